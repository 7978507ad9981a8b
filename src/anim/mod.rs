// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Shape-key animation clips loaded from USDA weight caches or JSON exports

mod json;
mod usda;
pub mod plan;

pub use json::parse_weights_json;
pub use usda::parse_weights_usda;
pub use plan::{plan_import, ImportOptions, ImportPlan, KeyedCurve, LoadTo, StartAt, StripPlan, TargetState, TrackInfo};

use crate::error::{BridgeError, BridgeResult};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Frame rate assumed for JSON exports, which carry none
pub const DEFAULT_JSON_FRAME_RATE: f64 = 60.0;

/// Blend shape weights for a single clip, stored per shape
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnimClip {
    pub clip_name: String,
    pub shapes: Vec<String>,
    /// One curve per shape, `num_frames` values each
    key_data: Vec<Vec<f32>>,
    pub num_frames: usize,
    pub start_frame: i32,
    pub frame_rate: f64,
}

impl AnimClip {
    /// Build a clip from frame-major rows, one weight per shape per row
    pub fn from_rows(
        clip_name: impl Into<String>,
        shapes: Vec<String>,
        rows: &[Vec<f32>],
        start_frame: i32,
        frame_rate: f64,
    ) -> BridgeResult<Self> {
        let clip_name = clip_name.into();

        if !(frame_rate.is_finite() && frame_rate > 0.0) {
            return Err(BridgeError::malformed(
                &clip_name,
                format!("invalid frame rate {}", frame_rate),
            ));
        }

        if let Some((frame, row)) = rows.iter().enumerate().find(|(_, r)| r.len() < shapes.len()) {
            return Err(BridgeError::malformed(
                &clip_name,
                format!(
                    "frame {} has {} weights for {} shapes",
                    frame,
                    row.len(),
                    shapes.len()
                ),
            ));
        }

        let key_data = (0..shapes.len())
            .map(|index| rows.iter().map(|row| row[index]).collect())
            .collect();

        Ok(Self {
            clip_name,
            shapes,
            key_data,
            num_frames: rows.len(),
            start_frame,
            frame_rate,
        })
    }

    /// `(data path, values)` for every shape, in shape order
    pub fn curves(&self) -> impl Iterator<Item = (String, &[f32])> + '_ {
        self.shapes
            .iter()
            .zip(&self.key_data)
            .map(|(name, values)| (curve_data_path(name), values.as_slice()))
    }

    pub fn curve(&self, shape: &str) -> Option<&[f32]> {
        self.shapes
            .iter()
            .position(|s| s == shape)
            .map(|index| self.key_data[index].as_slice())
    }

    pub fn duration_seconds(&self) -> f64 {
        self.num_frames as f64 / self.frame_rate
    }
}

/// Data path of the curve driving a shape key's value
pub fn curve_data_path(shape: &str) -> String {
    format!("key_blocks[\"{}\"].value", shape)
}

/// Clip name derived from a file path: the file name up to its first `.`
pub fn clip_name_for(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy())
        .and_then(|name| name.split('.').next().map(str::to_string))
        .unwrap_or_default()
}

/// Load a clip from a `.usda` weights cache or a `.json` export.
/// `json_frame_rate` is used for JSON files only.
pub fn load_clip(path: impl AsRef<Path>, json_frame_rate: f64) -> BridgeResult<AnimClip> {
    let path = path.as_ref();
    let extension = path
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    let clip_name = clip_name_for(path);

    log::info!("Loading anim: {}", path.display());

    match extension.as_str() {
        "usda" => {
            let source = std::fs::read_to_string(path)?;
            parse_weights_usda(&clip_name, &source, &path.display().to_string())
        }
        "json" => {
            let source = std::fs::read_to_string(path)?;
            parse_weights_json(&clip_name, &source, json_frame_rate, &path.display().to_string())
        }
        _ => Err(BridgeError::UnsupportedFormat(path.display().to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shapes(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_rows_are_transposed() {
        let rows = vec![vec![0.0, 1.0], vec![0.5, 0.75], vec![1.0, 0.25]];
        let clip = AnimClip::from_rows("talk", shapes(&["jawOpen", "mouthClose"]), &rows, 0, 30.0).unwrap();

        assert_eq!(clip.num_frames, 3);
        assert_eq!(clip.curve("jawOpen"), Some(&[0.0, 0.5, 1.0][..]));
        assert_eq!(clip.curve("mouthClose"), Some(&[1.0, 0.75, 0.25][..]));
        assert_eq!(clip.curve("missing"), None);
        assert!((clip.duration_seconds() - 0.1).abs() < 1e-9);
    }

    #[test]
    fn test_curve_data_paths() {
        let rows = vec![vec![0.1, 0.2]];
        let clip = AnimClip::from_rows("c", shapes(&["a", "b"]), &rows, 0, 60.0).unwrap();
        let paths: Vec<String> = clip.curves().map(|(path, _)| path).collect();
        assert_eq!(paths, vec![r#"key_blocks["a"].value"#, r#"key_blocks["b"].value"#]);
    }

    #[test]
    fn test_short_row_rejected() {
        let rows = vec![vec![0.1, 0.2], vec![0.3]];
        let result = AnimClip::from_rows("c", shapes(&["a", "b"]), &rows, 0, 60.0);
        assert!(matches!(result, Err(BridgeError::MalformedCache { .. })));
    }

    #[test]
    fn test_invalid_frame_rate_rejected() {
        let result = AnimClip::from_rows("c", shapes(&["a"]), &[vec![0.0]], 0, 0.0);
        assert!(matches!(result, Err(BridgeError::MalformedCache { .. })));
    }

    #[test]
    fn test_clip_name_for() {
        assert_eq!(clip_name_for(Path::new("/tmp/talk_take2.anim.usda")), "talk_take2");
        assert_eq!(clip_name_for(Path::new("weights.json")), "weights");
    }

    #[test]
    fn test_unsupported_extension() {
        let result = load_clip("clip.usdc", DEFAULT_JSON_FRAME_RATE);
        assert!(matches!(result, Err(BridgeError::UnsupportedFormat(_))));
    }
}
