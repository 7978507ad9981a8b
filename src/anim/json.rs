// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Reader for JSON blend shape weight exports

use super::AnimClip;
use crate::error::{BridgeError, BridgeResult};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WeightsFile {
    facs_names: Vec<String>,
    weight_mat: Vec<Vec<f32>>,
    num_frames: usize,
}

/// Parse a JSON weights export. The format stores no rate, so `frame_rate` is supplied.
pub fn parse_weights_json(
    clip_name: &str,
    source: &str,
    frame_rate: f64,
    path: &str,
) -> BridgeResult<AnimClip> {
    let value: serde_json::Value = serde_json::from_str(source)?;

    for key in ["facsNames", "weightMat", "numFrames"] {
        if value.get(key).is_none() {
            return Err(BridgeError::malformed(path, format!("missing data: {}", key)));
        }
    }

    let file: WeightsFile =
        serde_json::from_value(value).map_err(|e| BridgeError::malformed(path, e.to_string()))?;

    if file.num_frames != file.weight_mat.len() {
        return Err(BridgeError::malformed(
            path,
            format!(
                "expected {} frames, found {}",
                file.num_frames,
                file.weight_mat.len()
            ),
        ));
    }

    AnimClip::from_rows(clip_name, file.facs_names, &file.weight_mat, 0, frame_rate)
        .map_err(|e| e.with_path(path))
}
