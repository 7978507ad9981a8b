// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Import planning - where a clip's keys land on the target's timeline
//!
//! The planner never touches the host. It takes a snapshot of the target
//! (playhead, scene rate, existing tracks and curves) plus the user's options
//! and returns the list of edits to apply.

use super::{curve_data_path, AnimClip};
use crate::error::{BridgeError, BridgeResult};
use serde::{Deserialize, Serialize};

/// Where the first key is placed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StartAt {
    Playhead,
    Frame(i32),
}

/// Whether keys go onto the active action or into a new clip track
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LoadTo {
    CurrentAction,
    Clip,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportOptions {
    pub start: StartAt,
    pub load_to: LoadTo,
    /// Rescale keys when clip and scene rates differ
    pub apply_scale: bool,
    /// Replace tracks already holding a clip of the same name
    pub overwrite: bool,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            start: StartAt::Playhead,
            load_to: LoadTo::CurrentAction,
            apply_scale: false,
            overwrite: false,
        }
    }
}

/// A clip track and the actions of its strips
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TrackInfo {
    pub name: String,
    pub strip_actions: Vec<String>,
}

/// Snapshot of the object receiving the animation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetState {
    pub current_frame: i32,
    pub scene_fps: f64,
    /// Name of the action currently assigned, if any
    pub current_action: Option<String>,
    /// Curve data paths already present on the receiving action
    #[serde(default)]
    pub existing_curves: Vec<String>,
    #[serde(default)]
    pub tracks: Vec<TrackInfo>,
}

impl Default for TargetState {
    fn default() -> Self {
        Self {
            current_frame: 1,
            scene_fps: 24.0,
            current_action: None,
            existing_curves: Vec::new(),
            tracks: Vec::new(),
        }
    }
}

/// Keys for one shape curve as `(frame, value)`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyedCurve {
    pub data_path: String,
    pub keys: Vec<(f64, f32)>,
}

/// New clip track holding the imported action
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StripPlan {
    pub track_name: String,
    pub action_name: String,
    pub frame_start: i32,
    pub scale: f64,
}

/// Edits needed to bring a clip onto the target
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportPlan {
    pub action_name: String,
    /// Whether `action_name` must be created
    pub create_action: bool,
    pub remove_tracks: Vec<String>,
    pub remove_curves: Vec<String>,
    pub curves: Vec<KeyedCurve>,
    pub strip: Option<StripPlan>,
}

impl ImportPlan {
    pub fn key_count(&self) -> usize {
        self.curves.iter().map(|c| c.keys.len()).sum()
    }

    /// Last keyed frame, if any keys are planned
    pub fn last_frame(&self) -> Option<f64> {
        self.curves
            .iter()
            .filter_map(|c| c.keys.last().map(|(frame, _)| *frame))
            .fold(None, |acc, f| Some(acc.map_or(f, |a: f64| a.max(f))))
    }
}

/// Plan the import of `clip` onto `target`
pub fn plan_import(
    clip: &AnimClip,
    target: &TargetState,
    options: &ImportOptions,
) -> BridgeResult<ImportPlan> {
    let start_frame = match options.start {
        StartAt::Playhead => target.current_frame,
        StartAt::Frame(frame) => frame,
    };
    let clip_to_scene = target.scene_fps / clip.frame_rate;

    let mut remove_tracks = Vec::new();
    let (action_name, create_action, offset, clip_scale) = match options.load_to {
        LoadTo::Clip => {
            let existing: Vec<&TrackInfo> = target
                .tracks
                .iter()
                .filter(|t| t.strip_actions.iter().any(|a| *a == clip.clip_name))
                .collect();

            if !existing.is_empty() {
                if !options.overwrite {
                    return Err(BridgeError::ClipExists(clip.clip_name.clone()));
                }
                for track in existing {
                    log::info!("Removing old track {}", track.name);
                    remove_tracks.push(track.name.clone());
                }
            }

            (clip.clip_name.clone(), true, 0.0, 1.0)
        }
        LoadTo::CurrentAction => {
            let rates_differ = clip.frame_rate.trunc() as i64 != target.scene_fps.trunc() as i64;
            let scale = if options.apply_scale && rates_differ {
                clip_to_scene
            } else {
                1.0
            };
            match &target.current_action {
                Some(action) => (action.clone(), false, start_frame as f64, scale),
                None => (clip.clip_name.clone(), true, start_frame as f64, scale),
            }
        }
    };

    let remove_curves = target
        .existing_curves
        .iter()
        .filter(|path| {
            clip.shapes
                .iter()
                .any(|shape| path.contains(&format!("[\"{}\"]", shape)))
        })
        .cloned()
        .collect();

    let curves = clip
        .curves()
        .map(|(data_path, values)| KeyedCurve {
            data_path,
            keys: values
                .iter()
                .enumerate()
                .map(|(index, value)| (index as f64 * clip_scale + offset, *value))
                .collect(),
        })
        .collect();

    let strip = match options.load_to {
        LoadTo::Clip => Some(StripPlan {
            track_name: format!("{}_NLE", clip.clip_name),
            action_name: clip.clip_name.clone(),
            frame_start: start_frame,
            scale: if options.apply_scale { clip_to_scene } else { 1.0 },
        }),
        LoadTo::CurrentAction => None,
    };

    Ok(ImportPlan {
        action_name,
        create_action,
        remove_tracks,
        remove_curves,
        curves,
        strip,
    })
}

/// Data paths of every curve the clip would write
pub fn clip_data_paths(clip: &AnimClip) -> Vec<String> {
    clip.shapes.iter().map(|s| curve_data_path(s)).collect()
}
