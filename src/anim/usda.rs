// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Plain-text reader for USDA blend shape weight caches

use super::AnimClip;
use crate::error::{BridgeError, BridgeResult};

const FRAME_RATE_KEY: &str = "framesPerSecond = ";
const START_KEY: &str = "startTimeCode = ";
const END_KEY: &str = "endTimeCode = ";
const SHAPES_KEY: &str = "uniform token[] blendShapes = [";
const WEIGHTS_KEY: &str = "float[] blendShapeWeights.timeSamples = {";

const REQUIRED_MARKERS: [&str; 5] = [
    FRAME_RATE_KEY,
    SHAPES_KEY,
    WEIGHTS_KEY,
    "token[] custom:mh_curveNames = [",
    "float[] custom:mh_curveValues.timeSamples = {",
];

/// Parse a weights cache. `path` only labels errors.
pub fn parse_weights_usda(clip_name: &str, source: &str, path: &str) -> BridgeResult<AnimClip> {
    let source = source.trim();

    if !source.starts_with("#usda") {
        return Err(BridgeError::malformed(path, "missing #usda header"));
    }
    if let Some(marker) = REQUIRED_MARKERS.iter().find(|m| !source.contains(*m)) {
        return Err(BridgeError::malformed(
            path,
            format!("not a weights animation cache, missing `{}`", marker.trim_end()),
        ));
    }

    let frame_rate: f64 = header_number(source, FRAME_RATE_KEY, path)?;
    let start_frame = match line_after(source, START_KEY) {
        Some(_) => header_number::<f64>(source, START_KEY, path)?.round() as i32,
        None => 0,
    };

    let shapes = bracketed(source, SHAPES_KEY, ']')
        .ok_or_else(|| BridgeError::malformed(path, "unterminated blendShapes array"))?
        .split(',')
        .map(|name| name.trim().trim_matches('"').to_string())
        .filter(|name| !name.is_empty())
        .collect::<Vec<_>>();

    let samples = bracketed(source, WEIGHTS_KEY, '}')
        .ok_or_else(|| BridgeError::malformed(path, "unterminated blendShapeWeights samples"))?;

    let mut rows = Vec::new();
    for line in samples.lines().map(str::trim).filter(|l| !l.is_empty()) {
        rows.push(parse_sample_row(line).ok_or_else(|| {
            BridgeError::malformed(path, format!("bad time sample: {}", line))
        })?);
    }

    if let Some(end) = line_after(source, END_KEY).and_then(|v| v.parse::<f64>().ok()) {
        let expected = (end.round() as i64 - start_frame as i64 + 1).max(0) as usize;
        if expected != rows.len() {
            log::debug!(
                "{}: time code range covers {} frames, found {} samples",
                path,
                expected,
                rows.len()
            );
        }
    }

    AnimClip::from_rows(clip_name, shapes, &rows, start_frame, frame_rate)
        .map_err(|e| e.with_path(path))
}

/// Rest of the line following `key`, trimmed
fn line_after<'a>(source: &'a str, key: &str) -> Option<&'a str> {
    let start = source.find(key)? + key.len();
    let rest = &source[start..];
    Some(rest.lines().next().unwrap_or("").trim())
}

fn header_number<T: std::str::FromStr>(source: &str, key: &str, path: &str) -> BridgeResult<T> {
    let value = line_after(source, key).unwrap_or("");
    value.parse().map_err(|_| {
        BridgeError::malformed(
            path,
            format!("bad value for {}: '{}'", key.trim_end_matches(" = "), value),
        )
    })
}

/// Text between `key` and the next `close`
fn bracketed<'a>(source: &'a str, key: &str, close: char) -> Option<&'a str> {
    let start = source.find(key)? + key.len();
    let rest = &source[start..];
    rest.find(close).map(|end| &rest[..end])
}

/// `12: [0.1, 0.2, 0.3],` -> weights
fn parse_sample_row(line: &str) -> Option<Vec<f32>> {
    let (_, values) = line.split_once(": [")?;
    let values = &values[..values.rfind(']')?];
    if values.trim().is_empty() {
        return Some(Vec::new());
    }
    values
        .split(',')
        .map(|v| v.trim().parse::<f32>().ok())
        .collect()
}
