// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! CLI subsystem for omnibridge

pub mod reporter;

pub use reporter::Reporter;

use crate::anim::{AnimClip, ImportPlan};
use crate::document::{self, Metadata};
use crate::error::BridgeResult;
use serde::Serialize;
use std::path::Path;

/// Parse a `--meta key=value` argument
pub fn parse_key_val(s: &str) -> Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("invalid KEY=VALUE: no `=` found in `{}`", s))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("invalid KEY=VALUE: empty key in `{}`", s));
    }
    Ok((key.to_string(), value.to_string()))
}

/// Metadata from `--meta` pairs, each written as `key = value`. A key may
/// carry its type (`bool mm:flag=1`).
pub fn metadata_from_pairs(pairs: &[(String, String)]) -> Metadata {
    pairs
        .iter()
        .map(|(key, value)| (key.as_str(), value.as_str()))
        .collect()
}

/// Single JSON document for `anim --json`: the clip alone, or clip and plan
pub fn anim_json(clip: &AnimClip, plan: Option<&ImportPlan>) -> serde_json::Result<serde_json::Value> {
    match plan {
        Some(plan) => Ok(serde_json::json!({ "clip": clip, "plan": plan })),
        None => serde_json::to_value(clip),
    }
}

/// Pretty JSON written through the same atomic path as documents
pub fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> BridgeResult<()> {
    let json = serde_json::to_string_pretty(value)?;
    document::write_atomic(path, &json)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::AttrValue;

    #[test]
    fn test_parse_key_val() {
        assert_eq!(
            parse_key_val("mm:axis_up=Y").unwrap(),
            ("mm:axis_up".to_string(), "Y".to_string())
        );
        assert_eq!(
            parse_key_val("mm:expr=a=b").unwrap(),
            ("mm:expr".to_string(), "a=b".to_string())
        );
        assert!(parse_key_val("novalue").is_err());
        assert!(parse_key_val("=x").is_err());
    }

    #[test]
    fn test_pairs_render_literally() {
        let pairs = vec![
            ("mm:axis_fwd".to_string(), "Z".to_string()),
            ("bool mm:axis_vis".to_string(), "1".to_string()),
        ];
        let metadata = metadata_from_pairs(&pairs);
        assert_eq!(metadata.get("mm:axis_fwd"), Some(&AttrValue::Raw("Z".into())));
        assert_eq!(metadata.get("mm:axis_vis"), Some(&AttrValue::Raw("1".into())));
        assert_eq!(metadata.render(""), "mm:axis_fwd = Z\nbool mm:axis_vis = 1\n");
    }

    fn clip() -> AnimClip {
        AnimClip::from_rows("talk", vec!["jawOpen".into()], &[vec![0.0], vec![1.0]], 0, 30.0).unwrap()
    }

    #[test]
    fn test_anim_json_is_one_document() {
        let clip = clip();
        let plan = crate::anim::plan_import(&clip, &Default::default(), &Default::default()).unwrap();

        let value = anim_json(&clip, Some(&plan)).unwrap();
        let text = serde_json::to_string_pretty(&value).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed["clip"]["clip_name"], "talk");
        assert_eq!(parsed["plan"]["action_name"], "talk");

        let alone = anim_json(&clip, None).unwrap();
        assert_eq!(alone["num_frames"], 2);
        assert!(alone.get("plan").is_none());
    }

    #[test]
    fn test_write_json_uses_document_writer() -> anyhow::Result<()> {
        let dir = tempfile::TempDir::new()?;
        let path = dir.path().join("plan.json");
        let plain = dir.path().join("plain.json");

        write_json(&path, &clip())?;
        std::fs::write(&plain, "{}")?;

        let back: AnimClip = serde_json::from_str(&std::fs::read_to_string(&path)?)?;
        assert_eq!(back, clip());

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = |p: &Path| -> std::io::Result<u32> {
                Ok(std::fs::metadata(p)?.permissions().mode() & 0o777)
            };
            assert_eq!(mode(&path)?, mode(&plain)?);
        }
        Ok(())
    }
}
