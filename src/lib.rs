// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! omnibridge
//!
//! Hands scene data between a DCC host and USD-based face animation tools.
//! Generates project documents from a template, reads blend shape weight
//! caches back as clips, plans their placement on a timeline and transfers
//! shape keys through vertex mappings. Host state comes in as explicit
//! snapshot values; nothing here talks to a running application.

pub mod anim;
pub mod cli;
pub mod config;
pub mod document;
pub mod error;
pub mod project;
pub mod scene;
pub mod shapes;

pub use anim::{load_clip, plan_import, AnimClip, ImportOptions, ImportPlan};
pub use config::BridgeConfig;
pub use document::{generate, AttrValue, Metadata, Template};
pub use error::{BridgeError, BridgeResult};
pub use project::{AxisConvention, CharacterParts, ProjectExport};
pub use scene::{MeshRef, SceneNode, Transform};

use std::path::Path;

/// Generate a project document and write it to `path` using the built-in template
pub fn write_project(path: impl AsRef<Path>, payload_path: &str, metadata: &Metadata) -> BridgeResult<()> {
    document::write(path, &Template::project(), payload_path, metadata)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_generate() {
        let result = generate("./char.usd", &Metadata::new());
        assert!(result.is_ok());
    }
}
