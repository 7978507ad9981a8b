// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Project export - character parts to `transfer_data` metadata to project file

use crate::document::{self, AttrValue, Metadata, Template};
use crate::error::{BridgeError, BridgeResult};
use crate::scene::{MeshRef, SceneNode, Transform};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Axis convention recorded in the project's `transfer_data` scope
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AxisConvention {
    pub forward: String,
    pub up: String,
    pub visible: bool,
}

impl Default for AxisConvention {
    fn default() -> Self {
        Self {
            forward: "Z".to_string(),
            up: "Y".to_string(),
            visible: true,
        }
    }
}

impl AxisConvention {
    pub fn to_metadata(&self) -> Metadata {
        Metadata::new()
            .with("mm:axis_fwd", self.forward.as_str())
            .with("mm:axis_up", self.up.as_str())
            .with("mm:axis_vis", self.visible)
    }
}

/// Object names picked for each character role
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PartNames {
    pub skin: Option<String>,
    pub tongue: Option<String>,
    pub eye_left: Option<String>,
    pub eye_right: Option<String>,
    pub gums_lower: Option<String>,
    #[serde(default)]
    pub extra_static: Vec<String>,
    #[serde(default)]
    pub extra_dynamic: Vec<String>,
}

/// Meshes making up the exported character
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CharacterParts {
    pub skin: Option<MeshRef>,
    pub tongue: Option<MeshRef>,
    pub eye_left: Option<MeshRef>,
    pub eye_right: Option<MeshRef>,
    pub gums_lower: Option<MeshRef>,
    #[serde(default)]
    pub extra_static: Vec<MeshRef>,
    #[serde(default)]
    pub extra_dynamic: Vec<MeshRef>,
}

impl CharacterParts {
    /// Look up each named role in the scene snapshot
    pub fn resolve(scene: &SceneNode, names: &PartNames) -> BridgeResult<Self> {
        let lookup = |name: &String| -> BridgeResult<MeshRef> {
            scene
                .find(name)
                .and_then(SceneNode::mesh_ref)
                .ok_or_else(|| BridgeError::UnknownObject(name.clone()))
        };
        let lookup_opt = |name: &Option<String>| name.as_ref().map(lookup).transpose();

        Ok(Self {
            skin: lookup_opt(&names.skin)?,
            tongue: lookup_opt(&names.tongue)?,
            eye_left: lookup_opt(&names.eye_left)?,
            eye_right: lookup_opt(&names.eye_right)?,
            gums_lower: lookup_opt(&names.gums_lower)?,
            extra_static: names.extra_static.iter().map(lookup).collect::<BridgeResult<_>>()?,
            extra_dynamic: names.extra_dynamic.iter().map(lookup).collect::<BridgeResult<_>>()?,
        })
    }

    /// Extra static meshes, minus the eyes and gums
    pub fn static_extras(&self) -> Vec<&MeshRef> {
        let named: Vec<&MeshRef> = [&self.eye_left, &self.eye_right, &self.gums_lower]
            .into_iter()
            .flatten()
            .collect();
        self.extra_static.iter().filter(|m| !named.contains(m)).collect()
    }

    /// Extra dynamic meshes, minus the skin and tongue
    pub fn dynamic_extras(&self) -> Vec<&MeshRef> {
        let named: Vec<&MeshRef> = [&self.skin, &self.tongue].into_iter().flatten().collect();
        self.extra_dynamic.iter().filter(|m| !named.contains(m)).collect()
    }

    /// Attributes naming each part's prim path
    pub fn transfer_data(&self) -> Metadata {
        let mut metadata = Metadata::new();

        if let Some(skin) = &self.skin {
            metadata.insert("mm:skin", skin.prim_path());
        }
        if let Some(tongue) = &self.tongue {
            metadata.insert("mm:tongue", tongue.prim_path());
        }
        for (name, part) in [
            ("mm:l_eye", &self.eye_left),
            ("mm:r_eye", &self.eye_right),
            ("mm:gums", &self.gums_lower),
        ] {
            if let Some(part) = part {
                metadata.insert(name, AttrValue::StringArray(vec![part.prim_path()]));
            }
        }

        let statics = self.static_extras();
        if !statics.is_empty() {
            let paths = statics.iter().map(|m| m.prim_path()).collect::<Vec<_>>();
            metadata.insert("mm:extra_static", paths);
        }
        let dynamics = self.dynamic_extras();
        if !dynamics.is_empty() {
            let paths = dynamics.iter().map(|m| m.prim_path()).collect::<Vec<_>>();
            metadata.insert("mm:extra_dynamic", paths);
        }

        metadata
    }
}

/// `head.usd` -> `head_project.usda`, next to the head file
pub fn project_path_for(head_path: &Path) -> PathBuf {
    let stem = head_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    head_path.with_file_name(format!("{}_project.usda", stem))
}

/// Relative payload reference to the head file, e.g. `./head.usd`
pub fn payload_reference_for(head_path: &Path) -> BridgeResult<String> {
    let name = head_path.file_name().ok_or_else(|| BridgeError::InvalidPath {
        path: head_path.display().to_string(),
        reason: "path has no file name",
    })?;
    Ok(format!("./{}", name.to_string_lossy()))
}

/// A project document describing an exported character
#[derive(Debug, Clone, Default)]
pub struct ProjectExport {
    pub axes: AxisConvention,
    pub parts: CharacterParts,
    pub root_transform: Transform,
    template: Template,
}

impl ProjectExport {
    pub fn new(parts: CharacterParts) -> Self {
        Self {
            parts,
            ..Self::default()
        }
    }

    pub fn with_axes(mut self, axes: AxisConvention) -> Self {
        self.axes = axes;
        self
    }

    pub fn with_template(mut self, template: Template) -> Self {
        self.template = template;
        self
    }

    pub fn with_root_transform(mut self, transform: Transform) -> Self {
        self.root_transform = transform;
        self
    }

    /// Axis attributes followed by the part prim paths
    pub fn metadata(&self) -> Metadata {
        let mut metadata = self.axes.to_metadata();
        metadata.extend_from(self.parts.transfer_data());
        metadata
    }

    pub fn generate(&self, payload_path: &str) -> BridgeResult<String> {
        if !self.root_transform.is_identity(1e-6) {
            log::warn!(
                "Character root has a non-identity transform; the project uses identity ops, \
                 apply transforms before exporting the head"
            );
        }
        self.template.generate(payload_path, &self.metadata())
    }

    /// Write `<head>_project.usda` next to the head file and return its path
    pub fn write(&self, head_path: &Path) -> BridgeResult<PathBuf> {
        let payload = payload_reference_for(head_path)?;
        let document = self.generate(&payload)?;
        let project_path = project_path_for(head_path);
        document::write_atomic(&project_path, &document)?;
        log::info!("Exported project to: '{}'", project_path.display());
        Ok(project_path)
    }
}
