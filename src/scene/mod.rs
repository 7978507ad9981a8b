// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Scene snapshot - the host scene state passed explicitly into every operation

pub mod naming;

pub use naming::{character_prim_path, export_name, export_token, valid_prim_name};

use anyhow::{Context, Result};
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Translate / rotate (degrees, XYZ) / scale
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub translation: Vector3<f64>,
    pub rotation: Vector3<f64>,
    pub scale: Vector3<f64>,
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}

impl Transform {
    pub fn identity() -> Self {
        Self {
            translation: Vector3::zeros(),
            rotation: Vector3::zeros(),
            scale: Vector3::new(1.0, 1.0, 1.0),
        }
    }

    pub fn is_identity(&self, epsilon: f64) -> bool {
        let identity = Self::identity();
        (self.translation - identity.translation).amax() <= epsilon
            && (self.rotation - identity.rotation).amax() <= epsilon
            && (self.scale - identity.scale).amax() <= epsilon
    }
}

/// An object and the name of its mesh data block
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MeshRef {
    pub object: String,
    pub mesh: String,
}

impl MeshRef {
    pub fn new(object: impl Into<String>, mesh: impl Into<String>) -> Self {
        Self {
            object: object.into(),
            mesh: mesh.into(),
        }
    }

    /// Prim path of this mesh under the character root
    pub fn prim_path(&self) -> String {
        character_prim_path(&self.object, &self.mesh)
    }
}

/// A node of the host scene graph
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneNode {
    pub name: String,
    /// Mesh data name, for mesh objects
    #[serde(default)]
    pub mesh: Option<String>,
    #[serde(default)]
    pub transform: Transform,
    #[serde(default)]
    pub children: Vec<SceneNode>,
}

impl SceneNode {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            mesh: None,
            transform: Transform::identity(),
            children: Vec::new(),
        }
    }

    pub fn with_mesh(mut self, mesh: impl Into<String>) -> Self {
        self.mesh = Some(mesh.into());
        self
    }

    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    pub fn with_child(mut self, child: SceneNode) -> Self {
        self.children.push(child);
        self
    }

    pub fn mesh_ref(&self) -> Option<MeshRef> {
        self.mesh
            .as_ref()
            .map(|mesh| MeshRef::new(self.name.clone(), mesh.clone()))
    }

    /// Depth-first search by object name
    pub fn find(&self, name: &str) -> Option<&SceneNode> {
        if self.name == name {
            return Some(self);
        }
        self.children.iter().find_map(|child| child.find(name))
    }

    /// All nodes in depth-first order, self first
    pub fn walk(&self) -> Vec<&SceneNode> {
        let mut nodes = vec![self];
        for child in &self.children {
            nodes.extend(child.walk());
        }
        nodes
    }

    pub fn mesh_objects(&self) -> Vec<MeshRef> {
        self.walk().into_iter().filter_map(SceneNode::mesh_ref).collect()
    }

    /// Load a scene snapshot from JSON
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read scene snapshot: {:?}", path.as_ref()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse scene snapshot: {:?}", path.as_ref()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> SceneNode {
        SceneNode::new("Character")
            .with_child(SceneNode::new("Head").with_mesh("HeadMesh"))
            .with_child(
                SceneNode::new("Eyes")
                    .with_child(SceneNode::new("Eye.L").with_mesh("EyeMesh.L"))
                    .with_child(SceneNode::new("Eye.R").with_mesh("EyeMesh.R")),
            )
    }

    #[test]
    fn test_find_and_walk() {
        let scene = sample();
        assert_eq!(scene.walk().len(), 5);
        assert_eq!(scene.find("Eye.R").and_then(|n| n.mesh.clone()), Some("EyeMesh.R".into()));
        assert!(scene.find("Tongue").is_none());
    }

    #[test]
    fn test_mesh_objects() {
        let meshes = sample().mesh_objects();
        assert_eq!(meshes.len(), 3);
        assert_eq!(meshes[1].prim_path(), "/World/character_root/Eye_L/EyeMesh_L");
    }

    #[test]
    fn test_identity_transform() {
        assert!(Transform::identity().is_identity(1e-9));
        let moved = Transform {
            translation: Vector3::new(0.0, 1.0, 0.0),
            ..Transform::identity()
        };
        assert!(!moved.is_identity(1e-9));
    }

    #[test]
    fn test_snapshot_json_defaults() {
        let json = r#"{ "name": "Head", "mesh": "HeadMesh" }"#;
        let node: SceneNode = serde_json::from_str(json).unwrap();
        assert_eq!(node.transform, Transform::identity());
        assert!(node.children.is_empty());
    }
}
