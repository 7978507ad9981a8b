// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Shape-key transfer from re-imported heads back onto the original meshes
//!
//! Exported heads carry an `index_orig` mapping from each exported vertex to
//! the vertex of the original mesh it was copied from. Transferring a shape
//! writes every source vertex to its mapped target vertex; target vertices
//! outside the mapping keep their basis position.

use crate::error::{BridgeError, BridgeResult};
use crate::scene::{export_token, MeshRef};
use nalgebra::Point3;
use serde::{Deserialize, Serialize};

/// Name of the reference shape
pub const BASIS: &str = "Basis";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShapeKey {
    pub name: String,
    pub positions: Vec<Point3<f32>>,
}

impl ShapeKey {
    pub fn new(name: impl Into<String>, positions: Vec<Point3<f32>>) -> Self {
        Self {
            name: name.into(),
            positions,
        }
    }
}

/// Ordered shape keys of one mesh
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ShapeKeySet {
    pub keys: Vec<ShapeKey>,
}

impl ShapeKeySet {
    pub fn new(keys: Vec<ShapeKey>) -> Self {
        Self { keys }
    }

    pub fn get(&self, name: &str) -> Option<&ShapeKey> {
        self.keys.iter().find(|k| k.name == name)
    }

    pub fn basis(&self) -> Option<&ShapeKey> {
        self.get(BASIS)
    }

    /// Names of all keys other than the basis
    pub fn shape_names(&self) -> Vec<&str> {
        self.keys
            .iter()
            .filter(|k| k.name != BASIS)
            .map(|k| k.name.as_str())
            .collect()
    }

    /// Remove the named keys, returning how many were present
    pub fn clean_shapes(&mut self, names: &[&str]) -> usize {
        let before = self.keys.len();
        self.keys.retain(|k| !names.contains(&k.name.as_str()));
        before - self.keys.len()
    }
}

/// Pair each imported object with the exported mesh sharing its export token.
/// The imported side is matched by object name, the exported side by mesh name.
pub fn build_mapping_table<'a>(
    imported: &'a [String],
    exported: &'a [MeshRef],
) -> Vec<(&'a str, &'a MeshRef)> {
    let mut table = Vec::new();
    for name in imported {
        let token = export_token(name);
        if token.is_empty() {
            log::debug!("Skipping {}: no export suffix", name);
            continue;
        }
        if let Some(mesh) = exported.iter().find(|m| export_token(&m.mesh) == token) {
            table.push((name.as_str(), mesh));
        }
    }
    table
}

/// Build target keys for every non-basis source key
pub fn transfer_shapes(
    source: &ShapeKeySet,
    target_basis: &[Point3<f32>],
    mapping: &[u32],
) -> BridgeResult<Vec<ShapeKey>> {
    for key in &source.keys {
        if key.positions.len() != mapping.len() {
            return Err(BridgeError::ShapeMismatch(format!(
                "source shape {} has {} vertices, mapping has {}",
                key.name,
                key.positions.len(),
                mapping.len()
            )));
        }
    }
    if let Some(index) = mapping.iter().find(|&&i| i as usize >= target_basis.len()) {
        return Err(BridgeError::ShapeMismatch(format!(
            "mapping index {} out of range for {} target vertices",
            index,
            target_basis.len()
        )));
    }

    let keys = source
        .keys
        .iter()
        .filter(|k| k.name != BASIS)
        .map(|key| {
            let mut positions = target_basis.to_vec();
            for (source_index, &target_index) in mapping.iter().enumerate() {
                positions[target_index as usize] = key.positions[source_index];
            }
            ShapeKey::new(key.name.clone(), positions)
        })
        .collect();

    Ok(keys)
}

/// Target vertices no source vertex maps onto
pub fn untouched_vertices(target_len: usize, mapping: &[u32]) -> Vec<usize> {
    let mut covered = vec![false; target_len];
    for &index in mapping {
        if let Some(slot) = covered.get_mut(index as usize) {
            *slot = true;
        }
    }
    covered
        .iter()
        .enumerate()
        .filter_map(|(i, &c)| (!c).then_some(i))
        .collect()
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TransferReport {
    pub cleaned: usize,
    pub transferred: usize,
    /// Vertices left at the basis position
    pub untouched: Vec<usize>,
}

/// Replace the target's copies of the source shapes with freshly transferred ones.
/// A basis is created from `target_mesh` when the target has none.
pub fn transfer_into(
    target_mesh: &[Point3<f32>],
    target_keys: &mut ShapeKeySet,
    source: &ShapeKeySet,
    mapping: &[u32],
) -> BridgeResult<TransferReport> {
    let basis = match target_keys.basis() {
        Some(basis) => basis.positions.clone(),
        None => target_mesh.to_vec(),
    };
    let new_keys = transfer_shapes(source, &basis, mapping)?;

    let cleaned = target_keys.clean_shapes(&source.shape_names());
    if target_keys.basis().is_none() {
        target_keys.keys.insert(0, ShapeKey::new(BASIS, basis.clone()));
    }

    let transferred = new_keys.len();
    for key in &new_keys {
        log::info!("Transferred shape {}", key.name);
    }
    target_keys.keys.extend(new_keys);

    Ok(TransferReport {
        cleaned,
        transferred,
        untouched: untouched_vertices(basis.len(), mapping),
    })
}

/// A self-contained transfer request, as read from JSON by the CLI
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransferJob {
    pub target_mesh: Vec<Point3<f32>>,
    #[serde(default)]
    pub target_keys: ShapeKeySet,
    pub source: ShapeKeySet,
    pub mapping: Vec<u32>,
}

impl TransferJob {
    /// Run the transfer, returning the updated target keys
    pub fn run(mut self) -> BridgeResult<(ShapeKeySet, TransferReport)> {
        let report = transfer_into(&self.target_mesh, &mut self.target_keys, &self.source, &self.mapping)?;
        Ok((self.target_keys, report))
    }
}
