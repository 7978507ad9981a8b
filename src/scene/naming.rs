// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Prim naming rules shared by export and shape transfer

/// Suffix appended to duplicated export objects and their mesh data
pub const EXPORT_SUFFIX: &str = "__Audio2Face_EX";

/// Root under which the exported character is payloaded
pub const CHARACTER_ROOT: &str = "/World/character_root";

/// Make a host object name usable as a USD prim name
pub fn valid_prim_name(name: &str) -> String {
    name.replace(['-', ' ', '.'], "_")
}

/// Name given to the export duplicate of an object or mesh
pub fn export_name(name: &str) -> String {
    format!("{}{}", valid_prim_name(name), EXPORT_SUFFIX)
}

/// Name with the export suffix removed; empty when the suffix is absent
pub fn export_token(name: &str) -> &str {
    name.rfind(EXPORT_SUFFIX).map(|i| &name[..i]).unwrap_or("")
}

/// Prim path of a mesh under the character root
pub fn character_prim_path(object: &str, mesh: &str) -> String {
    format!(
        "{}/{}/{}",
        CHARACTER_ROOT,
        valid_prim_name(object),
        valid_prim_name(mesh)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_prim_name() {
        assert_eq!(valid_prim_name("Head Mesh-01.001"), "Head_Mesh_01_001");
        assert_eq!(valid_prim_name("already_ok"), "already_ok");
    }

    #[test]
    fn test_export_token() {
        assert_eq!(export_token("Head__Audio2Face_EX"), "Head");
        assert_eq!(export_token("Head__Audio2Face_EX.001"), "Head");
        assert_eq!(export_token("Head"), "");
        assert_eq!(export_token(&export_name("Left Eye")), "Left_Eye");
    }

    #[test]
    fn test_character_prim_path() {
        assert_eq!(
            character_prim_path("Head.001", "HeadMesh"),
            "/World/character_root/Head_001/HeadMesh"
        );
    }
}
