// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Interchange document generation - template substitution and file output

mod metadata;
mod template;

pub use metadata::{AttrValue, Attribute, Metadata};
pub use template::{
    validate_payload_path, Template, FILEPATH_TOKEN, PROJECT_TEMPLATE, TRANSFER_DATA_TOKEN,
};

use crate::error::BridgeResult;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

/// Generate a project document from the built-in template
pub fn generate(payload_path: &str, metadata: &Metadata) -> BridgeResult<String> {
    Template::project().generate(payload_path, metadata)
}

/// Generate a document and write it to `path`. Nothing is written when
/// generation fails.
pub fn write(
    path: impl AsRef<Path>,
    template: &Template,
    payload_path: &str,
    metadata: &Metadata,
) -> BridgeResult<()> {
    let document = template.generate(payload_path, metadata)?;
    write_atomic(path.as_ref(), &document)
}

/// Write through a temporary file in the destination directory, then rename
/// it over the target so readers never observe a partial document.
///
/// The result has the permissions a plain create would give it: those of the
/// file being replaced, or `0o666` minus the umask for a new file.
pub fn write_atomic(path: &Path, contents: &str) -> BridgeResult<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut file = temp_file_in(dir)?;
    file.write_all(contents.as_bytes())?;
    file.flush()?;
    if let Ok(existing) = std::fs::metadata(path) {
        file.as_file().set_permissions(existing.permissions())?;
    }
    file.persist(path).map_err(|e| e.error)?;

    log::info!("Wrote {} ({} bytes)", path.display(), contents.len());
    Ok(())
}

/// Temp files default to `0o600`; ask for `0o666` so the OS applies the umask
fn temp_file_in(dir: &Path) -> std::io::Result<NamedTempFile> {
    let mut builder = tempfile::Builder::new();
    builder.prefix(".omnibridge");
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        builder.permissions(std::fs::Permissions::from_mode(0o666));
    }
    builder.tempfile_in(dir)
}
