// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Placeholder substitution over the project template

use super::metadata::Metadata;
use crate::error::{BridgeError, BridgeResult};
use std::path::Path;

/// Replaced with the payload asset path
pub const FILEPATH_TOKEN: &str = "%filepath%";

/// Line replaced with the rendered `transfer_data` attributes
pub const TRANSFER_DATA_TOKEN: &str = "%transfer_data%";

/// Built-in project template
pub const PROJECT_TEMPLATE: &str = include_str!("project_template.usda");

/// Template text holding both placeholder tokens exactly once
#[derive(Debug, Clone, PartialEq)]
pub struct Template {
    text: String,
}

impl Default for Template {
    fn default() -> Self {
        Self::project()
    }
}

impl Template {
    /// The built-in project template
    pub fn project() -> Self {
        Self {
            text: PROJECT_TEMPLATE.to_string(),
        }
    }

    /// Wrap custom template text, checking both placeholders
    pub fn new(text: impl Into<String>) -> BridgeResult<Self> {
        let template = Self { text: text.into() };
        template.check_placeholders()?;
        Ok(template)
    }

    /// Load a custom template from disk
    pub fn from_file(path: impl AsRef<Path>) -> BridgeResult<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        log::debug!("Loaded template from {}", path.as_ref().display());
        Self::new(text)
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Ensure each placeholder token occurs exactly once
    pub fn check_placeholders(&self) -> BridgeResult<()> {
        for token in [FILEPATH_TOKEN, TRANSFER_DATA_TOKEN] {
            let count = self.text.matches(token).count();
            if count != 1 {
                return Err(BridgeError::MissingPlaceholder { token, count });
            }
        }
        Ok(())
    }

    /// Substitute the payload path and metadata into the template
    pub fn generate(&self, payload_path: &str, metadata: &Metadata) -> BridgeResult<String> {
        self.check_placeholders()?;
        validate_payload_path(payload_path)?;
        metadata.validate()?;

        let with_data = substitute_marker_line(&self.text, metadata);
        let document = with_data.replacen(FILEPATH_TOKEN, payload_path, 1);

        log::debug!(
            "Generated document for payload {} with {} metadata lines",
            payload_path,
            metadata.len()
        );
        Ok(document)
    }
}

/// Check a payload path against the `@...@` asset reference syntax
pub fn validate_payload_path(path: &str) -> BridgeResult<()> {
    let invalid = |reason| BridgeError::InvalidPath {
        path: path.to_string(),
        reason,
    };

    if path.trim().is_empty() {
        return Err(invalid("path is empty"));
    }
    if path.contains('@') {
        return Err(invalid("asset paths cannot contain '@'"));
    }
    if path.chars().any(char::is_control) {
        return Err(invalid("path contains a control character"));
    }
    if path.contains(FILEPATH_TOKEN) || path.contains(TRANSFER_DATA_TOKEN) {
        return Err(invalid("path contains a template placeholder token"));
    }
    Ok(())
}

/// Replace the marker. When it sits alone on its line the whole line is
/// replaced and each attribute reuses the line's indentation and line ending.
fn substitute_marker_line(text: &str, metadata: &Metadata) -> String {
    let Some(start) = text.find(TRANSFER_DATA_TOKEN) else {
        return text.to_string();
    };
    let end = start + TRANSFER_DATA_TOKEN.len();

    let line_start = text[..start].rfind('\n').map(|i| i + 1).unwrap_or(0);
    let line_end = text[end..].find('\n').map(|i| end + i + 1).unwrap_or(text.len());

    let indent = &text[line_start..start];
    let trailing = &text[end..line_end];
    let own_line = indent.chars().all(|c| c == ' ' || c == '\t')
        && trailing.trim_end_matches(['\n', '\r']).trim().is_empty();

    let mut out = String::with_capacity(text.len() + metadata.len() * 64);
    if own_line {
        let crlf = trailing.ends_with("\r\n")
            || (!trailing.ends_with('\n') && text.contains("\r\n"));
        let line_ending = if crlf {
            "\r\n"
        } else {
            "\n"
        };
        out.push_str(&text[..line_start]);
        out.push_str(&metadata.render_lines(indent, line_ending));
        out.push_str(&text[line_end..]);
    } else {
        let rendered = metadata.render("");
        out.push_str(&text[..start]);
        out.push_str(rendered.trim_end_matches('\n'));
        out.push_str(&text[end..]);
    }
    out
}
