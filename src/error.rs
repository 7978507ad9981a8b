// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Error types shared by the document, animation and shape modules

use thiserror::Error;

#[derive(Error, Debug)]
pub enum BridgeError {
    /// The template lacks a placeholder, or carries one more than once.
    #[error("Template placeholder {token} found {count} times, expected exactly once")]
    MissingPlaceholder { token: &'static str, count: usize },

    #[error("Invalid payload path '{path}': {reason}")]
    InvalidPath { path: String, reason: &'static str },

    #[error("Invalid metadata entry '{key}': {reason}")]
    InvalidMetadata { key: String, reason: &'static str },

    #[error("Attribute '{0}' is declared more than once")]
    DuplicateAttribute(String),

    #[error("Malformed animation cache {path}: {reason}")]
    MalformedCache { path: String, reason: String },

    #[error("Unsupported file type, expected .usda or .json: {0}")]
    UnsupportedFormat(String),

    #[error("Object '{0}' not found in scene or has no mesh data")]
    UnknownObject(String),

    #[error("Clip named {0} already exists")]
    ClipExists(String),

    #[error("Shape data mismatch: {0}")]
    ShapeMismatch(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type BridgeResult<T> = Result<T, BridgeError>;

impl BridgeError {
    pub(crate) fn malformed(path: &str, reason: impl Into<String>) -> Self {
        BridgeError::MalformedCache {
            path: path.to_string(),
            reason: reason.into(),
        }
    }

    /// Re-label a malformed-cache error with the file it came from
    pub(crate) fn with_path(self, path: &str) -> Self {
        match self {
            BridgeError::MalformedCache { reason, .. } => BridgeError::malformed(path, reason),
            other => other,
        }
    }

    /// Whether the error stems from user input that can be corrected and retried.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, BridgeError::MissingPlaceholder { .. })
    }
}
