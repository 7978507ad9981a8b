// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Attribute lines rendered into the `transfer_data` scope

use super::template::{FILEPATH_TOKEN, TRANSFER_DATA_TOKEN};
use crate::error::{BridgeError, BridgeResult};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Value of a single metadata attribute
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum AttrValue {
    String(String),
    StringArray(Vec<String>),
    Token(String),
    Bool(bool),
    Int(i64),
    Float(f64),
    /// Literal USD text written as given. The attribute name may carry its own
    /// type, e.g. `string mm:skin`; without one the line is just `name = value`.
    Raw(String),
}

impl AttrValue {
    /// USD type name, or `None` for raw literals
    pub fn type_name(&self) -> Option<&'static str> {
        match self {
            AttrValue::String(_) => Some("string"),
            AttrValue::StringArray(_) => Some("string[]"),
            AttrValue::Token(_) => Some("token"),
            AttrValue::Bool(_) => Some("bool"),
            AttrValue::Int(_) => Some("int"),
            AttrValue::Float(_) => Some("double"),
            AttrValue::Raw(_) => None,
        }
    }

    /// Render the right-hand side of the assignment
    pub fn literal(&self) -> String {
        match self {
            AttrValue::String(s) | AttrValue::Token(s) => quote(s),
            AttrValue::StringArray(items) => {
                let quoted: Vec<String> = items.iter().map(|s| quote(s)).collect();
                format!("[{}]", quoted.join(", "))
            }
            AttrValue::Bool(b) => String::from(if *b { "1" } else { "0" }),
            AttrValue::Int(i) => i.to_string(),
            AttrValue::Float(f) => f.to_string(),
            AttrValue::Raw(s) => s.clone(),
        }
    }

    fn texts(&self) -> Vec<&str> {
        match self {
            AttrValue::String(s) | AttrValue::Token(s) | AttrValue::Raw(s) => vec![s.as_str()],
            AttrValue::StringArray(items) => items.iter().map(String::as_str).collect(),
            _ => Vec::new(),
        }
    }
}

impl From<&str> for AttrValue {
    fn from(value: &str) -> Self {
        AttrValue::String(value.to_string())
    }
}

impl From<String> for AttrValue {
    fn from(value: String) -> Self {
        AttrValue::String(value)
    }
}

impl From<Vec<String>> for AttrValue {
    fn from(value: Vec<String>) -> Self {
        AttrValue::StringArray(value)
    }
}

impl From<bool> for AttrValue {
    fn from(value: bool) -> Self {
        AttrValue::Bool(value)
    }
}

impl From<i64> for AttrValue {
    fn from(value: i64) -> Self {
        AttrValue::Int(value)
    }
}

impl From<f64> for AttrValue {
    fn from(value: f64) -> Self {
        AttrValue::Float(value)
    }
}

fn quote(s: &str) -> String {
    format!("\"{}\"", s.replace('\\', "\\\\").replace('"', "\\\""))
}

/// A named attribute inside the `transfer_data` scope
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attribute {
    pub name: String,
    pub value: AttrValue,
}

impl Attribute {
    pub fn new(name: impl Into<String>, value: impl Into<AttrValue>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }

    /// Attribute name without a leading type declaration
    pub fn bare_name(&self) -> &str {
        match self.value {
            AttrValue::Raw(_) => self.name.rsplit(' ').next().unwrap_or(&self.name),
            _ => &self.name,
        }
    }

    /// Render as `<declaration> = <value>` without indentation
    pub fn render(&self) -> String {
        match self.value.type_name() {
            Some(type_name) => format!("{} {} = {}", type_name, self.name, self.value.literal()),
            None => format!("{} = {}", self.name, self.value.literal()),
        }
    }

    fn validate(&self) -> BridgeResult<()> {
        let invalid = |reason| BridgeError::InvalidMetadata {
            key: self.name.clone(),
            reason,
        };

        if self.name.trim().is_empty() {
            return Err(invalid("attribute name is empty"));
        }

        for text in std::iter::once(self.name.as_str()).chain(self.value.texts()) {
            if text.chars().any(char::is_control) {
                return Err(invalid("contains a line break or control character"));
            }
            if text.contains(FILEPATH_TOKEN) || text.contains(TRANSFER_DATA_TOKEN) {
                return Err(invalid("contains a template placeholder token"));
            }
        }

        match &self.value {
            AttrValue::Raw(literal) => {
                let mut words: Vec<&str> = self.name.split_whitespace().collect();
                let name = words.pop().unwrap_or("");
                if !is_namespaced_identifier(name) {
                    return Err(invalid("attribute name is not a namespaced identifier"));
                }
                if !words.iter().all(|w| is_type_word(w)) {
                    return Err(invalid("attribute type declaration is malformed"));
                }
                if literal.trim().is_empty() {
                    return Err(invalid("raw value is empty"));
                }
                if !is_balanced_literal(literal) {
                    return Err(invalid("raw value has unquoted braces or an open string"));
                }
            }
            _ => {
                if !is_namespaced_identifier(&self.name) {
                    return Err(invalid("attribute name is not a namespaced identifier"));
                }
            }
        }

        if let AttrValue::Float(f) = self.value {
            if !f.is_finite() {
                return Err(invalid("float value is not finite"));
            }
        }

        Ok(())
    }
}

/// `[A-Za-z_][A-Za-z0-9_]*` segments joined by `:`
fn is_namespaced_identifier(name: &str) -> bool {
    name.split(':').all(|segment| {
        let mut chars = segment.chars();
        matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
            && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
    })
}

/// A word of a type declaration: `uniform`, `string`, `token[]`, ...
fn is_type_word(word: &str) -> bool {
    is_namespaced_identifier(word.strip_suffix("[]").unwrap_or(word)) && !word.contains(':')
}

/// No `{ } ( )` outside quoted strings, and every string closed
fn is_balanced_literal(literal: &str) -> bool {
    let mut in_string = false;
    let mut escaped = false;
    for c in literal.chars() {
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
        } else {
            match c {
                '"' => in_string = true,
                '{' | '}' | '(' | ')' => return false,
                _ => {}
            }
        }
    }
    !in_string
}

/// Ordered attribute list; insertion order is the render order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Metadata {
    entries: Vec<Attribute>,
}

impl Metadata {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<AttrValue>) -> &mut Self {
        self.entries.push(Attribute::new(name, value));
        self
    }

    /// Chaining form of [`Metadata::insert`]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<AttrValue>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn extend_from(&mut self, other: Metadata) {
        self.entries.extend(other.entries);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Attribute> {
        self.entries.iter()
    }

    pub fn get(&self, name: &str) -> Option<&AttrValue> {
        self.entries
            .iter()
            .find(|attr| attr.bare_name() == name)
            .map(|attr| &attr.value)
    }

    /// Check every entry for characters that would corrupt the document
    pub fn validate(&self) -> BridgeResult<()> {
        let mut seen = HashSet::new();
        for attr in &self.entries {
            attr.validate()?;
            if !seen.insert(attr.bare_name()) {
                return Err(BridgeError::DuplicateAttribute(attr.bare_name().to_string()));
            }
        }
        Ok(())
    }

    /// Render one line per entry, each prefixed with `indent` and ending in a newline
    pub fn render(&self, indent: &str) -> String {
        self.render_lines(indent, "\n")
    }

    /// Like [`Metadata::render`] with a caller-chosen line ending
    pub fn render_lines(&self, indent: &str, line_ending: &str) -> String {
        self.entries
            .iter()
            .map(|attr| format!("{}{}{}", indent, attr.render(), line_ending))
            .collect()
    }
}

/// Plain `(key, value)` pairs render literally as `key = value`. A key may
/// carry its type (`bool mm:axis_vis`); the value is written as given.
impl<K, V> FromIterator<(K, V)> for Metadata
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(k, v)| Attribute::new(k, AttrValue::Raw(v.into())))
                .collect(),
        }
    }
}
