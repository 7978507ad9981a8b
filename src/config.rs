// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Bridge configuration system

use crate::anim::DEFAULT_JSON_FRAME_RATE;
use crate::document::Template;
use crate::project::AxisConvention;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default config file looked up in the working directory
pub const CONFIG_FILE: &str = "omnibridge.toml";

/// Bridge configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    /// Custom project template; the built-in one is used when unset
    pub template: Option<PathBuf>,
    /// Frame rate assumed for JSON weight exports
    pub json_frame_rate: f64,
    /// Verbose output
    pub verbose: bool,
    /// Axis convention written into project files
    pub axes: AxisConvention,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            template: None,
            json_frame_rate: DEFAULT_JSON_FRAME_RATE,
            verbose: false,
            axes: AxisConvention::default(),
        }
    }
}

impl BridgeConfig {
    /// Load configuration from file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {:?}", path.as_ref()))?;
        let config: BridgeConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {:?}", path.as_ref()))?;
        Ok(config)
    }

    /// Load `omnibridge.toml` if present, then apply environment overrides
    pub fn load() -> Result<Self> {
        let mut config = if PathBuf::from(CONFIG_FILE).exists() {
            Self::from_file(CONFIG_FILE)?
        } else {
            Self::default()
        };
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Apply overrides from a variable lookup (the process environment in `load`)
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(template) = lookup("OMNIBRIDGE_TEMPLATE") {
            self.template = Some(PathBuf::from(template));
        }

        if let Some(rate) = lookup("OMNIBRIDGE_FRAME_RATE") {
            match rate.parse::<f64>() {
                Ok(rate) if rate >= 1.0 => self.json_frame_rate = rate,
                _ => log::warn!("Ignoring invalid OMNIBRIDGE_FRAME_RATE: {}", rate),
            }
        }

        if let Some(forward) = lookup("OMNIBRIDGE_AXIS_FWD") {
            self.axes.forward = forward;
        }

        if let Some(up) = lookup("OMNIBRIDGE_AXIS_UP") {
            self.axes.up = up;
        }

        if let Some(verbose) = lookup("OMNIBRIDGE_VERBOSE") {
            self.verbose = verbose.parse().unwrap_or(false);
        }
    }

    /// Save configuration to file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(path.as_ref(), content)
            .with_context(|| format!("Failed to write config file: {:?}", path.as_ref()))?;
        Ok(())
    }

    /// The configured template, or the built-in project template
    pub fn load_template(&self) -> Result<Template> {
        match &self.template {
            Some(path) => Template::from_file(path)
                .with_context(|| format!("Failed to load template: {:?}", path)),
            None => Ok(Template::project()),
        }
    }
}
