// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Configuration management
//!
//! Values are layered: built-in defaults, then an optional TOML file, then
//! `TOSCA_MODELER_*` environment variables.

use crate::container::PollSettings;
use anyhow::{Context, Result};
use config::{Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Prefix of environment variables that override configuration values
pub const ENV_PREFIX: &str = "TOSCA_MODELER";

/// Application configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Directory for persistent data (application state)
    pub data_dir: PathBuf,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    /// Base URL of the container API
    pub container_url: String,
    /// Delay between status polls
    pub poll_interval_ms: u64,
    /// Deadline for a single wait operation
    pub poll_timeout_ms: u64,
    /// Deadline for a single HTTP request
    pub request_timeout_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: directories::ProjectDirs::from("org", "eclipse", "tosca-modeler")
                .map(|d| d.data_dir().to_path_buf())
                .unwrap_or_else(|| PathBuf::from(".tosca-modeler")),
            log_level: "info".to_string(),
            container_url: "http://localhost:1337".to_string(),
            poll_interval_ms: 1_000,
            poll_timeout_ms: 300_000,
            request_timeout_ms: 30_000,
        }
    }
}

impl Config {
    /// Polling settings for wait operations
    #[must_use]
    pub fn poll_settings(&self) -> PollSettings {
        PollSettings::from_millis(self.poll_interval_ms, self.poll_timeout_ms)
    }

    /// Per-request HTTP timeout
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    /// Render as TOML
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize configuration")
    }

    /// Look up one value by key, rendered as text
    #[must_use]
    pub fn get(&self, key: &str) -> Option<String> {
        let value = serde_json::to_value(self).ok()?;
        match value.get(key)? {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }
}

/// Load configuration, reading `path` as TOML when given
pub fn load(path: Option<&Path>) -> Result<Config> {
    let defaults = config::Config::try_from(&Config::default())
        .context("Failed to build default configuration")?;

    let mut builder = config::Config::builder().add_source(defaults);
    if let Some(path) = path {
        builder = builder.add_source(File::from(path).format(FileFormat::Toml).required(true));
    }
    builder = builder.add_source(Environment::with_prefix(ENV_PREFIX).try_parsing(true));

    builder
        .build()
        .and_then(config::Config::try_deserialize)
        .with_context(|| match path {
            Some(p) => format!("Failed to load configuration from {}", p.display()),
            None => "Failed to load configuration".to_string(),
        })
}
