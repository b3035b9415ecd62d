// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Agent monitoring configuration (TOML).
//!
//! ```toml
//! [server]
//! url = "http://127.0.0.1:5000"
//! name = "localhost"
//! key = "1234"
//!
//! [[service]]
//! name = "app"
//! period = 60
//! cwd = "/etc/overc/service.d"
//! command = "./check-app.sh --fast"
//! max_lag = 5.0   # optional, seconds
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

/// Collector endpoint and this agent's server identity.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    pub url: String,
    pub name: String,
    pub key: String,
}

/// One probe target.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServiceConfig {
    pub name: String,
    /// Nominal reporting period, seconds.
    pub period: u64,
    pub cwd: PathBuf,
    pub command: String,
    /// Operator override for the scheduling margin, seconds.
    #[serde(default)]
    pub max_lag: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MonitorConfig {
    pub server: ServerConfig,
    #[serde(default, rename = "service")]
    pub services: Vec<ServiceConfig>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid monitor config {path}: {source}")]
    Toml {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("monitor config {path} declares no [[service]] entries")]
    NoServices { path: PathBuf },
}

/// Load and validate a monitoring config file.
pub fn load(path: &Path) -> Result<MonitorConfig, ConfigError> {
    let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let config: MonitorConfig = toml::from_str(&raw).map_err(|source| ConfigError::Toml {
        path: path.to_path_buf(),
        source,
    })?;
    if config.services.is_empty() {
        return Err(ConfigError::NoServices { path: path.to_path_buf() });
    }
    Ok(config)
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
