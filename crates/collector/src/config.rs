// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Collector configuration: CLI flags plus the notifier TOML file.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

use crate::notify::NotifierSpec;
use crate::supervisor::SupervisorConfig;

/// Configuration for the `overcd` collector daemon.
#[derive(Debug, Clone, clap::Parser)]
#[command(name = "overcd", about = "OverC collector/supervisor daemon")]
pub struct CollectorConfig {
    /// Address to bind the HTTP API on.
    #[arg(long, default_value = "127.0.0.1:5000", env = "OVERC_BIND")]
    pub bind: SocketAddr,

    /// Snapshot file for the state store. Omit for a purely in-memory store.
    #[arg(long, env = "OVERC_DATA")]
    pub data: Option<PathBuf>,

    /// Notifier configuration file (TOML, `[[notifier]]` tables).
    #[arg(long, env = "OVERC_NOTIFIERS")]
    pub notifiers: Option<PathBuf>,

    /// Supervisor lockfile path. Defaults to `overc.lock` in the temp dir.
    #[arg(long, env = "OVERC_LOCK")]
    pub lock: Option<PathBuf>,

    /// Seconds between supervisor ticks.
    #[arg(long, default_value_t = 3, env = "OVERC_TICK_SECS")]
    pub tick_secs: u64,

    /// Bounded wait for the supervisor lock, seconds.
    #[arg(long, default_value_t = 2, env = "OVERC_LOCK_WAIT_SECS")]
    pub lock_wait_secs: u64,
}

impl CollectorConfig {
    pub fn supervisor_config(&self) -> SupervisorConfig {
        let mut config = SupervisorConfig::default();
        if let Some(lock) = &self.lock {
            config.lock_path = lock.clone();
        }
        config.tick_interval = Duration::from_secs(self.tick_secs);
        config.lock_wait = Duration::from_secs(self.lock_wait_secs);
        config
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid notifier config {path}: {source}")]
    Toml {
        path: PathBuf,
        source: toml::de::Error,
    },
}

#[derive(Debug, Default, Deserialize)]
struct NotifierFile {
    #[serde(default, rename = "notifier")]
    notifiers: Vec<NotifierSpec>,
}

/// Load the ordered notifier list from a TOML file.
pub fn load_notifiers(path: &Path) -> Result<Vec<NotifierSpec>, ConfigError> {
    let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let file: NotifierFile = toml::from_str(&raw).map_err(|source| ConfigError::Toml {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(file.notifiers)
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
