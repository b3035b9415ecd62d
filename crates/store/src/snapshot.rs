// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Snapshot persistence for the in-memory store.
//!
//! The whole materialized state is written as one JSON document via a
//! temp file and rename, so a crash mid-write leaves the previous
//! snapshot intact.

use std::fs;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::StoreError;
use crate::mem::Tables;

/// Current snapshot schema version
pub const CURRENT_SNAPSHOT_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
struct Snapshot {
    /// Schema version for migrations
    #[serde(rename = "v")]
    version: u32,
    state: Tables,
    /// When this snapshot was created
    created_at: DateTime<Utc>,
}

/// Load the snapshot at `path`, if one exists.
pub fn load(path: &Path) -> Result<Option<Tables>, StoreError> {
    if !path.exists() {
        return Ok(None);
    }
    let raw = fs::read_to_string(path)?;
    let snapshot: Snapshot = serde_json::from_str(&raw)?;
    tracing::info!(
        version = snapshot.version,
        servers = snapshot.state.servers.len(),
        states = snapshot.state.states.len(),
        "loaded snapshot"
    );
    Ok(Some(snapshot.state))
}

/// Write a snapshot of `tables` to `path` atomically.
pub fn save(path: &Path, tables: &Tables) -> Result<(), StoreError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let snapshot = Snapshot {
        version: CURRENT_SNAPSHOT_VERSION,
        state: tables.clone(),
        created_at: Utc::now(),
    };
    let tmp = path.with_extension("tmp");
    fs::write(&tmp, serde_json::to_vec(&snapshot)?)?;
    fs::rename(&tmp, path)?;
    Ok(())
}

#[cfg(test)]
#[path = "snapshot_tests.rs"]
mod tests;
