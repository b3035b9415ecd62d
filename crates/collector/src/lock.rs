// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Supervisor singleton lock.
//!
//! An advisory exclusive lock on a well-known file keeps overlapping
//! supervisor processes from double-sending alerts. Acquisition waits a
//! bounded time; on expiry the caller skips its tick.

use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use fs2::FileExt;
use thiserror::Error;

/// Default lock path: `overc.lock` in the system temp directory.
pub fn default_lock_path() -> PathBuf {
    std::env::temp_dir().join("overc.lock")
}

#[derive(Debug, Error)]
pub enum LockError {
    /// Another supervisor holds the lock and the bounded wait expired.
    #[error("supervisor lock busy: {path}")]
    Unavailable { path: PathBuf },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Held lock on the supervisor lockfile.
#[derive(Debug)]
pub struct LockGuard {
    // NOTE(lifetime): held to maintain the exclusive lock; released on drop
    #[allow(dead_code)]
    file: File,
}

/// Acquire the lock, retrying until `wait` has elapsed.
pub async fn acquire(path: &Path, wait: Duration) -> Result<LockGuard, LockError> {
    // Avoid truncating: the file may carry another supervisor's lock.
    let file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(false)
        .open(path)?;
    let deadline = Instant::now() + wait;
    loop {
        match file.try_lock_exclusive() {
            Ok(()) => return Ok(LockGuard { file }),
            Err(_) if Instant::now() < deadline => {
                tokio::time::sleep(Duration::from_millis(50)).await;
            }
            Err(_) => {
                return Err(LockError::Unavailable { path: path.to_path_buf() })
            }
        }
    }
}

#[cfg(test)]
#[path = "lock_tests.rs"]
mod tests;
