// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Plugin execution error types.

use crate::words::SplitError;

/// Errors from loading or running a plugin.
#[derive(Debug, thiserror::Error)]
pub enum PluginError {
    /// The command string could not be split into argv words.
    #[error("invalid plugin command `{command}`: {source}")]
    Parse {
        command: String,
        source: SplitError,
    },

    /// Executable missing or not spawnable.
    #[error("failed to spawn `{command}`: {source}")]
    Spawn {
        command: String,
        source: std::io::Error,
    },

    /// The plugin ran but exited non-zero.
    #[error("plugin `{command}` failed with exit code {code}")]
    NonZeroExit {
        command: String,
        code: i32,
        output: String,
    },
}
