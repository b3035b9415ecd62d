// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Service health states and alert severity.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Health state of a service observation.
///
/// Ordinal severity: OK=0, WARN=1, FAIL=2, UNK=3. Variant order matches the
/// ordinals, so derived `Ord` is "worse than" comparison. State names are
/// case-sensitive on the wire.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "UPPERCASE")]
pub enum CheckState {
    Ok,
    Warn,
    Fail,
    #[default]
    Unk,
}

impl CheckState {
    pub const ALL: [CheckState; 4] =
        [CheckState::Ok, CheckState::Warn, CheckState::Fail, CheckState::Unk];

    /// Numeric severity, `0..=3`
    pub fn ordinal(self) -> u8 {
        match self {
            CheckState::Ok => 0,
            CheckState::Warn => 1,
            CheckState::Fail => 2,
            CheckState::Unk => 3,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            CheckState::Ok => "OK",
            CheckState::Warn => "WARN",
            CheckState::Fail => "FAIL",
            CheckState::Unk => "UNK",
        }
    }

    /// Classify a probe plugin exit code. Codes outside `0..=3` have no
    /// state; callers substitute UNK with a diagnostic.
    pub fn from_exit_code(code: i32) -> Option<Self> {
        match code {
            0 => Some(CheckState::Ok),
            1 => Some(CheckState::Warn),
            2 => Some(CheckState::Fail),
            3 => Some(CheckState::Unk),
            _ => None,
        }
    }

    pub fn is_worse_than(self, other: Self) -> bool {
        self.ordinal() > other.ordinal()
    }
}

impl fmt::Display for CheckState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A state name that is not one of OK/WARN/FAIL/UNK
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown service state \"{0}\"")]
pub struct UnknownState(pub String);

impl FromStr for CheckState {
    type Err = UnknownState;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "OK" => Ok(CheckState::Ok),
            "WARN" => Ok(CheckState::Warn),
            "FAIL" => Ok(CheckState::Fail),
            "UNK" => Ok(CheckState::Unk),
            other => Err(UnknownState(other.to_owned())),
        }
    }
}

/// Severity of an alert category, from the fixed `(channel, event)` table.
/// Unlisted categories default to FAIL.
pub fn severity(channel: &str, event: &str) -> CheckState {
    match (channel, event) {
        ("plugin", "online") => CheckState::Ok,
        ("plugin", "offline") => CheckState::Fail,

        ("service:state", "OK") => CheckState::Ok,
        ("service:state", "WARN") => CheckState::Warn,
        ("service:state", "FAIL") => CheckState::Fail,
        ("service:state", "UNK") => CheckState::Unk,

        ("api", "alert") => CheckState::Fail,

        _ => CheckState::Fail,
    }
}

#[cfg(test)]
#[path = "state_tests.rs"]
mod tests;
