// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Store record types: servers, services, state history, alerts.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::state::{severity, CheckState};

macro_rules! id_newtype {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<i64> for $name {
            fn from(raw: i64) -> Self {
                Self(raw)
            }
        }
    };
}

id_newtype!(
    /// Server row id
    ServerId
);
id_newtype!(
    /// Service row id
    ServiceId
);
id_newtype!(
    /// Service state row id; store-wide monotonic, sortable as arrival order
    StateId
);
id_newtype!(
    /// Alert row id
    AlertId
);

/// A server being monitored
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Server {
    pub id: ServerId,
    /// Machine name as reported from the remote; unique across the store
    pub name: String,
    /// Display title; defaults to the name at creation
    pub title: String,
    /// Authentication key, set at creation and compared on every ingest
    pub key: String,
    /// Last observed remote address
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ip: Option<String>,
}

/// A service being monitored on a server
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Service {
    pub id: ServiceId,
    pub server_id: ServerId,
    /// Service machine name; unique per owning server
    pub name: String,
    /// Display title; defaults to the name at creation
    pub title: String,
    /// Expected reporting period, seconds. None until the first periodic report.
    #[serde(default)]
    pub period: Option<i64>,
    /// Is the service currently timed out?
    #[serde(default)]
    pub timed_out: bool,
    /// Latest state row, maintained by the store on every append
    #[serde(default)]
    pub latest_state_id: Option<StateId>,
}

/// One observation of a service's health. Append-only: rows are never
/// modified after `checked` is set, except by cascading deletion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceState {
    pub id: StateId,
    pub service_id: ServiceId,
    /// Reception instant, UTC
    pub rtime: DateTime<Utc>,
    pub state: CheckState,
    /// Free-text info captured from the probe
    pub info: String,
    /// Set once the transition detector has visited the row
    #[serde(default)]
    pub checked: bool,
}

/// A persisted notification descriptor awaiting delivery
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Alert {
    pub id: AlertId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server_id: Option<ServerId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_id: Option<ServiceId>,
    /// The state row that triggered the alert; None for manual alerts and
    /// liveness transitions
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_state_id: Option<StateId>,
    /// Creation time
    pub ctime: DateTime<Utc>,
    /// Alert channel, e.g. `service:state`, `plugin`, `api`
    pub channel: String,
    /// Event within the channel, e.g. `WARN`, `offline`, `alert`
    pub event: String,
    /// Rendered alert text
    pub message: String,
    /// Set once the notifier set has dispatched the alert
    #[serde(default)]
    pub reported: bool,
}

impl Alert {
    /// Severity derived from `(channel, event)`; defaults to FAIL
    pub fn severity(&self) -> CheckState {
        severity(&self.channel, &self.event)
    }
}

#[cfg(test)]
#[path = "model_tests.rs"]
mod tests;
