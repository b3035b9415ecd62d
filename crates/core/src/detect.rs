// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Pure transition detectors: state changes and liveness timeouts.
//!
//! Detection and rendering deliberately disagree about missing history:
//! a first-ever observation is compared against OK (so a healthy first
//! report stays silent) but the stored message prints `(?)` for the
//! previous state.

use chrono::{DateTime, TimeDelta, Utc};

use crate::model::{Service, ServiceState, StateId};
use crate::state::CheckState;

/// Category and message for an alert the supervisor should append.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlertDraft {
    pub channel: &'static str,
    pub event: String,
    pub message: String,
    pub service_state_id: Option<StateId>,
}

/// Detect a state change between consecutive observations of one service.
///
/// `prev` is the immediately preceding state row, if any. Equal states
/// produce nothing; a change produces one `service:state` alert whose
/// event is the new state's name.
pub fn detect_state_change(
    prev: Option<&ServiceState>,
    curr: &ServiceState,
) -> Option<AlertDraft> {
    let prev_state = prev.map(|p| p.state).unwrap_or(CheckState::Ok);
    if curr.state == prev_state {
        return None;
    }
    let prev_label = prev.map(|p| p.state.as_str()).unwrap_or("(?)");
    Some(AlertDraft {
        channel: "service:state",
        event: curr.state.to_string(),
        message: format!("State changed: \"{}\" -> \"{}\"", prev_label, curr.state),
        service_state_id: Some(curr.id),
    })
}

/// A liveness flip detected for a service.
///
/// The caller persists `timed_out` onto the service and appends the draft.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeoutTransition {
    pub timed_out: bool,
    pub draft: AlertDraft,
}

/// Detect a liveness transition for a service with a reporting period.
///
/// Nothing is emitted while the timed-out flag is stable; only the flip
/// in either direction alerts.
pub fn detect_timeout(
    service: &Service,
    latest_rtime: DateTime<Utc>,
    now: DateTime<Utc>,
) -> Option<TimeoutTransition> {
    let period = service.period?;
    let timed_out = now - latest_rtime > TimeDelta::seconds(period);
    if timed_out == service.timed_out {
        return None;
    }
    let draft = if timed_out {
        AlertDraft {
            channel: "plugin",
            event: "offline".to_owned(),
            message: "Monitoring plugin offline".to_owned(),
            service_state_id: None,
        }
    } else {
        AlertDraft {
            channel: "plugin",
            event: "online".to_owned(),
            message: "Monitoring plugin back online".to_owned(),
            service_state_id: None,
        }
    };
    Some(TimeoutTransition { timed_out, draft })
}

#[cfg(test)]
#[path = "detect_tests.rs"]
mod tests;
