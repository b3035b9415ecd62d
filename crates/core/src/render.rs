// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Alert rendering for notifier delivery.

use crate::model::{Alert, Server, Service, ServiceState};

/// Render an alert into the text piped to notifier plugins on stdin.
///
/// Format:
/// ```text
/// {server_name}[ {service_name}]: [{channel}/{event}] {message}
/// Current: {latest.state}: {latest.info}
/// ```
/// The `Current` line is present only when the alert has a service with a
/// latest state.
pub fn render_alert(
    alert: &Alert,
    server: Option<&Server>,
    service: Option<&Service>,
    latest: Option<&ServiceState>,
) -> String {
    let mut out = String::new();
    match (server, service) {
        (Some(server), Some(service)) => {
            out.push_str(&format!("{} {}: ", server.name, service.name));
        }
        (Some(server), None) => out.push_str(&format!("{}: ", server.name)),
        (None, Some(service)) => out.push_str(&format!("{}: ", service.name)),
        (None, None) => {}
    }
    out.push_str(&format!(
        "[{}/{}] {}\n",
        alert.channel, alert.event, alert.message
    ));
    if service.is_some() {
        if let Some(latest) = latest {
            out.push_str(&format!("Current: {}: {}\n", latest.state, latest.info));
        }
    }
    out
}

#[cfg(test)]
#[path = "render_tests.rs"]
mod tests;
