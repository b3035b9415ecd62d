// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! overc-agent: the distributed monitoring agent (`overcli`)
//!
//! Schedules local probe commands, classifies their exit codes into
//! health states, and ships batches to the collector over HTTP/JSON.

pub mod config;
pub mod monitor;
pub mod reporter;

pub use config::{MonitorConfig, ServiceConfig};
pub use monitor::{ProbeService, ServiceReport, ServicesMonitor};
pub use reporter::{AlertReport, Overclient, ReportError};

use overc_core::SystemClock;

/// Run the continuous monitoring loop: sleep, probe, report.
///
/// Transport failures are logged; the batch is retried on the next tick
/// rather than in place.
pub async fn run_monitor(config: MonitorConfig) -> anyhow::Result<()> {
    let client = Overclient::new(&config.server.url, &config.server.name, &config.server.key)?;
    let services = config
        .services
        .iter()
        .map(ProbeService::new)
        .collect::<Result<Vec<_>, _>>()?;
    let mut monitor = ServicesMonitor::new(services, SystemClock);

    if let Err(e) = client.ping().await {
        tracing::warn!(error = %e, "collector not reachable yet");
    }

    loop {
        tokio::time::sleep(monitor.sleep_time()).await;
        let (period, states) = monitor.check().await;
        if states.is_empty() {
            continue;
        }
        tracing::debug!(period, count = states.len(), "reporting batch");
        if let Err(e) = client.set_service_status(period, &states).await {
            tracing::warn!(error = %e, "report failed, retrying next tick");
        }
    }
}
