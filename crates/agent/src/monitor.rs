// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Adaptive probe scheduling.
//!
//! Each service keeps its measured probe duration (`lag`) and shrinks
//! its nominal period by a safety margin so the collector sees reports
//! comfortably inside its own timeout threshold. Due probes run in
//! parallel, one task per service.

use std::time::{Duration, Instant};

use serde::Serialize;
use tokio::task::JoinSet;

use overc_core::{CheckState, Clock, SystemClock};
use overc_plugin::{Plugin, PluginError};

use crate::config::ServiceConfig;

/// One service state for the report API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServiceReport {
    pub name: String,
    pub state: CheckState,
    pub info: String,
}

/// A probe target with its scheduling state.
#[derive(Debug, Clone)]
pub struct ProbeService {
    name: String,
    /// Nominal reporting period, seconds.
    period: u64,
    plugin: Plugin,
    /// Operator override for the margin subtracted from the period.
    max_lag: Option<Duration>,
    /// Most recent measured probe duration.
    lag: Duration,
    /// Batch reference instant of the last probe.
    last_tested: Option<Instant>,
}

impl ProbeService {
    const PERIOD_MARGIN_FACTOR: f64 = 0.8;
    const LAG_MARGIN_FACTOR: f64 = 3.0;

    pub fn new(config: &ServiceConfig) -> Result<Self, PluginError> {
        Ok(Self {
            name: config.name.clone(),
            period: config.period,
            plugin: Plugin::from_command(&config.name, &config.cwd, &config.command)?,
            max_lag: config.max_lag.map(Duration::from_secs_f64),
            lag: Duration::ZERO,
            last_tested: None,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn lag(&self) -> Duration {
        self.lag
    }

    /// Real probe cadence: the nominal period shrunk by a safety margin
    /// (the operator's `max_lag`, or three times the measured lag).
    pub fn real_period(&self) -> Duration {
        let margin = self
            .max_lag
            .unwrap_or_else(|| self.lag.mul_f64(Self::LAG_MARGIN_FACTOR));
        let scaled =
            self.period as f64 * Self::PERIOD_MARGIN_FACTOR - margin.as_secs_f64();
        Duration::from_secs_f64(scaled.max(0.0))
    }

    /// Delay until this service is due; zero when never tested.
    pub fn next_update_in(&self, now: Instant) -> Duration {
        match self.last_tested {
            None => Duration::ZERO,
            Some(at) => self
                .real_period()
                .saturating_sub(now.saturating_duration_since(at)),
        }
    }
}

/// Scheduler over a fixed set of probe services.
pub struct ServicesMonitor<C: Clock = SystemClock> {
    services: Vec<ProbeService>,
    clock: C,
}

impl<C: Clock> ServicesMonitor<C> {
    pub fn new(services: Vec<ProbeService>, clock: C) -> Self {
        Self { services, clock }
    }

    pub fn services(&self) -> &[ProbeService] {
        &self.services
    }

    /// How long it is safe to sleep before any service needs a probe.
    pub fn sleep_time(&self) -> Duration {
        let now = self.clock.now();
        self.services
            .iter()
            .map(|s| s.next_update_in(now))
            .min()
            .unwrap_or(Duration::ZERO)
    }

    /// Probe every due service once, in parallel.
    ///
    /// Services within `max(lag)` of being due are batched together.
    /// Returns the reporting period to promise (the largest nominal
    /// period among the batch) and one report per probed service.
    pub async fn check(&mut self) -> (i64, Vec<ServiceReport>) {
        let max_lag = self
            .services
            .iter()
            .map(|s| s.lag)
            .max()
            .unwrap_or(Duration::ZERO);
        let now = self.clock.now();
        let selected: Vec<usize> = (0..self.services.len())
            .filter(|&i| self.services[i].next_update_in(now) <= max_lag)
            .collect();
        if selected.is_empty() {
            return (0, Vec::new());
        }
        let period = selected
            .iter()
            .map(|&i| self.services[i].period)
            .max()
            .unwrap_or(0) as i64;

        let mut probes = JoinSet::new();
        for &i in &selected {
            let plugin = self.services[i].plugin.clone();
            let name = self.services[i].name.clone();
            probes.spawn(async move {
                let started = Instant::now();
                let result = plugin.probe().await;
                (i, started.elapsed(), name, result)
            });
        }

        let mut reports = Vec::new();
        while let Some(joined) = probes.join_next().await {
            let Ok((i, lag, name, result)) = joined else {
                continue;
            };
            let service = &mut self.services[i];
            service.lag = lag;
            service.last_tested = Some(now);
            tracing::debug!(
                service = %name,
                lag_ms = lag.as_millis() as u64,
                "probe finished"
            );
            reports.push(classify(&name, result));
        }
        (period, reports)
    }
}

/// Turn a probe outcome into a report: exit code 0..=3 maps to a state,
/// anything else (or a spawn failure) is UNK with a diagnostic info.
fn classify(name: &str, result: Result<overc_plugin::ProbeOutcome, PluginError>) -> ServiceReport {
    match result {
        Ok(outcome) => match CheckState::from_exit_code(outcome.exit_code) {
            Some(state) => ServiceReport {
                name: name.to_owned(),
                state,
                info: outcome.output.trim_end().to_owned(),
            },
            None => {
                tracing::error!(
                    service = %name,
                    code = outcome.exit_code,
                    "plugin returned an unsupported exit code"
                );
                ServiceReport {
                    name: name.to_owned(),
                    state: CheckState::Unk,
                    info: format!(
                        "Plugin `{}` failed with code {}: {}",
                        name,
                        outcome.exit_code,
                        outcome.output.trim_end()
                    ),
                }
            }
        },
        Err(e) => {
            tracing::error!(service = %name, error = %e, "failed to execute plugin");
            ServiceReport {
                name: name.to_owned(),
                state: CheckState::Unk,
                info: format!("Failed to execute plugin `{name}`: {e}"),
            }
        }
    }
}

#[cfg(test)]
#[path = "monitor_tests.rs"]
mod tests;
