// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Notifier fan-out with failure-of-notifier escalation.

use std::path::PathBuf;

use serde::Deserialize;

use overc_plugin::{Plugin, PluginError};

/// One notifier from the collector config, in declared order.
#[derive(Debug, Clone, Deserialize)]
pub struct NotifierSpec {
    pub name: String,
    pub cwd: PathBuf,
    pub command: String,
}

/// Outcome of one `deliver` call. `failures` records the primary pass;
/// the escalation pass only logs.
#[derive(Debug, Clone, Default)]
pub struct DeliveryReport {
    /// Notifiers that accepted the message on the primary pass.
    pub delivered: usize,
    pub failures: Vec<(String, String)>,
}

impl DeliveryReport {
    /// Whether the alert counts as delivered: a clean pass, or at least
    /// one notifier accepted it.
    pub fn succeeded(&self) -> bool {
        self.failures.is_empty() || self.delivered > 0
    }
}

/// Ordered set of notifier plugins.
pub struct NotifierSet {
    plugins: Vec<Plugin>,
}

impl NotifierSet {
    /// Build the set, splitting each command string once.
    pub fn new(specs: &[NotifierSpec]) -> Result<Self, PluginError> {
        let plugins = specs
            .iter()
            .map(|spec| Plugin::from_command(&spec.name, &spec.cwd, &spec.command))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { plugins })
    }

    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }

    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    /// Deliver `message` to every notifier in declared order.
    ///
    /// Failures are collected, not raised. When any notifier fails, a
    /// second pass delivers the failure list through every notifier —
    /// any single working notifier suffices to surface the broken ones.
    /// There is no third pass: if the escalation pass also fully fails,
    /// the failure report is logged and dropped.
    pub async fn deliver(&self, message: &str) -> DeliveryReport {
        let mut report = DeliveryReport::default();
        for plugin in &self.plugins {
            match plugin.run(message).await {
                Ok(_) => report.delivered += 1,
                Err(e) => {
                    tracing::warn!(plugin = plugin.name(), error = %e, "alert plugin failed");
                    report.failures.push((plugin.name().to_owned(), e.to_string()));
                }
            }
        }
        if report.failures.is_empty() {
            return report;
        }

        let escalation = report
            .failures
            .iter()
            .map(|(name, error)| format!("Alert plugin `{name}` failed: {error}"))
            .collect::<Vec<_>>()
            .join("\n");
        let mut escalated = 0;
        for plugin in &self.plugins {
            match plugin.run(&escalation).await {
                Ok(_) => escalated += 1,
                Err(e) => {
                    tracing::warn!(
                        plugin = plugin.name(),
                        error = %e,
                        "failed to send plugin failure report"
                    );
                }
            }
        }
        if escalated == 0 {
            tracing::error!(
                fatal = true,
                "no alert plugin could deliver the failure report:\n{escalation}"
            );
        }
        report
    }
}

#[cfg(test)]
#[path = "notify_tests.rs"]
mod tests;
