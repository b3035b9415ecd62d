// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The supervisor loop: observation → state machine → alert → delivery.
//!
//! Each tick runs under the cross-process lockfile so overlapping
//! supervisors (e.g. restart overlap) never double-send. Within a tick,
//! state-change detection runs strictly before timeout detection, and
//! both before delivery.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use overc_core::{
    detect_state_change, detect_timeout, render_alert, Clock, SystemClock,
};
use overc_store::{NewAlert, SharedStore, StateStore, StoreError};

use crate::lock::{self, LockError};
use crate::notify::NotifierSet;

/// Supervisor timing and lock configuration.
#[derive(Debug, Clone)]
pub struct SupervisorConfig {
    pub lock_path: PathBuf,
    /// Bounded wait for the lock; on expiry the tick is skipped.
    pub lock_wait: Duration,
    pub tick_interval: Duration,
}

impl Default for SupervisorConfig {
    fn default() -> Self {
        Self {
            lock_path: lock::default_lock_path(),
            lock_wait: Duration::from_secs(2),
            tick_interval: Duration::from_secs(3),
        }
    }
}

/// Per-tick counts, for observability and tests.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickReport {
    pub new_alerts: usize,
    pub sent_alerts: usize,
}

#[derive(Debug, Error)]
pub enum SuperviseError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("lock error: {0}")]
    Lock(#[from] std::io::Error),
}

/// Single-owner periodic coordinator over the state store.
pub struct Supervisor<C: Clock = SystemClock> {
    store: SharedStore,
    notifiers: NotifierSet,
    clock: C,
    config: SupervisorConfig,
}

impl<C: Clock> Supervisor<C> {
    pub fn new(
        store: SharedStore,
        notifiers: NotifierSet,
        clock: C,
        config: SupervisorConfig,
    ) -> Self {
        Self { store, notifiers, clock, config }
    }

    /// Run one tick: scan unchecked states, scan timeouts, drain pending
    /// alerts. A busy lock skips the tick with a zero report.
    pub async fn tick(&self) -> Result<TickReport, SuperviseError> {
        let _lock = match lock::acquire(&self.config.lock_path, self.config.lock_wait).await {
            Ok(guard) => guard,
            Err(LockError::Unavailable { path }) => {
                tracing::debug!(path = %path.display(), "lock busy, skipping tick");
                return Ok(TickReport::default());
            }
            Err(LockError::Io(e)) => return Err(SuperviseError::Lock(e)),
        };

        let mut report = TickReport::default();
        report.new_alerts += self.check_states()?;
        report.new_alerts += self.check_timeouts()?;
        report.sent_alerts = self.send_pending().await?;
        Ok(report)
    }

    /// Tick forever. Errors are logged and swallowed; the loop never
    /// terminates.
    pub async fn run_loop(&self) {
        loop {
            match self.tick().await {
                Ok(report) if report.new_alerts > 0 || report.sent_alerts > 0 => {
                    tracing::info!(
                        new_alerts = report.new_alerts,
                        sent_alerts = report.sent_alerts,
                        "supervisor tick"
                    );
                }
                Ok(_) => {}
                Err(e) => tracing::error!(error = %e, "supervisor tick failed"),
            }
            tokio::time::sleep(self.config.tick_interval).await;
        }
    }

    /// Drain unchecked states in id order, appending alerts for
    /// transitions and marking each row checked.
    fn check_states(&self) -> Result<usize, SuperviseError> {
        let mut store = self.store.lock();
        let mut created = 0;
        for (state, prev) in store.unchecked_states() {
            if let Some(draft) = detect_state_change(prev.as_ref(), &state) {
                let server_id = store.service(state.service_id).map(|s| s.server_id);
                store.append_alert(NewAlert {
                    server_id,
                    service_id: Some(state.service_id),
                    service_state_id: draft.service_state_id,
                    ctime: self.clock.now_utc(),
                    channel: draft.channel.to_owned(),
                    event: draft.event,
                    message: draft.message,
                })?;
                created += 1;
            }
            store.mark_state_checked(state.id)?;
        }
        store.commit()?;
        Ok(created)
    }

    /// Apply the liveness detector to every service with a period and a
    /// state, persisting flag flips and their alerts.
    fn check_timeouts(&self) -> Result<usize, SuperviseError> {
        let now = self.clock.now_utc();
        let mut store = self.store.lock();
        let mut created = 0;
        for service in store.services_with_period_and_state() {
            let Some(latest) = store.latest_state(service.id) else {
                continue;
            };
            if let Some(transition) = detect_timeout(&service, latest.rtime, now) {
                store.set_service_timed_out(service.id, transition.timed_out)?;
                store.append_alert(NewAlert {
                    server_id: Some(service.server_id),
                    service_id: Some(service.id),
                    service_state_id: None,
                    ctime: now,
                    channel: transition.draft.channel.to_owned(),
                    event: transition.draft.event,
                    message: transition.draft.message,
                })?;
                created += 1;
            }
        }
        store.commit()?;
        Ok(created)
    }

    /// Deliver pending alerts in id order through the notifier set.
    ///
    /// Rendering happens under the store lock; delivery does not, so
    /// notifier latency never blocks ingest. Each alert is marked
    /// reported before the next is attempted, and only when delivery
    /// succeeded — a fully failed alert stays pending for the next tick.
    async fn send_pending(&self) -> Result<usize, SuperviseError> {
        let pending: Vec<_> = {
            let store = self.store.lock();
            store
                .pending_alerts()
                .into_iter()
                .map(|alert| {
                    let server = alert.server_id.and_then(|id| store.server(id));
                    let service = alert.service_id.and_then(|id| store.service(id));
                    let latest = service.as_ref().and_then(|s| store.latest_state(s.id));
                    let text =
                        render_alert(&alert, server.as_ref(), service.as_ref(), latest.as_ref());
                    (alert.id, text)
                })
                .collect()
        };

        let mut sent = 0;
        for (alert_id, text) in pending {
            let outcome = self.notifiers.deliver(&text).await;
            if outcome.succeeded() {
                let mut store = self.store.lock();
                store.mark_alert_reported(alert_id)?;
                store.commit()?;
                sent += 1;
            } else {
                tracing::warn!(alert = %alert_id, "alert delivery failed, will retry");
            }
        }
        Ok(sent)
    }
}

#[cfg(test)]
#[path = "supervisor_tests.rs"]
mod tests;
