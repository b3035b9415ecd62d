// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The storage interface consumed by ingest and the supervisor.

use chrono::{DateTime, Utc};
use serde::Serialize;

use overc_core::{
    Alert, AlertId, CheckState, Server, ServerId, Service, ServiceId, ServiceState, StateId,
};

use crate::error::StoreError;

/// An alert to be appended, before it has an id.
#[derive(Debug, Clone)]
pub struct NewAlert {
    pub server_id: Option<ServerId>,
    pub service_id: Option<ServiceId>,
    pub service_state_id: Option<StateId>,
    pub ctime: DateTime<Utc>,
    pub channel: String,
    pub event: String,
    pub message: String,
}

/// Store totals for the status endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StoreStats {
    pub servers: usize,
    pub services: usize,
    pub alerts_pending: usize,
}

/// Append-mostly state storage.
///
/// All reads observe every prior write through the same handle
/// (read-your-writes). `commit()` makes the work since the previous
/// commit durable; implementations without a durable backing no-op.
pub trait StateStore: Send {
    // -- Lookups --------------------------------------------------------

    fn server(&self, id: ServerId) -> Option<Server>;
    fn server_by_name(&self, name: &str) -> Option<Server>;
    fn servers(&self) -> Vec<Server>;
    fn service(&self, id: ServiceId) -> Option<Service>;
    fn service_by_name(&self, server: ServerId, name: &str) -> Option<Service>;
    fn services_of(&self, server: ServerId) -> Vec<Service>;
    fn state(&self, id: StateId) -> Option<ServiceState>;
    /// Latest state of a service, via the stored pointer.
    fn latest_state(&self, service: ServiceId) -> Option<ServiceState>;

    // -- Mutations ------------------------------------------------------

    /// Create a server; `title` defaults to the name.
    fn create_server(&mut self, name: &str, key: &str) -> Server;
    fn update_server_ip(&mut self, id: ServerId, ip: &str) -> Result<(), StoreError>;
    fn create_service(&mut self, server: ServerId, name: &str) -> Result<Service, StoreError>;
    fn set_service_period(&mut self, id: ServiceId, period: i64) -> Result<(), StoreError>;
    /// Append a state row and advance the service's latest-state pointer.
    fn append_state(
        &mut self,
        service: ServiceId,
        state: CheckState,
        info: &str,
        rtime: DateTime<Utc>,
    ) -> Result<ServiceState, StoreError>;
    fn append_alert(&mut self, alert: NewAlert) -> Result<Alert, StoreError>;

    // -- Supervisor scans -----------------------------------------------

    /// All unchecked states in ascending id order, each with the
    /// immediately preceding state of the same service, if any.
    fn unchecked_states(&self) -> Vec<(ServiceState, Option<ServiceState>)>;
    /// Services that have both a period and at least one state.
    fn services_with_period_and_state(&self) -> Vec<Service>;
    /// Unreported alerts in ascending id order.
    fn pending_alerts(&self) -> Vec<Alert>;
    fn mark_state_checked(&mut self, id: StateId) -> Result<(), StoreError>;
    fn mark_alert_reported(&mut self, id: AlertId) -> Result<(), StoreError>;
    fn set_service_timed_out(&mut self, id: ServiceId, timed_out: bool)
        -> Result<(), StoreError>;

    // -- Status queries -------------------------------------------------

    /// Alerts created at or after `since`, optionally scoped to one
    /// server or service, ascending by id.
    fn alerts_since(
        &self,
        since: DateTime<Utc>,
        server: Option<ServerId>,
        service: Option<ServiceId>,
    ) -> Vec<Alert>;
    /// States of one service received at or after `since`, newest first.
    fn states_since(&self, service: ServiceId, since: DateTime<Utc>) -> Vec<ServiceState>;
    fn stats(&self) -> StoreStats;

    // -- Administration -------------------------------------------------

    /// Delete a server, cascading to its services, states, and alerts.
    fn delete_server(&mut self, id: ServerId) -> Result<(), StoreError>;
    /// Delete a service, cascading to its states and alerts.
    fn delete_service(&mut self, id: ServiceId) -> Result<(), StoreError>;

    // -- Durability -----------------------------------------------------

    fn commit(&mut self) -> Result<(), StoreError>;
}
