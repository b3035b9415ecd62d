// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-memory materialized state with optional snapshot persistence.

use std::collections::BTreeMap;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use overc_core::{
    Alert, AlertId, CheckState, Server, ServerId, Service, ServiceId, ServiceState, StateId,
};

use crate::error::StoreError;
use crate::snapshot;
use crate::store::{NewAlert, StateStore, StoreStats};

fn one() -> i64 {
    1
}

/// Materialized tables. Keys are row ids; BTreeMaps keep every scan in
/// ascending id order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Tables {
    pub servers: BTreeMap<i64, Server>,
    pub services: BTreeMap<i64, Service>,
    pub states: BTreeMap<i64, ServiceState>,
    pub alerts: BTreeMap<i64, Alert>,
    #[serde(default = "one")]
    next_server_id: i64,
    #[serde(default = "one")]
    next_service_id: i64,
    #[serde(default = "one")]
    next_state_id: i64,
    #[serde(default = "one")]
    next_alert_id: i64,
}

impl Tables {
    /// Ids must stay monotonic even across snapshots written before the
    /// counters were persisted.
    fn fixup_counters(&mut self) {
        fn max_key<V>(m: &BTreeMap<i64, V>) -> i64 {
            m.keys().next_back().copied().unwrap_or(0)
        }
        self.next_server_id = self.next_server_id.max(max_key(&self.servers) + 1);
        self.next_service_id = self.next_service_id.max(max_key(&self.services) + 1);
        self.next_state_id = self.next_state_id.max(max_key(&self.states) + 1);
        self.next_alert_id = self.next_alert_id.max(max_key(&self.alerts) + 1);
    }
}

/// The reference [`StateStore`]: materialized state behind a mutex,
/// snapshotted to JSON on `commit()` when opened on a path.
#[derive(Debug)]
pub struct MemStore {
    tables: Tables,
    path: Option<PathBuf>,
}

impl MemStore {
    /// A store with no durable backing; `commit()` is a no-op.
    pub fn in_memory() -> Self {
        let mut tables = Tables::default();
        tables.fixup_counters();
        Self { tables, path: None }
    }

    /// Open a store backed by a snapshot file, loading it if present.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let mut tables = snapshot::load(&path)?.unwrap_or_default();
        tables.fixup_counters();
        Ok(Self { tables, path: Some(path) })
    }

    fn prev_state(&self, service: ServiceId, before: StateId) -> Option<ServiceState> {
        self.tables
            .states
            .range(..before.0)
            .rev()
            .find(|(_, s)| s.service_id == service)
            .map(|(_, s)| s.clone())
    }
}

impl StateStore for MemStore {
    fn server(&self, id: ServerId) -> Option<Server> {
        self.tables.servers.get(&id.0).cloned()
    }

    fn server_by_name(&self, name: &str) -> Option<Server> {
        self.tables.servers.values().find(|s| s.name == name).cloned()
    }

    fn servers(&self) -> Vec<Server> {
        self.tables.servers.values().cloned().collect()
    }

    fn service(&self, id: ServiceId) -> Option<Service> {
        self.tables.services.get(&id.0).cloned()
    }

    fn service_by_name(&self, server: ServerId, name: &str) -> Option<Service> {
        self.tables
            .services
            .values()
            .find(|s| s.server_id == server && s.name == name)
            .cloned()
    }

    fn services_of(&self, server: ServerId) -> Vec<Service> {
        self.tables
            .services
            .values()
            .filter(|s| s.server_id == server)
            .cloned()
            .collect()
    }

    fn state(&self, id: StateId) -> Option<ServiceState> {
        self.tables.states.get(&id.0).cloned()
    }

    fn latest_state(&self, service: ServiceId) -> Option<ServiceState> {
        let service = self.tables.services.get(&service.0)?;
        self.tables.states.get(&service.latest_state_id?.0).cloned()
    }

    fn create_server(&mut self, name: &str, key: &str) -> Server {
        let id = self.tables.next_server_id;
        self.tables.next_server_id += 1;
        let server = Server {
            id: ServerId(id),
            name: name.to_owned(),
            title: name.to_owned(),
            key: key.to_owned(),
            ip: None,
        };
        self.tables.servers.insert(id, server.clone());
        tracing::info!(server = %name, id, "server created");
        server
    }

    fn update_server_ip(&mut self, id: ServerId, ip: &str) -> Result<(), StoreError> {
        let server = self
            .tables
            .servers
            .get_mut(&id.0)
            .ok_or(StoreError::Missing { entity: "server", id: id.0 })?;
        server.ip = Some(ip.to_owned());
        Ok(())
    }

    fn create_service(&mut self, server: ServerId, name: &str) -> Result<Service, StoreError> {
        if !self.tables.servers.contains_key(&server.0) {
            return Err(StoreError::Missing { entity: "server", id: server.0 });
        }
        let id = self.tables.next_service_id;
        self.tables.next_service_id += 1;
        let service = Service {
            id: ServiceId(id),
            server_id: server,
            name: name.to_owned(),
            title: name.to_owned(),
            period: None,
            timed_out: false,
            latest_state_id: None,
        };
        self.tables.services.insert(id, service.clone());
        tracing::info!(service = %name, id, server = %server, "service created");
        Ok(service)
    }

    fn set_service_period(&mut self, id: ServiceId, period: i64) -> Result<(), StoreError> {
        let service = self
            .tables
            .services
            .get_mut(&id.0)
            .ok_or(StoreError::Missing { entity: "service", id: id.0 })?;
        service.period = Some(period);
        Ok(())
    }

    fn append_state(
        &mut self,
        service: ServiceId,
        state: CheckState,
        info: &str,
        rtime: DateTime<Utc>,
    ) -> Result<ServiceState, StoreError> {
        let owner = self
            .tables
            .services
            .get_mut(&service.0)
            .ok_or(StoreError::Missing { entity: "service", id: service.0 })?;
        let id = self.tables.next_state_id;
        self.tables.next_state_id += 1;
        let row = ServiceState {
            id: StateId(id),
            service_id: service,
            rtime,
            state,
            info: info.to_owned(),
            checked: false,
        };
        owner.latest_state_id = Some(row.id);
        self.tables.states.insert(id, row.clone());
        Ok(row)
    }

    fn append_alert(&mut self, alert: NewAlert) -> Result<Alert, StoreError> {
        let id = self.tables.next_alert_id;
        self.tables.next_alert_id += 1;
        let row = Alert {
            id: AlertId(id),
            server_id: alert.server_id,
            service_id: alert.service_id,
            service_state_id: alert.service_state_id,
            ctime: alert.ctime,
            channel: alert.channel,
            event: alert.event,
            message: alert.message,
            reported: false,
        };
        self.tables.alerts.insert(id, row.clone());
        Ok(row)
    }

    fn unchecked_states(&self) -> Vec<(ServiceState, Option<ServiceState>)> {
        self.tables
            .states
            .values()
            .filter(|s| !s.checked)
            .map(|s| (s.clone(), self.prev_state(s.service_id, s.id)))
            .collect()
    }

    fn services_with_period_and_state(&self) -> Vec<Service> {
        self.tables
            .services
            .values()
            .filter(|s| s.period.is_some() && s.latest_state_id.is_some())
            .cloned()
            .collect()
    }

    fn pending_alerts(&self) -> Vec<Alert> {
        self.tables.alerts.values().filter(|a| !a.reported).cloned().collect()
    }

    fn mark_state_checked(&mut self, id: StateId) -> Result<(), StoreError> {
        let state = self
            .tables
            .states
            .get_mut(&id.0)
            .ok_or(StoreError::Missing { entity: "state", id: id.0 })?;
        state.checked = true;
        Ok(())
    }

    fn mark_alert_reported(&mut self, id: AlertId) -> Result<(), StoreError> {
        let alert = self
            .tables
            .alerts
            .get_mut(&id.0)
            .ok_or(StoreError::Missing { entity: "alert", id: id.0 })?;
        alert.reported = true;
        Ok(())
    }

    fn set_service_timed_out(
        &mut self,
        id: ServiceId,
        timed_out: bool,
    ) -> Result<(), StoreError> {
        let service = self
            .tables
            .services
            .get_mut(&id.0)
            .ok_or(StoreError::Missing { entity: "service", id: id.0 })?;
        service.timed_out = timed_out;
        Ok(())
    }

    fn alerts_since(
        &self,
        since: DateTime<Utc>,
        server: Option<ServerId>,
        service: Option<ServiceId>,
    ) -> Vec<Alert> {
        self.tables
            .alerts
            .values()
            .filter(|a| a.ctime >= since)
            .filter(|a| server.is_none() || a.server_id == server)
            .filter(|a| service.is_none() || a.service_id == service)
            .cloned()
            .collect()
    }

    fn states_since(&self, service: ServiceId, since: DateTime<Utc>) -> Vec<ServiceState> {
        let mut states: Vec<_> = self
            .tables
            .states
            .values()
            .filter(|s| s.service_id == service && s.rtime >= since)
            .cloned()
            .collect();
        states.reverse();
        states
    }

    fn stats(&self) -> StoreStats {
        StoreStats {
            servers: self.tables.servers.len(),
            services: self.tables.services.len(),
            alerts_pending: self.tables.alerts.values().filter(|a| !a.reported).count(),
        }
    }

    fn delete_server(&mut self, id: ServerId) -> Result<(), StoreError> {
        self.tables
            .servers
            .remove(&id.0)
            .ok_or(StoreError::Missing { entity: "server", id: id.0 })?;
        let orphaned: Vec<ServiceId> = self
            .tables
            .services
            .values()
            .filter(|s| s.server_id == id)
            .map(|s| s.id)
            .collect();
        for service in &orphaned {
            self.tables.services.remove(&service.0);
            self.tables.states.retain(|_, s| s.service_id != *service);
        }
        self.tables.alerts.retain(|_, a| {
            a.server_id != Some(id)
                && !a.service_id.is_some_and(|sid| orphaned.contains(&sid))
        });
        tracing::info!(server = %id, "server deleted");
        Ok(())
    }

    fn delete_service(&mut self, id: ServiceId) -> Result<(), StoreError> {
        self.tables
            .services
            .remove(&id.0)
            .ok_or(StoreError::Missing { entity: "service", id: id.0 })?;
        self.tables.states.retain(|_, s| s.service_id != id);
        self.tables.alerts.retain(|_, a| a.service_id != Some(id));
        tracing::info!(service = %id, "service deleted");
        Ok(())
    }

    fn commit(&mut self) -> Result<(), StoreError> {
        if let Some(path) = &self.path {
            snapshot::save(path, &self.tables)?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "mem_tests.rs"]
mod tests;
