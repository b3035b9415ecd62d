// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Ingest contracts: validation, auth, and upsert semantics of the
//! report endpoints, independent of the HTTP carrier.
//!
//! Bodies are decoded by hand over `serde_json::Value` so malformed
//! payloads fail with the messages the API documents
//! (`Data: "server.key" should be a string`, ...) rather than serde's
//! own phrasing.

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use thiserror::Error;

use overc_core::{CheckState, Server, Service};
use overc_store::{StateStore, StoreError};

/// Server identification carried by every report.
#[derive(Debug, Clone)]
pub struct ServerSpec {
    pub name: String,
    pub key: String,
}

/// One service entry in a status batch.
#[derive(Debug, Clone)]
pub struct ServiceEntry {
    pub name: String,
    pub state: String,
    pub info: Option<String>,
    /// Per-service override of the batch period.
    pub period: Option<i64>,
}

/// Body of `POST /api/set/service/status`.
#[derive(Debug, Clone)]
pub struct StatusRequest {
    pub server: ServerSpec,
    pub period: i64,
    pub services: Vec<ServiceEntry>,
}

/// One alert in `POST /api/set/alerts`.
#[derive(Debug, Clone)]
pub struct AlertEntry {
    pub message: String,
    /// Service name to attach the alert to, created if missing.
    pub service: Option<String>,
}

/// Body of `POST /api/set/alerts`.
#[derive(Debug, Clone)]
pub struct AlertsRequest {
    pub server: ServerSpec,
    pub alerts: Vec<AlertEntry>,
}

/// Body of `POST /api/ping`.
#[derive(Debug, Clone)]
pub struct PingRequest {
    pub server: ServerSpec,
}

#[derive(Debug, Error)]
pub enum IngestError {
    /// Malformed payload: wrong types, missing or unknown keys.
    #[error("{0}")]
    Validation(String),

    /// Server exists but the key does not match.
    #[error("Invalid server key")]
    Forbidden,

    #[error(transparent)]
    Store(#[from] StoreError),
}

// -- Body validation ----------------------------------------------------

const SERVER_SHAPE: &str = r#"Data: "server" should be a dict with keys "name", "key""#;
const SERVICES_SHAPE: &str =
    r#"Data: "services" should be a list of objects with keys "name", "state", "info", "period""#;
const ALERTS_SHAPE: &str =
    r#"Data: "alerts" should be a list of objects with keys "message", "service""#;

fn invalid(message: impl Into<String>) -> IngestError {
    IngestError::Validation(message.into())
}

fn decode(body: &[u8]) -> Result<Map<String, Value>, IngestError> {
    match serde_json::from_slice(body) {
        Ok(Value::Object(data)) => Ok(data),
        _ => Err(invalid("Invalid data: should be JSON object")),
    }
}

fn required<'a>(data: &'a Map<String, Value>, key: &str) -> Result<&'a Value, IngestError> {
    data.get(key)
        .ok_or_else(|| invalid(format!("Data: \"{key}\" key is missing")))
}

fn server_spec(data: &Map<String, Value>) -> Result<ServerSpec, IngestError> {
    let server = required(data, "server")?
        .as_object()
        .ok_or_else(|| invalid(r#"Data: "server" should be a dict"#))?;
    if server.keys().any(|k| !matches!(k.as_str(), "name" | "key")) {
        return Err(invalid(SERVER_SHAPE));
    }
    let name = server
        .get("name")
        .and_then(Value::as_str)
        .ok_or_else(|| invalid(r#"Data: "server.name" should be a string"#))?;
    let key = server
        .get("key")
        .and_then(Value::as_str)
        .ok_or_else(|| invalid(r#"Data: "server.key" should be a string"#))?;
    Ok(ServerSpec { name: name.to_owned(), key: key.to_owned() })
}

fn parse_services(value: &Value) -> Result<Vec<ServiceEntry>, IngestError> {
    let entries = value.as_array().ok_or_else(|| invalid(SERVICES_SHAPE))?;
    entries
        .iter()
        .map(|entry| {
            let entry = entry.as_object().ok_or_else(|| invalid(SERVICES_SHAPE))?;
            if entry
                .keys()
                .any(|k| !matches!(k.as_str(), "name" | "state" | "info" | "period"))
            {
                return Err(invalid(SERVICES_SHAPE));
            }
            let name = entry
                .get("name")
                .and_then(Value::as_str)
                .ok_or_else(|| invalid(SERVICES_SHAPE))?;
            let state = entry
                .get("state")
                .and_then(Value::as_str)
                .ok_or_else(|| invalid(SERVICES_SHAPE))?;
            let info = entry
                .get("info")
                .map(|v| v.as_str().map(str::to_owned).ok_or_else(|| invalid(SERVICES_SHAPE)))
                .transpose()?;
            let period = entry
                .get("period")
                .map(|v| v.as_i64().ok_or_else(|| invalid(SERVICES_SHAPE)))
                .transpose()?;
            Ok(ServiceEntry {
                name: name.to_owned(),
                state: state.to_owned(),
                info,
                period,
            })
        })
        .collect()
}

fn parse_alerts(value: &Value) -> Result<Vec<AlertEntry>, IngestError> {
    let entries = value.as_array().ok_or_else(|| invalid(ALERTS_SHAPE))?;
    entries
        .iter()
        .map(|entry| {
            let entry = entry.as_object().ok_or_else(|| invalid(ALERTS_SHAPE))?;
            if entry.keys().any(|k| !matches!(k.as_str(), "message" | "service")) {
                return Err(invalid(ALERTS_SHAPE));
            }
            let message = entry
                .get("message")
                .and_then(Value::as_str)
                .ok_or_else(|| invalid(ALERTS_SHAPE))?;
            let service = entry
                .get("service")
                .map(|v| v.as_str().map(str::to_owned).ok_or_else(|| invalid(ALERTS_SHAPE)))
                .transpose()?;
            Ok(AlertEntry { message: message.to_owned(), service })
        })
        .collect()
}

impl PingRequest {
    /// Decode and validate a `POST /api/ping` body.
    pub fn from_body(body: &[u8]) -> Result<Self, IngestError> {
        let data = decode(body)?;
        Ok(Self { server: server_spec(&data)? })
    }
}

impl StatusRequest {
    /// Decode and validate a `POST /api/set/service/status` body.
    pub fn from_body(body: &[u8]) -> Result<Self, IngestError> {
        let data = decode(body)?;
        let server = server_spec(&data)?;
        let period = required(&data, "period")?
            .as_i64()
            .ok_or_else(|| invalid(r#"Data: "period" should be an integer"#))?;
        let services = parse_services(required(&data, "services")?)?;
        Ok(Self { server, period, services })
    }
}

impl AlertsRequest {
    /// Decode and validate a `POST /api/set/alerts` body.
    pub fn from_body(body: &[u8]) -> Result<Self, IngestError> {
        let data = decode(body)?;
        let server = server_spec(&data)?;
        let alerts = parse_alerts(required(&data, "alerts")?)?;
        Ok(Self { server, alerts })
    }
}

// -- Upsert semantics ---------------------------------------------------

/// Identify the server, creating it on first contact.
///
/// An existing server requires an exact key match; mismatch fails the
/// request and leaves the record untouched. The peer address is recorded
/// only after auth passes.
fn identify_server(
    store: &mut dyn StateStore,
    spec: &ServerSpec,
    peer: Option<&str>,
) -> Result<Server, IngestError> {
    let server = match store.server_by_name(&spec.name) {
        Some(server) => {
            if server.key != spec.key {
                return Err(IngestError::Forbidden);
            }
            server
        }
        None => store.create_server(&spec.name, &spec.key),
    };
    if let Some(ip) = peer {
        store.update_server_ip(server.id, ip)?;
    }
    Ok(server)
}

/// Identify a service on a server, creating it on first mention.
fn identify_service(
    store: &mut dyn StateStore,
    server: &Server,
    name: &str,
) -> Result<Service, IngestError> {
    match store.service_by_name(server.id, name) {
        Some(service) => Ok(service),
        None => Ok(store.create_service(server.id, name)?),
    }
}

/// `POST /api/ping`: authenticate (creating the server if new).
pub fn ping(
    store: &mut dyn StateStore,
    req: &PingRequest,
    peer: Option<&str>,
) -> Result<(), IngestError> {
    identify_server(store, &req.server, peer)?;
    store.commit()?;
    Ok(())
}

/// `POST /api/set/service/status`: upsert services and append one state
/// row per entry.
///
/// Duplicate names in one batch collapse to a single service with
/// multiple state rows; the last period wins. A state name outside
/// OK/WARN/FAIL/UNK is coerced to UNK with the raw value noted in info.
pub fn service_status(
    store: &mut dyn StateStore,
    now: DateTime<Utc>,
    req: &StatusRequest,
    peer: Option<&str>,
) -> Result<(), IngestError> {
    let server = identify_server(store, &req.server, peer)?;

    for entry in &req.services {
        let service = identify_service(store, &server, &entry.name)?;
        let period = entry.period.unwrap_or(req.period);
        store.set_service_period(service.id, period)?;

        let info = entry.info.clone().unwrap_or_default();
        let (state, info) = match entry.state.parse::<CheckState>() {
            Ok(state) => (state, info),
            Err(_) => (
                CheckState::Unk,
                format!("{} (sent unsupported state: \"{}\")", info, entry.state),
            ),
        };
        store.append_state(service.id, state, &info, now)?;
    }

    store.commit()?;
    Ok(())
}

/// `POST /api/set/alerts`: append one `api/alert` row per entry.
pub fn set_alerts(
    store: &mut dyn StateStore,
    now: DateTime<Utc>,
    req: &AlertsRequest,
    peer: Option<&str>,
) -> Result<(), IngestError> {
    let server = identify_server(store, &req.server, peer)?;

    for entry in &req.alerts {
        let service = match &entry.service {
            Some(name) => Some(identify_service(store, &server, name)?),
            None => None,
        };
        store.append_alert(overc_store::NewAlert {
            server_id: Some(server.id),
            service_id: service.map(|s| s.id),
            service_state_id: None,
            ctime: now,
            channel: "api".to_owned(),
            event: "alert".to_owned(),
            message: entry.message.clone(),
        })?;
    }

    store.commit()?;
    Ok(())
}

#[cfg(test)]
#[path = "ingest_tests.rs"]
mod tests;
