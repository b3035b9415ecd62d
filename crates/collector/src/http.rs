// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! HTTP/JSON frontend: the report API and the status endpoints.

use std::convert::Infallible;
use std::net::SocketAddr;

use axum::body::Bytes;
use axum::extract::{ConnectInfo, FromRequestParts, Path, Query, State};
use axum::http::request::Parts;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tower_http::trace::TraceLayer;

use overc_core::{Server, Service, ServiceState};
use overc_store::{SharedStore, StateStore, StoreStats};

use crate::ingest::{self, AlertsRequest, IngestError, PingRequest, StatusRequest};

/// Build the collector router.
pub fn router(store: SharedStore) -> Router {
    Router::new()
        // Report API
        .route("/api/ping", post(api_ping))
        .route("/api/set/service/status", post(api_service_status))
        .route("/api/set/alerts", post(api_set_alerts))
        // Status projections
        .route("/ui/api/status", get(ui_status))
        .route("/ui/api/status/server/{id}", get(ui_status_server))
        .route("/ui/api/status/service/{id}", get(ui_status_service))
        .route("/ui/api/status/alerts", get(ui_alerts))
        .route("/ui/api/status/alerts/server/{id}", get(ui_alerts_server))
        .route("/ui/api/status/alerts/service/{id}", get(ui_alerts_service))
        .route("/ui/api/status/service/{id}/states", get(ui_service_states))
        // Administration
        .route("/ui/api/item/server/{id}", delete(ui_delete_server))
        .route("/ui/api/item/service/{id}", delete(ui_delete_service))
        .layer(TraceLayer::new_for_http())
        .with_state(store)
}

// -- Errors -------------------------------------------------------------

/// API error mapped to a status code and an `{"error": ...}` body.
#[derive(Debug)]
pub enum ApiError {
    Validation(String),
    Forbidden(String),
    NotFound(String),
    Internal(String),
}

impl From<IngestError> for ApiError {
    fn from(err: IngestError) -> Self {
        match err {
            IngestError::Validation(msg) => ApiError::Validation(msg),
            IngestError::Forbidden => ApiError::Forbidden(err.to_string()),
            IngestError::Store(e) => ApiError::Internal(e.to_string()),
        }
    }
}

impl From<overc_store::StoreError> for ApiError {
    fn from(err: overc_store::StoreError) -> Self {
        match err {
            overc_store::StoreError::Missing { entity, id } => {
                ApiError::NotFound(format!("no such {entity} {id}"))
            }
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::Validation(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}

/// Remote peer address, when the transport provides one.
///
/// Reads the `ConnectInfo` extension directly so handlers keep working
/// under test transports that never populate it.
struct PeerAddr(Option<String>);

impl<S: Send + Sync> FromRequestParts<S> for PeerAddr {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Infallible> {
        let ip = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.ip().to_string());
        Ok(PeerAddr(ip))
    }
}

// -- Report API ---------------------------------------------------------

async fn api_ping(
    State(store): State<SharedStore>,
    PeerAddr(peer): PeerAddr,
    body: Bytes,
) -> Result<Json<serde_json::Value>, ApiError> {
    let req = PingRequest::from_body(&body)?;
    let mut store = store.lock();
    ingest::ping(&mut *store, &req, peer.as_deref())?;
    Ok(Json(json!({ "pong": 1 })))
}

async fn api_service_status(
    State(store): State<SharedStore>,
    PeerAddr(peer): PeerAddr,
    body: Bytes,
) -> Result<Json<serde_json::Value>, ApiError> {
    let req = StatusRequest::from_body(&body)?;
    let mut store = store.lock();
    ingest::service_status(&mut *store, Utc::now(), &req, peer.as_deref())?;
    Ok(Json(json!({ "ok": 1 })))
}

async fn api_set_alerts(
    State(store): State<SharedStore>,
    PeerAddr(peer): PeerAddr,
    body: Bytes,
) -> Result<Json<serde_json::Value>, ApiError> {
    let req = AlertsRequest::from_body(&body)?;
    let mut store = store.lock();
    ingest::set_alerts(&mut *store, Utc::now(), &req, peer.as_deref())?;
    Ok(Json(json!({ "ok": 1 })))
}

// -- Status projections -------------------------------------------------

#[derive(Debug, Serialize)]
struct StateView {
    id: i64,
    rtime: DateTime<Utc>,
    state: String,
    info: String,
    checked: bool,
}

impl StateView {
    fn of(state: &ServiceState) -> Self {
        Self {
            id: state.id.0,
            rtime: state.rtime,
            state: state.state.to_string(),
            info: state.info.clone(),
            checked: state.checked,
        }
    }
}

#[derive(Debug, Serialize)]
struct ServiceStatus {
    id: i64,
    name: String,
    title: String,
    period: Option<i64>,
    timed_out: bool,
    state: Option<StateView>,
}

#[derive(Debug, Serialize)]
struct ServerStatus {
    id: i64,
    name: String,
    title: String,
    ip: Option<String>,
    services: Vec<ServiceStatus>,
}

#[derive(Debug, Serialize)]
struct StatusResponse {
    stats: StoreStats,
    servers: Vec<ServerStatus>,
}

#[derive(Debug, Serialize)]
struct AlertsResponse {
    alerts: Vec<AlertView>,
}

#[derive(Debug, Serialize)]
struct StatesResponse {
    states: Vec<StateView>,
}

#[derive(Debug, Serialize)]
struct AlertView {
    id: i64,
    server_id: Option<i64>,
    service_id: Option<i64>,
    channel: String,
    event: String,
    severity: u8,
    ctime: DateTime<Utc>,
    message: String,
    reported: bool,
}

#[derive(Debug, Deserialize)]
struct HoursQuery {
    hours: Option<i64>,
}

impl HoursQuery {
    /// Cutoff instant; defaults to the last 24 hours.
    fn since(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        now - TimeDelta::hours(self.hours.unwrap_or(24))
    }
}

fn service_status_view(store: &dyn StateStore, service: &Service) -> ServiceStatus {
    ServiceStatus {
        id: service.id.0,
        name: service.name.clone(),
        title: service.title.clone(),
        period: service.period,
        timed_out: service.timed_out,
        state: store.latest_state(service.id).as_ref().map(StateView::of),
    }
}

fn server_status_view(
    store: &dyn StateStore,
    server: &Server,
    services: &[Service],
) -> ServerStatus {
    ServerStatus {
        id: server.id.0,
        name: server.name.clone(),
        title: server.title.clone(),
        ip: server.ip.clone(),
        services: services
            .iter()
            .map(|s| service_status_view(store, s))
            .collect(),
    }
}

async fn ui_status(State(store): State<SharedStore>) -> Json<StatusResponse> {
    let store = store.lock();
    let servers: Vec<ServerStatus> = store
        .servers()
        .iter()
        .map(|server| server_status_view(&*store, server, &store.services_of(server.id)))
        .collect();
    Json(StatusResponse { stats: store.stats(), servers })
}

async fn ui_status_server(
    State(store): State<SharedStore>,
    Path(id): Path<i64>,
) -> Result<Json<StatusResponse>, ApiError> {
    let store = store.lock();
    let server = store
        .server(id.into())
        .ok_or_else(|| ApiError::NotFound(format!("no such server {id}")))?;
    Ok(Json(StatusResponse {
        stats: store.stats(),
        servers: vec![server_status_view(&*store, &server, &store.services_of(server.id))],
    }))
}

async fn ui_status_service(
    State(store): State<SharedStore>,
    Path(id): Path<i64>,
) -> Result<Json<StatusResponse>, ApiError> {
    let store = store.lock();
    let service = store
        .service(id.into())
        .ok_or_else(|| ApiError::NotFound(format!("no such service {id}")))?;
    let server = store
        .server(service.server_id)
        .ok_or_else(|| ApiError::Internal("service without owner".to_owned()))?;
    Ok(Json(StatusResponse {
        stats: store.stats(),
        servers: vec![server_status_view(&*store, &server, std::slice::from_ref(&service))],
    }))
}

fn alert_views(alerts: Vec<overc_core::Alert>) -> Vec<AlertView> {
    alerts
        .into_iter()
        .map(|a| AlertView {
            id: a.id.0,
            server_id: a.server_id.map(|id| id.0),
            service_id: a.service_id.map(|id| id.0),
            severity: a.severity().ordinal(),
            channel: a.channel,
            event: a.event,
            ctime: a.ctime,
            message: a.message,
            reported: a.reported,
        })
        .collect()
}

async fn ui_alerts(
    State(store): State<SharedStore>,
    Query(query): Query<HoursQuery>,
) -> Json<AlertsResponse> {
    let store = store.lock();
    let alerts = store.alerts_since(query.since(Utc::now()), None, None);
    Json(AlertsResponse { alerts: alert_views(alerts) })
}

async fn ui_alerts_server(
    State(store): State<SharedStore>,
    Path(id): Path<i64>,
    Query(query): Query<HoursQuery>,
) -> Result<Json<AlertsResponse>, ApiError> {
    let store = store.lock();
    store
        .server(id.into())
        .ok_or_else(|| ApiError::NotFound(format!("no such server {id}")))?;
    let alerts = store.alerts_since(query.since(Utc::now()), Some(id.into()), None);
    Ok(Json(AlertsResponse { alerts: alert_views(alerts) }))
}

async fn ui_alerts_service(
    State(store): State<SharedStore>,
    Path(id): Path<i64>,
    Query(query): Query<HoursQuery>,
) -> Result<Json<AlertsResponse>, ApiError> {
    let store = store.lock();
    store
        .service(id.into())
        .ok_or_else(|| ApiError::NotFound(format!("no such service {id}")))?;
    let alerts = store.alerts_since(query.since(Utc::now()), None, Some(id.into()));
    Ok(Json(AlertsResponse { alerts: alert_views(alerts) }))
}

async fn ui_service_states(
    State(store): State<SharedStore>,
    Path(id): Path<i64>,
    Query(query): Query<HoursQuery>,
) -> Result<Json<StatesResponse>, ApiError> {
    let store = store.lock();
    store
        .service(id.into())
        .ok_or_else(|| ApiError::NotFound(format!("no such service {id}")))?;
    let states: Vec<StateView> = store
        .states_since(id.into(), query.since(Utc::now()))
        .iter()
        .map(StateView::of)
        .collect();
    Ok(Json(StatesResponse { states }))
}

// -- Administration -----------------------------------------------------

async fn ui_delete_server(
    State(store): State<SharedStore>,
    Path(id): Path<i64>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let mut store = store.lock();
    store.delete_server(id.into())?;
    store.commit()?;
    Ok(Json(json!({ "ok": 1 })))
}

async fn ui_delete_service(
    State(store): State<SharedStore>,
    Path(id): Path<i64>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let mut store = store.lock();
    store.delete_service(id.into())?;
    store.commit()?;
    Ok(Json(json!({ "ok": 1 })))
}
