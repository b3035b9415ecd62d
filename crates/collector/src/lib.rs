// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! overc-collector: the central collector/supervisor daemon (`overcd`)
//!
//! Ingests health reports over HTTP/JSON, persists history, detects
//! state transitions and liveness timeouts, and fans alerts out through
//! external notifier plugins.

pub mod config;
pub mod http;
pub mod ingest;
pub mod lock;
pub mod notify;
pub mod supervisor;

use std::net::SocketAddr;

use overc_core::SystemClock;
use overc_store::MemStore;
use tracing::info;

pub use config::CollectorConfig;
pub use notify::{DeliveryReport, NotifierSet, NotifierSpec};
pub use supervisor::{Supervisor, SupervisorConfig, TickReport};

/// Run the collector: HTTP frontend plus the supervisor loop.
pub async fn run(config: CollectorConfig) -> anyhow::Result<()> {
    let store = match &config.data {
        Some(path) => MemStore::open(path)?,
        None => MemStore::in_memory(),
    };
    let store = overc_store::shared(store);

    let specs = match &config.notifiers {
        Some(path) => config::load_notifiers(path)?,
        None => Vec::new(),
    };
    if specs.is_empty() {
        tracing::warn!("no notifiers configured; alerts will be marked reported unsent");
    }
    let notifiers = NotifierSet::new(&specs)?;

    let supervisor = Supervisor::new(
        store.clone(),
        notifiers,
        SystemClock,
        config.supervisor_config(),
    );
    tokio::spawn(async move { supervisor.run_loop().await });

    let app = http::router(store);
    let listener = tokio::net::TcpListener::bind(config.bind).await?;
    info!(bind = %config.bind, "overcd listening");
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;
    Ok(())
}
