// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! overc-store: state storage for the collector
//!
//! The supervisor and the ingest layer see storage through the
//! [`StateStore`] trait. The reference implementation is an in-memory
//! materialized state with an optional JSON snapshot on disk; `commit()`
//! is the unit-of-work boundary.

pub mod error;
pub mod mem;
pub mod snapshot;
pub mod store;

use std::sync::Arc;

pub use error::StoreError;
pub use mem::MemStore;
pub use store::{NewAlert, StateStore, StoreStats};

/// Store handle shared between the HTTP frontend and the supervisor.
/// Holding the lock is the transaction scope.
pub type SharedStore = Arc<parking_lot::Mutex<MemStore>>;

/// Wrap a store for sharing.
pub fn shared(store: MemStore) -> SharedStore {
    Arc::new(parking_lot::Mutex::new(store))
}
