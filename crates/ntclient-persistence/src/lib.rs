// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Persistent entry store for `ntclient`, backed by SQLite.
//!
//! The client core keeps its replica in memory by default; this crate
//! plugs a durable store into the same [`ntclient::Store`] contract, so
//! locally created entries survive a process restart and are replayed
//! to the server during the next handshake.
//!
//! ```rust,no_run
//! use ntclient::Client;
//! use ntclient_persistence::SqliteStore;
//! use std::sync::Arc;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let store = Arc::new(SqliteStore::open("/var/lib/vision/entries.db")?);
//! let client = Client::builder().store(store).build();
//! client.ping()?;
//! # Ok(())
//! # }
//! ```

mod store;

pub use store::SqliteStore;
