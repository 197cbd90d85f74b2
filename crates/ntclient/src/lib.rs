// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! # ntclient - NetworkTables v3 client
//!
//! A pure Rust client for the FIRST Robotics NetworkTables revision-3 wire
//! protocol: a publish/subscribe key-value service spoken between a robot
//! controller (the server) and co-processors (clients) over a single
//! long-lived TCP connection.
//!
//! The client keeps a local replica of the shared entry table, reconciles
//! it with the server during the connection handshake, and mirrors every
//! subsequent value/flag/delete/clear mutation in both directions.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use ntclient::{Client, EntryValue, Result};
//!
//! fn main() -> Result<()> {
//!     let client = Client::builder()
//!         .addr("10.0.0.2:1735")
//!         .identity("vision-coprocessor")
//!         .build();
//!
//!     // Lazily dials and handshakes on first use.
//!     client.ping()?;
//!
//!     client.update_value("targeting/yaw", EntryValue::Double(3.5))?;
//!     let entry = client.get("targeting/yaw")?;
//!     println!("yaw = {:?} (seq {})", entry.value, entry.seq);
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! +--------------------------------------------------------------+
//! |                        Client API                            |
//! |     ping / get / update_value / update_flags / create /      |
//! |                      delete / close                          |
//! +--------------------------------------------------------------+
//! |  Connection manager          |  Inbound dispatcher           |
//! |  lazy dial + handshake,      |  reader thread, demuxes       |
//! |  single-writer mutex         |  server messages into store   |
//! +--------------------------------------------------------------+
//! |                      Entry store (replica)                   |
//! |        name <-> id indices, value/flags/seq records          |
//! +--------------------------------------------------------------+
//! |                        Wire codec                            |
//! |    big-endian integers, IEEE-754 doubles, ULEB128 strings,   |
//! |              typed values, self-delimiting frames            |
//! +--------------------------------------------------------------+
//! ```
//!
//! ## Key Types
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Client`] | Entry point; owns the connection and the replica |
//! | [`Entry`] | One shared key/value/flags record |
//! | [`EntryValue`] | Tagged value union (seven variants) |
//! | [`Store`] | Pluggable replica storage contract |
//! | [`MemoryStore`] | Default in-memory store |
//!
//! The server side of the protocol, id arbitration, the RPC message
//! family, and TLS are out of scope; RPC frames received from a server
//! are accepted and ignored.

/// Wire codec: primitives and message framing for the NT3 protocol.
pub mod codec;
/// Entry model: value union, wire type tags, flags bitfield.
pub mod entry;
/// Local entry store contract and the in-memory default.
pub mod store;
/// Compile-time configurable logging (no-op unless initialized).
pub mod logging;

/// Client: connection manager, handshake, dispatcher, public API.
mod client;

pub use client::{Client, ClientBuilder, Error, Result};
pub use entry::{Entry, EntryFlags, EntryType, EntryValue};
pub use store::{MemoryStore, Store, StoreError, StoreResult};

#[cfg(feature = "logging")]
pub use logging::{init_logging, FileSink, LogLevel, LogSink, StderrSink};

/// Protocol revision spoken by this client, transmitted verbatim.
pub const PROTOCOL_REVISION: u16 = 0x0300;

/// Default server address when none is configured.
pub const DEFAULT_ADDR: &str = ":1735";
