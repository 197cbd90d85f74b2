// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Local entry store: the replica of the shared table.
//!
//! The store is indexed three ways -- by name, by server-assigned id,
//! and each record carries its sequence number. Both the inbound
//! dispatcher (reader thread) and public client operations mutate it
//! concurrently, so every operation must be atomic: no caller may
//! observe a half-applied `create` or `delete`.
//!
//! [`MemoryStore`] is the default. Persistent backends implement the
//! same trait with transactional multi-index writes (see the
//! `ntclient-persistence` crate).

mod memory;

pub use memory::MemoryStore;

use crate::entry::{Entry, EntryFlags, EntryValue};
use std::fmt;

/// Store failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// No entry under that name or id.
    NotFound,

    /// Backend-specific failure (I/O, database, ...).
    Backend(String),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound => write!(f, "entry not found"),
            Self::Backend(reason) => write!(f, "store backend error: {}", reason),
        }
    }
}

impl std::error::Error for StoreError {}

/// Result alias for store operations.
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// The replica storage contract.
///
/// Implementations must be safe under one reader-thread mutator and any
/// number of concurrent callers; interior locking or per-operation
/// transactions both satisfy this.
pub trait Store: Send + Sync {
    /// Insert an entry. An existing entry with the same name is removed
    /// first, including its id index.
    fn create(&self, entry: Entry) -> StoreResult<()>;

    /// Overwrite value and sequence number for an id.
    fn update_value(&self, id: u16, seq: u16, value: EntryValue) -> StoreResult<()>;

    /// Overwrite flags for an id.
    fn update_flags(&self, id: u16, flags: EntryFlags) -> StoreResult<()>;

    /// Remove the entry and both of its indices.
    fn delete(&self, id: u16) -> StoreResult<()>;

    /// Resolve a name, remove the entry, and return the freed id.
    fn delete_by_name(&self, name: &str) -> StoreResult<u16>;

    fn get_by_name(&self, name: &str) -> StoreResult<Entry>;

    fn get_value(&self, id: u16) -> StoreResult<EntryValue>;

    fn get_flags(&self, id: u16) -> StoreResult<EntryFlags>;

    fn get_id(&self, name: &str) -> StoreResult<u16>;

    fn get_id_seq(&self, name: &str) -> StoreResult<(u16, u16)>;

    /// Current keyset. Order unspecified but stable within one call.
    fn names(&self) -> StoreResult<Vec<String>>;

    /// Wipe all state.
    fn clear(&self) -> StoreResult<()>;
}
