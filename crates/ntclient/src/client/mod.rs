// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! The public client: user-facing operations over the connection
//! manager and the store.
//!
//! Reads (`get`) are store-only and never touch the wire. Mutations
//! update the replica and emit the matching message, except `create`,
//! which is wire-only: the server assigns the real id and echoes a
//! fresh assignment back through the dispatcher.

mod config;
mod connection;
mod dispatch;
mod handshake;

use crate::codec::{Encoder, Message, WireError};
use crate::entry::{Entry, EntryFlags, EntryValue, PENDING_ID};
use crate::store::{MemoryStore, Store, StoreError};
use connection::ConnectionManager;
use std::fmt;
use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Client failure. The outer message is human-readable; the variant is
/// programmatically matchable.
#[derive(Debug)]
pub enum Error {
    /// Could not reach the server at all.
    DialFailed { addr: String, source: io::Error },

    /// The transport failed mid-operation.
    Io(io::Error),

    /// The server closed the stream.
    Disconnected,

    /// The server only speaks another protocol revision.
    UnsupportedRevision(u16),

    /// A message arrived that is invalid in the current state.
    UnexpectedMessage(u8),

    /// A frame could not be decoded or encoded.
    Frame(WireError),

    /// The store rejected the operation.
    Store(StoreError),

    /// No live connection where one was required.
    NotConnected,

    /// The client was already closed.
    AlreadyClosed,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DialFailed { addr, source } => {
                write!(f, "couldn't dial server at {}: {}", addr, source)
            }
            Self::Io(e) => write!(f, "connection I/O failed: {}", e),
            Self::Disconnected => write!(f, "server closed the connection"),
            Self::UnsupportedRevision(rev) => {
                write!(f, "server only supports protocol revision {:#06x}", rev)
            }
            Self::UnexpectedMessage(tag) => {
                write!(f, "server sent unexpected message type {:#04x}", tag)
            }
            Self::Frame(e) => write!(f, "invalid frame: {}", e),
            Self::Store(e) => write!(f, "store operation failed: {}", e),
            Self::NotConnected => write!(f, "not connected to a server"),
            Self::AlreadyClosed => write!(f, "client is closed"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::DialFailed { source, .. } => Some(source),
            Self::Io(e) => Some(e),
            Self::Frame(e) => Some(e),
            Self::Store(e) => Some(e),
            _ => None,
        }
    }
}

impl From<WireError> for Error {
    fn from(e: WireError) -> Self {
        match e {
            WireError::ShortRead => Self::Disconnected,
            WireError::Io(e) => Self::Io(e),
            other => Self::Frame(other),
        }
    }
}

/// Result alias for client operations.
pub type Result<T> = std::result::Result<T, Error>;

/// NetworkTables v3 client.
///
/// Cheap to share behind an `Arc`; every operation takes `&self`. The
/// first wire operation dials and handshakes; reads are served from the
/// local replica.
pub struct Client {
    store: Arc<dyn Store>,
    conn: ConnectionManager,
    closed: AtomicBool,
}

impl Client {
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    /// Acquire a live connection (handshaking if needed) and send a
    /// keep-alive.
    pub fn ping(&self) -> Result<()> {
        self.ensure_open()?;
        self.send(&Message::KeepAlive)
    }

    /// Read an entry from the local replica. Never touches the wire.
    pub fn get(&self, name: &str) -> Result<Entry> {
        self.ensure_open()?;
        self.store.get_by_name(name).map_err(Error::Store)
    }

    /// Advance the entry's sequence number, store the new value, and
    /// announce the update to the server. Fails with `NotFound` if the
    /// entry does not exist yet; use [`Client::create`] first.
    pub fn update_value(&self, name: &str, value: EntryValue) -> Result<()> {
        self.ensure_open()?;

        let (id, seq) = self.store.get_id_seq(name).map_err(Error::Store)?;
        let seq = seq.wrapping_add(1);
        self.store
            .update_value(id, seq, value.clone())
            .map_err(Error::Store)?;

        self.send(&Message::EntryUpdate { id, seq, value })
    }

    /// Store the new flags and announce them to the server.
    pub fn update_flags(&self, name: &str, flags: EntryFlags) -> Result<()> {
        self.ensure_open()?;

        let id = self.store.get_id(name).map_err(Error::Store)?;
        self.store.update_flags(id, flags).map_err(Error::Store)?;

        self.send(&Message::EntryFlagsUpdate { id, flags })
    }

    /// Ask the server to create an entry. The local store is not
    /// touched: the server assigns an id and echoes a real assignment
    /// back, so the entry is not guaranteed to exist on return.
    pub fn create(&self, name: &str, flags: EntryFlags, value: EntryValue) -> Result<()> {
        self.ensure_open()?;

        self.send(&Message::EntryAssignment(Entry {
            name: name.to_string(),
            id: PENDING_ID,
            seq: 0,
            flags,
            value,
        }))
    }

    /// Remove the entry locally and announce the delete.
    pub fn delete(&self, name: &str) -> Result<()> {
        self.ensure_open()?;

        let id = self.store.delete_by_name(name).map_err(Error::Store)?;
        self.send(&Message::EntryDelete { id })
    }

    /// Tear the connection down. Further operations fail with
    /// [`Error::AlreadyClosed`]; the replica is released when the last
    /// `Client` reference drops.
    pub fn close(&self) -> Result<()> {
        if self.closed.swap(true, Ordering::SeqCst) {
            return Err(Error::AlreadyClosed);
        }
        self.conn.close();
        Ok(())
    }

    fn ensure_open(&self) -> Result<()> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(Error::AlreadyClosed);
        }
        Ok(())
    }

    fn send(&self, msg: &Message) -> Result<()> {
        let mut enc = Encoder::new(Vec::new());
        msg.write_to(&mut enc)?;
        self.conn.send(&enc.into_inner())
    }
}

/// Builder for [`Client`]. Unset fields fall back to the documented
/// defaults: `:1735`, the host name (or `"networktables-go"`), and an
/// in-memory store.
pub struct ClientBuilder {
    addr: String,
    identity: String,
    store: Option<Arc<dyn Store>>,
}

impl ClientBuilder {
    fn new() -> Self {
        Self {
            addr: String::new(),
            identity: String::new(),
            store: None,
        }
    }

    /// Server address as `host:port`; a bare `:port` means localhost.
    pub fn addr(mut self, addr: impl Into<String>) -> Self {
        self.addr = addr.into();
        self
    }

    /// Identity advertised in the client hello.
    pub fn identity(mut self, identity: impl Into<String>) -> Self {
        self.identity = identity.into();
        self
    }

    /// Replica storage backend.
    pub fn store(mut self, store: Arc<dyn Store>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn build(self) -> Client {
        let store: Arc<dyn Store> = self
            .store
            .unwrap_or_else(|| Arc::new(MemoryStore::new()));
        let dial_addr = config::dial_addr(&self.addr);
        let identity = config::resolve_identity(&self.identity);

        Client {
            store: Arc::clone(&store),
            conn: ConnectionManager::new(dial_addr, identity, store),
            closed: AtomicBool::new(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_reads_only_the_store() {
        // The address points nowhere; a wire touch would fail loudly.
        let store = Arc::new(MemoryStore::new());
        store
            .create(Entry {
                name: "local".into(),
                id: 3,
                seq: 5,
                flags: EntryFlags::default(),
                value: EntryValue::String("cached".into()),
            })
            .expect("seed");

        let client = Client::builder()
            .addr("127.0.0.1:1")
            .store(store)
            .build();

        let entry = client.get("local").expect("served from the replica");
        assert_eq!(entry.seq, 5);

        match client.get("missing") {
            Err(Error::Store(StoreError::NotFound)) => {}
            other => panic!("expected NotFound, got {:?}", other.err()),
        }
    }

    #[test]
    fn update_value_requires_an_existing_entry() {
        let client = Client::builder().addr("127.0.0.1:1").build();

        // The store lookup fails before anything dials.
        match client.update_value("ghost", EntryValue::Double(1.0)) {
            Err(Error::Store(StoreError::NotFound)) => {}
            other => panic!("expected NotFound, got {:?}", other.err()),
        }
    }

    #[test]
    fn operations_after_close_fail() {
        let client = Client::builder().addr("127.0.0.1:1").build();
        client.close().expect("first close");

        match client.ping() {
            Err(Error::AlreadyClosed) => {}
            other => panic!("expected AlreadyClosed, got {:?}", other.err()),
        }
        match client.close() {
            Err(Error::AlreadyClosed) => {}
            other => panic!("expected AlreadyClosed, got {:?}", other.err()),
        }
    }

    #[test]
    fn error_display_is_matchable_and_readable() {
        let err = Error::UnsupportedRevision(0x0200);
        assert!(err.to_string().contains("0x0200"));

        let err = Error::DialFailed {
            addr: "10.0.0.2:1735".into(),
            source: io::Error::new(io::ErrorKind::ConnectionRefused, "refused"),
        };
        assert!(err.to_string().contains("10.0.0.2:1735"));

        let err = Error::Store(StoreError::NotFound);
        assert!(err.to_string().contains("not found"));
    }
}
