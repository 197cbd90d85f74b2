// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Inbound dispatcher: demuxes server messages into store mutations.
//!
//! Runs on the reader thread for the connection's lifetime. Store
//! failures are logged and the message skipped -- the server cannot help
//! with those. Codec failures and EOF end the loop; the connection
//! manager then clears the handle so the next operation reconnects.

use crate::codec::message::CLEAR_ALL_MAGIC;
use crate::codec::{Decoder, Message};
use crate::entry::PENDING_ID;
use crate::store::Store;
use std::io::Read;

/// Read and apply messages until the stream ends or breaks.
pub(crate) fn run<R: Read>(source: R, store: &dyn Store) {
    let mut dec = Decoder::new(source);

    loop {
        match Message::read_from(&mut dec) {
            Ok(msg) => apply(msg, store),
            Err(e) if e.is_eof() => {
                crate::info!("server closed the connection");
                return;
            }
            Err(e) => {
                crate::error!("inbound stream is unreadable: {}", e);
                return;
            }
        }
    }
}

fn apply(msg: Message, store: &dyn Store) {
    match msg {
        Message::KeepAlive => {}

        Message::EntryAssignment(entry) => {
            if entry.id == PENDING_ID {
                crate::warn!(
                    "server sent assignment for {:?} without a real id, skipping",
                    entry.name
                );
                return;
            }

            let name = entry.name.clone();
            let id = entry.id;
            match store.create(entry) {
                Ok(()) => crate::debug!("created entry {:?} (id {})", name, id),
                Err(e) => crate::warn!("couldn't create entry {:?}: {}", name, e),
            }
        }

        Message::EntryUpdate { id, seq, value } => match store.update_value(id, seq, value) {
            Ok(()) => crate::debug!("updated entry {} to seq {}", id, seq),
            Err(e) => crate::warn!("couldn't update entry {}: {}", id, e),
        },

        Message::EntryFlagsUpdate { id, flags } => match store.update_flags(id, flags) {
            Ok(()) => crate::debug!("updated flags for entry {}", id),
            Err(e) => crate::warn!("couldn't update flags for entry {}: {}", id, e),
        },

        Message::EntryDelete { id } => match store.delete(id) {
            Ok(()) => crate::debug!("deleted entry {}", id),
            Err(e) => crate::warn!("couldn't delete entry {}: {}", id, e),
        },

        Message::ClearAllEntries { magic, .. } => {
            // The magic guards against a clear decoded out of a
            // misaligned frame.
            if magic != CLEAR_ALL_MAGIC {
                crate::warn!("dropping clear-all with magic {:#010x}", magic);
                return;
            }
            match store.clear() {
                Ok(()) => crate::info!("cleared all entries"),
                Err(e) => crate::warn!("couldn't clear entries: {}", e),
            }
        }

        Message::RpcExecute | Message::RpcResponse => {
            crate::warn!("ignoring RPC message from server");
        }

        other => {
            crate::warn!(
                "ignoring message type {:#04x} in steady state",
                other.wire_type()
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::Encoder;
    use crate::entry::{Entry, EntryFlags, EntryValue};
    use crate::store::{MemoryStore, StoreError};
    use std::io::Cursor;

    fn feed(store: &MemoryStore, messages: &[Message]) {
        let mut enc = Encoder::new(Vec::new());
        for msg in messages {
            msg.write_to(&mut enc).expect("encode script");
        }
        run(Cursor::new(enc.into_inner()), store);
    }

    fn seeded() -> MemoryStore {
        let store = MemoryStore::new();
        store
            .create(Entry {
                name: "x".into(),
                id: 1,
                seq: 0,
                flags: EntryFlags::default(),
                value: EntryValue::Double(3.14),
            })
            .expect("seed");
        store
    }

    #[test]
    fn assignment_creates_update_mutates() {
        let store = MemoryStore::new();
        feed(
            &store,
            &[
                Message::EntryAssignment(Entry {
                    name: "x".into(),
                    id: 1,
                    seq: 0,
                    flags: EntryFlags::default(),
                    value: EntryValue::Double(1.0),
                }),
                Message::EntryUpdate {
                    id: 1,
                    seq: 1,
                    value: EntryValue::Double(2.0),
                },
                Message::EntryFlagsUpdate {
                    id: 1,
                    flags: EntryFlags { persist: true },
                },
            ],
        );

        let entry = store.get_by_name("x").expect("x");
        assert_eq!(entry.seq, 1);
        assert_eq!(entry.value, EntryValue::Double(2.0));
        assert!(entry.flags.persist);
    }

    #[test]
    fn delete_removes_the_entry() {
        let store = seeded();
        feed(&store, &[Message::EntryDelete { id: 1 }]);
        assert_eq!(store.get_id("x"), Err(StoreError::NotFound));
    }

    #[test]
    fn clear_with_matching_magic_wipes() {
        let store = seeded();
        feed(
            &store,
            &[Message::ClearAllEntries {
                id: 0,
                magic: CLEAR_ALL_MAGIC,
            }],
        );
        assert!(store.names().expect("names").is_empty());
    }

    #[test]
    fn clear_with_wrong_magic_is_dropped() {
        let store = seeded();
        feed(
            &store,
            &[Message::ClearAllEntries {
                id: 0,
                magic: 0x0000_0000,
            }],
        );
        assert_eq!(store.names().expect("names").len(), 1);
    }

    #[test]
    fn store_errors_do_not_stop_the_loop() {
        let store = MemoryStore::new();
        feed(
            &store,
            &[
                // Update for an id nobody assigned: logged and skipped.
                Message::EntryUpdate {
                    id: 42,
                    seq: 1,
                    value: EntryValue::Boolean(true),
                },
                Message::EntryAssignment(Entry {
                    name: "later".into(),
                    id: 2,
                    seq: 0,
                    flags: EntryFlags::default(),
                    value: EntryValue::String("v".into()),
                }),
            ],
        );

        assert_eq!(store.get_id("later").expect("created after error"), 2);
    }

    #[test]
    fn pending_id_assignment_is_rejected() {
        let store = MemoryStore::new();
        feed(
            &store,
            &[Message::EntryAssignment(Entry {
                name: "bogus".into(),
                id: PENDING_ID,
                seq: 0,
                flags: EntryFlags::default(),
                value: EntryValue::Boolean(false),
            })],
        );
        assert!(store.names().expect("names").is_empty());
    }

    #[test]
    fn keep_alive_and_rpc_frames_are_ignored() {
        let store = seeded();
        feed(
            &store,
            &[
                Message::KeepAlive,
                Message::RpcExecute,
                Message::RpcResponse,
            ],
        );
        assert_eq!(store.names().expect("names").len(), 1);
    }
}
