// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! SQLite-backed implementation of the entry store contract.
//!
//! One `entries` table carries all five records per entry (value,
//! flags, sequence, and both name/id indices via column constraints).
//! Every mutation that touches more than one index runs inside a SQL
//! transaction, preserving the contract's atomicity guarantee.
//!
//! Values are stored in their wire form: the type tag byte, then the
//! value body as the protocol encodes it.

use ntclient::codec::{Decoder, Encoder};
use ntclient::{Entry, EntryFlags, EntryType, EntryValue, Store, StoreError, StoreResult};
use parking_lot::Mutex;
use rusqlite::{params, Connection, OptionalExtension};
use std::io::Cursor;
use std::path::Path;

/// Durable entry store.
///
/// Thread-safe via an internal mutex (a SQLite `Connection` is not
/// `Sync`), which also serialises transactions.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open (or create) a file-backed store.
    pub fn open<P: AsRef<Path>>(path: P) -> StoreResult<Self> {
        let conn = Connection::open(path).map_err(backend)?;
        Self::with_connection(conn)
    }

    /// Open an in-memory store. Contents vanish on drop; mainly for
    /// tests and ephemeral deployments.
    pub fn open_in_memory() -> StoreResult<Self> {
        let conn = Connection::open_in_memory().map_err(backend)?;
        Self::with_connection(conn)
    }

    fn with_connection(conn: Connection) -> StoreResult<Self> {
        conn.execute(
            "CREATE TABLE IF NOT EXISTS entries (
                id    INTEGER PRIMARY KEY,
                name  TEXT NOT NULL UNIQUE,
                seq   INTEGER NOT NULL,
                flags INTEGER NOT NULL,
                kind  INTEGER NOT NULL,
                value BLOB NOT NULL
            )",
            [],
        )
        .map_err(backend)?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }
}

fn backend<E: std::fmt::Display>(e: E) -> StoreError {
    StoreError::Backend(e.to_string())
}

fn encode_value(value: &EntryValue) -> StoreResult<(u8, Vec<u8>)> {
    let mut enc = Encoder::new(Vec::new());
    value.write_to(&mut enc).map_err(backend)?;
    Ok((value.kind().to_wire(), enc.into_inner()))
}

fn decode_value(kind: u8, blob: &[u8]) -> StoreResult<EntryValue> {
    let kind = EntryType::from_wire(kind).map_err(backend)?;
    let mut dec = Decoder::new(Cursor::new(blob));
    EntryValue::read_from(&mut dec, kind).map_err(backend)
}

/// Raw row shape: the value blob is decoded outside rusqlite's error
/// type so wire failures map to `StoreError::Backend`.
type EntryRow = (u16, u16, u8, u8, Vec<u8>);

fn row_to_parts(row: &rusqlite::Row<'_>) -> rusqlite::Result<EntryRow> {
    Ok((
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
        row.get(4)?,
    ))
}

impl Store for SqliteStore {
    fn create(&self, entry: Entry) -> StoreResult<()> {
        let (kind, blob) = encode_value(&entry.value)?;

        let mut conn = self.conn.lock();
        let tx = conn.transaction().map_err(backend)?;

        // A same-named or same-id row is displaced before the insert.
        tx.execute(
            "DELETE FROM entries WHERE name = ?1 OR id = ?2",
            params![entry.name, entry.id],
        )
        .map_err(backend)?;

        tx.execute(
            "INSERT INTO entries (id, name, seq, flags, kind, value)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                entry.id,
                entry.name,
                entry.seq,
                entry.flags.to_wire(),
                kind,
                blob
            ],
        )
        .map_err(backend)?;

        tx.commit().map_err(backend)
    }

    fn update_value(&self, id: u16, seq: u16, value: EntryValue) -> StoreResult<()> {
        let (kind, blob) = encode_value(&value)?;

        let conn = self.conn.lock();
        let changed = conn
            .execute(
                "UPDATE entries SET seq = ?1, kind = ?2, value = ?3 WHERE id = ?4",
                params![seq, kind, blob, id],
            )
            .map_err(backend)?;

        if changed == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    fn update_flags(&self, id: u16, flags: EntryFlags) -> StoreResult<()> {
        let conn = self.conn.lock();
        let changed = conn
            .execute(
                "UPDATE entries SET flags = ?1 WHERE id = ?2",
                params![flags.to_wire(), id],
            )
            .map_err(backend)?;

        if changed == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    fn delete(&self, id: u16) -> StoreResult<()> {
        let conn = self.conn.lock();
        let changed = conn
            .execute("DELETE FROM entries WHERE id = ?1", params![id])
            .map_err(backend)?;

        if changed == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    fn delete_by_name(&self, name: &str) -> StoreResult<u16> {
        let mut conn = self.conn.lock();
        let tx = conn.transaction().map_err(backend)?;

        let id: Option<u16> = tx
            .query_row(
                "SELECT id FROM entries WHERE name = ?1",
                params![name],
                |row| row.get(0),
            )
            .optional()
            .map_err(backend)?;
        let id = id.ok_or(StoreError::NotFound)?;

        tx.execute("DELETE FROM entries WHERE id = ?1", params![id])
            .map_err(backend)?;
        tx.commit().map_err(backend)?;
        Ok(id)
    }

    fn get_by_name(&self, name: &str) -> StoreResult<Entry> {
        let conn = self.conn.lock();
        let found = conn
            .query_row(
                "SELECT id, seq, flags, kind, value FROM entries WHERE name = ?1",
                params![name],
                row_to_parts,
            )
            .optional()
            .map_err(backend)?;

        let (id, seq, flags, kind, blob) = found.ok_or(StoreError::NotFound)?;
        Ok(Entry {
            name: name.to_string(),
            id,
            seq,
            flags: EntryFlags::from_wire(flags),
            value: decode_value(kind, &blob)?,
        })
    }

    fn get_value(&self, id: u16) -> StoreResult<EntryValue> {
        let conn = self.conn.lock();
        let found: Option<(u8, Vec<u8>)> = conn
            .query_row(
                "SELECT kind, value FROM entries WHERE id = ?1",
                params![id],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()
            .map_err(backend)?;

        let (kind, blob) = found.ok_or(StoreError::NotFound)?;
        decode_value(kind, &blob)
    }

    fn get_flags(&self, id: u16) -> StoreResult<EntryFlags> {
        let conn = self.conn.lock();
        let flags: Option<u8> = conn
            .query_row(
                "SELECT flags FROM entries WHERE id = ?1",
                params![id],
                |row| row.get(0),
            )
            .optional()
            .map_err(backend)?;

        Ok(EntryFlags::from_wire(flags.ok_or(StoreError::NotFound)?))
    }

    fn get_id(&self, name: &str) -> StoreResult<u16> {
        let conn = self.conn.lock();
        conn.query_row(
            "SELECT id FROM entries WHERE name = ?1",
            params![name],
            |row| row.get(0),
        )
        .optional()
        .map_err(backend)?
        .ok_or(StoreError::NotFound)
    }

    fn get_id_seq(&self, name: &str) -> StoreResult<(u16, u16)> {
        let conn = self.conn.lock();
        conn.query_row(
            "SELECT id, seq FROM entries WHERE name = ?1",
            params![name],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .optional()
        .map_err(backend)?
        .ok_or(StoreError::NotFound)
    }

    fn names(&self) -> StoreResult<Vec<String>> {
        let conn = self.conn.lock();
        let mut stmt = conn
            .prepare("SELECT name FROM entries ORDER BY name")
            .map_err(backend)?;
        let rows = stmt
            .query_map([], |row| row.get::<_, String>(0))
            .map_err(backend)?;

        let mut names = Vec::new();
        for name in rows {
            names.push(name.map_err(backend)?);
        }
        Ok(names)
    }

    fn clear(&self) -> StoreResult<()> {
        let conn = self.conn.lock();
        conn.execute("DELETE FROM entries", []).map_err(backend)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(name: &str, id: u16, value: EntryValue) -> Entry {
        Entry {
            name: name.to_string(),
            id,
            seq: 0,
            flags: EntryFlags::default(),
            value,
        }
    }

    #[test]
    fn all_value_variants_survive_storage() {
        let store = SqliteStore::open_in_memory().expect("open");
        let values = [
            EntryValue::Boolean(true),
            EntryValue::Double(3.14),
            EntryValue::String("text".into()),
            EntryValue::Raw(vec![0, 1, 255]),
            EntryValue::BooleanArray(vec![true, false]),
            EntryValue::DoubleArray(vec![1.5, -2.5]),
            EntryValue::StringArray(vec!["a".into(), "b".into()]),
        ];

        for (i, value) in values.into_iter().enumerate() {
            let name = format!("entry-{}", i);
            store
                .create(entry(&name, i as u16, value.clone()))
                .expect("create");
            assert_eq!(store.get_value(i as u16).expect("get"), value);
        }
    }

    #[test]
    fn contract_same_name_replaces() {
        let store = SqliteStore::open_in_memory().expect("open");
        store
            .create(entry("x", 1, EntryValue::Boolean(false)))
            .expect("first");
        store
            .create(entry("x", 9, EntryValue::Double(6.28)))
            .expect("replacement");

        assert_eq!(store.names().expect("names"), vec!["x".to_string()]);
        assert_eq!(store.get_id("x").expect("id"), 9);
        assert_eq!(store.get_value(1), Err(StoreError::NotFound));
    }

    #[test]
    fn contract_create_delete_is_a_keyset_noop() {
        let store = SqliteStore::open_in_memory().expect("open");
        store
            .create(entry("x", 5, EntryValue::Double(2.0)))
            .expect("create");
        store.delete(5).expect("delete");

        assert!(store.names().expect("names").is_empty());
        assert_eq!(store.delete(5), Err(StoreError::NotFound));
    }

    #[test]
    fn contract_update_value_and_flags() {
        let store = SqliteStore::open_in_memory().expect("open");
        store
            .create(entry("x", 1, EntryValue::Double(1.0)))
            .expect("create");

        store
            .update_value(1, 3, EntryValue::Double(2.0))
            .expect("update value");
        store
            .update_flags(1, EntryFlags { persist: true })
            .expect("update flags");

        let back = store.get_by_name("x").expect("get");
        assert_eq!(back.seq, 3);
        assert_eq!(back.value, EntryValue::Double(2.0));
        assert!(back.flags.persist);
        assert_eq!(store.get_id_seq("x").expect("pair"), (1, 3));

        assert_eq!(
            store.update_value(99, 0, EntryValue::Boolean(true)),
            Err(StoreError::NotFound)
        );
    }

    #[test]
    fn delete_by_name_returns_the_freed_id() {
        let store = SqliteStore::open_in_memory().expect("open");
        store
            .create(entry("y", 12, EntryValue::Raw(vec![7])))
            .expect("create");

        assert_eq!(store.delete_by_name("y").expect("delete"), 12);
        assert_eq!(store.delete_by_name("y"), Err(StoreError::NotFound));
    }

    #[test]
    fn clear_wipes_everything() {
        let store = SqliteStore::open_in_memory().expect("open");
        for id in 0..3u16 {
            store
                .create(entry(&format!("n{}", id), id, EntryValue::Boolean(true)))
                .expect("create");
        }

        store.clear().expect("clear");
        assert!(store.names().expect("names").is_empty());
    }

    #[test]
    fn entries_survive_reopen() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("entries.db");

        {
            let store = SqliteStore::open(&path).expect("open");
            store
                .create(Entry {
                    name: "persisted".into(),
                    id: 4,
                    seq: 7,
                    flags: EntryFlags { persist: true },
                    value: EntryValue::DoubleArray(vec![1.0, 2.0]),
                })
                .expect("create");
        }

        let store = SqliteStore::open(&path).expect("reopen");
        let back = store.get_by_name("persisted").expect("still there");
        assert_eq!(back.id, 4);
        assert_eq!(back.seq, 7);
        assert!(back.flags.persist);
        assert_eq!(back.value, EntryValue::DoubleArray(vec![1.0, 2.0]));
    }
}
