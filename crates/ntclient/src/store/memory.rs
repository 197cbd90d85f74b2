// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Default in-memory store: three maps behind one read/write lock.

use super::{Store, StoreError, StoreResult};
use crate::entry::{Entry, EntryFlags, EntryValue};
use parking_lot::RwLock;
use std::collections::HashMap;

#[derive(Debug, Clone)]
struct Record {
    value: EntryValue,
    flags: EntryFlags,
    seq: u16,
}

#[derive(Default)]
struct Tables {
    name_to_id: HashMap<String, u16>,
    id_to_name: HashMap<u16, String>,
    records: HashMap<u16, Record>,
}

impl Tables {
    fn remove(&mut self, id: u16, name: &str) {
        self.name_to_id.remove(name);
        self.id_to_name.remove(&id);
        self.records.remove(&id);
    }
}

/// In-memory replica. All operations take one lock, so each is atomic
/// with respect to every other.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Store for MemoryStore {
    fn create(&self, entry: Entry) -> StoreResult<()> {
        let mut tables = self.tables.write();

        // A same-named entry is replaced wholesale, reverse index included.
        if let Some(old_id) = tables.name_to_id.get(&entry.name).copied() {
            tables.remove(old_id, &entry.name);
        }

        tables.name_to_id.insert(entry.name.clone(), entry.id);
        tables.id_to_name.insert(entry.id, entry.name);
        tables.records.insert(
            entry.id,
            Record {
                value: entry.value,
                flags: entry.flags,
                seq: entry.seq,
            },
        );
        Ok(())
    }

    fn update_value(&self, id: u16, seq: u16, value: EntryValue) -> StoreResult<()> {
        let mut tables = self.tables.write();
        let record = tables.records.get_mut(&id).ok_or(StoreError::NotFound)?;
        record.value = value;
        record.seq = seq;
        Ok(())
    }

    fn update_flags(&self, id: u16, flags: EntryFlags) -> StoreResult<()> {
        let mut tables = self.tables.write();
        let record = tables.records.get_mut(&id).ok_or(StoreError::NotFound)?;
        record.flags = flags;
        Ok(())
    }

    fn delete(&self, id: u16) -> StoreResult<()> {
        let mut tables = self.tables.write();
        let name = tables
            .id_to_name
            .get(&id)
            .cloned()
            .ok_or(StoreError::NotFound)?;
        tables.remove(id, &name);
        Ok(())
    }

    fn delete_by_name(&self, name: &str) -> StoreResult<u16> {
        let mut tables = self.tables.write();
        let id = tables
            .name_to_id
            .get(name)
            .copied()
            .ok_or(StoreError::NotFound)?;
        tables.remove(id, name);
        Ok(id)
    }

    fn get_by_name(&self, name: &str) -> StoreResult<Entry> {
        let tables = self.tables.read();
        let id = tables
            .name_to_id
            .get(name)
            .copied()
            .ok_or(StoreError::NotFound)?;
        let record = tables.records.get(&id).ok_or(StoreError::NotFound)?;
        Ok(Entry {
            name: name.to_string(),
            id,
            seq: record.seq,
            flags: record.flags,
            value: record.value.clone(),
        })
    }

    fn get_value(&self, id: u16) -> StoreResult<EntryValue> {
        let tables = self.tables.read();
        let record = tables.records.get(&id).ok_or(StoreError::NotFound)?;
        Ok(record.value.clone())
    }

    fn get_flags(&self, id: u16) -> StoreResult<EntryFlags> {
        let tables = self.tables.read();
        let record = tables.records.get(&id).ok_or(StoreError::NotFound)?;
        Ok(record.flags)
    }

    fn get_id(&self, name: &str) -> StoreResult<u16> {
        let tables = self.tables.read();
        tables
            .name_to_id
            .get(name)
            .copied()
            .ok_or(StoreError::NotFound)
    }

    fn get_id_seq(&self, name: &str) -> StoreResult<(u16, u16)> {
        let tables = self.tables.read();
        let id = tables
            .name_to_id
            .get(name)
            .copied()
            .ok_or(StoreError::NotFound)?;
        let record = tables.records.get(&id).ok_or(StoreError::NotFound)?;
        Ok((id, record.seq))
    }

    fn names(&self) -> StoreResult<Vec<String>> {
        let tables = self.tables.read();
        Ok(tables.name_to_id.keys().cloned().collect())
    }

    fn clear(&self) -> StoreResult<()> {
        let mut tables = self.tables.write();
        *tables = Tables::default();
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
    fn name_and_id_indices_stay_bijective() {
        let store = MemoryStore::new();
        store
            .create(entry("a", 1, EntryValue::Boolean(true)))
            .expect("create a");
        store
            .create(entry("b", 2, EntryValue::Double(1.0)))
            .expect("create b");
        store
            .create(entry("c", 3, EntryValue::String("v".into())))
            .expect("create c");

        for name in store.names().expect("names") {
            let id = store.get_id(&name).expect("id for listed name");
            let back = store.get_by_name(&name).expect("entry for listed name");
            assert_eq!(back.id, id);
            assert_eq!(back.name, name);
        }
    }

    #[test]
    fn create_then_delete_is_a_keyset_noop() {
        let store = MemoryStore::new();
        store
            .create(entry("x", 5, EntryValue::Double(2.0)))
            .expect("create");
        store.delete(5).expect("delete");

        assert!(store.names().expect("names").is_empty());
        assert_eq!(store.get_id("x"), Err(StoreError::NotFound));
        assert_eq!(store.get_value(5), Err(StoreError::NotFound));
    }

    #[test]
    fn create_same_name_replaces_entirely() {
        let store = MemoryStore::new();
        store
            .create(entry("x", 1, EntryValue::Boolean(false)))
            .expect("create first");
        store
            .create(entry("x", 9, EntryValue::Double(6.28)))
            .expect("create replacement");

        assert_eq!(store.names().expect("names"), vec!["x".to_string()]);
        assert_eq!(store.get_id("x").expect("id"), 9);
        assert_eq!(store.get_value(9).expect("value"), EntryValue::Double(6.28));
        // The displaced id is fully gone.
        assert_eq!(store.get_value(1), Err(StoreError::NotFound));
    }

    #[test]
    fn delete_by_name_returns_the_freed_id() {
        let store = MemoryStore::new();
        store
            .create(entry("y", 12, EntryValue::Raw(vec![1])))
            .expect("create");

        assert_eq!(store.delete_by_name("y").expect("delete"), 12);
        assert_eq!(store.delete_by_name("y"), Err(StoreError::NotFound));
    }

    #[test]
    fn update_value_overwrites_value_and_seq() {
        let store = MemoryStore::new();
        store
            .create(entry("x", 1, EntryValue::Double(1.0)))
            .expect("create");

        store
            .update_value(1, 7, EntryValue::Double(2.0))
            .expect("update");
        let back = store.get_by_name("x").expect("get");
        assert_eq!(back.seq, 7);
        assert_eq!(back.value, EntryValue::Double(2.0));

        assert_eq!(
            store.update_value(99, 1, EntryValue::Boolean(true)),
            Err(StoreError::NotFound)
        );
    }

    #[test]
    fn update_flags_only_touches_flags() {
        let store = MemoryStore::new();
        store
            .create(entry("x", 1, EntryValue::Double(1.0)))
            .expect("create");

        store
            .update_flags(1, EntryFlags { persist: true })
            .expect("update flags");
        let back = store.get_by_name("x").expect("get");
        assert!(back.flags.persist);
        assert_eq!(back.seq, 0);

        assert_eq!(
            store.update_flags(2, EntryFlags::default()),
            Err(StoreError::NotFound)
        );
    }

    #[test]
    fn get_id_seq_pairs_up() {
        let store = MemoryStore::new();
        let mut e = entry("z", 3, EntryValue::Boolean(true));
        e.seq = 41;
        store.create(e).expect("create");

        assert_eq!(store.get_id_seq("z").expect("pair"), (3, 41));
        assert_eq!(store.get_id_seq("missing"), Err(StoreError::NotFound));
    }

    #[test]
    fn clear_wipes_everything() {
        let store = MemoryStore::new();
        for (i, name) in ["a", "b", "c"].iter().enumerate() {
            store
                .create(entry(name, i as u16, EntryValue::Boolean(true)))
                .expect("create");
        }

        store.clear().expect("clear");
        assert!(store.names().expect("names").is_empty());
        assert_eq!(store.get_flags(0), Err(StoreError::NotFound));
    }
}
