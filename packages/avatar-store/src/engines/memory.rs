//! In-memory [`KeyspaceEngine`] implementation backed by [`DashMap`].
//!
//! Each keyspace is an ordered map so scans follow key order, matching the
//! file-backed engine. Nothing survives the process.

use std::collections::BTreeMap;

use dashmap::DashMap;

use crate::engine::{EntryVisitor, KeyspaceEngine};
use crate::error::{StoreError, StoreResult};

/// Volatile storage with one `BTreeMap` per keyspace.
///
/// Writers to the same keyspace serialize on that keyspace's shard lock;
/// scans copy the keyspace first so visitors never run under a lock.
pub struct MemoryEngine {
    keyspaces: DashMap<String, BTreeMap<String, Vec<u8>>>,
}

impl MemoryEngine {
    /// Creates an engine with no keyspaces.
    #[must_use]
    pub fn new() -> Self {
        Self {
            keyspaces: DashMap::new(),
        }
    }
}

impl Default for MemoryEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyspaceEngine for MemoryEngine {
    fn get(&self, keyspace: &str, key: &str) -> StoreResult<Option<Vec<u8>>> {
        let entries = self
            .keyspaces
            .get(keyspace)
            .ok_or_else(|| StoreError::keyspace_not_found(keyspace))?;
        Ok(entries.get(key).cloned())
    }

    fn put(&self, keyspace: &str, key: &str, value: &[u8]) -> StoreResult<()> {
        self.keyspaces
            .entry(keyspace.to_string())
            .or_default()
            .insert(key.to_string(), value.to_vec());
        Ok(())
    }

    fn delete(&self, keyspace: &str, key: &str) -> StoreResult<bool> {
        let mut entries = self
            .keyspaces
            .get_mut(keyspace)
            .ok_or_else(|| StoreError::keyspace_not_found(keyspace))?;
        Ok(entries.remove(key).is_some())
    }

    fn for_each(&self, keyspace: &str, visitor: &mut EntryVisitor<'_>) -> StoreResult<()> {
        let snapshot = self
            .keyspaces
            .get(keyspace)
            .map(|entries| entries.value().clone())
            .ok_or_else(|| StoreError::keyspace_not_found(keyspace))?;

        for (key, value) in &snapshot {
            visitor(key, value)?;
        }
        Ok(())
    }

    fn has_keyspace(&self, keyspace: &str) -> StoreResult<bool> {
        Ok(self.keyspaces.contains_key(keyspace))
    }
}
