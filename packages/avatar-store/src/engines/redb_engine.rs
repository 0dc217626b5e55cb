//! File-backed [`KeyspaceEngine`] implementation on top of [`redb`].
//!
//! Each keyspace is a redb table of `&str -> &[u8]`. redb serializes write
//! transactions process-wide and gives every read transaction a stable
//! snapshot, so concurrent callers need no extra locking here.

use std::sync::Arc;

use redb::backends::InMemoryBackend;
use redb::{
    Builder, Database, ReadableTable, TableDefinition, TableError, TableHandle, WriteTransaction,
};
use tracing::info;

use crate::config::DatabaseConfig;
use crate::engine::{EntryVisitor, KeyspaceEngine};
use crate::error::{StoreError, StoreResult};

fn table(keyspace: &str) -> TableDefinition<'_, &'static str, &'static [u8]> {
    TableDefinition::new(keyspace)
}

/// Maps redb's "table does not exist" onto the store's keyspace error.
fn open_error(keyspace: &str, err: TableError) -> StoreError {
    match err {
        TableError::TableDoesNotExist(_) => StoreError::keyspace_not_found(keyspace),
        other => StoreError::engine(other),
    }
}

/// Keyspace engine over a shared redb [`Database`] handle.
///
/// The handle is injected and shared; dropping the engine drops only this
/// reference, so opening and closing the database stays with the caller.
#[derive(Clone)]
pub struct RedbEngine {
    db: Arc<Database>,
}

impl RedbEngine {
    /// Wraps an already-open database.
    #[must_use]
    pub fn from_database(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Opens (or creates) the database file described by `config`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Engine`] if the file cannot be opened or is locked
    /// by another process.
    pub fn open(config: &DatabaseConfig) -> StoreResult<Self> {
        let db = Builder::new()
            .set_cache_size(config.cache_size_bytes)
            .create(&config.path)
            .map_err(StoreError::engine)?;
        info!(path = %config.path.display(), "opened avatar database");
        Ok(Self::from_database(Arc::new(db)))
    }

    /// Creates a database that lives only in memory.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Engine`] if redb fails to initialize the backend.
    pub fn in_memory() -> StoreResult<Self> {
        let db = Builder::new()
            .create_with_backend(InMemoryBackend::new())
            .map_err(StoreError::engine)?;
        Ok(Self::from_database(Arc::new(db)))
    }

    /// The shared database handle.
    #[must_use]
    pub fn database(&self) -> Arc<Database> {
        Arc::clone(&self.db)
    }

    fn table_exists(txn: &WriteTransaction, keyspace: &str) -> StoreResult<bool> {
        let mut tables = txn.list_tables().map_err(StoreError::engine)?;
        Ok(tables.any(|handle| handle.name() == keyspace))
    }
}

impl KeyspaceEngine for RedbEngine {
    fn get(&self, keyspace: &str, key: &str) -> StoreResult<Option<Vec<u8>>> {
        let txn = self.db.begin_read().map_err(StoreError::engine)?;
        let table = txn
            .open_table(table(keyspace))
            .map_err(|err| open_error(keyspace, err))?;
        let value = table.get(key).map_err(StoreError::engine)?;
        Ok(value.map(|guard| guard.value().to_vec()))
    }

    fn put(&self, keyspace: &str, key: &str, value: &[u8]) -> StoreResult<()> {
        let txn = self.db.begin_write().map_err(StoreError::engine)?;
        {
            let mut table = txn.open_table(table(keyspace)).map_err(StoreError::engine)?;
            table.insert(key, value).map_err(StoreError::engine)?;
        }
        txn.commit().map_err(StoreError::engine)
    }

    fn delete(&self, keyspace: &str, key: &str) -> StoreResult<bool> {
        let txn = self.db.begin_write().map_err(StoreError::engine)?;
        // open_table in a write transaction would create the keyspace.
        if !Self::table_exists(&txn, keyspace)? {
            txn.abort().map_err(StoreError::engine)?;
            return Err(StoreError::keyspace_not_found(keyspace));
        }
        let removed = {
            let mut table = txn.open_table(table(keyspace)).map_err(StoreError::engine)?;
            let old = table.remove(key).map_err(StoreError::engine)?;
            old.is_some()
        };
        txn.commit().map_err(StoreError::engine)?;
        Ok(removed)
    }

    fn for_each(&self, keyspace: &str, visitor: &mut EntryVisitor<'_>) -> StoreResult<()> {
        let txn = self.db.begin_read().map_err(StoreError::engine)?;
        let table = txn
            .open_table(table(keyspace))
            .map_err(|err| open_error(keyspace, err))?;

        for entry in table.iter().map_err(StoreError::engine)? {
            let (key, value) = entry.map_err(StoreError::engine)?;
            visitor(key.value(), value.value())?;
        }
        Ok(())
    }

    fn has_keyspace(&self, keyspace: &str) -> StoreResult<bool> {
        let txn = self.db.begin_read().map_err(StoreError::engine)?;
        let mut tables = txn.list_tables().map_err(StoreError::engine)?;
        Ok(tables.any(|handle| handle.name() == keyspace))
    }
}
