//! Low-level keyspace engine trait.
//!
//! Defines [`KeyspaceEngine`], the innermost storage layer: named keyspaces
//! of string keys to opaque byte values. Every call runs in its own
//! transaction (read-only for lookups and scans, read-write for mutations),
//! so readers always observe a consistent snapshot.

use crate::error::StoreResult;

/// Object-safe scan callback. Returning an error aborts the scan.
pub type EntryVisitor<'a> = dyn FnMut(&str, &[u8]) -> StoreResult<()> + 'a;

/// Transactional key-value storage partitioned into named keyspaces.
///
/// Keyspaces are created on first write. Reads, scans and deletes against a
/// keyspace that was never written fail with
/// [`StoreError::KeyspaceNotFound`](crate::StoreError::KeyspaceNotFound).
///
/// Wrapped in `Arc<dyn KeyspaceEngine>` so one handle can be shared by every
/// caller in the process.
pub trait KeyspaceEngine: Send + Sync + 'static {
    /// Fetch the value stored under `key`, or `None` if the key is absent.
    fn get(&self, keyspace: &str, key: &str) -> StoreResult<Option<Vec<u8>>>;

    /// Insert or replace the value under `key`, creating the keyspace if needed.
    fn put(&self, keyspace: &str, key: &str, value: &[u8]) -> StoreResult<()>;

    /// Remove `key`. Returns whether a value was present.
    ///
    /// Removing an absent key from an existing keyspace succeeds.
    fn delete(&self, keyspace: &str, key: &str) -> StoreResult<bool>;

    /// Visit every entry of a keyspace in key order.
    ///
    /// Uses `&mut dyn FnMut` instead of a generic for `dyn KeyspaceEngine`
    /// compatibility. The first visitor error stops the scan and is returned.
    fn for_each(&self, keyspace: &str, visitor: &mut EntryVisitor<'_>) -> StoreResult<()>;

    /// Whether the keyspace has been created.
    fn has_keyspace(&self, keyspace: &str) -> StoreResult<bool>;
}
