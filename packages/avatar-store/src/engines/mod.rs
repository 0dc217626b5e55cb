//! [`KeyspaceEngine`](crate::KeyspaceEngine) implementations.
//!
//! [`MemoryEngine`] keeps everything in process memory; [`RedbEngine`]
//! (feature `redb`, on by default) persists to a single database file.

mod memory;
#[cfg(feature = "redb")]
mod redb_engine;

pub use memory::MemoryEngine;
#[cfg(feature = "redb")]
pub use redb_engine::RedbEngine;
