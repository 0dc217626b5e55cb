//! Avatar Store — durable avatar profiles, image metadata and configuration
//! over an embedded transactional key-value engine.
//!
//! Two layers:
//!
//! - **Layer 1** ([`KeyspaceEngine`]): named keyspaces of raw bytes, one
//!   transaction per call. [`RedbEngine`] persists to a single file;
//!   [`MemoryEngine`] keeps data in process.
//! - **Layer 2** ([`AvatarStore`]): typed records encoded as JSON, identifier
//!   assignment, default-profile synthesis. Callers depend on the
//!   [`AvatarStorage`] trait.
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use avatar_core::{Avatar, AvatarState};
//! use avatar_store::{AvatarStorage, AvatarStore, DatabaseConfig, RedbEngine};
//!
//! # fn main() -> Result<(), avatar_store::StoreError> {
//! let engine = RedbEngine::open(&DatabaseConfig::default())?;
//! let store = AvatarStore::new(Arc::new(engine));
//!
//! let robot = Avatar::new("Robot", "Metal friend")
//!     .with_state(AvatarState::Idle, "/avatars/robot/idle.png");
//! let saved = store.save_avatar(robot)?;
//! assert_eq!(store.get_avatar(&saved.id)?, saved);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod engine;
pub mod engines;
pub mod error;
pub mod store;
pub mod traits;

pub use config::{DatabaseConfig, StoreConfig, CONFIG_KEY};
pub use engine::{EntryVisitor, KeyspaceEngine};
pub use engines::MemoryEngine;
#[cfg(feature = "redb")]
pub use engines::RedbEngine;
pub use error::{StoreError, StoreResult};
pub use store::AvatarStore;
pub use traits::AvatarStorage;
