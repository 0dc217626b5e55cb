//! Configuration types for the avatar record store.

use std::path::PathBuf;

/// Reserved key under which the configuration document is stored.
pub const CONFIG_KEY: &str = "config";

/// Settings for opening a file-backed database.
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// Path of the single database file. Created if missing.
    pub path: PathBuf,
    /// Page cache size in bytes.
    pub cache_size_bytes: usize,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("avatars.redb"),
            cache_size_bytes: 16 * 1024 * 1024, // 16 MiB
        }
    }
}

/// Keyspace names used by [`AvatarStore`](crate::AvatarStore).
///
/// Each entity kind gets its own keyspace so full scans never have to tell
/// record kinds apart.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Keyspace holding avatar profiles keyed by identifier.
    pub avatars_keyspace: String,
    /// Keyspace holding image metadata keyed by file path.
    pub images_keyspace: String,
    /// Keyspace holding the configuration document under [`CONFIG_KEY`].
    pub config_keyspace: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            avatars_keyspace: "avatars".to_string(),
            images_keyspace: "avatar_images".to_string(),
            config_keyspace: "avatar_config".to_string(),
        }
    }
}
