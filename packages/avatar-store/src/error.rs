//! Error taxonomy for the record store.
//!
//! Callers distinguish four classes of failure: a keyspace that was never
//! created, a missing key, bytes that do not match the record shape, and
//! engine-level faults (I/O, locking, transaction conflicts).

/// Convenience alias used throughout the store.
pub type StoreResult<T> = Result<T, StoreError>;

/// Failure returned by every store and engine operation.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The requested keyspace has never been written to.
    #[error("keyspace not found: {keyspace}")]
    KeyspaceNotFound { keyspace: String },

    /// The keyspace exists but holds no value under `key`.
    #[error("{key} not found in {keyspace}")]
    NotFound { keyspace: String, key: String },

    /// An outgoing record could not be serialized.
    #[error("failed to encode {kind}: {source}")]
    Encode {
        kind: &'static str,
        #[source]
        source: serde_json::Error,
    },

    /// A stored value does not decode to the expected record shape.
    #[error("failed to decode {keyspace}/{key}: {source}")]
    Decode {
        keyspace: String,
        key: String,
        #[source]
        source: serde_json::Error,
    },

    /// Fault raised by the underlying key-value engine.
    #[error("storage engine error: {0}")]
    Engine(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl StoreError {
    /// Builds a [`StoreError::KeyspaceNotFound`].
    #[must_use]
    pub fn keyspace_not_found(keyspace: &str) -> Self {
        Self::KeyspaceNotFound {
            keyspace: keyspace.to_string(),
        }
    }

    /// Builds a [`StoreError::NotFound`].
    #[must_use]
    pub fn not_found(keyspace: &str, key: &str) -> Self {
        Self::NotFound {
            keyspace: keyspace.to_string(),
            key: key.to_string(),
        }
    }

    /// Wraps any engine error.
    pub fn engine<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Engine(Box::new(err))
    }

    /// `true` for both missing-keyspace and missing-key failures.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::KeyspaceNotFound { .. } | Self::NotFound { .. })
    }

    /// `true` when stored or outgoing bytes do not match the record shape.
    #[must_use]
    pub fn is_corrupt(&self) -> bool {
        matches!(self, Self::Encode { .. } | Self::Decode { .. })
    }
}
