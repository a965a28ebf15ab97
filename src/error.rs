//! Error types for the cache
//!
//! Provides unified error handling using thiserror.

use thiserror::Error;

// == Cache Error Enum ==
/// Unified error type for the cache.
#[derive(Error, Debug)]
pub enum CacheError {
    /// Malformed or missing configuration (cipher key/IV length, etc.)
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A crypt operation was called without a configured cipher
    #[error("Encryption not configured")]
    EncryptionDisabled,

    /// Key not found in cache
    #[error("Key not found: {0}")]
    NotFound(String),

    /// Key has expired
    #[error("Key expired: {0}")]
    Expired(String),

    /// Stored payload could not be decrypted
    #[error("Invalid ciphertext: {0}")]
    InvalidCiphertext(String),

    /// A record type was encoded or decoded without being registered
    #[error("Unregistered payload type: {0}")]
    UnregisteredType(String),

    /// Snapshot or record encoding failure
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Local file failure
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Blob store failure
    #[error("Storage error: {0}")]
    Storage(String),
}

impl From<bincode::Error> for CacheError {
    fn from(err: bincode::Error) -> Self {
        CacheError::Serialization(err.to_string())
    }
}

// == Result Type Alias ==
/// Convenience Result type for the cache.
pub type Result<T> = std::result::Result<T, CacheError>;
