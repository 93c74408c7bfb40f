//! Error types for the key vault
//!
//! `KeyVaultError` is what every vault, wallet and derivation operation returns.
//! `StorageError` is the opaque error of the storage contract; it is carried
//! through unchanged except for not-found conditions, which surface as
//! `KeyVaultError::NotFound`.

use thiserror::Error;

/// Message carried by every relative-path validation failure.
pub const INVALID_PATH_MESSAGE: &str = "invalid relative path. Example: /1/2/3";

/// Main error type for key vault operations
#[derive(Debug, Error)]
pub enum KeyVaultError {
    /// Root secret is empty or otherwise unusable
    #[error("invalid seed: {0}")]
    InvalidSeed(String),

    /// Relative derivation path does not match the path grammar
    #[error("{}", INVALID_PATH_MESSAGE)]
    InvalidPath,

    /// A persisted record is missing a field or holds a value of the wrong shape
    #[error("{0}")]
    MalformedRecord(String),

    /// Name or id has no corresponding persisted object
    #[error("not found: {0}")]
    NotFound(String),

    /// Name is already registered
    #[error("name already in use: {0}")]
    DuplicateName(String),

    #[error("key derivation failed: {0}")]
    KeyDerivation(String),

    /// Bootstrap options are incomplete or inconsistent
    #[error("configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Storage(StorageError),
}

/// Result type alias for key vault operations
pub type KeyVaultResult<T> = Result<T, KeyVaultError>;

/// Errors reported by storage contract implementations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Backend(String),

    #[error("Encryption error: {0}")]
    Encryption(String),

    #[error("Decryption error: {0}")]
    Decryption(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Item not found: {0}")]
    NotFound(String),

    #[error("Lock poisoned")]
    LockPoisoned,
}

impl From<StorageError> for KeyVaultError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound(what) => KeyVaultError::NotFound(what),
            other => KeyVaultError::Storage(other),
        }
    }
}

impl From<serde_json::Error> for StorageError {
    fn from(err: serde_json::Error) -> Self {
        StorageError::Serialization(err.to_string())
    }
}
