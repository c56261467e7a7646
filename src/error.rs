//! Error taxonomy shared by the stores and the FFI layer.

use thiserror::Error;

/// Failures raised by a [`KeyValueStore`](crate::storage::KeyValueStore) backend.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("LMDB error: {0}")]
    Lmdb(#[from] lmdb::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("value stored under '{key}' is not valid UTF-8")]
    InvalidUtf8 { key: String },

    #[error("storage lock poisoned")]
    Poisoned,
}

/// Errors surfaced to callers of the session and document stores.
///
/// None of these are fatal. The UI host is expected to turn them into a
/// transient notification and carry on.
#[derive(Debug, Error)]
pub enum AppError {
    /// Email or password missing at sign-in / sign-up.
    #[error("email and password are required")]
    InvalidCredentials,

    /// A document operation was attempted with nobody signed in.
    #[error("no user is signed in")]
    NotAuthenticated,

    #[error("no document found with id: {0}")]
    NotFound(String),

    #[error(transparent)]
    Storage(#[from] StorageError),
}
