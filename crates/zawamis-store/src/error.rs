use thiserror::Error;

use zawamis_shared::{CredentialError, IdSpaceExhausted, ValidationError};

/// Errors produced by the store layer.
#[derive(Error, Debug)]
pub enum StoreError {
    /// SQLite error from the persistent backend.
    #[error("Database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// Failed to determine a platform data directory.
    #[error("Could not determine application data directory")]
    NoDataDir,

    /// Generic I/O error (e.g. creating the database directory).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Migration failure.
    #[error("Migration error: {0}")]
    Migration(String),

    /// A record could not be encoded for writing.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A backend lock was poisoned by a panicking writer.
    #[error("Storage lock poisoned")]
    LockPoisoned,

    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("Credential error: {0}")]
    Credential(#[from] CredentialError),

    #[error(transparent)]
    IdSpaceExhausted(#[from] IdSpaceExhausted),

    #[error("Email already registered: {0}")]
    DuplicateEmail(String),

    #[error("ID number already registered: {0}")]
    DuplicateIdNumber(String),

    #[error("Invalid email or password")]
    InvalidCredentials,

    /// A user account tried to sign in through the admin console.
    #[error("Please use the regular login page for user access")]
    NotAnAdmin,

    #[error("No account found for {0}")]
    AccountNotFound(String),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, StoreError>;
