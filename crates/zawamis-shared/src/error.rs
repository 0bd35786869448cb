use thiserror::Error;

use crate::types::DocumentKind;

/// Input rejected before anything is written. Never retried.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Please enter a message or attach a file")]
    EmptyMessage,

    #[error("Message exceeds {max} words ({count} given)")]
    TooManyWords { count: usize, max: usize },

    #[error("Reply text cannot be empty")]
    EmptyReply,

    #[error("Passwords do not match")]
    PasswordMismatch,

    #[error("Password must be at least {min} characters long")]
    WeakPassword { min: usize },

    #[error("Missing required document: {0}")]
    MissingDocument(DocumentKind),

    #[error("Invalid file type for {kind}: {mime_type}")]
    InvalidDocumentType {
        kind: DocumentKind,
        mime_type: String,
    },

    #[error("Attachment too large: {size} bytes (max {max})")]
    AttachmentTooLarge { size: usize, max: usize },

    #[error("Missing required field: {0}")]
    MissingField(&'static str),
}

#[derive(Error, Debug)]
pub enum CredentialError {
    #[error("Failed to hash credential: {0}")]
    Hashing(String),

    #[error("Stored credential is malformed: {0}")]
    Malformed(String),
}

/// Every id up to `u64::MAX` is taken in the slot or this process.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("No record ids left to issue")]
pub struct IdSpaceExhausted;
