//! # zawamis-shared
//!
//! Types, rules and constants shared by the store and client crates: record
//! ids, form enums, input validation, attachments and credential hashing.

pub mod attachment;
pub mod constants;
pub mod credentials;
pub mod error;
pub mod types;
pub mod validation;

pub use attachment::Attachment;
pub use credentials::CredentialHash;
pub use error::{CredentialError, IdSpaceExhausted, ValidationError};
pub use types::{ApplicationStatus, DocumentKind, Gender, MaritalStatus, RecordId, Role};
