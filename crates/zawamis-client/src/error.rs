use thiserror::Error;

use zawamis_shared::ValidationError;
use zawamis_store::StoreError;

/// Failure talking to the REST backend.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request never produced a usable response. Shown to users as a
    /// generic message; the cause is kept for logs.
    #[error("Network error. Please check your connection and try again.")]
    Network(#[source] reqwest::Error),

    /// The backend answered and said no.
    #[error("{message}")]
    Rejected {
        message: String,
        /// Field errors flattened to `field: reason` lines.
        errors: Vec<String>,
    },

    #[error("Cannot upload {file_name}: {reason}")]
    Upload { file_name: String, reason: String },
}

#[derive(Debug, Error)]
pub enum PortalError {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Not signed in")]
    NotSignedIn,
}

impl From<ValidationError> for PortalError {
    fn from(e: ValidationError) -> Self {
        Self::Store(StoreError::Validation(e))
    }
}

pub type Result<T> = std::result::Result<T, PortalError>;
