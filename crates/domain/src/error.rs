//! Common error types used across the workspace.
//!
//! Each layer defines its own typed errors and converts into
//! [`PlugDashError`] via `#[from]` or an explicit `From` impl.

use crate::automation::TriggerError;

/// Top-level error shared by the domain, the application services and
/// every port implementation.
#[derive(Debug, thiserror::Error)]
pub enum PlugDashError {
    /// A domain invariant or form rule was violated.
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    /// The requested record does not exist on the backend.
    #[error(transparent)]
    NotFound(#[from] NotFoundError),

    /// A stored trigger value could not be decoded.
    #[error("invalid trigger value")]
    Decode(#[from] TriggerError),

    /// The backend rejected the bearer token (or there is none).
    #[error("not authenticated")]
    Unauthorized,

    /// Transport, protocol or persistence failure in an adapter.
    #[error("remote error")]
    Remote(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Reasons a record or a form fails validation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("hardware name must not be empty")]
    EmptyHardwareName,

    #[error("no device selected")]
    MissingDevice,

    #[error("schedule time must be HH:MM, got {0:?}")]
    InvalidTime(String),

    #[error("a schedule needs at least one day")]
    NoDays,

    #[error("amount must be a non-negative number, got {0:?}")]
    InvalidAmount(String),

    #[error("no carbon intensity level selected")]
    MissingCarbonLevel,

    #[error("current password is required")]
    MissingCurrentPassword,

    #[error("new password must be at least {min} characters")]
    PasswordTooShort { min: usize },

    #[error("passwords do not match")]
    PasswordMismatch,

    #[error("username and password are required")]
    MissingCredentials,
}

/// A lookup by identifier found nothing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{entity} {id} not found")]
pub struct NotFoundError {
    pub entity: &'static str,
    pub id: String,
}
