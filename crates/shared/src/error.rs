//! Application-wide error types.

use thiserror::Error;

/// Result type alias using `AppError`.
pub type AppResult<T> = Result<T, AppError>;

/// Application error types.
///
/// The taxonomy is flat and driven by the HTTP status it maps to.
#[derive(Debug, Error)]
pub enum AppError {
    /// Missing or invalid identity.
    #[error("Authentication failed: {0}")]
    Unauthorized(String),

    /// Authenticated, but the role may not perform the operation.
    #[error("Access denied: {0}")]
    Forbidden(String),

    /// Resource not found (partner, work, order, ...).
    #[error("Not found: {0}")]
    NotFound(String),

    /// Malformed input or a violated precondition.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Conflict (e.g., duplicate entry).
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Database error.
    #[error("Database error: {0}")]
    Database(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::Unauthorized(_) => 401,
            Self::Forbidden(_) => 403,
            Self::NotFound(_) => 404,
            Self::Validation(_) => 400,
            Self::Conflict(_) => 409,
            Self::Database(_) | Self::Internal(_) => 500,
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::Unauthorized(_) => "UNAUTHORIZED",
            Self::Forbidden(_) => "FORBIDDEN",
            Self::NotFound(_) => "NOT_FOUND",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::Conflict(_) => "CONFLICT",
            Self::Database(_) => "DATABASE_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Returns true for failures the caller cannot fix (5xx).
    #[must_use]
    pub const fn is_server_error(&self) -> bool {
        matches!(self, Self::Database(_) | Self::Internal(_))
    }

    /// Returns the message shown to end users.
    ///
    /// Client errors carry a message written for the user. Server errors never
    /// leak their cause here; see [`AppError::detail`].
    #[must_use]
    pub fn public_message(&self) -> String {
        match self {
            Self::Unauthorized(msg)
            | Self::Forbidden(msg)
            | Self::NotFound(msg)
            | Self::Validation(msg)
            | Self::Conflict(msg) => msg.clone(),
            Self::Database(_) | Self::Internal(_) => "Erreur interne du serveur".to_string(),
        }
    }

    /// Returns the internal cause of a server error.
    #[must_use]
    pub fn detail(&self) -> Option<&str> {
        match self {
            Self::Database(msg) | Self::Internal(msg) => Some(msg),
            _ => None,
        }
    }
}
