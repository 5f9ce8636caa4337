//! # Shop Error Types
//!
//! Typed error handling for shopfront.
//! All core and repository operations return `Result<T, ShopError>`.

use thiserror::Error;

/// Public message for every token/identity failure. Callers never learn which
/// check rejected them.
pub const UNAUTHORIZED_MESSAGE: &str = "Could not validate credentials";

/// Core error type for all shop operations
#[derive(Debug, Error)]
pub enum ShopError {
    /// Configuration errors (missing secrets, invalid values)
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Invalid request data that passed schema parsing
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Registration with an email that already exists
    #[error("Email already registered")]
    EmailAlreadyRegistered,

    /// Login with an unknown name or a wrong password
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// Missing, malformed, tampered or expired bearer token, or a subject
    /// that does not resolve to a user.
    ///
    /// `reason` is for logs only and is never rendered.
    #[error("Could not validate credentials")]
    Unauthorized { reason: String },

    /// Database failure (detail is logged, not returned)
    #[error("Database error: {0}")]
    Database(String),

    /// Internal error (should not happen)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ShopError {
    /// Build an `Unauthorized` error carrying an internal reason
    pub fn unauthorized(reason: impl Into<String>) -> Self {
        ShopError::Unauthorized {
            reason: reason.into(),
        }
    }

    /// Returns the HTTP status code appropriate for this error
    pub fn status_code(&self) -> u16 {
        match self {
            ShopError::Configuration(_) => 500,
            ShopError::InvalidRequest(_) => 400,
            ShopError::EmailAlreadyRegistered => 400,
            ShopError::InvalidCredentials => 401,
            ShopError::Unauthorized { .. } => 401,
            ShopError::Database(_) => 500,
            ShopError::Internal(_) => 500,
        }
    }

    /// Message safe to return to a client.
    ///
    /// Server-side failures collapse to a fixed string; their detail only
    /// goes to the log.
    pub fn public_message(&self) -> String {
        match self {
            ShopError::Database(_) => "Database error".to_string(),
            ShopError::Internal(_) => "Internal error".to_string(),
            other => other.to_string(),
        }
    }

    /// Returns true for 401 errors
    pub fn is_unauthorized(&self) -> bool {
        self.status_code() == 401
    }
}

/// Result type alias for shop operations
pub type ShopResult<T> = Result<T, ShopError>;
