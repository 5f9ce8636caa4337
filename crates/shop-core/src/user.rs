//! # User Types
//!
//! Accounts, registration/login payloads and the token response.

use crate::token::TOKEN_TYPE;
use serde::{Deserialize, Serialize};

/// Database-generated user identifier
pub type UserId = i64;

/// A stored user account.
///
/// `password_hash` is a bcrypt hash and is never serialized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
}

impl User {
    /// Public view of this user
    pub fn to_public(&self) -> UserOut {
        UserOut {
            id: self.id,
            name: self.name.clone(),
            email: self.email.clone(),
        }
    }
}

/// User as returned by the API (no password)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserOut {
    pub id: UserId,
    pub name: String,
    pub email: String,
}

impl UserOut {
    /// Minimal identity for a subject with no local account
    pub fn placeholder(id: UserId) -> Self {
        Self {
            id,
            name: "unknown".to_string(),
            email: String::new(),
        }
    }
}

impl From<User> for UserOut {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
        }
    }
}

/// Registration payload
#[derive(Debug, Clone, Deserialize)]
pub struct UserCreate {
    pub name: String,
    pub email: String,
    pub password: String,
}

/// Login payload
#[derive(Debug, Clone, Deserialize)]
pub struct UserLogin {
    pub name: String,
    pub password: String,
}

/// Successful login response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
}

impl TokenResponse {
    /// Wrap a signed token as a bearer response
    pub fn bearer(access_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            token_type: TOKEN_TYPE.to_string(),
        }
    }
}
