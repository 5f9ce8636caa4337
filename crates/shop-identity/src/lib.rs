//! # shop-identity
//!
//! Delegated authentication for shopfront-rs.
//!
//! Instead of verifying tokens locally, the API can hand every bearer token
//! to an external authentication service and trust the user id it returns.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use shop_identity::{RemoteAuthConfig, RemoteIdentityProvider};
//! use shop_core::IdentityProvider;
//!
//! // AUTH_SERVICE_URL=http://auth:8000
//! let config = RemoteAuthConfig::from_lookup(|key| std::env::var(key).ok())?;
//! let provider = RemoteIdentityProvider::new(config)?;
//!
//! let user_id = provider.resolve(bearer_token).await?;
//! ```
//!
//! ## Protocol
//!
//! `GET {AUTH_SERVICE_URL}/verify` with `Authorization: Bearer <token>`.
//! A `200` response with `{"user_id": 42}` resolves the token; any other
//! status, an unreadable body, or a network failure is unauthorized.

pub mod client;
pub mod config;

// Re-exports
pub use client::RemoteIdentityProvider;
pub use config::RemoteAuthConfig;
