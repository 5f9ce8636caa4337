//! # Identity Providers
//!
//! Strategy trait for turning a bearer token into a user id.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                  IdentityProvider (trait)                   │
//! │  ├── resolve()                                              │
//! │  ├── provider_name()                                        │
//! │  └── trusts_subject()                                       │
//! └─────────────────────────────────────────────────────────────┘
//!                            ▲
//!               ┌────────────┴────────────┐
//!               │                         │
//!      ┌────────┴────────┐       ┌────────┴────────┐
//!      │ JwtIdentity     │       │ RemoteIdentity  │
//!      │ Provider        │       │ Provider        │
//!      │ (local tokens)  │       │ (shop-identity) │
//!      └─────────────────┘       └─────────────────┘
//! ```

use crate::error::{ShopError, ShopResult};
use crate::token::TokenService;
use crate::user::UserId;
use async_trait::async_trait;
use std::sync::Arc;

/// Resolves bearer tokens to user ids.
///
/// Every failure must surface as `ShopError::Unauthorized`.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Resolve a bearer token (without the `Bearer ` prefix) to a user id
    async fn resolve(&self, token: &str) -> ShopResult<UserId>;

    /// Provider name (for logging)
    fn provider_name(&self) -> &'static str;

    /// Whether the returned id is trusted without a local user lookup.
    ///
    /// Local tokens only prove that we signed them once; the user must
    /// still exist. A remote auth service owns the accounts it vouches for.
    fn trusts_subject(&self) -> bool {
        false
    }
}

/// Type alias for a boxed identity provider (dynamic dispatch)
pub type BoxedIdentityProvider = Arc<dyn IdentityProvider>;

/// Verifies locally signed access tokens
#[derive(Clone)]
pub struct JwtIdentityProvider {
    tokens: TokenService,
}

impl JwtIdentityProvider {
    pub fn new(tokens: TokenService) -> Self {
        Self { tokens }
    }
}

#[async_trait]
impl IdentityProvider for JwtIdentityProvider {
    async fn resolve(&self, token: &str) -> ShopResult<UserId> {
        let claims = self.tokens.verify(token)?;
        claims.user_id()
    }

    fn provider_name(&self) -> &'static str {
        "jwt"
    }
}

/// Extract the token from an `Authorization` header value.
///
/// The scheme is matched case-insensitively; anything other than a
/// non-empty `Bearer` credential is unauthorized.
pub fn parse_bearer(header_value: &str) -> ShopResult<&str> {
    let (scheme, token) = header_value
        .trim()
        .split_once(' ')
        .ok_or_else(|| ShopError::unauthorized("authorization header has no scheme"))?;

    if !scheme.eq_ignore_ascii_case("bearer") {
        return Err(ShopError::unauthorized(format!(
            "unsupported authorization scheme: {}",
            scheme
        )));
    }

    let token = token.trim();
    if token.is_empty() {
        return Err(ShopError::unauthorized("empty bearer token"));
    }

    Ok(token)
}
