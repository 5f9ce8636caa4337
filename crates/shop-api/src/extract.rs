//! # Identity Extractor
//!
//! `CurrentUser` guards protected routes. It reads the bearer token, resolves
//! it through the configured identity provider and, unless the provider
//! vouches for its own users, loads the matching account.

use crate::error::ApiError;
use crate::state::AppState;
use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use shop_core::{parse_bearer, ShopError, User, UserId};

/// The authenticated caller
#[derive(Debug, Clone)]
pub struct CurrentUser {
    /// Resolved user id
    pub id: UserId,
    /// Local account; `None` when the identity provider trusts its subject
    pub user: Option<User>,
}

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .ok_or_else(|| ShopError::unauthorized("missing authorization header"))?
            .to_str()
            .map_err(|_| ShopError::unauthorized("authorization header is not valid UTF-8"))?;
        let token = parse_bearer(header)?.to_string();

        let id = state.identity.resolve(&token).await?;

        if state.identity.trusts_subject() {
            return Ok(Self { id, user: None });
        }

        let user = state
            .db
            .users()
            .find_by_id(id)
            .await?
            .ok_or_else(|| ShopError::unauthorized(format!("no user with id {}", id)))?;

        Ok(Self {
            id,
            user: Some(user),
        })
    }
}
