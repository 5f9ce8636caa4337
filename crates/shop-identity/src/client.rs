//! # Remote Identity Provider
//!
//! Delegates bearer token verification to an external authentication
//! service. The caller's token is forwarded as-is; a `200` response carrying
//! `{"user_id": <id>}` means the token is valid.

use crate::config::RemoteAuthConfig;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use shop_core::{IdentityProvider, ShopError, ShopResult, UserId};
use tracing::{debug, instrument, warn};

/// Identity provider backed by the remote auth service
pub struct RemoteIdentityProvider {
    config: RemoteAuthConfig,
    client: Client,
}

impl RemoteIdentityProvider {
    /// Create a provider with its own HTTP client
    pub fn new(config: RemoteAuthConfig) -> ShopResult<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| {
                ShopError::Configuration(format!("Failed to create HTTP client: {}", e))
            })?;

        Ok(Self { config, client })
    }
}

#[async_trait]
impl IdentityProvider for RemoteIdentityProvider {
    #[instrument(skip(self, token))]
    async fn resolve(&self, token: &str) -> ShopResult<UserId> {
        let url = self.config.verify_url();

        let response = self
            .client
            .get(&url)
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| {
                warn!("Auth service unreachable: {}", e);
                ShopError::unauthorized(format!("auth service request failed: {}", e))
            })?;

        let status = response.status();
        if !status.is_success() {
            debug!("Auth service rejected token: status={}", status);
            return Err(ShopError::unauthorized(format!(
                "auth service returned {}",
                status
            )));
        }

        let body: VerifyResponse = response.json().await.map_err(|e| {
            warn!("Auth service sent an unreadable body: {}", e);
            ShopError::unauthorized(format!("auth service response unreadable: {}", e))
        })?;

        debug!("Auth service resolved user_id={}", body.user_id);
        Ok(body.user_id)
    }

    fn provider_name(&self) -> &'static str {
        "remote"
    }

    fn trusts_subject(&self) -> bool {
        true
    }
}

// =============================================================================
// Auth Service API Types
// =============================================================================

#[derive(Debug, Deserialize)]
struct VerifyResponse {
    user_id: UserId,
}
