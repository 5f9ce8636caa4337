//! # Application State
//!
//! Shared state for the Axum application.
//! Contains configuration, the database pool, token and password services,
//! and the identity provider used by protected routes.

use crate::db::Database;
use chrono::Duration;
use shop_core::{
    BoxedIdentityProvider, JwtIdentityProvider, PasswordHasher, ShopError, ShopResult,
    TokenService,
};
use shop_identity::{RemoteAuthConfig, RemoteIdentityProvider};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use tracing::info;

/// SQLite database used when `LOCAL=true`
pub const LOCAL_DATABASE_URL: &str = "sqlite://./shop.db?mode=rwc";

/// Minimum signing secret length in production
const MIN_PRODUCTION_SECRET_LEN: usize = 32;

/// Longest accepted login token lifetime (one year)
pub const MAX_TOKEN_TTL_MINUTES: i64 = 60 * 24 * 365;

/// Where bearer tokens are verified
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMode {
    /// Tokens signed and verified by this service
    Local,
    /// Tokens verified by the external auth service
    Remote,
}

impl FromStr for AuthMode {
    type Err = ShopError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "local" => Ok(AuthMode::Local),
            "remote" => Ok(AuthMode::Remote),
            other => Err(ShopError::Configuration(format!(
                "AUTH_MODE must be 'local' or 'remote', got '{}'",
                other
            ))),
        }
    }
}

/// Application configuration
#[derive(Clone)]
pub struct AppConfig {
    /// Host to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
    /// Environment (development, staging, production)
    pub environment: String,
    /// Database connection URL
    pub database_url: String,
    /// Pool size
    pub database_max_connections: u32,
    /// Token signing secret
    pub jwt_secret: String,
    /// Lifetime of tokens issued at login
    pub access_token_expire_minutes: i64,
    /// bcrypt work factor
    pub bcrypt_cost: u32,
    /// Token verification mode
    pub auth_mode: AuthMode,
    /// Auth service settings, present in remote mode
    pub remote_auth: Option<RemoteAuthConfig>,
    /// Answer `/users/me` with a placeholder when a remotely verified user
    /// has no local row
    pub me_placeholder_fallback: bool,
}

impl AppConfig {
    /// Load from environment variables (and `.env` if present)
    pub fn from_env() -> ShopResult<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load from an arbitrary key/value source
    pub fn from_lookup<F>(lookup: F) -> ShopResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let environment = lookup("ENVIRONMENT").unwrap_or_else(|| "development".to_string());
        let is_production = environment == "production";

        let jwt_secret = lookup("JWT_SECRET")
            .filter(|s| !s.is_empty())
            .ok_or_else(|| ShopError::Configuration("JWT_SECRET not set".to_string()))?;
        if is_production && jwt_secret.len() < MIN_PRODUCTION_SECRET_LEN {
            return Err(ShopError::Configuration(format!(
                "JWT_SECRET must be at least {} bytes in production",
                MIN_PRODUCTION_SECRET_LEN
            )));
        }

        let access_token_expire_minutes: i64 = parse_or(
            "ACCESS_TOKEN_EXPIRE_MINUTES",
            lookup("ACCESS_TOKEN_EXPIRE_MINUTES"),
            30,
        )?;
        if !(1..=MAX_TOKEN_TTL_MINUTES).contains(&access_token_expire_minutes) {
            return Err(ShopError::Configuration(format!(
                "ACCESS_TOKEN_EXPIRE_MINUTES must be between 1 and {}, got {}",
                MAX_TOKEN_TTL_MINUTES, access_token_expire_minutes
            )));
        }

        let auth_mode = lookup("AUTH_MODE")
            .map(|m| m.parse::<AuthMode>())
            .transpose()?
            .unwrap_or(AuthMode::Local);
        let remote_auth = match auth_mode {
            AuthMode::Local => None,
            AuthMode::Remote => Some(RemoteAuthConfig::from_lookup(&lookup)?),
        };

        Ok(Self {
            host: lookup("HOST").unwrap_or_else(|| "127.0.0.1".to_string()),
            port: parse_or("PORT", lookup("PORT"), 8080)?,
            environment,
            database_url: database_url(&lookup)?,
            database_max_connections: parse_or(
                "DATABASE_MAX_CONNECTIONS",
                lookup("DATABASE_MAX_CONNECTIONS"),
                10,
            )?,
            jwt_secret,
            access_token_expire_minutes,
            bcrypt_cost: parse_or("BCRYPT_COST", lookup("BCRYPT_COST"), bcrypt_default_cost())?,
            auth_mode,
            remote_auth,
            me_placeholder_fallback: lookup("ME_PLACEHOLDER_FALLBACK")
                .map(|v| v == "true" || v == "1")
                .unwrap_or(false),
        })
    }

    /// Get the socket address to bind to
    pub fn socket_addr(&self) -> ShopResult<std::net::SocketAddr> {
        format!("{}:{}", self.host, self.port).parse().map_err(|_| {
            ShopError::Configuration(format!("Invalid socket address {}:{}", self.host, self.port))
        })
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// Lifetime of tokens issued at login
    pub fn token_ttl(&self) -> ShopResult<Duration> {
        Duration::try_minutes(self.access_token_expire_minutes)
            .filter(|ttl| *ttl > Duration::zero())
            .ok_or_else(|| {
                ShopError::Configuration(format!(
                    "invalid token lifetime: {} minutes",
                    self.access_token_expire_minutes
                ))
            })
    }
}

impl fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("environment", &self.environment)
            .field("database_url", &redact_url(&self.database_url))
            .field("database_max_connections", &self.database_max_connections)
            .field("jwt_secret", &"<redacted>")
            .field("access_token_expire_minutes", &self.access_token_expire_minutes)
            .field("bcrypt_cost", &self.bcrypt_cost)
            .field("auth_mode", &self.auth_mode)
            .field("remote_auth", &self.remote_auth)
            .field("me_placeholder_fallback", &self.me_placeholder_fallback)
            .finish()
    }
}

fn bcrypt_default_cost() -> u32 {
    PasswordHasher::default().cost()
}

fn parse_or<T: FromStr>(key: &str, raw: Option<String>, default: T) -> ShopResult<T> {
    match raw {
        Some(value) => value.parse().map_err(|_| {
            ShopError::Configuration(format!("{} has an invalid value: {}", key, value))
        }),
        None => Ok(default),
    }
}

/// `DATABASE_URL`, else the local SQLite file when `LOCAL=true`, else a
/// PostgreSQL URL assembled from `POSTGRES_*`
fn database_url<F>(lookup: &F) -> ShopResult<String>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(url) = lookup("DATABASE_URL") {
        return Ok(url);
    }

    if lookup("LOCAL").as_deref() == Some("true") {
        return Ok(LOCAL_DATABASE_URL.to_string());
    }

    let keys = [
        "POSTGRES_USER",
        "POSTGRES_PASSWORD",
        "POSTGRES_HOST",
        "POSTGRES_PORT",
        "POSTGRES_DB",
    ];
    let missing: Vec<&str> = keys.iter().copied().filter(|k| lookup(*k).is_none()).collect();
    if !missing.is_empty() {
        return Err(ShopError::Configuration(format!(
            "set LOCAL=true, DATABASE_URL, or {}",
            missing.join(", ")
        )));
    }

    let value = |key: &str| lookup(key).unwrap_or_default();
    Ok(format!(
        "postgresql://{}:{}@{}:{}/{}",
        value("POSTGRES_USER"),
        value("POSTGRES_PASSWORD"),
        value("POSTGRES_HOST"),
        value("POSTGRES_PORT"),
        value("POSTGRES_DB"),
    ))
}

/// Hide the password part of a connection URL
fn redact_url(url: &str) -> String {
    match (url.find("://"), url.rfind('@')) {
        (Some(scheme_end), Some(at)) if at > scheme_end => {
            let credentials = &url[scheme_end + 3..at];
            match credentials.split_once(':') {
                Some((user, _)) => format!("{}{}:***{}", &url[..scheme_end + 3], user, &url[at..]),
                None => url.to_string(),
            }
        }
        _ => url.to_string(),
    }
}

fn default_identity(
    config: &AppConfig,
    tokens: &TokenService,
) -> ShopResult<BoxedIdentityProvider> {
    match (config.auth_mode, &config.remote_auth) {
        (AuthMode::Local, _) => Ok(Arc::new(JwtIdentityProvider::new(tokens.clone()))),
        (AuthMode::Remote, Some(remote)) => {
            Ok(Arc::new(RemoteIdentityProvider::new(remote.clone())?))
        }
        (AuthMode::Remote, None) => Err(ShopError::Configuration(
            "AUTH_MODE=remote requires AUTH_SERVICE_URL".to_string(),
        )),
    }
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Application config
    pub config: AppConfig,
    /// Database pool
    pub db: Database,
    /// Access token signer/verifier
    pub tokens: TokenService,
    /// Password hasher
    pub passwords: PasswordHasher,
    /// Resolves bearer tokens on protected routes
    pub identity: BoxedIdentityProvider,
}

impl AppState {
    /// Connect to the configured database and build the state
    pub async fn from_config(config: AppConfig) -> anyhow::Result<Self> {
        let db = Database::connect(&config.database_url, config.database_max_connections).await?;
        db.create_schema().await?;
        info!("Database schema ready");

        Ok(Self::from_parts(config, db, None)?)
    }

    /// Assemble state from an open database.
    ///
    /// Without an explicit identity provider one is chosen by `auth_mode`.
    pub fn from_parts(
        config: AppConfig,
        db: Database,
        identity: Option<BoxedIdentityProvider>,
    ) -> ShopResult<Self> {
        let tokens = TokenService::new(&config.jwt_secret, config.token_ttl()?)?;
        let passwords = PasswordHasher::new(config.bcrypt_cost)?;
        let identity = match identity {
            Some(identity) => identity,
            None => default_identity(&config, &tokens)?,
        };

        Ok(Self {
            config,
            db,
            tokens,
            passwords,
            identity,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_app_config_defaults() {
        let config =
            AppConfig::from_lookup(lookup_from(&[("JWT_SECRET", "s3cret"), ("LOCAL", "true")]))
                .unwrap();

        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 8080);
        assert_eq!(config.database_url, LOCAL_DATABASE_URL);
        assert_eq!(config.access_token_expire_minutes, 30);
        assert_eq!(config.token_ttl().unwrap(), Duration::minutes(30));
        assert_eq!(config.bcrypt_cost, 12);
        assert_eq!(config.auth_mode, AuthMode::Local);
        assert!(!config.me_placeholder_fallback);
        assert!(!config.is_production());
    }

    #[test]
    fn test_postgres_url_from_parts() {
        let config = AppConfig::from_lookup(lookup_from(&[
            ("JWT_SECRET", "s3cret"),
            ("POSTGRES_USER", "shop"),
            ("POSTGRES_PASSWORD", "pw"),
            ("POSTGRES_HOST", "db"),
            ("POSTGRES_PORT", "5432"),
            ("POSTGRES_DB", "shop"),
        ]))
        .unwrap();

        assert_eq!(config.database_url, "postgresql://shop:pw@db:5432/shop");
        assert!(!format!("{:?}", config).contains(":pw@"));
    }

    #[test]
    fn test_missing_database_settings() {
        let err = AppConfig::from_lookup(lookup_from(&[
            ("JWT_SECRET", "s3cret"),
            ("POSTGRES_USER", "shop"),
        ]))
        .unwrap_err();

        let message = err.to_string();
        assert!(message.contains("POSTGRES_HOST"));
        assert!(!message.contains("POSTGRES_USER"));
    }

    #[test]
    fn test_database_url_overrides_local() {
        let config = AppConfig::from_lookup(lookup_from(&[
            ("JWT_SECRET", "s3cret"),
            ("LOCAL", "true"),
            ("DATABASE_URL", "sqlite::memory:"),
        ]))
        .unwrap();
        assert_eq!(config.database_url, "sqlite::memory:");
    }

    #[test]
    fn test_secret_is_required() {
        let result = AppConfig::from_lookup(lookup_from(&[("LOCAL", "true")]));
        assert!(matches!(result, Err(ShopError::Configuration(_))));

        let result = AppConfig::from_lookup(lookup_from(&[("LOCAL", "true"), ("JWT_SECRET", "")]));
        assert!(result.is_err());
    }

    #[test]
    fn test_production_requires_long_secret() {
        let result = AppConfig::from_lookup(lookup_from(&[
            ("LOCAL", "true"),
            ("ENVIRONMENT", "production"),
            ("JWT_SECRET", "short"),
        ]));
        assert!(result.is_err());

        let secret = "x".repeat(32);
        let config = AppConfig::from_lookup(lookup_from(&[
            ("LOCAL", "true"),
            ("ENVIRONMENT", "production"),
            ("JWT_SECRET", secret.as_str()),
        ]))
        .unwrap();
        assert!(config.is_production());
        assert!(!format!("{:?}", config).contains(&secret));
    }

    #[test]
    fn test_auth_mode_parsing() {
        assert_eq!("remote".parse::<AuthMode>().unwrap(), AuthMode::Remote);
        assert_eq!("LOCAL".parse::<AuthMode>().unwrap(), AuthMode::Local);
        assert!("oauth".parse::<AuthMode>().is_err());

        let config = AppConfig::from_lookup(lookup_from(&[
            ("JWT_SECRET", "s3cret"),
            ("LOCAL", "true"),
            ("AUTH_MODE", "remote"),
            ("AUTH_SERVICE_URL", "http://auth:8000"),
            ("ME_PLACEHOLDER_FALLBACK", "true"),
        ]))
        .unwrap();
        assert_eq!(config.auth_mode, AuthMode::Remote);
        assert_eq!(
            config.remote_auth.as_ref().unwrap().verify_url(),
            "http://auth:8000/verify"
        );
        assert!(config.me_placeholder_fallback);
    }

    #[test]
    fn test_remote_mode_requires_valid_auth_service() {
        let result = AppConfig::from_lookup(lookup_from(&[
            ("JWT_SECRET", "s3cret"),
            ("LOCAL", "true"),
            ("AUTH_MODE", "remote"),
        ]));
        assert!(matches!(result, Err(ShopError::Configuration(_))));

        let result = AppConfig::from_lookup(lookup_from(&[
            ("JWT_SECRET", "s3cret"),
            ("LOCAL", "true"),
            ("AUTH_MODE", "remote"),
            ("AUTH_SERVICE_URL", "auth:8000"),
        ]));
        assert!(matches!(result, Err(ShopError::Configuration(_))));

        let result = AppConfig::from_lookup(lookup_from(&[
            ("JWT_SECRET", "s3cret"),
            ("LOCAL", "true"),
            ("AUTH_MODE", "remote"),
            ("AUTH_SERVICE_URL", "http://auth:8000"),
            ("AUTH_SERVICE_TIMEOUT_SECS", "soon"),
        ]));
        assert!(matches!(result, Err(ShopError::Configuration(_))));
    }

    #[tokio::test]
    async fn test_state_selects_identity_provider() {
        let local = AppConfig::from_lookup(lookup_from(&[
            ("JWT_SECRET", "s3cret"),
            ("LOCAL", "true"),
            ("BCRYPT_COST", "4"),
        ]))
        .unwrap();
        let db = Database::in_memory().await.unwrap();
        let state = AppState::from_parts(local, db, None).unwrap();
        assert_eq!(state.identity.provider_name(), "jwt");

        let remote = AppConfig::from_lookup(lookup_from(&[
            ("JWT_SECRET", "s3cret"),
            ("LOCAL", "true"),
            ("BCRYPT_COST", "4"),
            ("AUTH_MODE", "remote"),
            ("AUTH_SERVICE_URL", "http://auth:8000"),
        ]))
        .unwrap();
        let db = Database::in_memory().await.unwrap();
        let state = AppState::from_parts(remote.clone(), db, None).unwrap();
        assert_eq!(state.identity.provider_name(), "remote");
        assert!(state.identity.trusts_subject());

        let mut broken = remote;
        broken.remote_auth = None;
        let result = AppState::from_parts(broken, Database::in_memory().await.unwrap(), None);
        assert!(matches!(result, Err(ShopError::Configuration(_))));
    }

    #[test]
    fn test_invalid_numbers_are_rejected() {
        let result = AppConfig::from_lookup(lookup_from(&[
            ("JWT_SECRET", "s3cret"),
            ("LOCAL", "true"),
            ("PORT", "eighty"),
        ]));
        assert!(result.is_err());
    }

    #[test]
    fn test_token_lifetime_bounds() {
        for bad in ["0", "-5", "525601", "150000000000", "200000000000000"] {
            let result = AppConfig::from_lookup(lookup_from(&[
                ("JWT_SECRET", "s3cret"),
                ("LOCAL", "true"),
                ("ACCESS_TOKEN_EXPIRE_MINUTES", bad),
            ]));
            assert!(
                matches!(result, Err(ShopError::Configuration(_))),
                "accepted {}",
                bad
            );
        }

        let mut config = AppConfig::from_lookup(lookup_from(&[
            ("JWT_SECRET", "s3cret"),
            ("LOCAL", "true"),
            ("ACCESS_TOKEN_EXPIRE_MINUTES", "525600"),
        ]))
        .unwrap();
        assert_eq!(config.token_ttl().unwrap(), Duration::minutes(525_600));

        config.access_token_expire_minutes = 200_000_000_000_000;
        assert!(config.token_ttl().is_err());
        config.access_token_expire_minutes = -5;
        assert!(config.token_ttl().is_err());
    }

    #[test]
    fn test_socket_addr() {
        let mut config =
            AppConfig::from_lookup(lookup_from(&[("JWT_SECRET", "s3cret"), ("LOCAL", "true")]))
                .unwrap();
        config.host = "0.0.0.0".to_string();
        config.port = 3000;

        let addr = config.socket_addr().unwrap();
        assert_eq!(addr.to_string(), "0.0.0.0:3000");
    }

    #[test]
    fn test_redact_url() {
        assert_eq!(
            redact_url("postgresql://shop:pw@db:5432/shop"),
            "postgresql://shop:***@db:5432/shop"
        );
        assert_eq!(redact_url(LOCAL_DATABASE_URL), LOCAL_DATABASE_URL);
    }
}
