//! # Remote Auth Configuration
//!
//! Where the authentication service lives and how long to wait for it.
//! Values come from the same environment lookup as the rest of the service
//! configuration.

use shop_core::ShopError;
use std::time::Duration;

/// Default path of the token verification endpoint
pub const DEFAULT_VERIFY_PATH: &str = "/verify";

/// Default request timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 5;

/// Remote authentication service configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteAuthConfig {
    /// Base URL of the auth service (e.g. `http://auth:8000`)
    pub base_url: String,

    /// Path of the verification endpoint
    pub verify_path: String,

    /// Per-request timeout
    pub timeout: Duration,
}

impl RemoteAuthConfig {
    /// Load configuration from a key/value source such as the process
    /// environment.
    ///
    /// Required keys:
    /// - `AUTH_SERVICE_URL`
    ///
    /// Optional:
    /// - `AUTH_SERVICE_VERIFY_PATH` (default `/verify`)
    /// - `AUTH_SERVICE_TIMEOUT_SECS` (default 5)
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ShopError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let base_url = lookup("AUTH_SERVICE_URL")
            .filter(|url| !url.is_empty())
            .ok_or_else(|| ShopError::Configuration("AUTH_SERVICE_URL not set".to_string()))?;

        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(ShopError::Configuration(
                "AUTH_SERVICE_URL must start with http:// or https://".to_string(),
            ));
        }

        let verify_path =
            lookup("AUTH_SERVICE_VERIFY_PATH").unwrap_or_else(|| DEFAULT_VERIFY_PATH.to_string());

        let timeout_secs = match lookup("AUTH_SERVICE_TIMEOUT_SECS") {
            Some(raw) => raw.parse::<u64>().map_err(|_| {
                ShopError::Configuration(format!(
                    "AUTH_SERVICE_TIMEOUT_SECS must be a whole number of seconds, got {}",
                    raw
                ))
            })?,
            None => DEFAULT_TIMEOUT_SECS,
        };

        Ok(Self::new(base_url)
            .with_verify_path(verify_path)
            .with_timeout(Duration::from_secs(timeout_secs)))
    }

    /// Create config with an explicit base URL and defaults for the rest
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            verify_path: DEFAULT_VERIFY_PATH.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    /// Builder: set the verification path
    pub fn with_verify_path(mut self, path: impl Into<String>) -> Self {
        let path = path.into();
        self.verify_path = if path.starts_with('/') {
            path
        } else {
            format!("/{}", path)
        };
        self
    }

    /// Builder: set the request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Full URL of the verification endpoint
    pub fn verify_url(&self) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), self.verify_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_verify_url() {
        let config = RemoteAuthConfig::new("http://auth:8000/");
        assert_eq!(config.verify_url(), "http://auth:8000/verify");

        let config = RemoteAuthConfig::new("http://auth:8000").with_verify_path("api/me");
        assert_eq!(config.verify_url(), "http://auth:8000/api/me");
    }

    #[test]
    fn test_defaults() {
        let config = RemoteAuthConfig::new("https://auth.example.com");
        assert_eq!(config.verify_path, DEFAULT_VERIFY_PATH);
        assert_eq!(config.timeout, Duration::from_secs(DEFAULT_TIMEOUT_SECS));
    }

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_from_lookup() {
        let config = RemoteAuthConfig::from_lookup(lookup_from(&[
            ("AUTH_SERVICE_URL", "http://auth:8000"),
            ("AUTH_SERVICE_VERIFY_PATH", "tokens/check"),
            ("AUTH_SERVICE_TIMEOUT_SECS", "2"),
        ]))
        .unwrap();

        assert_eq!(config.verify_url(), "http://auth:8000/tokens/check");
        assert_eq!(config.timeout, Duration::from_secs(2));

        let config =
            RemoteAuthConfig::from_lookup(lookup_from(&[("AUTH_SERVICE_URL", "https://auth")]))
                .unwrap();
        assert_eq!(config, RemoteAuthConfig::new("https://auth"));
    }

    #[test]
    fn test_missing_url() {
        let result = RemoteAuthConfig::from_lookup(lookup_from(&[]));
        assert!(matches!(result, Err(ShopError::Configuration(_))));

        let result = RemoteAuthConfig::from_lookup(lookup_from(&[("AUTH_SERVICE_URL", "")]));
        assert!(matches!(result, Err(ShopError::Configuration(_))));
    }

    #[test]
    fn test_url_scheme_is_checked() {
        for url in ["auth:8000", "ftp://auth", "//auth:8000"] {
            let result = RemoteAuthConfig::from_lookup(lookup_from(&[("AUTH_SERVICE_URL", url)]));
            match result {
                Err(ShopError::Configuration(message)) => assert!(message.contains("http://")),
                other => panic!("accepted {}: {:?}", url, other),
            }
        }
    }

    #[test]
    fn test_invalid_timeout() {
        for raw in ["soon", "-1", "2.5"] {
            let result = RemoteAuthConfig::from_lookup(lookup_from(&[
                ("AUTH_SERVICE_URL", "http://auth:8000"),
                ("AUTH_SERVICE_TIMEOUT_SECS", raw),
            ]));
            match result {
                Err(ShopError::Configuration(message)) => {
                    assert!(message.contains("AUTH_SERVICE_TIMEOUT_SECS"))
                }
                other => panic!("accepted {}: {:?}", raw, other),
            }
        }
    }
}
