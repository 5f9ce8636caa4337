//! # Access Tokens
//!
//! Issues and verifies signed, time-limited bearer tokens (HS256 JWT).
//! Tokens are stateless: nothing is persisted and there is no revocation.
//!
//! ```rust,ignore
//! let tokens = TokenService::new(&secret, Duration::minutes(15))?;
//! let token = tokens.issue("42", Some(Duration::minutes(30)))?;
//! let claims = tokens.verify(&token)?;
//! assert_eq!(claims.user_id()?, 42);
//! ```

use crate::error::{ShopError, ShopResult};
use crate::user::UserId;
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Lifetime used when the caller does not pass one
pub const DEFAULT_TOKEN_TTL_MINUTES: i64 = 15;

/// Token type reported to clients
pub const TOKEN_TYPE: &str = "bearer";

/// Claim set carried by an access token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the user id, as a string
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,
    /// Expiry (unix seconds)
    pub exp: i64,
    /// Issued at (unix seconds)
    #[serde(default)]
    pub iat: i64,
}

impl Claims {
    /// Parse the subject into a user id.
    ///
    /// A missing or non-numeric subject is unauthorized.
    pub fn user_id(&self) -> ShopResult<UserId> {
        let sub = self
            .sub
            .as_deref()
            .ok_or_else(|| ShopError::unauthorized("token has no subject"))?;

        sub.parse::<UserId>().map_err(|_| {
            ShopError::unauthorized(format!("token subject is not a user id: {}", sub))
        })
    }
}

/// Signs and verifies access tokens with a single symmetric secret
#[derive(Clone)]
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    default_ttl: Duration,
}

impl TokenService {
    /// Create a token service.
    ///
    /// The secret comes from configuration; an empty secret is rejected.
    pub fn new(secret: &str, default_ttl: Duration) -> ShopResult<Self> {
        if secret.is_empty() {
            return Err(ShopError::Configuration(
                "token signing secret must not be empty".to_string(),
            ));
        }

        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.validate_exp = true;
        validation.set_required_spec_claims(&["exp"]);

        Ok(Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            default_ttl,
        })
    }

    /// Create a token service with the 15 minute default lifetime
    pub fn with_default_ttl(secret: &str) -> ShopResult<Self> {
        Self::new(secret, Duration::minutes(DEFAULT_TOKEN_TTL_MINUTES))
    }

    /// Lifetime applied when `issue` gets no explicit TTL
    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    /// Issue a token for `subject` expiring `ttl` from now
    pub fn issue(&self, subject: impl Into<String>, ttl: Option<Duration>) -> ShopResult<String> {
        self.issue_at(subject, Utc::now(), ttl)
    }

    /// Issue a token as if the current time were `issued_at`.
    ///
    /// Identical subject, time, TTL and secret give an identical token.
    pub fn issue_at(
        &self,
        subject: impl Into<String>,
        issued_at: DateTime<Utc>,
        ttl: Option<Duration>,
    ) -> ShopResult<String> {
        let ttl = ttl.unwrap_or(self.default_ttl);
        let expires_at = issued_at.checked_add_signed(ttl).ok_or_else(|| {
            ShopError::InvalidRequest(format!("token lifetime out of range: {}", ttl))
        })?;
        let claims = Claims {
            sub: Some(subject.into()),
            exp: expires_at.timestamp(),
            iat: issued_at.timestamp(),
        };

        jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| ShopError::Internal(format!("Failed to sign token: {}", e)))
    }

    /// Verify signature, algorithm and expiry, returning the claims.
    ///
    /// A token is expired once `exp <= now`, so a zero TTL never validates.
    pub fn verify(&self, token: &str) -> ShopResult<Claims> {
        let data = jsonwebtoken::decode::<Claims>(token, &self.decoding, &self.validation)
            .map_err(|e| {
                let reason = match e.kind() {
                    ErrorKind::ExpiredSignature => "token expired".to_string(),
                    ErrorKind::InvalidSignature => "signature mismatch".to_string(),
                    ErrorKind::InvalidAlgorithm => "unexpected algorithm".to_string(),
                    _ => format!("malformed token: {}", e),
                };
                debug!("Token rejected: {}", reason);
                ShopError::unauthorized(reason)
            })?;

        if data.claims.exp <= Utc::now().timestamp() {
            debug!("Token rejected: token expired");
            return Err(ShopError::unauthorized("token expired"));
        }

        Ok(data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret-with-enough-bytes-for-hs256";

    fn service() -> TokenService {
        TokenService::with_default_ttl(SECRET).unwrap()
    }

    fn replace_first_char(segment: &str) -> String {
        let first = if segment.starts_with('A') { 'B' } else { 'A' };
        format!("{}{}", first, &segment[1..])
    }

    #[test]
    fn test_issue_and_verify() {
        let tokens = service();
        let token = tokens.issue("42", Some(Duration::minutes(30))).unwrap();

        let claims = tokens.verify(&token).unwrap();
        assert_eq!(claims.sub.as_deref(), Some("42"));
        assert_eq!(claims.user_id().unwrap(), 42);
        assert_eq!(claims.exp - claims.iat, 30 * 60);
    }

    #[test]
    fn test_default_ttl_is_fifteen_minutes() {
        let tokens = service();
        let token = tokens.issue("7", None).unwrap();
        let claims = tokens.verify(&token).unwrap();

        assert_eq!(claims.exp - claims.iat, 15 * 60);
        assert_eq!(tokens.default_ttl(), Duration::minutes(15));
    }

    #[test]
    fn test_deterministic_for_same_inputs() {
        let tokens = service();
        let at = Utc::now();
        let a = tokens.issue_at("1", at, None).unwrap();
        let b = tokens.issue_at("1", at, None).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_out_of_range_ttl_is_rejected() {
        let tokens = service();

        let err = tokens
            .issue("1", Some(Duration::days(100_000_000)))
            .unwrap_err();
        assert!(matches!(err, ShopError::InvalidRequest(_)));

        let err = tokens
            .issue_at("1", DateTime::<Utc>::MAX_UTC, Some(Duration::minutes(1)))
            .unwrap_err();
        assert!(matches!(err, ShopError::InvalidRequest(_)));
    }

    #[test]
    fn test_zero_ttl_is_expired() {
        let tokens = service();
        let token = tokens.issue("1", Some(Duration::zero())).unwrap();

        let err = tokens.verify(&token).unwrap_err();
        assert!(err.is_unauthorized());
    }

    #[test]
    fn test_past_expiry_is_rejected() {
        let tokens = service();
        let token = tokens
            .issue_at("1", Utc::now() - Duration::hours(2), Some(Duration::minutes(30)))
            .unwrap();

        match tokens.verify(&token).unwrap_err() {
            ShopError::Unauthorized { reason } => assert_eq!(reason, "token expired"),
            other => panic!("Expected Unauthorized, got {:?}", other),
        }
    }

    #[test]
    fn test_tampered_signature_is_rejected() {
        let tokens = service();
        let token = tokens.issue("1", None).unwrap();

        let parts: Vec<&str> = token.split('.').collect();
        assert_eq!(parts.len(), 3);
        let tampered = format!("{}.{}.{}", parts[0], parts[1], replace_first_char(parts[2]));

        assert!(tokens.verify(&tampered).unwrap_err().is_unauthorized());
    }

    #[test]
    fn test_foreign_subject_with_old_signature_is_rejected() {
        let tokens = service();
        let real = tokens.issue("1", None).unwrap();
        let forged = tokens.issue("2", None).unwrap();

        let real_parts: Vec<&str> = real.split('.').collect();
        let forged_parts: Vec<&str> = forged.split('.').collect();
        let spliced = format!("{}.{}.{}", real_parts[0], forged_parts[1], real_parts[2]);

        assert!(tokens.verify(&spliced).is_err());
    }

    #[test]
    fn test_wrong_secret_is_rejected() {
        let other = TokenService::with_default_ttl("a-completely-different-secret").unwrap();
        let token = other.issue("1", None).unwrap();

        assert!(service().verify(&token).unwrap_err().is_unauthorized());
    }

    #[test]
    fn test_malformed_token_is_rejected() {
        let tokens = service();
        assert!(tokens.verify("invalid.token.here").unwrap_err().is_unauthorized());
        assert!(tokens.verify("").unwrap_err().is_unauthorized());
    }

    #[test]
    fn test_empty_secret_is_configuration_error() {
        assert!(matches!(
            TokenService::with_default_ttl(""),
            Err(ShopError::Configuration(_))
        ));
    }

    #[test]
    fn test_subject_parsing() {
        let claims = Claims {
            sub: None,
            exp: 0,
            iat: 0,
        };
        assert!(claims.user_id().unwrap_err().is_unauthorized());

        let claims = Claims {
            sub: Some("alice".to_string()),
            exp: 0,
            iat: 0,
        };
        assert!(claims.user_id().unwrap_err().is_unauthorized());
    }
}
