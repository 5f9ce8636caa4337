//! # Credential Store
//!
//! Salted, adaptive password hashing backed by bcrypt.
//! Plaintext passwords only ever pass through `hash` and `verify`.

use crate::error::{ShopError, ShopResult};

/// Lowest cost bcrypt accepts
pub const MIN_COST: u32 = 4;

/// Highest cost bcrypt accepts
pub const MAX_COST: u32 = 31;

/// bcrypt password hasher with a fixed work factor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PasswordHasher {
    cost: u32,
}

impl PasswordHasher {
    /// Create a hasher with the given bcrypt cost.
    ///
    /// Returns a configuration error when the cost is outside `4..=31`.
    pub fn new(cost: u32) -> ShopResult<Self> {
        if !(MIN_COST..=MAX_COST).contains(&cost) {
            return Err(ShopError::Configuration(format!(
                "bcrypt cost must be between {} and {}, got {}",
                MIN_COST, MAX_COST, cost
            )));
        }
        Ok(Self { cost })
    }

    /// Work factor used for new hashes
    pub fn cost(&self) -> u32 {
        self.cost
    }

    /// Hash a password with a fresh random salt.
    ///
    /// Hashing the same input twice yields two different strings.
    pub fn hash(&self, password: &str) -> ShopResult<String> {
        bcrypt::hash(password, self.cost)
            .map_err(|e| ShopError::Internal(format!("Failed to hash password: {}", e)))
    }

    /// Check a plaintext password against a stored hash.
    ///
    /// The cost and salt come from the hash itself. A malformed hash is
    /// treated as a mismatch.
    pub fn verify(&self, password: &str, hash: &str) -> bool {
        match bcrypt::verify(password, hash) {
            Ok(matches) => matches,
            Err(e) => {
                tracing::debug!("Password hash could not be checked: {}", e);
                false
            }
        }
    }
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self {
            cost: bcrypt::DEFAULT_COST,
        }
    }
}
