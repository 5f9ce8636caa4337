//! # shop-core
//!
//! Core types and authentication primitives for the shopfront backend.
//!
//! This crate provides:
//! - `PasswordHasher` for bcrypt password storage
//! - `TokenService` for signed, time-limited access tokens
//! - `IdentityProvider` trait for resolving bearer tokens to users
//! - `User`, `Product` and the basket/order schemas
//! - `ShopError` for typed error handling
//!
//! ## Example
//!
//! ```rust,ignore
//! use shop_core::{PasswordHasher, TokenService, JwtIdentityProvider, IdentityProvider};
//!
//! let hasher = PasswordHasher::new(12)?;
//! let hash = hasher.hash("p1")?;
//! assert!(hasher.verify("p1", &hash));
//!
//! let tokens = TokenService::with_default_ttl(&secret)?;
//! let token = tokens.issue(user.id.to_string(), None)?;
//!
//! let provider = JwtIdentityProvider::new(tokens);
//! let user_id = provider.resolve(&token).await?;
//! ```

pub mod credentials;
pub mod error;
pub mod identity;
pub mod order;
pub mod product;
pub mod token;
pub mod user;

// Re-exports for convenience
pub use credentials::PasswordHasher;
pub use error::{ShopError, ShopResult, UNAUTHORIZED_MESSAGE};
pub use identity::{parse_bearer, BoxedIdentityProvider, IdentityProvider, JwtIdentityProvider};
pub use order::{BasketItem, BasketItemCreate, Order, OrderCreate, OrderItem, OrderItemCreate};
pub use product::{NewProduct, Product, ProductCreate, ProductId};
pub use token::{Claims, TokenService, DEFAULT_TOKEN_TTL_MINUTES, TOKEN_TYPE};
pub use user::{TokenResponse, User, UserCreate, UserId, UserLogin, UserOut};
