//! # shop-api
//!
//! HTTP API layer for shopfront-rs.
//!
//! This crate provides:
//! - Axum-based HTTP server
//! - Account registration and login
//! - Bearer-token protected user and product endpoints
//! - SQL persistence for SQLite and PostgreSQL
//!
//! ## Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | GET | `/health` | Health check |
//! | POST | `/register` | Create account |
//! | POST | `/login` | Issue access token |
//! | GET | `/users/` | List users (token) |
//! | GET | `/users/me` | Caller's account (token) |
//! | GET | `/products/` | List products (token) |
//! | POST | `/products/` | Create product (token) |

pub mod db;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod routes;
pub mod state;

pub use error::{ApiError, ErrorResponse};
pub use extract::CurrentUser;
pub use routes::create_router;
pub use state::{AppConfig, AppState, AuthMode};
