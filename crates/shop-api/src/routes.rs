//! # Routes
//!
//! Axum router configuration for the shop API.

use crate::handlers;
use crate::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

/// Create the main application router
///
/// Routes:
/// - Public:
///   - POST /login - Exchange name and password for a token
///   - POST /register - Create an account
///
/// - Bearer token required:
///   - GET  /users/ - List users
///   - GET  /users/me - Caller's account
///   - GET  /products/ - List products
///   - POST /products/ - Create product
///
/// Collection routes answer with and without the trailing slash.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Health check at root
        .route("/health", get(handlers::health))
        .route("/", get(handlers::health))
        // Accounts
        .route("/login", post(handlers::login))
        .route("/register", post(handlers::register))
        .route("/users", get(handlers::list_users))
        .route("/users/", get(handlers::list_users))
        .route("/users/me", get(handlers::me))
        // Catalog
        .route(
            "/products",
            get(handlers::list_products).post(handlers::create_product),
        )
        .route(
            "/products/",
            get(handlers::list_products).post(handlers::create_product),
        )
        // Middleware
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}
