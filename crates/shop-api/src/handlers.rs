//! # Request Handlers
//!
//! Axum request handlers for accounts and the product catalog.

use crate::error::ApiError;
use crate::extract::CurrentUser;
use crate::state::AppState;
use axum::{extract::State, response::IntoResponse, Json};
use shop_core::{Product, ProductCreate, ShopError, TokenResponse, UserCreate, UserLogin, UserOut};
use tokio::task;
use tracing::{info, instrument, warn};

type ApiResult<T> = Result<Json<T>, ApiError>;

// =============================================================================
// Health
// =============================================================================

/// Health check endpoint
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let (status, database) = if state.db.ping().await {
        ("healthy", "ok")
    } else {
        ("degraded", "unavailable")
    };

    Json(serde_json::json!({
        "status": status,
        "service": "shopfront",
        "version": env!("CARGO_PKG_VERSION"),
        "database": database
    }))
}

// =============================================================================
// Accounts
// =============================================================================

/// Exchange name and password for an access token
#[instrument(skip(state, request), fields(name = %request.name))]
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<UserLogin>,
) -> ApiResult<TokenResponse> {
    let user = match state.db.users().find_by_name(&request.name).await? {
        Some(user) => user,
        None => {
            warn!("Login for unknown user");
            return Err(ShopError::InvalidCredentials.into());
        }
    };

    let passwords = state.passwords;
    let hash = user.password_hash.clone();
    let valid = task::spawn_blocking(move || passwords.verify(&request.password, &hash))
        .await
        .map_err(|e| ShopError::Internal(format!("password check failed: {}", e)))?;

    if !valid {
        warn!(user_id = user.id, "Login with wrong password");
        return Err(ShopError::InvalidCredentials.into());
    }

    // The token service defaults to ACCESS_TOKEN_EXPIRE_MINUTES
    let token = state.tokens.issue(user.id.to_string(), None)?;

    info!(user_id = user.id, "Issued access token");
    Ok(Json(TokenResponse::bearer(token)))
}

/// Create an account
#[instrument(skip(state, request), fields(name = %request.name))]
pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<UserCreate>,
) -> ApiResult<UserOut> {
    let users = state.db.users();

    if users.find_by_email(&request.email).await?.is_some() {
        return Err(ShopError::EmailAlreadyRegistered.into());
    }

    let passwords = state.passwords;
    let password = request.password;
    let hash = task::spawn_blocking(move || passwords.hash(&password))
        .await
        .map_err(|e| ShopError::Internal(format!("password hashing failed: {}", e)))??;

    let user = users.create(&request.name, &request.email, &hash).await?;

    info!(user_id = user.id, "Registered user");
    Ok(Json(user.to_public()))
}

/// List all users
pub async fn list_users(
    _caller: CurrentUser,
    State(state): State<AppState>,
) -> ApiResult<Vec<UserOut>> {
    Ok(Json(state.db.users().list().await?))
}

/// The caller's own account
pub async fn me(caller: CurrentUser, State(state): State<AppState>) -> ApiResult<UserOut> {
    if let Some(user) = caller.user {
        return Ok(Json(user.to_public()));
    }

    match state.db.users().find_by_id(caller.id).await? {
        Some(user) => Ok(Json(user.to_public())),
        None if state.config.me_placeholder_fallback => {
            Ok(Json(UserOut::placeholder(caller.id)))
        }
        None => {
            Err(ShopError::unauthorized(format!("no local user with id {}", caller.id)).into())
        }
    }
}

// =============================================================================
// Products
// =============================================================================

/// Add a product to the catalog
#[instrument(skip(state, request, caller), fields(user_id = caller.id, name = %request.name))]
pub async fn create_product(
    caller: CurrentUser,
    State(state): State<AppState>,
    Json(request): Json<ProductCreate>,
) -> ApiResult<Product> {
    let product = request.validate()?;
    let created = state.db.products().create(&product).await?;

    info!(product_id = created.id, "Created product");
    Ok(Json(created))
}

/// List all products
pub async fn list_products(
    _caller: CurrentUser,
    State(state): State<AppState>,
) -> ApiResult<Vec<Product>> {
    Ok(Json(state.db.products().list().await?))
}
