//! # Database
//!
//! Connection pool, schema bootstrap and repositories.
//!
//! The same queries run against SQLite (local development, tests) and
//! PostgreSQL through sqlx's `Any` driver. Only the DDL differs per backend.
//!
//! ## Tables
//!
//! - `users` - accounts (`email` unique, `password` holds a bcrypt hash)
//! - `products` - catalog (`price_cents` in the smallest currency unit)

pub mod products;
pub mod users;

pub use products::ProductRepository;
pub use users::UserRepository;

use shop_core::{ShopError, ShopResult};
use sqlx::any::AnyPoolOptions;
use sqlx::AnyPool;
use std::time::Duration;
use tracing::{error, info};

/// Database engine behind a connection URL
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatabaseBackend {
    Sqlite,
    Postgres,
}

impl DatabaseBackend {
    /// Detect the backend from a connection URL
    pub fn from_url(url: &str) -> ShopResult<Self> {
        if url.starts_with("sqlite:") {
            Ok(DatabaseBackend::Sqlite)
        } else if url.starts_with("postgres://") || url.starts_with("postgresql://") {
            Ok(DatabaseBackend::Postgres)
        } else {
            Err(ShopError::Configuration(format!(
                "unsupported database URL scheme: {}",
                url.split(':').next().unwrap_or_default()
            )))
        }
    }

    fn schema(&self) -> &'static [&'static str] {
        match self {
            DatabaseBackend::Sqlite => &[
                r#"
                CREATE TABLE IF NOT EXISTS users (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    name TEXT NOT NULL,
                    email TEXT NOT NULL UNIQUE,
                    password TEXT NOT NULL
                )
                "#,
                "CREATE INDEX IF NOT EXISTS idx_users_name ON users (name)",
                r#"
                CREATE TABLE IF NOT EXISTS products (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    name TEXT NOT NULL,
                    description TEXT,
                    price_cents INTEGER NOT NULL CHECK (price_cents >= 0),
                    stock INTEGER NOT NULL CHECK (stock >= 0)
                )
                "#,
            ],
            DatabaseBackend::Postgres => &[
                r#"
                CREATE TABLE IF NOT EXISTS users (
                    id BIGSERIAL PRIMARY KEY,
                    name TEXT NOT NULL,
                    email TEXT NOT NULL UNIQUE,
                    password TEXT NOT NULL
                )
                "#,
                "CREATE INDEX IF NOT EXISTS idx_users_name ON users (name)",
                r#"
                CREATE TABLE IF NOT EXISTS products (
                    id BIGSERIAL PRIMARY KEY,
                    name TEXT NOT NULL,
                    description TEXT,
                    price_cents BIGINT NOT NULL CHECK (price_cents >= 0),
                    stock BIGINT NOT NULL CHECK (stock >= 0)
                )
                "#,
            ],
        }
    }
}

/// Pooled database handle shared by all requests
#[derive(Debug, Clone)]
pub struct Database {
    pool: AnyPool,
    backend: DatabaseBackend,
}

impl Database {
    /// Connect a pool to `url`
    pub async fn connect(url: &str, max_connections: u32) -> ShopResult<Self> {
        sqlx::any::install_default_drivers();
        let backend = DatabaseBackend::from_url(url)?;

        let pool = AnyPoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(Duration::from_secs(10))
            .connect(url)
            .await
            .map_err(|e| {
                ShopError::Configuration(format!("Failed to connect to database: {}", e))
            })?;

        info!("Connected to {:?} database", backend);
        Ok(Self { pool, backend })
    }

    /// Private in-memory SQLite database.
    ///
    /// Held on a single connection that never expires, so the data lives as
    /// long as the pool.
    pub async fn in_memory() -> ShopResult<Self> {
        sqlx::any::install_default_drivers();

        let pool = AnyPoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await
            .map_err(|e| {
                ShopError::Configuration(format!("Failed to open in-memory database: {}", e))
            })?;

        Ok(Self {
            pool,
            backend: DatabaseBackend::Sqlite,
        })
    }

    /// Create tables that do not exist yet
    pub async fn create_schema(&self) -> ShopResult<()> {
        for statement in self.backend.schema() {
            sqlx::query(*statement)
                .execute(&self.pool)
                .await
                .map_err(database_error)?;
        }
        Ok(())
    }

    /// Round-trip a trivial query
    pub async fn ping(&self) -> bool {
        sqlx::query("SELECT 1").execute(&self.pool).await.is_ok()
    }

    /// Close every connection; later queries fail
    pub async fn close(&self) {
        self.pool.close().await;
    }

    pub fn backend(&self) -> DatabaseBackend {
        self.backend
    }

    pub fn users(&self) -> UserRepository<'_> {
        UserRepository::new(&self.pool)
    }

    pub fn products(&self) -> ProductRepository<'_> {
        ProductRepository::new(&self.pool)
    }
}

/// Map a sqlx failure to a 500, logging the detail
pub(crate) fn database_error(e: sqlx::Error) -> ShopError {
    error!("Database query failed: {}", e);
    ShopError::Database(e.to_string())
}
