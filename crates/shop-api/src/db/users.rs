//! User repository.

use super::database_error;
use shop_core::{ShopError, ShopResult, User, UserId, UserOut};
use sqlx::AnyPool;

#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: i64,
    name: String,
    email: String,
    password: String,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            email: row.email,
            password_hash: row.password,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct PublicUserRow {
    id: i64,
    name: String,
    email: String,
}

/// Repository for user database operations
pub struct UserRepository<'a> {
    pool: &'a AnyPool,
}

impl<'a> UserRepository<'a> {
    pub fn new(pool: &'a AnyPool) -> Self {
        Self { pool }
    }

    /// Get a user by id
    pub async fn find_by_id(&self, id: UserId) -> ShopResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(
            "SELECT id, name, email, password FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await
        .map_err(database_error)?;

        Ok(row.map(User::from))
    }

    /// Get a user by email
    pub async fn find_by_email(&self, email: &str) -> ShopResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(
            "SELECT id, name, email, password FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(self.pool)
        .await
        .map_err(database_error)?;

        Ok(row.map(User::from))
    }

    /// Get the oldest user with this name (names are not unique)
    pub async fn find_by_name(&self, name: &str) -> ShopResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, name, email, password
            FROM users
            WHERE name = $1
            ORDER BY id
            LIMIT 1
            "#,
        )
        .bind(name)
        .fetch_optional(self.pool)
        .await
        .map_err(database_error)?;

        Ok(row.map(User::from))
    }

    /// Insert a user.
    ///
    /// Returns `ShopError::EmailAlreadyRegistered` if the email is taken.
    pub async fn create(&self, name: &str, email: &str, password_hash: &str) -> ShopResult<User> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            INSERT INTO users (name, email, password)
            VALUES ($1, $2, $3)
            RETURNING id, name, email, password
            "#,
        )
        .bind(name)
        .bind(email)
        .bind(password_hash)
        .fetch_one(self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e {
                if db_err.is_unique_violation() {
                    return ShopError::EmailAlreadyRegistered;
                }
            }
            database_error(e)
        })?;

        Ok(row.into())
    }

    /// All users, oldest first
    pub async fn list(&self) -> ShopResult<Vec<UserOut>> {
        let rows =
            sqlx::query_as::<_, PublicUserRow>("SELECT id, name, email FROM users ORDER BY id")
                .fetch_all(self.pool)
                .await
                .map_err(database_error)?;

        Ok(rows
            .into_iter()
            .map(|r| UserOut {
                id: r.id,
                name: r.name,
                email: r.email,
            })
            .collect())
    }
}
