//! Product repository.

use super::database_error;
use shop_core::{NewProduct, Product, ShopResult};
use sqlx::AnyPool;

#[derive(Debug, sqlx::FromRow)]
struct ProductRow {
    id: i64,
    name: String,
    description: Option<String>,
    price_cents: i64,
    stock: i64,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Product::from_stored(row.id, row.name, row.description, row.price_cents, row.stock)
    }
}

/// Repository for product database operations
pub struct ProductRepository<'a> {
    pool: &'a AnyPool,
}

impl<'a> ProductRepository<'a> {
    pub fn new(pool: &'a AnyPool) -> Self {
        Self { pool }
    }

    /// Insert a validated product
    pub async fn create(&self, product: &NewProduct) -> ShopResult<Product> {
        let row = sqlx::query_as::<_, ProductRow>(
            r#"
            INSERT INTO products (name, description, price_cents, stock)
            VALUES ($1, $2, $3, $4)
            RETURNING id, name, description, price_cents, stock
            "#,
        )
        .bind(&product.name)
        .bind(product.description.clone())
        .bind(product.price_cents)
        .bind(product.stock)
        .fetch_one(self.pool)
        .await
        .map_err(database_error)?;

        Ok(row.into())
    }

    /// All products, oldest first
    pub async fn list(&self) -> ShopResult<Vec<Product>> {
        let rows = sqlx::query_as::<_, ProductRow>(
            "SELECT id, name, description, price_cents, stock FROM products ORDER BY id",
        )
        .fetch_all(self.pool)
        .await
        .map_err(database_error)?;

        Ok(rows.into_iter().map(Product::from).collect())
    }
}
