//! # Product Types
//!
//! Products are priced as decimals on the wire and stored in the smallest
//! currency unit (cents) so the database never holds a float.

use crate::error::{ShopError, ShopResult};
use serde::{Deserialize, Serialize};

/// Database-generated product identifier
pub type ProductId = i64;

/// Decimal places kept for prices
const PRICE_DECIMAL_PLACES: i32 = 2;

/// Convert a decimal price to cents, rejecting negative or non-finite values
pub fn price_to_cents(price: f64) -> ShopResult<i64> {
    if !price.is_finite() {
        return Err(ShopError::InvalidRequest(
            "price must be a finite number".to_string(),
        ));
    }
    if price < 0.0 {
        return Err(ShopError::InvalidRequest(
            "price must not be negative".to_string(),
        ));
    }

    let multiplier = 10_f64.powi(PRICE_DECIMAL_PLACES);
    let cents = (price * multiplier).round();
    if cents > i64::MAX as f64 {
        return Err(ShopError::InvalidRequest("price is too large".to_string()));
    }
    Ok(cents as i64)
}

/// Convert cents back to a decimal price
pub fn cents_to_price(cents: i64) -> f64 {
    let divisor = 10_f64.powi(PRICE_DECIMAL_PLACES);
    cents as f64 / divisor
}

/// A product as returned by the API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub description: Option<String>,
    pub price: f64,
    pub stock: i64,
}

impl Product {
    /// Build from stored columns
    pub fn from_stored(
        id: ProductId,
        name: String,
        description: Option<String>,
        price_cents: i64,
        stock: i64,
    ) -> Self {
        Self {
            id,
            name,
            description,
            price: cents_to_price(price_cents),
            stock,
        }
    }
}

/// Product creation payload
#[derive(Debug, Clone, Deserialize)]
pub struct ProductCreate {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub price: f64,
    pub stock: i64,
}

impl ProductCreate {
    /// Validate the payload into an insertable product
    pub fn validate(self) -> ShopResult<NewProduct> {
        let price_cents = price_to_cents(self.price)?;

        if self.stock < 0 {
            return Err(ShopError::InvalidRequest(
                "stock must not be negative".to_string(),
            ));
        }

        Ok(NewProduct {
            name: self.name,
            description: self.description,
            price_cents,
            stock: self.stock,
        })
    }
}

/// A validated product ready for insert
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProduct {
    pub name: String,
    pub description: Option<String>,
    pub price_cents: i64,
    pub stock: i64,
}
