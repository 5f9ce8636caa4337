//! # Basket and Order Types
//!
//! Request/response shapes for baskets and orders. No routes or tables use
//! them yet; they exist so clients and future handlers share one schema.

use crate::product::ProductId;
use crate::user::UserId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Basket item creation payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BasketItemCreate {
    pub user_id: UserId,
    pub product_id: ProductId,
    pub quantity: i64,
}

/// A stored basket item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BasketItem {
    pub id: i64,
    pub user_id: UserId,
    pub product_id: ProductId,
    pub quantity: i64,
}

/// Order creation payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderCreate {
    pub user_id: UserId,
    pub total: f64,
}

/// A placed order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: i64,
    pub user_id: UserId,
    pub total: f64,
    pub order_date: DateTime<Utc>,
}

/// Order line creation payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderItemCreate {
    pub order_id: i64,
    pub product_id: ProductId,
    pub quantity: i64,
    pub price_at_purchase: f64,
}

/// A line of a placed order, priced at purchase time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderItem {
    pub id: i64,
    pub order_id: i64,
    pub product_id: ProductId,
    pub quantity: i64,
    pub price_at_purchase: f64,
}

impl OrderItem {
    /// Line total at purchase price
    pub fn line_total(&self) -> f64 {
        self.price_at_purchase * self.quantity as f64
    }
}
