use std::fmt;

use chrono::{DateTime, Utc};

use crate::domain::CartLine;

/// Checkout progress of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderStatus {
    /// Recorded before the charge is attempted.
    Pending,
    /// Charge captured.
    Paid,
    /// Charge declined or errored.
    Failed,
}

impl OrderStatus {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Paid => "PAID",
            Self::Failed => "FAILED",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Frozen copy of an item at checkout time. Later item edits do not touch it.
#[derive(Clone, Debug, PartialEq)]
pub struct OrderItem {
    pub id: String,
    pub order_id: String,
    pub user_id: String,
    pub title: String,
    pub description: String,
    pub image: Option<String>,
    pub large_image: Option<String>,
    pub price: i64,
    pub quantity: i32,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Order {
    pub id: String,
    pub user_id: String,
    /// Minor units. Equals the captured amount once the order is paid.
    pub total: i64,
    /// Payment reference, set once the charge succeeds.
    pub charge: Option<String>,
    pub status: OrderStatus,
    pub items: Vec<OrderItem>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewOrderItem {
    pub title: String,
    pub description: String,
    pub image: Option<String>,
    pub large_image: Option<String>,
    pub price: i64,
    pub quantity: i32,
}

impl NewOrderItem {
    /// Copy the item fields of a cart line, minus its id.
    pub fn snapshot(line: &CartLine) -> Self {
        Self {
            title: line.item.title.clone(),
            description: line.item.description.clone(),
            image: line.item.image.clone(),
            large_image: line.item.large_image.clone(),
            price: line.item.price,
            quantity: line.cart_item.quantity,
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewOrder {
    pub user_id: String,
    pub total: i64,
    pub items: Vec<NewOrderItem>,
}
