use chrono::{DateTime, Utc};

use crate::domain::{DomainError, DomainResult, Item};

/// A cart row. Quantity is at least 1 and unique per (user, item).
#[derive(Clone, Debug, PartialEq)]
pub struct CartItem {
    pub id: String,
    pub user_id: String,
    pub item_id: String,
    pub quantity: i32,
    pub created_at: DateTime<Utc>,
}

/// A cart row joined with the current state of its item.
#[derive(Clone, Debug, PartialEq)]
pub struct CartLine {
    pub cart_item: CartItem,
    pub item: Item,
}

impl CartLine {
    /// `None` when price × quantity does not fit in an `i64`.
    pub fn line_total(&self) -> Option<i64> {
        self.item.price.checked_mul(i64::from(self.cart_item.quantity))
    }
}

/// Sum of price × quantity over every line, in minor units.
pub fn cart_total(lines: &[CartLine]) -> DomainResult<i64> {
    lines
        .iter()
        .try_fold(0i64, |acc, line| line.line_total().and_then(|t| acc.checked_add(t)))
        .ok_or_else(|| DomainError::Validation("Cart total is too large".into()))
}
