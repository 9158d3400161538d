use async_trait::async_trait;

use super::{CartItem, CartLine};
use crate::domain::DomainResult;

#[async_trait]
pub trait CartRepository: Send + Sync {
    async fn find_by_id(&self, id: &str) -> DomainResult<Option<CartItem>>;
    async fn find_for_user_item(&self, user_id: &str, item_id: &str)
        -> DomainResult<Option<CartItem>>;

    /// Insert a new row with quantity 1. Fails with `Conflict` when the
    /// (user, item) pair already has a row.
    async fn create(&self, user_id: &str, item_id: &str) -> DomainResult<CartItem>;

    /// Atomically add one to the quantity of an existing row.
    async fn increment_quantity(&self, id: &str) -> DomainResult<CartItem>;

    async fn delete(&self, id: &str) -> DomainResult<()>;

    /// The user's rows joined with their items, oldest first.
    async fn lines_for_user(&self, user_id: &str) -> DomainResult<Vec<CartLine>>;

    /// Remove every row of the user. Idempotent; returns the rows removed.
    async fn clear_for_user(&self, user_id: &str) -> DomainResult<u64>;
}
