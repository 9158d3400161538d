use async_trait::async_trait;

use super::{NewOrder, Order, OrderStatus};
use crate::domain::DomainResult;

#[async_trait]
pub trait OrderRepository: Send + Sync {
    /// Persist the order and its line items with status `Pending`.
    async fn create_pending(&self, order: NewOrder) -> DomainResult<Order>;

    /// Mark the order paid with the captured amount and charge reference.
    async fn confirm(&self, id: &str, charge_id: &str, total: i64) -> DomainResult<Order>;

    async fn mark_failed(&self, id: &str) -> DomainResult<()>;

    async fn find_by_id(&self, id: &str) -> DomainResult<Option<Order>>;

    /// Newest first, optionally restricted to one status.
    async fn list_for_user(
        &self,
        user_id: &str,
        status: Option<OrderStatus>,
    ) -> DomainResult<Vec<Order>>;
}
