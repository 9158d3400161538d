use async_trait::async_trait;

use super::{Item, ItemChanges, ItemOrder, NewItem};
use crate::domain::DomainResult;
use crate::shared::PageWindow;

#[async_trait]
pub trait ItemRepository: Send + Sync {
    async fn create(&self, item: NewItem) -> DomainResult<Item>;
    async fn find_by_id(&self, id: &str) -> DomainResult<Option<Item>>;
    async fn list(&self, order: ItemOrder, window: PageWindow) -> DomainResult<Vec<Item>>;
    async fn count(&self) -> DomainResult<u64>;

    /// Fails with `NotFound` when the item does not exist.
    async fn update(&self, id: &str, changes: ItemChanges) -> DomainResult<Item>;

    /// Fails with `NotFound` when the item does not exist.
    async fn delete(&self, id: &str) -> DomainResult<()>;
}
