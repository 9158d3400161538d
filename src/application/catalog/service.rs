use std::sync::Arc;

use tracing::info;
use validator::Validate;

use crate::application::{owner_or_permitted, require_user, RequestContext};
use crate::domain::{
    DomainError, DomainResult, Item, ItemChanges, ItemOrder, NewItem, Permission,
    RepositoryProvider, MAX_PRICE,
};
use crate::shared::PageWindow;

#[derive(Debug, Clone, Validate)]
pub struct CreateItemInput {
    #[validate(length(min = 1, message = "must not be empty"))]
    pub title: String,
    pub description: String,
    pub price: i64,
    pub image: Option<String>,
    pub large_image: Option<String>,
}

fn validate_price(price: i64) -> DomainResult<()> {
    if price < 0 {
        return Err(DomainError::Validation("price: must not be negative".into()));
    }
    if price > MAX_PRICE {
        return Err(DomainError::Validation(format!(
            "price: must not exceed {MAX_PRICE}"
        )));
    }
    Ok(())
}

pub struct CatalogService {
    repos: Arc<dyn RepositoryProvider>,
}

impl CatalogService {
    pub fn new(repos: Arc<dyn RepositoryProvider>) -> Self {
        Self { repos }
    }

    // ── Queries ─────────────────────────────────────────────────

    pub async fn items(&self, order: ItemOrder, window: PageWindow) -> DomainResult<Vec<Item>> {
        self.repos.items().list(order, window).await
    }

    pub async fn item(&self, id: &str) -> DomainResult<Option<Item>> {
        self.repos.items().find_by_id(id).await
    }

    pub async fn count(&self) -> DomainResult<u64> {
        self.repos.items().count().await
    }

    // ── Commands ────────────────────────────────────────────────

    pub async fn create_item(
        &self,
        ctx: &RequestContext,
        input: CreateItemInput,
    ) -> DomainResult<Item> {
        let caller = require_user(ctx)?;
        input
            .validate()
            .map_err(|e| DomainError::Validation(e.to_string()))?;
        validate_price(input.price)?;

        let item = self
            .repos
            .items()
            .create(NewItem {
                title: input.title,
                description: input.description,
                image: input.image,
                large_image: input.large_image,
                price: input.price,
                user_id: caller.id.clone(),
            })
            .await?;

        info!(item_id = %item.id, user_id = %caller.id, "Item created");
        Ok(item)
    }

    pub async fn update_item(
        &self,
        ctx: &RequestContext,
        id: &str,
        changes: ItemChanges,
    ) -> DomainResult<Item> {
        let caller = require_user(ctx)?;
        let item = self.require_item(id).await?;
        owner_or_permitted(caller, &item.user_id, &[Permission::Admin, Permission::ItemUpdate])?;

        if changes.title.as_deref().is_some_and(str::is_empty) {
            return Err(DomainError::Validation("title: must not be empty".into()));
        }
        if let Some(price) = changes.price {
            validate_price(price)?;
        }
        if changes.is_empty() {
            return Ok(item);
        }

        let updated = self.repos.items().update(id, changes).await?;
        info!(item_id = %updated.id, user_id = %caller.id, "Item updated");
        Ok(updated)
    }

    /// Returns the item as it was just before deletion.
    pub async fn delete_item(&self, ctx: &RequestContext, id: &str) -> DomainResult<Item> {
        let caller = require_user(ctx)?;
        let item = self.require_item(id).await?;
        owner_or_permitted(caller, &item.user_id, &[Permission::Admin, Permission::ItemDelete])?;

        self.repos.items().delete(id).await?;
        info!(item_id = %item.id, user_id = %caller.id, "Item deleted");
        Ok(item)
    }

    async fn require_item(&self, id: &str) -> DomainResult<Item> {
        self.repos
            .items()
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found("Item", "id", id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::testing::{seed_item, seed_user, Harness};

    fn input(title: &str, price: i64) -> CreateItemInput {
        CreateItemInput {
            title: title.to_string(),
            description: "Nice".to_string(),
            price,
            image: None,
            large_image: None,
        }
    }

    #[tokio::test]
    async fn create_requires_session_and_sets_owner() {
        let h = Harness::new();
        let svc = CatalogService::new(h.repos());

        let err = svc
            .create_item(&RequestContext::anonymous(), input("Hat", 100))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Unauthenticated));

        let seller = seed_user(&h, "seller@example.com", &[Permission::User]).await;
        let item = svc
            .create_item(&RequestContext::authenticated(seller.clone()), input("Hat", 100))
            .await
            .unwrap();
        assert_eq!(item.user_id, seller.id);
        assert_eq!(svc.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn create_rejects_negative_price() {
        let h = Harness::new();
        let svc = CatalogService::new(h.repos());
        let seller = seed_user(&h, "seller@example.com", &[Permission::User]).await;

        let err = svc
            .create_item(&RequestContext::authenticated(seller), input("Hat", -1))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[tokio::test]
    async fn prices_above_the_ceiling_are_rejected() {
        let h = Harness::new();
        let svc = CatalogService::new(h.repos());
        let seller = seed_user(&h, "seller@example.com", &[Permission::User]).await;
        let ctx = RequestContext::authenticated(seller.clone());

        let err = svc
            .create_item(&ctx, input("Yacht", MAX_PRICE + 1))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
        let item = svc.create_item(&ctx, input("Yacht", MAX_PRICE)).await.unwrap();

        let err = svc
            .update_item(
                &ctx,
                &item.id,
                ItemChanges {
                    price: Some(i64::MAX / 2 + 1),
                    ..ItemChanges::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
        assert_eq!(svc.item(&item.id).await.unwrap().unwrap().price, MAX_PRICE);
    }

    #[tokio::test]
    async fn update_changes_title_and_keeps_id() {
        let h = Harness::new();
        let svc = CatalogService::new(h.repos());
        let seller = seed_user(&h, "seller@example.com", &[Permission::User]).await;
        let item = seed_item(&h, &seller, "Hat", 100).await;
        let ctx = RequestContext::authenticated(seller);

        svc.update_item(
            &ctx,
            &item.id,
            ItemChanges {
                title: Some("X".to_string()),
                ..ItemChanges::default()
            },
        )
        .await
        .unwrap();

        let reloaded = svc.item(&item.id).await.unwrap().unwrap();
        assert_eq!(reloaded.id, item.id);
        assert_eq!(reloaded.title, "X");
        assert_eq!(reloaded.price, 100);
    }

    #[tokio::test]
    async fn update_by_stranger_is_forbidden() {
        let h = Harness::new();
        let svc = CatalogService::new(h.repos());
        let seller = seed_user(&h, "seller@example.com", &[Permission::User]).await;
        let stranger = seed_user(&h, "stranger@example.com", &[Permission::User]).await;
        let editor = seed_user(&h, "editor@example.com", &[Permission::ItemUpdate]).await;
        let item = seed_item(&h, &seller, "Hat", 100).await;
        let changes = ItemChanges {
            price: Some(200),
            ..ItemChanges::default()
        };

        let err = svc
            .update_item(&RequestContext::authenticated(stranger), &item.id, changes.clone())
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Forbidden(_)));

        let updated = svc
            .update_item(&RequestContext::authenticated(editor), &item.id, changes)
            .await
            .unwrap();
        assert_eq!(updated.price, 200);
    }

    #[tokio::test]
    async fn delete_policy_owner_or_itemdelete() {
        let h = Harness::new();
        let svc = CatalogService::new(h.repos());
        let alice = seed_user(&h, "alice@example.com", &[Permission::User]).await;
        let bob = seed_user(&h, "bob@example.com", &[Permission::User]).await;
        let bobs_item = seed_item(&h, &bob, "Coat", 5000).await;
        let alices_item = seed_item(&h, &alice, "Hat", 100).await;
        let alice_ctx = RequestContext::authenticated(alice);

        let err = svc.delete_item(&alice_ctx, &bobs_item.id).await.unwrap_err();
        assert!(matches!(err, DomainError::Forbidden(_)));

        let deleted = svc.delete_item(&alice_ctx, &alices_item.id).await.unwrap();
        assert_eq!(deleted.id, alices_item.id);
        let err = svc.delete_item(&alice_ctx, &alices_item.id).await.unwrap_err();
        assert!(matches!(err, DomainError::NotFound { .. }));

        let moderator = seed_user(&h, "mod@example.com", &[Permission::ItemDelete]).await;
        svc.delete_item(&RequestContext::authenticated(moderator), &bobs_item.id)
            .await
            .unwrap();
        assert!(svc.item(&bobs_item.id).await.unwrap().is_none());
    }
}
