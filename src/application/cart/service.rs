use std::sync::Arc;

use tracing::info;

use crate::application::{require_user, RequestContext};
use crate::domain::{CartItem, CartLine, DomainError, DomainResult, RepositoryProvider};

pub struct CartService {
    repos: Arc<dyn RepositoryProvider>,
}

impl CartService {
    pub fn new(repos: Arc<dyn RepositoryProvider>) -> Self {
        Self { repos }
    }

    /// One more of `item_id` in the caller's cart: bump the existing line or
    /// start a new one at quantity 1.
    pub async fn add_to_cart(&self, ctx: &RequestContext, item_id: &str) -> DomainResult<CartItem> {
        let caller = require_user(ctx)?;
        if self.repos.items().find_by_id(item_id).await?.is_none() {
            return Err(DomainError::not_found("Item", "id", item_id));
        }

        let cart = self.repos.cart();
        let line = match cart.find_for_user_item(&caller.id, item_id).await? {
            Some(existing) => cart.increment_quantity(&existing.id).await?,
            None => match cart.create(&caller.id, item_id).await {
                Ok(created) => created,
                // A concurrent add won the insert; fold into its row.
                Err(DomainError::Conflict(_)) => {
                    let existing = cart
                        .find_for_user_item(&caller.id, item_id)
                        .await?
                        .ok_or_else(|| DomainError::not_found("CartItem", "item", item_id))?;
                    cart.increment_quantity(&existing.id).await?
                }
                Err(e) => return Err(e),
            },
        };

        metrics::counter!("storefront_cart_additions_total").increment(1);
        info!(
            user_id = %caller.id,
            item_id = %item_id,
            quantity = line.quantity,
            "Added to cart"
        );
        Ok(line)
    }

    pub async fn remove_from_cart(
        &self,
        ctx: &RequestContext,
        cart_item_id: &str,
    ) -> DomainResult<CartItem> {
        let caller = require_user(ctx)?;
        let line = self
            .repos
            .cart()
            .find_by_id(cart_item_id)
            .await?
            .ok_or_else(|| DomainError::not_found("CartItem", "id", cart_item_id))?;

        if line.user_id != caller.id {
            return Err(DomainError::Forbidden("That cart item is not yours".into()));
        }

        self.repos.cart().delete(&line.id).await?;
        info!(user_id = %caller.id, cart_item_id = %line.id, "Removed from cart");
        Ok(line)
    }

    pub async fn lines_for_user(&self, user_id: &str) -> DomainResult<Vec<CartLine>> {
        self.repos.cart().lines_for_user(user_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::testing::{seed_item, seed_user, Harness};
    use crate::domain::Permission;

    #[tokio::test]
    async fn adding_twice_yields_one_line_with_quantity_two() {
        let h = Harness::new();
        let svc = CartService::new(h.repos());
        let shopper = seed_user(&h, "shopper@example.com", &[Permission::User]).await;
        let item = seed_item(&h, &shopper, "Hat", 100).await;
        let ctx = RequestContext::authenticated(shopper.clone());

        let first = svc.add_to_cart(&ctx, &item.id).await.unwrap();
        let second = svc.add_to_cart(&ctx, &item.id).await.unwrap();
        assert_eq!(first.id, second.id);
        assert_eq!(second.quantity, 2);

        let lines = svc.lines_for_user(&shopper.id).await.unwrap();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].cart_item.quantity, 2);
    }

    #[tokio::test]
    async fn unknown_item_and_anonymous_caller_rejected() {
        let h = Harness::new();
        let svc = CartService::new(h.repos());
        let shopper = seed_user(&h, "shopper@example.com", &[Permission::User]).await;

        let err = svc
            .add_to_cart(&RequestContext::authenticated(shopper), "missing")
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::NotFound { .. }));

        let err = svc
            .add_to_cart(&RequestContext::anonymous(), "missing")
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Unauthenticated));
    }

    #[tokio::test]
    async fn only_the_owner_removes_a_line() {
        let h = Harness::new();
        let svc = CartService::new(h.repos());
        let shopper = seed_user(&h, "shopper@example.com", &[Permission::User]).await;
        let other = seed_user(&h, "other@example.com", &[Permission::Admin]).await;
        let item = seed_item(&h, &shopper, "Hat", 100).await;
        let ctx = RequestContext::authenticated(shopper.clone());
        let line = svc.add_to_cart(&ctx, &item.id).await.unwrap();

        let err = svc
            .remove_from_cart(&RequestContext::authenticated(other), &line.id)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Forbidden(_)));

        let removed = svc.remove_from_cart(&ctx, &line.id).await.unwrap();
        assert_eq!(removed.id, line.id);
        assert!(svc.lines_for_user(&shopper.id).await.unwrap().is_empty());

        let err = svc.remove_from_cart(&ctx, &line.id).await.unwrap_err();
        assert!(matches!(err, DomainError::NotFound { .. }));
    }
}
