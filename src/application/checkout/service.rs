//! Checkout saga
//!
//! pending order → charge → confirm → clear cart. Every step leaves a
//! record behind: a failed charge marks the order `FAILED` and keeps the
//! cart, a failed cart cleanup leaves the paid order standing.

use std::sync::Arc;

use tracing::{error, info, warn};

use crate::application::{owner_or_permitted, require_user, RequestContext};
use crate::domain::{
    cart_total, ChargeRequest, DomainError, DomainResult, NewOrder, NewOrderItem, Order,
    OrderStatus, PaymentGateway, Permission, RepositoryProvider,
};
use crate::shared::{retry_with_backoff, RetryConfig};

#[derive(Debug, Clone)]
pub struct CheckoutSettings {
    /// ISO 4217 code sent to the payment processor.
    pub currency: String,
    pub cleanup_retry: RetryConfig,
}

impl Default for CheckoutSettings {
    fn default() -> Self {
        Self {
            currency: "USD".to_string(),
            cleanup_retry: RetryConfig::default(),
        }
    }
}

pub struct CheckoutService {
    repos: Arc<dyn RepositoryProvider>,
    payments: Arc<dyn PaymentGateway>,
    settings: CheckoutSettings,
}

fn record_outcome(outcome: &'static str) {
    metrics::counter!("storefront_checkouts_total", "outcome" => outcome).increment(1);
}

impl CheckoutService {
    pub fn new(
        repos: Arc<dyn RepositoryProvider>,
        payments: Arc<dyn PaymentGateway>,
        settings: CheckoutSettings,
    ) -> Self {
        Self {
            repos,
            payments,
            settings,
        }
    }

    pub async fn create_order(&self, ctx: &RequestContext, token: &str) -> DomainResult<Order> {
        let caller = require_user(ctx)?;
        if token.trim().is_empty() {
            return Err(DomainError::Validation("token: must not be empty".into()));
        }

        let lines = self.repos.cart().lines_for_user(&caller.id).await?;
        if lines.is_empty() {
            return Err(DomainError::Validation("Your cart is empty".into()));
        }
        let total = cart_total(&lines)?;

        let pending = self
            .repos
            .orders()
            .create_pending(NewOrder {
                user_id: caller.id.clone(),
                total,
                items: lines.iter().map(NewOrderItem::snapshot).collect(),
            })
            .await?;
        info!(
            order_id = %pending.id,
            user_id = %caller.id,
            total,
            lines = lines.len(),
            "Pending order recorded"
        );

        let charge = match self
            .payments
            .charge(ChargeRequest {
                amount: total,
                currency: self.settings.currency.clone(),
                source: token.to_string(),
                idempotency_key: pending.id.clone(),
                description: Some(format!("Sick Fits order {}", pending.id)),
            })
            .await
        {
            Ok(charge) => charge,
            Err(e) => {
                warn!(order_id = %pending.id, error = %e, "Charge failed, order marked FAILED");
                record_outcome("declined");
                if let Err(mark_err) = self.repos.orders().mark_failed(&pending.id).await {
                    error!(order_id = %pending.id, error = %mark_err, "Could not mark order FAILED");
                }
                return Err(e);
            }
        };

        if charge.amount != total {
            warn!(
                order_id = %pending.id,
                expected = total,
                captured = charge.amount,
                "Captured amount differs from cart total"
            );
        }

        let order = match self
            .repos
            .orders()
            .confirm(&pending.id, &charge.id, charge.amount)
            .await
        {
            Ok(order) => order,
            Err(e) => {
                // Money moved but the order is still PENDING; the charge id is
                // needed to reconcile by hand.
                error!(
                    order_id = %pending.id,
                    charge_id = %charge.id,
                    error = %e,
                    "Charge captured but order confirmation failed"
                );
                record_outcome("unconfirmed");
                return Err(e);
            }
        };

        let cart = self.repos.cart();
        let cleared = retry_with_backoff(
            self.settings.cleanup_retry.clone(),
            || cart.clear_for_user(&caller.id),
            DomainError::is_transient,
            "clear_cart",
        )
        .await;
        if let Err(e) = cleared {
            error!(order_id = %order.id, user_id = %caller.id, error = %e, "Cart cleanup failed");
        }

        record_outcome("paid");
        info!(
            order_id = %order.id,
            charge_id = %charge.id,
            total = order.total,
            "Order paid"
        );
        Ok(order)
    }

    /// Visible to the owner and to ADMIN.
    pub async fn order(&self, ctx: &RequestContext, id: &str) -> DomainResult<Order> {
        let caller = require_user(ctx)?;
        let order = self
            .repos
            .orders()
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found("Order", "id", id))?;
        owner_or_permitted(caller, &order.user_id, &[Permission::Admin])?;
        Ok(order)
    }

    /// The caller's paid orders, newest first.
    pub async fn orders(&self, ctx: &RequestContext) -> DomainResult<Vec<Order>> {
        let caller = require_user(ctx)?;
        self.repos
            .orders()
            .list_for_user(&caller.id, Some(OrderStatus::Paid))
            .await
    }
}
