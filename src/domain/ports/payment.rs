use async_trait::async_trait;

use crate::domain::DomainResult;

#[derive(Debug, Clone)]
pub struct ChargeRequest {
    /// Amount in the smallest currency unit.
    pub amount: i64,
    /// ISO 4217 code.
    pub currency: String,
    /// One-time payment token from the client.
    pub source: String,
    /// Replays with the same key must not charge twice.
    pub idempotency_key: String,
    pub description: Option<String>,
}

/// Confirmed charge as reported by the processor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Charge {
    pub id: String,
    /// Captured amount in minor units.
    pub amount: i64,
}

#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Fails with `Upstream` on decline or transport failure.
    async fn charge(&self, request: ChargeRequest) -> DomainResult<Charge>;
}
