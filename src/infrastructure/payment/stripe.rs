//! Stripe charge client.
//!
//! Creates a charge against a one-time card token through
//! `POST /v1/charges` and reports the captured amount.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{error, info};

use crate::domain::{Charge, ChargeRequest, DomainError, DomainResult, PaymentGateway};

const SERVICE: &str = "payment";

#[derive(Debug, Clone)]
pub struct StripeConfig {
    pub secret_key: String,
    /// Base URL without a trailing slash.
    pub api_base: String,
}

impl Default for StripeConfig {
    fn default() -> Self {
        Self {
            secret_key: String::new(),
            api_base: "https://api.stripe.com".to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct StripeCharge {
    id: String,
    amount: i64,
    #[serde(default)]
    status: Option<String>,
}

#[derive(Debug, Deserialize)]
struct StripeErrorBody {
    error: StripeErrorDetail,
}

#[derive(Debug, Deserialize)]
struct StripeErrorDetail {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Clone)]
pub struct StripeGateway {
    client: Client,
    config: StripeConfig,
}

impl StripeGateway {
    pub fn new(config: StripeConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    pub fn is_configured(&self) -> bool {
        !self.config.secret_key.is_empty()
    }
}

#[async_trait]
impl PaymentGateway for StripeGateway {
    async fn charge(&self, request: ChargeRequest) -> DomainResult<Charge> {
        if !self.is_configured() {
            return Err(DomainError::upstream(SERVICE, "Stripe secret key not configured"));
        }

        let url = format!("{}/v1/charges", self.config.api_base);
        let amount = request.amount.to_string();
        let currency = request.currency.to_lowercase();
        let mut form = vec![
            ("amount", amount.as_str()),
            ("currency", currency.as_str()),
            ("source", request.source.as_str()),
        ];
        if let Some(description) = request.description.as_deref() {
            form.push(("description", description));
        }

        let response = self
            .client
            .post(&url)
            .basic_auth(&self.config.secret_key, None::<&str>)
            .header("Idempotency-Key", &request.idempotency_key)
            .form(&form)
            .send()
            .await
            .map_err(|e| DomainError::upstream(SERVICE, e))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| DomainError::upstream(SERVICE, e))?;

        if !status.is_success() {
            let detail = serde_json::from_str::<StripeErrorBody>(&body)
                .ok()
                .map(|b| {
                    format!(
                        "{}: {}",
                        b.error.code.unwrap_or_else(|| status.to_string()),
                        b.error.message.unwrap_or_default()
                    )
                })
                .unwrap_or_else(|| format!("HTTP {}", status));
            error!(
                idempotency_key = %request.idempotency_key,
                status = %status,
                detail = %detail,
                "Stripe charge failed"
            );
            return Err(DomainError::upstream(SERVICE, detail));
        }

        let charge: StripeCharge =
            serde_json::from_str(&body).map_err(|e| DomainError::upstream(SERVICE, e))?;
        if charge.status.as_deref() == Some("failed") {
            return Err(DomainError::upstream(SERVICE, "charge declined"));
        }

        info!(
            charge_id = %charge.id,
            amount = charge.amount,
            currency = %currency,
            "Stripe charge captured"
        );
        Ok(Charge {
            id: charge.id,
            amount: charge.amount,
        })
    }
}
