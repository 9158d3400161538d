//! Shared fixtures for the service tests.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;

use crate::application::{AccountService, AccountSettings};
use crate::domain::{
    Charge, ChargeRequest, DomainError, DomainResult, Item, ItemRepository, MailMessage, Mailer,
    NewItem, NewUser, PaymentGateway, Permission, RepositoryProvider, User, UserRepository,
};
use crate::infrastructure::crypto::JwtConfig;
use crate::infrastructure::storage::InMemoryStore;
use crate::shared::{ManualClock, SharedClock};

pub(crate) struct Harness {
    pub store: Arc<InMemoryStore>,
    pub clock: Arc<ManualClock>,
}

impl Harness {
    pub fn new() -> Self {
        Self {
            store: Arc::new(InMemoryStore::new()),
            clock: Arc::new(ManualClock::new(Utc::now())),
        }
    }

    pub fn repos(&self) -> Arc<dyn RepositoryProvider> {
        self.store.clone()
    }

    pub fn shared_clock(&self) -> SharedClock {
        self.clock.clone()
    }

    pub fn account_settings(&self) -> AccountSettings {
        AccountSettings {
            jwt: JwtConfig {
                secret: "test-secret".to_string(),
                expiration_hours: 1,
                issuer: "sick-fits".to_string(),
            },
            password_cost: 4,
            ..AccountSettings::default()
        }
    }
}

pub(crate) fn account_service(h: &Harness) -> AccountService {
    account_service_with_mailer(h, Arc::new(RecordingMailer::default()))
}

pub(crate) fn account_service_with_mailer(h: &Harness, mailer: Arc<dyn Mailer>) -> AccountService {
    AccountService::new(h.repos(), mailer, h.shared_clock(), h.account_settings())
}

pub(crate) fn user_with(id: &str, permissions: &[Permission]) -> User {
    let now = Utc::now();
    User {
        id: id.to_string(),
        name: id.to_string(),
        email: format!("{}@example.com", id),
        password_hash: "hash".to_string(),
        permissions: permissions.to_vec(),
        reset_token: None,
        reset_token_expiry: None,
        created_at: now,
        updated_at: now,
    }
}

pub(crate) async fn seed_user(h: &Harness, email: &str, permissions: &[Permission]) -> User {
    UserRepository::create(
        h.store.as_ref(),
        NewUser {
            name: email.to_string(),
            email: email.to_string(),
            password_hash: "hash".to_string(),
            permissions: permissions.to_vec(),
        },
    )
    .await
    .unwrap()
}

pub(crate) async fn seed_item(h: &Harness, owner: &User, title: &str, price: i64) -> Item {
    ItemRepository::create(
        h.store.as_ref(),
        NewItem {
            title: title.to_string(),
            description: format!("A lovely {}", title),
            image: None,
            large_image: None,
            price,
            user_id: owner.id.clone(),
        },
    )
    .await
    .unwrap()
}

// ── Outbound stubs ──────────────────────────────────────────────

/// Captures requests; approves them unless told to decline.
#[derive(Default)]
pub(crate) struct StubPaymentGateway {
    decline: bool,
    /// Amount reported as captured instead of the requested one.
    captured_amount: Option<i64>,
    requests: Mutex<Vec<ChargeRequest>>,
}

impl StubPaymentGateway {
    pub fn approving() -> Self {
        Self::default()
    }

    pub fn declining() -> Self {
        Self {
            decline: true,
            ..Self::default()
        }
    }

    pub fn capturing(amount: i64) -> Self {
        Self {
            captured_amount: Some(amount),
            ..Self::default()
        }
    }

    pub fn requests(&self) -> Vec<ChargeRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl PaymentGateway for StubPaymentGateway {
    async fn charge(&self, request: ChargeRequest) -> DomainResult<Charge> {
        let amount = self.captured_amount.unwrap_or(request.amount);
        let mut requests = self.requests.lock().unwrap();
        requests.push(request);
        if self.decline {
            return Err(DomainError::upstream("payment", "card_declined"));
        }
        Ok(Charge {
            id: format!("ch_{}", requests.len()),
            amount,
        })
    }
}

#[derive(Default)]
pub(crate) struct RecordingMailer {
    sent: Mutex<Vec<MailMessage>>,
}

impl RecordingMailer {
    pub fn sent(&self) -> Vec<MailMessage> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send_mail(&self, message: MailMessage) -> DomainResult<()> {
        self.sent.lock().unwrap().push(message);
        Ok(())
    }
}

pub(crate) struct FailingMailer;

#[async_trait]
impl Mailer for FailingMailer {
    async fn send_mail(&self, _message: MailMessage) -> DomainResult<()> {
        Err(DomainError::upstream("mail", "connection refused"))
    }
}
