use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::{NewUser, User};
use crate::domain::{DomainResult, Permission};

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Fails with `Conflict` when the email is already registered.
    async fn create(&self, user: NewUser) -> DomainResult<User>;

    async fn find_by_id(&self, id: &str) -> DomainResult<Option<User>>;
    async fn find_by_email(&self, email: &str) -> DomainResult<Option<User>>;

    /// User holding `token` whose expiry is at or after `now`.
    async fn find_by_reset_token(
        &self,
        token: &str,
        now: DateTime<Utc>,
    ) -> DomainResult<Option<User>>;

    async fn list(&self) -> DomainResult<Vec<User>>;
    async fn count(&self) -> DomainResult<u64>;

    async fn set_reset_token(
        &self,
        id: &str,
        token: &str,
        expiry: DateTime<Utc>,
    ) -> DomainResult<()>;

    /// Store the new hash and clear the reset token and expiry in one write.
    async fn complete_password_reset(&self, id: &str, password_hash: &str) -> DomainResult<User>;

    async fn update_permissions(&self, id: &str, permissions: &[Permission])
        -> DomainResult<User>;
}
