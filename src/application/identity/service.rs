//! Account service: application-layer orchestration
//!
//! All account-related business logic lives here.
//! GraphQL resolvers are thin wrappers that delegate to this service.

use std::sync::Arc;

use chrono::Duration;
use tracing::{debug, error, info, warn};
use validator::Validate;

use crate::application::{has_permission, require_user, Message, RequestContext};
use crate::domain::{
    DomainError, DomainResult, MailMessage, Mailer, NewUser, Permission, RepositoryProvider, User,
};
use crate::infrastructure::crypto::{
    create_token, generate_reset_token, hash_password, verify_password, verify_token, JwtConfig,
    PASSWORD_HASH_COST,
};
use crate::shared::SharedClock;

/// Knobs the account flows read from configuration.
#[derive(Clone)]
pub struct AccountSettings {
    pub jwt: JwtConfig,
    pub password_cost: u32,
    pub reset_token_ttl: Duration,
    /// Storefront origin used to build the reset link.
    pub frontend_url: String,
    pub mail_from: String,
    /// Answer `requestReset` for unknown emails like known ones.
    pub conceal_account_existence: bool,
}

impl Default for AccountSettings {
    fn default() -> Self {
        Self {
            jwt: JwtConfig::default(),
            password_cost: PASSWORD_HASH_COST,
            reset_token_ttl: Duration::hours(1),
            frontend_url: "http://localhost:7777".to_string(),
            mail_from: "Sick Fits <shop@sickfits.local>".to_string(),
            conceal_account_existence: false,
        }
    }
}

/// A user together with a freshly issued session token.
#[derive(Debug, Clone)]
pub struct Session {
    pub user: User,
    pub token: String,
}

#[derive(Debug, Clone, Validate)]
pub struct SignupInput {
    #[validate(email(message = "must be a valid email address"))]
    pub email: String,
    #[validate(length(min = 1, message = "must not be empty"))]
    pub name: String,
    #[validate(length(min = 1, message = "must not be empty"))]
    pub password: String,
}

pub struct AccountService {
    repos: Arc<dyn RepositoryProvider>,
    mailer: Arc<dyn Mailer>,
    clock: SharedClock,
    settings: AccountSettings,
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Wrap plain text in the storefront's mail layout.
fn nice_email(text: &str) -> String {
    format!(
        "<div style=\"border: 1px solid black; padding: 20px; font-family: sans-serif; \
         line-height: 2; font-size: 20px;\">\
         <h2>Hello There!</h2><p>{}</p><p>The Sick Fits team</p></div>",
        text
    )
}

impl AccountService {
    pub fn new(
        repos: Arc<dyn RepositoryProvider>,
        mailer: Arc<dyn Mailer>,
        clock: SharedClock,
        settings: AccountSettings,
    ) -> Self {
        Self {
            repos,
            mailer,
            clock,
            settings,
        }
    }

    pub fn settings(&self) -> &AccountSettings {
        &self.settings
    }

    fn issue(&self, user: User) -> DomainResult<Session> {
        let token = create_token(&user.id, &self.settings.jwt)
            .map_err(|e| DomainError::upstream("session", e))?;
        Ok(Session { user, token })
    }

    fn hash(&self, password: &str) -> DomainResult<String> {
        hash_password(password, self.settings.password_cost)
            .map_err(|e| DomainError::upstream("password hashing", e))
    }

    // ── Sessions ────────────────────────────────────────────────

    /// Resolve a session token to its user. Bad, expired or orphaned
    /// tokens yield `None`: the request simply runs anonymously.
    pub async fn resolve_session(&self, token: &str) -> DomainResult<Option<User>> {
        let claims = match verify_token(token, &self.settings.jwt) {
            Ok(claims) => claims,
            Err(e) => {
                debug!(error = %e, "Ignoring invalid session token");
                return Ok(None);
            }
        };
        self.repos.users().find_by_id(&claims.user_id).await
    }

    pub async fn signup(&self, mut input: SignupInput) -> DomainResult<Session> {
        input.email = normalize_email(&input.email);
        input
            .validate()
            .map_err(|e| DomainError::Validation(e.to_string()))?;

        let password_hash = self.hash(&input.password)?;
        let user = self
            .repos
            .users()
            .create(NewUser {
                name: input.name,
                email: input.email,
                password_hash,
                permissions: vec![Permission::User],
            })
            .await?;

        info!(user_id = %user.id, email = %user.email, "New user signed up");
        metrics::counter!("storefront_signups_total").increment(1);
        self.issue(user)
    }

    pub async fn signin(&self, email: &str, password: &str) -> DomainResult<Session> {
        let email = normalize_email(email);
        let user = self
            .repos
            .users()
            .find_by_email(&email)
            .await?
            .ok_or_else(|| DomainError::not_found("User", "email", email.clone()))?;

        let valid = verify_password(password, &user.password_hash).unwrap_or(false);
        if !valid {
            warn!(user_id = %user.id, "Sign-in rejected: wrong password");
            return Err(DomainError::InvalidCredential);
        }

        info!(user_id = %user.id, "User signed in");
        self.issue(user)
    }

    pub fn signout(&self) -> Message {
        Message::new("Goodbye!")
    }

    // ── Password reset ──────────────────────────────────────────

    pub async fn request_reset(&self, email: &str) -> DomainResult<Message> {
        let email = normalize_email(email);
        let Some(user) = self.repos.users().find_by_email(&email).await? else {
            if self.settings.conceal_account_existence {
                info!("Password reset requested for unknown email");
                return Ok(Message::new("Thanks!"));
            }
            return Err(DomainError::not_found("User", "email", email));
        };

        let token = generate_reset_token();
        let expiry = self.clock.now() + self.settings.reset_token_ttl;
        self.repos
            .users()
            .set_reset_token(&user.id, &token, expiry)
            .await?;

        let link = format!(
            "{}/reset?resetToken={}",
            self.settings.frontend_url.trim_end_matches('/'),
            token
        );
        let message = MailMessage {
            from: self.settings.mail_from.clone(),
            to: user.email.clone(),
            subject: "Your Password Reset Token".to_string(),
            html: nice_email(&format!(
                "Your Password Reset Token is here!\n\n<a href=\"{}\">Click Here to Reset</a>",
                link
            )),
        };

        // Delivery problems are not the caller's business.
        if let Err(e) = self.mailer.send_mail(message).await {
            error!(user_id = %user.id, error = %e, "Failed to deliver reset email");
        } else {
            info!(user_id = %user.id, "Password reset email sent");
        }

        Ok(Message::new("Thanks!"))
    }

    pub async fn reset_password(
        &self,
        reset_token: &str,
        password: &str,
        confirm_password: &str,
    ) -> DomainResult<Session> {
        if password != confirm_password {
            return Err(DomainError::PasswordMismatch);
        }
        if password.is_empty() {
            return Err(DomainError::Validation("password: must not be empty".into()));
        }

        let user = self
            .repos
            .users()
            .find_by_reset_token(reset_token, self.clock.now())
            .await?
            .ok_or(DomainError::InvalidOrExpiredToken)?;

        let password_hash = self.hash(password)?;
        let user = self
            .repos
            .users()
            .complete_password_reset(&user.id, &password_hash)
            .await?;

        info!(user_id = %user.id, "Password reset completed");
        self.issue(user)
    }

    // ── Users & permissions ─────────────────────────────────────

    pub async fn user_by_id(&self, id: &str) -> DomainResult<Option<User>> {
        self.repos.users().find_by_id(id).await
    }

    pub async fn list_users(&self, ctx: &RequestContext) -> DomainResult<Vec<User>> {
        let caller = require_user(ctx)?;
        has_permission(caller, &[Permission::Admin, Permission::PermissionUpdate])?;
        self.repos.users().list().await
    }

    pub async fn update_permissions(
        &self,
        ctx: &RequestContext,
        permissions: Vec<Permission>,
        user_id: &str,
    ) -> DomainResult<User> {
        let caller = require_user(ctx)?;
        has_permission(caller, &[Permission::Admin, Permission::PermissionUpdate])?;

        let permissions = Permission::normalize(permissions);
        let user = self
            .repos
            .users()
            .update_permissions(user_id, &permissions)
            .await?;

        info!(
            caller_id = %caller.id,
            user_id = %user.id,
            permissions = ?user.permissions,
            "Permissions updated"
        );
        Ok(user)
    }

    /// Create the first administrator when no user exists yet.
    pub async fn ensure_admin(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> DomainResult<Option<User>> {
        if self.repos.users().count().await? > 0 {
            return Ok(None);
        }

        let password_hash = self.hash(password)?;
        let user = self
            .repos
            .users()
            .create(NewUser {
                name: name.to_string(),
                email: normalize_email(email),
                password_hash,
                permissions: Permission::ALL.to_vec(),
            })
            .await?;

        info!(user_id = %user.id, email = %user.email, "Bootstrap admin created");
        Ok(Some(user))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::testing::{
        account_service, account_service_with_mailer, seed_user, Harness, RecordingMailer,
    };
    use crate::domain::UserRepository;
    use crate::shared::Clock;

    async fn issued_reset_token(h: &Harness, svc: &AccountService, email: &str) -> String {
        svc.request_reset(email).await.unwrap();
        h.store
            .find_by_email(email)
            .await
            .unwrap()
            .unwrap()
            .reset_token
            .unwrap()
    }

    fn signup_input(email: &str) -> SignupInput {
        SignupInput {
            email: email.to_string(),
            name: "Wes".to_string(),
            password: "hunter2".to_string(),
        }
    }

    #[tokio::test]
    async fn signup_lowercases_email_and_grants_user() {
        let h = Harness::new();
        let svc = account_service(&h);

        let session = svc.signup(signup_input("Wes@Example.COM")).await.unwrap();
        assert_eq!(session.user.email, "wes@example.com");
        assert_eq!(session.user.permissions, vec![Permission::User]);
        assert_ne!(session.user.password_hash, "hunter2");

        let resolved = svc.resolve_session(&session.token).await.unwrap().unwrap();
        assert_eq!(resolved.id, session.user.id);
    }

    #[tokio::test]
    async fn signup_rejects_bad_input_and_duplicates() {
        let h = Harness::new();
        let svc = account_service(&h);

        let err = svc.signup(signup_input("not-an-email")).await.unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));

        svc.signup(signup_input("wes@example.com")).await.unwrap();
        let err = svc.signup(signup_input("WES@example.com")).await.unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));
    }

    #[tokio::test]
    async fn signin_distinguishes_unknown_user_and_wrong_password() {
        let h = Harness::new();
        let svc = account_service(&h);
        svc.signup(signup_input("wes@example.com")).await.unwrap();

        let err = svc.signin("nobody@example.com", "x").await.unwrap_err();
        assert!(matches!(err, DomainError::NotFound { .. }));

        let err = svc.signin("wes@example.com", "wrong").await.unwrap_err();
        assert!(matches!(err, DomainError::InvalidCredential));

        let session = svc.signin("WES@example.com", "hunter2").await.unwrap();
        assert_eq!(session.user.email, "wes@example.com");
    }

    #[tokio::test]
    async fn garbage_session_token_resolves_to_nobody() {
        let h = Harness::new();
        let svc = account_service(&h);
        assert!(svc.resolve_session("not.a.jwt").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn reset_flow_issues_link_and_single_use_token() {
        let h = Harness::new();
        let mailer = Arc::new(RecordingMailer::default());
        let svc = account_service_with_mailer(&h, mailer.clone());
        svc.signup(signup_input("wes@example.com")).await.unwrap();

        let ack = svc.request_reset("wes@example.com").await.unwrap();
        assert_eq!(ack.message, "Thanks!");

        let user = h.store.find_by_email("wes@example.com").await.unwrap().unwrap();
        let token = user.reset_token.clone().unwrap();
        assert_eq!(token.len(), 40);
        assert_eq!(
            user.reset_token_expiry.unwrap(),
            h.clock.now() + Duration::hours(1)
        );

        let sent = mailer.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].to, "wes@example.com");
        assert!(sent[0]
            .html
            .contains(&format!("http://localhost:7777/reset?resetToken={}", token)));

        let session = svc.reset_password(&token, "newpass", "newpass").await.unwrap();
        assert!(session.user.reset_token.is_none());
        assert!(session.user.reset_token_expiry.is_none());
        svc.signin("wes@example.com", "newpass").await.unwrap();

        let err = svc
            .reset_password(&token, "again", "again")
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::InvalidOrExpiredToken));
    }

    #[tokio::test]
    async fn reset_token_expires_after_an_hour() {
        let h = Harness::new();
        let svc = account_service(&h);
        svc.signup(signup_input("wes@example.com")).await.unwrap();

        // Still valid on the last second of its lifetime.
        let token = issued_reset_token(&h, &svc, "wes@example.com").await;
        h.clock.advance(Duration::seconds(3600));
        svc.reset_password(&token, "newpass", "newpass")
            .await
            .unwrap();

        // One second later it is gone.
        let token = issued_reset_token(&h, &svc, "wes@example.com").await;
        h.clock.advance(Duration::seconds(3601));
        let err = svc
            .reset_password(&token, "newpass", "newpass")
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::InvalidOrExpiredToken));
    }

    #[tokio::test]
    async fn mismatched_passwords_fail_first() {
        let h = Harness::new();
        let svc = account_service(&h);
        let err = svc.reset_password("whatever", "a", "b").await.unwrap_err();
        assert!(matches!(err, DomainError::PasswordMismatch));
    }

    #[tokio::test]
    async fn request_reset_for_unknown_email() {
        let h = Harness::new();
        let err = account_service(&h)
            .request_reset("ghost@example.com")
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::NotFound { .. }));

        let concealing = AccountService::new(
            h.repos(),
            Arc::new(RecordingMailer::default()),
            h.shared_clock(),
            AccountSettings {
                conceal_account_existence: true,
                ..h.account_settings()
            },
        );
        let ack = concealing.request_reset("ghost@example.com").await.unwrap();
        assert_eq!(ack.message, "Thanks!");
    }

    #[tokio::test]
    async fn mail_failure_is_not_surfaced() {
        let h = Harness::new();
        let svc = account_service_with_mailer(&h, Arc::new(crate::application::testing::FailingMailer));
        svc.signup(signup_input("wes@example.com")).await.unwrap();

        let ack = svc.request_reset("wes@example.com").await.unwrap();
        assert_eq!(ack.message, "Thanks!");
    }

    #[tokio::test]
    async fn permission_management_requires_admin_or_permissionupdate() {
        let h = Harness::new();
        let svc = account_service(&h);
        let shopper = seed_user(&h, "shopper@example.com", &[Permission::User]).await;
        let admin = seed_user(&h, "admin@example.com", &[Permission::Admin]).await;

        let err = svc
            .list_users(&RequestContext::authenticated(shopper.clone()))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Forbidden(_)));

        let err = svc.list_users(&RequestContext::anonymous()).await.unwrap_err();
        assert!(matches!(err, DomainError::Unauthenticated));

        let admin_ctx = RequestContext::authenticated(admin);
        assert_eq!(svc.list_users(&admin_ctx).await.unwrap().len(), 2);

        let updated = svc
            .update_permissions(
                &admin_ctx,
                vec![Permission::ItemCreate, Permission::User, Permission::ItemCreate],
                &shopper.id,
            )
            .await
            .unwrap();
        assert_eq!(
            updated.permissions,
            vec![Permission::User, Permission::ItemCreate]
        );

        let err = svc
            .update_permissions(&admin_ctx, vec![Permission::User], "missing")
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::NotFound { .. }));
    }

    #[tokio::test]
    async fn ensure_admin_only_on_empty_store() {
        let h = Harness::new();
        let svc = account_service(&h);

        let admin = svc
            .ensure_admin("Admin", "Admin@Example.com", "changeme")
            .await
            .unwrap()
            .unwrap();
        assert!(admin.has_any_permission(&[Permission::Admin]));
        assert_eq!(admin.email, "admin@example.com");

        assert!(svc
            .ensure_admin("Admin", "other@example.com", "changeme")
            .await
            .unwrap()
            .is_none());
    }
}
