use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel,
    PaginatorTrait, QueryFilter, QueryOrder, Set,
};

use super::{db_err, db_write_err};
use crate::domain::{
    DomainError, DomainResult, NewUser, Permission, User, UserRepository,
};
use crate::infrastructure::database::entities::user;

pub struct SeaOrmUserRepository {
    db: DatabaseConnection,
}

impl SeaOrmUserRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    async fn require(&self, id: &str) -> DomainResult<user::Model> {
        user::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err)?
            .ok_or_else(|| DomainError::not_found("User", "id", id))
    }
}

// ── Conversion helpers ──────────────────────────────────────────

fn permissions_to_column(permissions: &[Permission]) -> String {
    let tags: Vec<&str> = permissions.iter().map(Permission::as_str).collect();
    serde_json::to_string(&tags).unwrap_or_else(|_| "[]".to_string())
}

fn permissions_from_column(raw: &str) -> Vec<Permission> {
    let tags: Vec<String> = serde_json::from_str(raw).unwrap_or_default();
    Permission::normalize(tags.iter().filter_map(|t| t.parse().ok()).collect())
}

fn user_model_to_domain(model: user::Model) -> User {
    User {
        permissions: permissions_from_column(&model.permissions),
        id: model.id,
        name: model.name,
        email: model.email,
        password_hash: model.password,
        reset_token: model.reset_token,
        reset_token_expiry: model.reset_token_expiry,
        created_at: model.created_at,
        updated_at: model.updated_at,
    }
}

// ── Repository implementation ───────────────────────────────────

#[async_trait]
impl UserRepository for SeaOrmUserRepository {
    async fn create(&self, new_user: NewUser) -> DomainResult<User> {
        let now = Utc::now();
        let email = new_user.email.clone();

        let model = user::ActiveModel {
            id: Set(uuid::Uuid::new_v4().to_string()),
            name: Set(new_user.name),
            email: Set(new_user.email),
            password: Set(new_user.password_hash),
            permissions: Set(permissions_to_column(&Permission::normalize(
                new_user.permissions,
            ))),
            reset_token: Set(None),
            reset_token_expiry: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let saved = model.insert(&self.db).await.map_err(|e| {
            db_write_err(e, || format!("A user with email {} already exists", email))
        })?;
        Ok(user_model_to_domain(saved))
    }

    async fn find_by_id(&self, id: &str) -> DomainResult<Option<User>> {
        let model = user::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err)?;
        Ok(model.map(user_model_to_domain))
    }

    async fn find_by_email(&self, email: &str) -> DomainResult<Option<User>> {
        let model = user::Entity::find()
            .filter(user::Column::Email.eq(email))
            .one(&self.db)
            .await
            .map_err(db_err)?;
        Ok(model.map(user_model_to_domain))
    }

    async fn find_by_reset_token(
        &self,
        token: &str,
        now: DateTime<Utc>,
    ) -> DomainResult<Option<User>> {
        let model = user::Entity::find()
            .filter(user::Column::ResetToken.eq(token))
            .filter(user::Column::ResetTokenExpiry.gte(now))
            .one(&self.db)
            .await
            .map_err(db_err)?;
        Ok(model.map(user_model_to_domain))
    }

    async fn list(&self) -> DomainResult<Vec<User>> {
        let models = user::Entity::find()
            .order_by_asc(user::Column::CreatedAt)
            .order_by_asc(user::Column::Email)
            .all(&self.db)
            .await
            .map_err(db_err)?;
        Ok(models.into_iter().map(user_model_to_domain).collect())
    }

    async fn count(&self) -> DomainResult<u64> {
        user::Entity::find().count(&self.db).await.map_err(db_err)
    }

    async fn set_reset_token(
        &self,
        id: &str,
        token: &str,
        expiry: DateTime<Utc>,
    ) -> DomainResult<()> {
        let mut active = self.require(id).await?.into_active_model();
        active.reset_token = Set(Some(token.to_string()));
        active.reset_token_expiry = Set(Some(expiry));
        active.updated_at = Set(Utc::now());
        active.update(&self.db).await.map_err(db_err)?;
        Ok(())
    }

    async fn complete_password_reset(&self, id: &str, password_hash: &str) -> DomainResult<User> {
        let mut active = self.require(id).await?.into_active_model();
        active.password = Set(password_hash.to_string());
        active.reset_token = Set(None);
        active.reset_token_expiry = Set(None);
        active.updated_at = Set(Utc::now());
        let saved = active.update(&self.db).await.map_err(db_err)?;
        Ok(user_model_to_domain(saved))
    }

    async fn update_permissions(
        &self,
        id: &str,
        permissions: &[Permission],
    ) -> DomainResult<User> {
        let mut active = self.require(id).await?.into_active_model();
        active.permissions = Set(permissions_to_column(&Permission::normalize(
            permissions.to_vec(),
        )));
        active.updated_at = Set(Utc::now());
        let saved = active.update(&self.db).await.map_err(db_err)?;
        Ok(user_model_to_domain(saved))
    }
}
