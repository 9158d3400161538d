use async_trait::async_trait;
use chrono::Utc;
use sea_orm::prelude::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};

use super::item_repository::item_model_to_domain;
use super::{db_err, db_write_err};
use crate::domain::{CartItem, CartLine, CartRepository, DomainError, DomainResult};
use crate::infrastructure::database::entities::{cart_item, item};

pub struct SeaOrmCartRepository {
    db: DatabaseConnection,
}

impl SeaOrmCartRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

fn cart_model_to_domain(model: cart_item::Model) -> CartItem {
    CartItem {
        id: model.id,
        user_id: model.user_id,
        item_id: model.item_id,
        quantity: model.quantity,
        created_at: model.created_at,
    }
}

#[async_trait]
impl CartRepository for SeaOrmCartRepository {
    async fn find_by_id(&self, id: &str) -> DomainResult<Option<CartItem>> {
        let model = cart_item::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err)?;
        Ok(model.map(cart_model_to_domain))
    }

    async fn find_for_user_item(
        &self,
        user_id: &str,
        item_id: &str,
    ) -> DomainResult<Option<CartItem>> {
        let model = cart_item::Entity::find()
            .filter(cart_item::Column::UserId.eq(user_id))
            .filter(cart_item::Column::ItemId.eq(item_id))
            .one(&self.db)
            .await
            .map_err(db_err)?;
        Ok(model.map(cart_model_to_domain))
    }

    async fn create(&self, user_id: &str, item_id: &str) -> DomainResult<CartItem> {
        let model = cart_item::ActiveModel {
            id: Set(uuid::Uuid::new_v4().to_string()),
            user_id: Set(user_id.to_string()),
            item_id: Set(item_id.to_string()),
            quantity: Set(1),
            created_at: Set(Utc::now()),
        };
        let saved = model.insert(&self.db).await.map_err(|e| {
            db_write_err(e, || format!("Item {} is already in the cart", item_id))
        })?;
        Ok(cart_model_to_domain(saved))
    }

    async fn increment_quantity(&self, id: &str) -> DomainResult<CartItem> {
        // Single UPDATE so concurrent adds never lose an increment.
        let result = cart_item::Entity::update_many()
            .col_expr(
                cart_item::Column::Quantity,
                Expr::col(cart_item::Column::Quantity).add(1),
            )
            .filter(cart_item::Column::Id.eq(id))
            .exec(&self.db)
            .await
            .map_err(db_err)?;
        if result.rows_affected == 0 {
            return Err(DomainError::not_found("CartItem", "id", id));
        }

        self.find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found("CartItem", "id", id))
    }

    async fn delete(&self, id: &str) -> DomainResult<()> {
        let result = cart_item::Entity::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(db_err)?;
        if result.rows_affected == 0 {
            return Err(DomainError::not_found("CartItem", "id", id));
        }
        Ok(())
    }

    async fn lines_for_user(&self, user_id: &str) -> DomainResult<Vec<CartLine>> {
        let rows = cart_item::Entity::find()
            .filter(cart_item::Column::UserId.eq(user_id))
            .order_by_asc(cart_item::Column::CreatedAt)
            .order_by_asc(cart_item::Column::Id)
            .find_also_related(item::Entity)
            .all(&self.db)
            .await
            .map_err(db_err)?;

        // Rows whose item vanished are skipped; the cascade normally removes them.
        Ok(rows
            .into_iter()
            .filter_map(|(cart, item)| {
                item.map(|item| CartLine {
                    cart_item: cart_model_to_domain(cart),
                    item: item_model_to_domain(item),
                })
            })
            .collect())
    }

    async fn clear_for_user(&self, user_id: &str) -> DomainResult<u64> {
        let result = cart_item::Entity::delete_many()
            .filter(cart_item::Column::UserId.eq(user_id))
            .exec(&self.db)
            .await
            .map_err(db_err)?;
        Ok(result.rows_affected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ItemRepository, NewItem, NewUser, Permission, UserRepository};
    use crate::infrastructure::database::repositories::item_repository::SeaOrmItemRepository;
    use crate::infrastructure::database::repositories::test_support::migrated_db;
    use crate::infrastructure::database::repositories::user_repository::SeaOrmUserRepository;

    struct Fixture {
        cart: SeaOrmCartRepository,
        items: SeaOrmItemRepository,
        user_id: String,
        item_id: String,
    }

    async fn fixture() -> Fixture {
        let db = migrated_db().await;
        let user = SeaOrmUserRepository::new(db.clone())
            .create(NewUser {
                name: "Shopper".to_string(),
                email: "shopper@example.com".to_string(),
                password_hash: "hash".to_string(),
                permissions: vec![Permission::User],
            })
            .await
            .unwrap();
        let items = SeaOrmItemRepository::new(db.clone());
        let item = items
            .create(NewItem {
                title: "Hat".to_string(),
                description: "Warm".to_string(),
                image: None,
                large_image: None,
                price: 1500,
                user_id: user.id.clone(),
            })
            .await
            .unwrap();
        Fixture {
            cart: SeaOrmCartRepository::new(db),
            items,
            user_id: user.id,
            item_id: item.id,
        }
    }

    #[tokio::test]
    async fn second_create_for_same_pair_conflicts() {
        let f = fixture().await;
        f.cart.create(&f.user_id, &f.item_id).await.unwrap();

        let err = f.cart.create(&f.user_id, &f.item_id).await.unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));
    }

    #[tokio::test]
    async fn increment_and_join_lines() {
        let f = fixture().await;
        let row = f.cart.create(&f.user_id, &f.item_id).await.unwrap();

        let bumped = f.cart.increment_quantity(&row.id).await.unwrap();
        assert_eq!(bumped.quantity, 2);

        let lines = f.cart.lines_for_user(&f.user_id).await.unwrap();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].item.id, f.item_id);
        assert_eq!(lines[0].line_total(), Some(3000));
    }

    #[tokio::test]
    async fn deleting_item_cascades_to_cart() {
        let f = fixture().await;
        f.cart.create(&f.user_id, &f.item_id).await.unwrap();

        f.items.delete(&f.item_id).await.unwrap();
        assert!(f.cart.lines_for_user(&f.user_id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn clear_is_idempotent() {
        let f = fixture().await;
        f.cart.create(&f.user_id, &f.item_id).await.unwrap();

        assert_eq!(f.cart.clear_for_user(&f.user_id).await.unwrap(), 1);
        assert_eq!(f.cart.clear_for_user(&f.user_id).await.unwrap(), 0);
    }
}
