use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, DatabaseConnection, EntityTrait, IntoActiveModel, PaginatorTrait,
    QueryOrder, QuerySelect, Select, Set,
};

use super::db_err;
use crate::domain::{
    DomainError, DomainResult, Item, ItemChanges, ItemOrder, ItemRepository, NewItem,
};
use crate::infrastructure::database::entities::item;
use crate::shared::PageWindow;

pub struct SeaOrmItemRepository {
    db: DatabaseConnection,
}

impl SeaOrmItemRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

pub(super) fn item_model_to_domain(model: item::Model) -> Item {
    Item {
        id: model.id,
        title: model.title,
        description: model.description,
        image: model.image,
        large_image: model.large_image,
        price: model.price,
        user_id: model.user_id,
        created_at: model.created_at,
        updated_at: model.updated_at,
    }
}

/// Primary sort column plus id as a tiebreaker, so paging is stable.
fn apply_order(query: Select<item::Entity>, order: ItemOrder) -> Select<item::Entity> {
    let query = match order {
        ItemOrder::CreatedAtDesc => query.order_by_desc(item::Column::CreatedAt),
        ItemOrder::CreatedAtAsc => query.order_by_asc(item::Column::CreatedAt),
        ItemOrder::PriceAsc => query.order_by_asc(item::Column::Price),
        ItemOrder::PriceDesc => query.order_by_desc(item::Column::Price),
        ItemOrder::TitleAsc => query.order_by_asc(item::Column::Title),
        ItemOrder::TitleDesc => query.order_by_desc(item::Column::Title),
    };
    query.order_by_asc(item::Column::Id)
}

#[async_trait]
impl ItemRepository for SeaOrmItemRepository {
    async fn create(&self, new_item: NewItem) -> DomainResult<Item> {
        let now = Utc::now();
        let model = item::ActiveModel {
            id: Set(uuid::Uuid::new_v4().to_string()),
            title: Set(new_item.title),
            description: Set(new_item.description),
            image: Set(new_item.image),
            large_image: Set(new_item.large_image),
            price: Set(new_item.price),
            user_id: Set(new_item.user_id),
            created_at: Set(now),
            updated_at: Set(now),
        };
        let saved = model.insert(&self.db).await.map_err(db_err)?;
        Ok(item_model_to_domain(saved))
    }

    async fn find_by_id(&self, id: &str) -> DomainResult<Option<Item>> {
        let model = item::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err)?;
        Ok(model.map(item_model_to_domain))
    }

    async fn list(&self, order: ItemOrder, window: PageWindow) -> DomainResult<Vec<Item>> {
        let models = apply_order(item::Entity::find(), order)
            .offset(window.skip)
            .limit(window.first)
            .all(&self.db)
            .await
            .map_err(db_err)?;
        Ok(models.into_iter().map(item_model_to_domain).collect())
    }

    async fn count(&self) -> DomainResult<u64> {
        item::Entity::find().count(&self.db).await.map_err(db_err)
    }

    async fn update(&self, id: &str, changes: ItemChanges) -> DomainResult<Item> {
        let model = item::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err)?
            .ok_or_else(|| DomainError::not_found("Item", "id", id))?;

        let mut active = model.into_active_model();
        if let Some(title) = changes.title {
            active.title = Set(title);
        }
        if let Some(description) = changes.description {
            active.description = Set(description);
        }
        if let Some(image) = changes.image {
            active.image = Set(Some(image));
        }
        if let Some(large_image) = changes.large_image {
            active.large_image = Set(Some(large_image));
        }
        if let Some(price) = changes.price {
            active.price = Set(price);
        }
        active.updated_at = Set(Utc::now());

        let saved = active.update(&self.db).await.map_err(db_err)?;
        Ok(item_model_to_domain(saved))
    }

    async fn delete(&self, id: &str) -> DomainResult<()> {
        let result = item::Entity::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(db_err)?;
        if result.rows_affected == 0 {
            return Err(DomainError::not_found("Item", "id", id));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{NewUser, Permission, UserRepository};
    use crate::infrastructure::database::repositories::test_support::migrated_db;
    use crate::infrastructure::database::repositories::user_repository::SeaOrmUserRepository;

    async fn seeded() -> (SeaOrmItemRepository, String) {
        let db = migrated_db().await;
        let owner = SeaOrmUserRepository::new(db.clone())
            .create(NewUser {
                name: "Seller".to_string(),
                email: "seller@example.com".to_string(),
                password_hash: "hash".to_string(),
                permissions: vec![Permission::User],
            })
            .await
            .unwrap();
        (SeaOrmItemRepository::new(db), owner.id)
    }

    fn new_item(owner: &str, title: &str, price: i64) -> NewItem {
        NewItem {
            title: title.to_string(),
            description: format!("{} description", title),
            image: None,
            large_image: None,
            price,
            user_id: owner.to_string(),
        }
    }

    #[tokio::test]
    async fn lists_by_price_with_window() {
        let (repo, owner) = seeded().await;
        for (title, price) in [("Hat", 500), ("Coat", 9000), ("Socks", 150)] {
            repo.create(new_item(&owner, title, price)).await.unwrap();
        }

        let page = repo
            .list(ItemOrder::PriceAsc, PageWindow { skip: 1, first: 2 })
            .await
            .unwrap();
        let titles: Vec<&str> = page.iter().map(|i| i.title.as_str()).collect();
        assert_eq!(titles, vec!["Hat", "Coat"]);
        assert_eq!(repo.count().await.unwrap(), 3);
    }

    #[tokio::test]
    async fn update_applies_only_given_fields() {
        let (repo, owner) = seeded().await;
        let item = repo.create(new_item(&owner, "Hat", 500)).await.unwrap();

        let updated = repo
            .update(
                &item.id,
                ItemChanges {
                    price: Some(750),
                    ..ItemChanges::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.id, item.id);
        assert_eq!(updated.title, "Hat");
        assert_eq!(updated.price, 750);
    }

    #[tokio::test]
    async fn delete_missing_item_is_not_found() {
        let (repo, _) = seeded().await;
        let err = repo.delete("missing").await.unwrap_err();
        assert!(matches!(err, DomainError::NotFound { .. }));
    }
}
