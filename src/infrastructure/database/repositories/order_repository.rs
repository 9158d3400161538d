use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};

use super::db_err;
use crate::domain::{
    DomainError, DomainResult, NewOrder, Order, OrderItem, OrderRepository, OrderStatus,
};
use crate::infrastructure::database::entities::{order, order_item};

pub struct SeaOrmOrderRepository {
    db: DatabaseConnection,
}

impl SeaOrmOrderRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    async fn require(&self, id: &str) -> DomainResult<order::Model> {
        order::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err)?
            .ok_or_else(|| DomainError::not_found("Order", "id", id))
    }

    async fn items_of(&self, order_id: &str) -> DomainResult<Vec<order_item::Model>> {
        order_item::Entity::find()
            .filter(order_item::Column::OrderId.eq(order_id))
            .order_by_asc(order_item::Column::Position)
            .all(&self.db)
            .await
            .map_err(db_err)
    }
}

// ── Conversion helpers ──────────────────────────────────────────

fn entity_status_to_domain(status: order::OrderStatus) -> OrderStatus {
    match status {
        order::OrderStatus::Pending => OrderStatus::Pending,
        order::OrderStatus::Paid => OrderStatus::Paid,
        order::OrderStatus::Failed => OrderStatus::Failed,
    }
}

fn domain_status_to_entity(status: OrderStatus) -> order::OrderStatus {
    match status {
        OrderStatus::Pending => order::OrderStatus::Pending,
        OrderStatus::Paid => order::OrderStatus::Paid,
        OrderStatus::Failed => order::OrderStatus::Failed,
    }
}

fn order_item_model_to_domain(model: order_item::Model) -> OrderItem {
    OrderItem {
        id: model.id,
        order_id: model.order_id,
        user_id: model.user_id,
        title: model.title,
        description: model.description,
        image: model.image,
        large_image: model.large_image,
        price: model.price,
        quantity: model.quantity,
    }
}

fn order_model_to_domain(model: order::Model, items: Vec<order_item::Model>) -> Order {
    Order {
        id: model.id,
        user_id: model.user_id,
        total: model.total,
        charge: model.charge,
        status: entity_status_to_domain(model.status),
        items: items.into_iter().map(order_item_model_to_domain).collect(),
        created_at: model.created_at,
        updated_at: model.updated_at,
    }
}

// ── Repository implementation ───────────────────────────────────

#[async_trait]
impl OrderRepository for SeaOrmOrderRepository {
    async fn create_pending(&self, new_order: NewOrder) -> DomainResult<Order> {
        let now = Utc::now();
        let order_id = uuid::Uuid::new_v4().to_string();

        let item_models: Vec<order_item::Model> = new_order
            .items
            .into_iter()
            .enumerate()
            .map(|(position, item)| order_item::Model {
                id: uuid::Uuid::new_v4().to_string(),
                order_id: order_id.clone(),
                user_id: new_order.user_id.clone(),
                title: item.title,
                description: item.description,
                image: item.image,
                large_image: item.large_image,
                price: item.price,
                quantity: item.quantity,
                position: position as i32,
            })
            .collect();

        let txn = self.db.begin().await.map_err(db_err)?;

        let saved = order::ActiveModel {
            id: Set(order_id),
            user_id: Set(new_order.user_id),
            total: Set(new_order.total),
            charge: Set(None),
            status: Set(order::OrderStatus::Pending),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&txn)
        .await
        .map_err(db_err)?;

        if !item_models.is_empty() {
            order_item::Entity::insert_many(
                item_models.iter().cloned().map(order_item::ActiveModel::from),
            )
            .exec(&txn)
            .await
            .map_err(db_err)?;
        }

        txn.commit().await.map_err(db_err)?;
        Ok(order_model_to_domain(saved, item_models))
    }

    async fn confirm(&self, id: &str, charge_id: &str, total: i64) -> DomainResult<Order> {
        let mut active = self.require(id).await?.into_active_model();
        active.status = Set(order::OrderStatus::Paid);
        active.charge = Set(Some(charge_id.to_string()));
        active.total = Set(total);
        active.updated_at = Set(Utc::now());
        let saved = active.update(&self.db).await.map_err(db_err)?;

        let items = self.items_of(id).await?;
        Ok(order_model_to_domain(saved, items))
    }

    async fn mark_failed(&self, id: &str) -> DomainResult<()> {
        let mut active = self.require(id).await?.into_active_model();
        active.status = Set(order::OrderStatus::Failed);
        active.updated_at = Set(Utc::now());
        active.update(&self.db).await.map_err(db_err)?;
        Ok(())
    }

    async fn find_by_id(&self, id: &str) -> DomainResult<Option<Order>> {
        let Some(model) = order::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err)?
        else {
            return Ok(None);
        };
        let items = self.items_of(id).await?;
        Ok(Some(order_model_to_domain(model, items)))
    }

    async fn list_for_user(
        &self,
        user_id: &str,
        status: Option<OrderStatus>,
    ) -> DomainResult<Vec<Order>> {
        let mut query = order::Entity::find().filter(order::Column::UserId.eq(user_id));
        if let Some(status) = status {
            query = query.filter(order::Column::Status.eq(domain_status_to_entity(status)));
        }
        let orders = query
            .order_by_desc(order::Column::CreatedAt)
            .order_by_desc(order::Column::Id)
            .all(&self.db)
            .await
            .map_err(db_err)?;
        if orders.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<String> = orders.iter().map(|o| o.id.clone()).collect();
        let mut items_by_order: HashMap<String, Vec<order_item::Model>> = HashMap::new();
        for item in order_item::Entity::find()
            .filter(order_item::Column::OrderId.is_in(ids))
            .order_by_asc(order_item::Column::Position)
            .all(&self.db)
            .await
            .map_err(db_err)?
        {
            items_by_order
                .entry(item.order_id.clone())
                .or_default()
                .push(item);
        }

        Ok(orders
            .into_iter()
            .map(|o| {
                let items = items_by_order.remove(&o.id).unwrap_or_default();
                order_model_to_domain(o, items)
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{NewOrderItem, NewUser, Permission, UserRepository};
    use crate::infrastructure::database::repositories::test_support::migrated_db;
    use crate::infrastructure::database::repositories::user_repository::SeaOrmUserRepository;

    async fn repo_with_user() -> (SeaOrmOrderRepository, String) {
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
        (SeaOrmOrderRepository::new(db), user.id)
    }

    fn pending(user_id: &str) -> NewOrder {
        NewOrder {
            user_id: user_id.to_string(),
            total: 3500,
            items: vec![
                NewOrderItem {
                    title: "Hat".to_string(),
                    description: "Warm".to_string(),
                    image: None,
                    large_image: None,
                    price: 1000,
                    quantity: 2,
                },
                NewOrderItem {
                    title: "Socks".to_string(),
                    description: "Wool".to_string(),
                    image: Some("socks.jpg".to_string()),
                    large_image: None,
                    price: 1500,
                    quantity: 1,
                },
            ],
        }
    }

    #[tokio::test]
    async fn pending_order_is_stored_with_items() {
        let (repo, user_id) = repo_with_user().await;
        let order = repo.create_pending(pending(&user_id)).await.unwrap();
        assert_eq!(order.status, OrderStatus::Pending);
        assert!(order.charge.is_none());

        let loaded = repo.find_by_id(&order.id).await.unwrap().unwrap();
        assert_eq!(loaded.items.len(), 2);
        assert!(loaded.items.iter().all(|i| i.order_id == order.id));
        assert!(loaded.items.iter().all(|i| i.user_id == user_id));
    }

    #[tokio::test]
    async fn items_keep_cart_sequence() {
        let (repo, user_id) = repo_with_user().await;
        let mut new_order = pending(&user_id);
        for n in 0..8 {
            let mut line = new_order.items[0].clone();
            line.title = format!("Extra {n}");
            new_order.items.push(line);
        }
        let expected: Vec<String> = new_order.items.iter().map(|i| i.title.clone()).collect();

        let order = repo.create_pending(new_order).await.unwrap();
        let loaded = repo.find_by_id(&order.id).await.unwrap().unwrap();
        let titles: Vec<String> = loaded.items.iter().map(|i| i.title.clone()).collect();
        assert_eq!(titles, expected);

        let listed = repo.list_for_user(&user_id, None).await.unwrap();
        let titles: Vec<String> = listed[0].items.iter().map(|i| i.title.clone()).collect();
        assert_eq!(titles, expected);
    }

    #[tokio::test]
    async fn confirm_records_charge() {
        let (repo, user_id) = repo_with_user().await;
        let order = repo.create_pending(pending(&user_id)).await.unwrap();

        let paid = repo.confirm(&order.id, "ch_123", 3500).await.unwrap();
        assert_eq!(paid.status, OrderStatus::Paid);
        assert_eq!(paid.charge.as_deref(), Some("ch_123"));
        assert_eq!(paid.items.len(), 2);
    }

    #[tokio::test]
    async fn list_filters_by_status() {
        let (repo, user_id) = repo_with_user().await;
        let paid = repo.create_pending(pending(&user_id)).await.unwrap();
        repo.confirm(&paid.id, "ch_1", 3500).await.unwrap();
        let failed = repo.create_pending(pending(&user_id)).await.unwrap();
        repo.mark_failed(&failed.id).await.unwrap();

        let all = repo.list_for_user(&user_id, None).await.unwrap();
        assert_eq!(all.len(), 2);

        let only_paid = repo
            .list_for_user(&user_id, Some(OrderStatus::Paid))
            .await
            .unwrap();
        assert_eq!(only_paid.len(), 1);
        assert_eq!(only_paid[0].id, paid.id);
        assert_eq!(only_paid[0].items.len(), 2);
    }

    #[tokio::test]
    async fn confirm_missing_order_is_not_found() {
        let (repo, _) = repo_with_user().await;
        let err = repo.confirm("missing", "ch_1", 1).await.unwrap_err();
        assert!(matches!(err, DomainError::NotFound { .. }));
    }
}
