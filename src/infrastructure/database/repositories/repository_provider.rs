//! SeaORM implementation of RepositoryProvider

use sea_orm::DatabaseConnection;

use crate::domain::{
    CartRepository, ItemRepository, OrderRepository, RepositoryProvider, UserRepository,
};

use super::cart_repository::SeaOrmCartRepository;
use super::item_repository::SeaOrmItemRepository;
use super::order_repository::SeaOrmOrderRepository;
use super::user_repository::SeaOrmUserRepository;

/// Unified repository provider backed by SeaORM.
///
/// Holds one connection pool and exposes per-aggregate repository accessors.
///
/// ```ignore
/// let repos = SeaOrmRepositoryProvider::new(db.clone());
/// let user = repos.users().find_by_email("wes@example.com").await?;
/// let lines = repos.cart().lines_for_user(&user.id).await?;
/// ```
pub struct SeaOrmRepositoryProvider {
    users: SeaOrmUserRepository,
    items: SeaOrmItemRepository,
    cart: SeaOrmCartRepository,
    orders: SeaOrmOrderRepository,
}

impl SeaOrmRepositoryProvider {
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            users: SeaOrmUserRepository::new(db.clone()),
            items: SeaOrmItemRepository::new(db.clone()),
            cart: SeaOrmCartRepository::new(db.clone()),
            orders: SeaOrmOrderRepository::new(db),
        }
    }
}

impl RepositoryProvider for SeaOrmRepositoryProvider {
    fn users(&self) -> &dyn UserRepository {
        &self.users
    }

    fn items(&self) -> &dyn ItemRepository {
        &self.items
    }

    fn cart(&self) -> &dyn CartRepository {
        &self.cart
    }

    fn orders(&self) -> &dyn OrderRepository {
        &self.orders
    }
}
