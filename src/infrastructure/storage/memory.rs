//! In-memory storage implementation
//!
//! Implements every repository trait over `DashMap`s. Backs the service and
//! GraphQL tests, which run without a database.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use uuid::Uuid;

use crate::domain::{
    CartItem, CartLine, CartRepository, DomainError, DomainResult, Item, ItemChanges, ItemOrder,
    ItemRepository, NewItem, NewOrder, NewUser, Order, OrderItem, OrderRepository, OrderStatus,
    Permission, RepositoryProvider, User, UserRepository,
};
use crate::shared::PageWindow;

/// In-memory storage for development and testing
#[derive(Default)]
pub struct InMemoryStore {
    users: DashMap<String, User>,
    /// email -> user id
    emails: DashMap<String, String>,
    items: DashMap<String, Item>,
    cart_items: DashMap<String, CartItem>,
    /// (user id, item id) -> cart item id
    cart_keys: DashMap<(String, String), String>,
    orders: DashMap<String, Order>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn new_id() -> String {
    Uuid::new_v4().to_string()
}

fn user_not_found(id: &str) -> DomainError {
    DomainError::not_found("User", "id", id)
}

// ── Users ───────────────────────────────────────────────────────

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn create(&self, user: NewUser) -> DomainResult<User> {
        let id = new_id();
        match self.emails.entry(user.email.clone()) {
            Entry::Occupied(_) => {
                return Err(DomainError::Conflict(format!(
                    "A user with email {} already exists",
                    user.email
                )))
            }
            Entry::Vacant(slot) => {
                slot.insert(id.clone());
            }
        }

        let now = Utc::now();
        let user = User {
            id: id.clone(),
            name: user.name,
            email: user.email,
            password_hash: user.password_hash,
            permissions: Permission::normalize(user.permissions),
            reset_token: None,
            reset_token_expiry: None,
            created_at: now,
            updated_at: now,
        };
        self.users.insert(id, user.clone());
        Ok(user)
    }

    async fn find_by_id(&self, id: &str) -> DomainResult<Option<User>> {
        Ok(self.users.get(id).map(|u| u.clone()))
    }

    async fn find_by_email(&self, email: &str) -> DomainResult<Option<User>> {
        let id = self.emails.get(email).map(|id| id.clone());
        Ok(id.and_then(|id| self.users.get(&id).map(|u| u.clone())))
    }

    async fn find_by_reset_token(
        &self,
        token: &str,
        now: DateTime<Utc>,
    ) -> DomainResult<Option<User>> {
        Ok(self
            .users
            .iter()
            .find(|u| {
                u.reset_token.as_deref() == Some(token)
                    && u.reset_token_expiry.is_some_and(|expiry| expiry >= now)
            })
            .map(|u| u.clone()))
    }

    async fn list(&self) -> DomainResult<Vec<User>> {
        let mut users: Vec<User> = self.users.iter().map(|u| u.clone()).collect();
        users.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.email.cmp(&b.email)));
        Ok(users)
    }

    async fn count(&self) -> DomainResult<u64> {
        Ok(self.users.len() as u64)
    }

    async fn set_reset_token(
        &self,
        id: &str,
        token: &str,
        expiry: DateTime<Utc>,
    ) -> DomainResult<()> {
        let mut user = self.users.get_mut(id).ok_or_else(|| user_not_found(id))?;
        user.reset_token = Some(token.to_string());
        user.reset_token_expiry = Some(expiry);
        user.updated_at = Utc::now();
        Ok(())
    }

    async fn complete_password_reset(&self, id: &str, password_hash: &str) -> DomainResult<User> {
        let mut user = self.users.get_mut(id).ok_or_else(|| user_not_found(id))?;
        user.password_hash = password_hash.to_string();
        user.reset_token = None;
        user.reset_token_expiry = None;
        user.updated_at = Utc::now();
        Ok(user.clone())
    }

    async fn update_permissions(
        &self,
        id: &str,
        permissions: &[Permission],
    ) -> DomainResult<User> {
        let mut user = self.users.get_mut(id).ok_or_else(|| user_not_found(id))?;
        user.permissions = Permission::normalize(permissions.to_vec());
        user.updated_at = Utc::now();
        Ok(user.clone())
    }
}

// ── Items ───────────────────────────────────────────────────────

#[async_trait]
impl ItemRepository for InMemoryStore {
    async fn create(&self, item: NewItem) -> DomainResult<Item> {
        let now = Utc::now();
        let item = Item {
            id: new_id(),
            title: item.title,
            description: item.description,
            image: item.image,
            large_image: item.large_image,
            price: item.price,
            user_id: item.user_id,
            created_at: now,
            updated_at: now,
        };
        self.items.insert(item.id.clone(), item.clone());
        Ok(item)
    }

    async fn find_by_id(&self, id: &str) -> DomainResult<Option<Item>> {
        Ok(self.items.get(id).map(|i| i.clone()))
    }

    async fn list(&self, order: ItemOrder, window: PageWindow) -> DomainResult<Vec<Item>> {
        let mut items: Vec<Item> = self.items.iter().map(|i| i.clone()).collect();
        match order {
            ItemOrder::CreatedAtDesc => items.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
            ItemOrder::CreatedAtAsc => items.sort_by(|a, b| a.created_at.cmp(&b.created_at)),
            ItemOrder::PriceAsc => items.sort_by_key(|i| i.price),
            ItemOrder::PriceDesc => items.sort_by(|a, b| b.price.cmp(&a.price)),
            ItemOrder::TitleAsc => items.sort_by(|a, b| a.title.cmp(&b.title)),
            ItemOrder::TitleDesc => items.sort_by(|a, b| b.title.cmp(&a.title)),
        }
        Ok(items
            .into_iter()
            .skip(window.skip as usize)
            .take(window.first as usize)
            .collect())
    }

    async fn count(&self) -> DomainResult<u64> {
        Ok(self.items.len() as u64)
    }

    async fn update(&self, id: &str, changes: ItemChanges) -> DomainResult<Item> {
        let mut item = self
            .items
            .get_mut(id)
            .ok_or_else(|| DomainError::not_found("Item", "id", id))?;
        changes.apply(&mut item);
        item.updated_at = Utc::now();
        Ok(item.clone())
    }

    async fn delete(&self, id: &str) -> DomainResult<()> {
        if self.items.remove(id).is_none() {
            return Err(DomainError::not_found("Item", "id", id));
        }
        // Mirror the ON DELETE CASCADE of the relational schema.
        self.cart_items.retain(|_, ci| ci.item_id != id);
        self.cart_keys.retain(|(_, item_id), _| item_id != id);
        Ok(())
    }
}

// ── Cart ────────────────────────────────────────────────────────

#[async_trait]
impl CartRepository for InMemoryStore {
    async fn find_by_id(&self, id: &str) -> DomainResult<Option<CartItem>> {
        Ok(self.cart_items.get(id).map(|ci| ci.clone()))
    }

    async fn find_for_user_item(
        &self,
        user_id: &str,
        item_id: &str,
    ) -> DomainResult<Option<CartItem>> {
        let key = (user_id.to_string(), item_id.to_string());
        let id = self.cart_keys.get(&key).map(|id| id.clone());
        Ok(id.and_then(|id| self.cart_items.get(&id).map(|ci| ci.clone())))
    }

    async fn create(&self, user_id: &str, item_id: &str) -> DomainResult<CartItem> {
        let cart_item = CartItem {
            id: new_id(),
            user_id: user_id.to_string(),
            item_id: item_id.to_string(),
            quantity: 1,
            created_at: Utc::now(),
        };
        match self
            .cart_keys
            .entry((user_id.to_string(), item_id.to_string()))
        {
            Entry::Occupied(_) => {
                return Err(DomainError::Conflict(format!(
                    "Item {item_id} is already in the cart"
                )))
            }
            Entry::Vacant(slot) => {
                slot.insert(cart_item.id.clone());
            }
        }
        self.cart_items
            .insert(cart_item.id.clone(), cart_item.clone());
        Ok(cart_item)
    }

    async fn increment_quantity(&self, id: &str) -> DomainResult<CartItem> {
        let mut cart_item = self
            .cart_items
            .get_mut(id)
            .ok_or_else(|| DomainError::not_found("CartItem", "id", id))?;
        cart_item.quantity += 1;
        Ok(cart_item.clone())
    }

    async fn delete(&self, id: &str) -> DomainResult<()> {
        let (_, removed) = self
            .cart_items
            .remove(id)
            .ok_or_else(|| DomainError::not_found("CartItem", "id", id))?;
        self.cart_keys.remove(&(removed.user_id, removed.item_id));
        Ok(())
    }

    async fn lines_for_user(&self, user_id: &str) -> DomainResult<Vec<CartLine>> {
        let mut rows: Vec<CartItem> = self
            .cart_items
            .iter()
            .filter(|ci| ci.user_id == user_id)
            .map(|ci| ci.clone())
            .collect();
        rows.sort_by(|a, b| a.created_at.cmp(&b.created_at));

        Ok(rows
            .into_iter()
            .filter_map(|cart_item| {
                let item = self.items.get(&cart_item.item_id)?.clone();
                Some(CartLine { cart_item, item })
            })
            .collect())
    }

    async fn clear_for_user(&self, user_id: &str) -> DomainResult<u64> {
        let mut removed = 0u64;
        self.cart_items.retain(|_, ci| {
            let keep = ci.user_id != user_id;
            if !keep {
                removed += 1;
            }
            keep
        });
        self.cart_keys.retain(|(owner, _), _| owner != user_id);
        Ok(removed)
    }
}

// ── Orders ──────────────────────────────────────────────────────

#[async_trait]
impl OrderRepository for InMemoryStore {
    async fn create_pending(&self, order: NewOrder) -> DomainResult<Order> {
        let now = Utc::now();
        let id = new_id();
        let items = order
            .items
            .into_iter()
            .map(|item| OrderItem {
                id: new_id(),
                order_id: id.clone(),
                user_id: order.user_id.clone(),
                title: item.title,
                description: item.description,
                image: item.image,
                large_image: item.large_image,
                price: item.price,
                quantity: item.quantity,
            })
            .collect();

        let order = Order {
            id: id.clone(),
            user_id: order.user_id,
            total: order.total,
            charge: None,
            status: OrderStatus::Pending,
            items,
            created_at: now,
            updated_at: now,
        };
        self.orders.insert(id, order.clone());
        Ok(order)
    }

    async fn confirm(&self, id: &str, charge_id: &str, total: i64) -> DomainResult<Order> {
        let mut order = self
            .orders
            .get_mut(id)
            .ok_or_else(|| DomainError::not_found("Order", "id", id))?;
        order.status = OrderStatus::Paid;
        order.charge = Some(charge_id.to_string());
        order.total = total;
        order.updated_at = Utc::now();
        Ok(order.clone())
    }

    async fn mark_failed(&self, id: &str) -> DomainResult<()> {
        let mut order = self
            .orders
            .get_mut(id)
            .ok_or_else(|| DomainError::not_found("Order", "id", id))?;
        order.status = OrderStatus::Failed;
        order.updated_at = Utc::now();
        Ok(())
    }

    async fn find_by_id(&self, id: &str) -> DomainResult<Option<Order>> {
        Ok(self.orders.get(id).map(|o| o.clone()))
    }

    async fn list_for_user(
        &self,
        user_id: &str,
        status: Option<OrderStatus>,
    ) -> DomainResult<Vec<Order>> {
        let mut orders: Vec<Order> = self
            .orders
            .iter()
            .filter(|o| o.user_id == user_id && status.map_or(true, |s| o.status == s))
            .map(|o| o.clone())
            .collect();
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(orders)
    }
}

impl RepositoryProvider for InMemoryStore {
    fn users(&self) -> &dyn UserRepository {
        self
    }

    fn items(&self) -> &dyn ItemRepository {
        self
    }

    fn cart(&self) -> &dyn CartRepository {
        self
    }

    fn orders(&self) -> &dyn OrderRepository {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_user(email: &str) -> NewUser {
        NewUser {
            name: "Test".into(),
            email: email.into(),
            password_hash: "hash".into(),
            permissions: vec![Permission::User],
        }
    }

    #[tokio::test]
    async fn duplicate_email_is_a_conflict() {
        let store = InMemoryStore::new();
        UserRepository::create(&store, new_user("a@b.co")).await.unwrap();
        let err = UserRepository::create(&store, new_user("a@b.co"))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));
    }

    #[tokio::test]
    async fn deleting_an_item_drops_its_cart_rows() {
        let store = InMemoryStore::new();
        let user = UserRepository::create(&store, new_user("a@b.co")).await.unwrap();
        let item = ItemRepository::create(
            &store,
            NewItem {
                title: "Hat".into(),
                description: "Red".into(),
                image: None,
                large_image: None,
                price: 500,
                user_id: user.id.clone(),
            },
        )
        .await
        .unwrap();
        CartRepository::create(&store, &user.id, &item.id).await.unwrap();

        ItemRepository::delete(&store, &item.id).await.unwrap();

        assert!(store.lines_for_user(&user.id).await.unwrap().is_empty());
        assert!(store
            .find_for_user_item(&user.id, &item.id)
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn clear_counts_only_the_callers_rows() {
        let store = InMemoryStore::new();
        let alice = UserRepository::create(&store, new_user("alice@b.co")).await.unwrap();
        let bob = UserRepository::create(&store, new_user("bob@b.co")).await.unwrap();
        let mut items = Vec::new();
        for title in ["Hat", "Socks"] {
            let item = ItemRepository::create(
                &store,
                NewItem {
                    title: title.into(),
                    description: "Red".into(),
                    image: None,
                    large_image: None,
                    price: 500,
                    user_id: alice.id.clone(),
                },
            )
            .await
            .unwrap();
            items.push(item);
        }
        for item in &items {
            CartRepository::create(&store, &alice.id, &item.id).await.unwrap();
        }
        CartRepository::create(&store, &bob.id, &items[0].id).await.unwrap();

        assert_eq!(store.clear_for_user(&alice.id).await.unwrap(), 2);
        assert_eq!(store.clear_for_user(&alice.id).await.unwrap(), 0);
        assert_eq!(store.lines_for_user(&bob.id).await.unwrap().len(), 1);
        assert!(store
            .find_for_user_item(&alice.id, &items[0].id)
            .await
            .unwrap()
            .is_none());
    }
}
