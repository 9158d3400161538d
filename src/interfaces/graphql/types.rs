//! GraphQL output objects and enums.
//!
//! Domain types are wrapped rather than exposed directly so secrets
//! (password hash, reset token) never reach the schema.

use async_graphql::{Context, Enum, Object, SimpleObject, ID};
use chrono::{DateTime, Utc};

use super::error::GraphqlResultExt;
use super::{request_context, services};
use crate::application::{has_permission, Message};
use crate::domain::{
    CartItem, CartLine, DomainError, Item, ItemOrder, Order, OrderItem, OrderStatus, Permission,
    User,
};

// ── Enums ───────────────────────────────────────────────────────

#[derive(Enum, Copy, Clone, Debug, Eq, PartialEq)]
#[graphql(name = "Permission", rename_items = "UPPERCASE")]
pub enum PermissionTag {
    Admin,
    User,
    ItemCreate,
    ItemUpdate,
    ItemDelete,
    PermissionUpdate,
}

impl From<Permission> for PermissionTag {
    fn from(p: Permission) -> Self {
        match p {
            Permission::Admin => Self::Admin,
            Permission::User => Self::User,
            Permission::ItemCreate => Self::ItemCreate,
            Permission::ItemUpdate => Self::ItemUpdate,
            Permission::ItemDelete => Self::ItemDelete,
            Permission::PermissionUpdate => Self::PermissionUpdate,
        }
    }
}

impl From<PermissionTag> for Permission {
    fn from(p: PermissionTag) -> Self {
        match p {
            PermissionTag::Admin => Self::Admin,
            PermissionTag::User => Self::User,
            PermissionTag::ItemCreate => Self::ItemCreate,
            PermissionTag::ItemUpdate => Self::ItemUpdate,
            PermissionTag::ItemDelete => Self::ItemDelete,
            PermissionTag::PermissionUpdate => Self::PermissionUpdate,
        }
    }
}

#[derive(Enum, Copy, Clone, Debug, Eq, PartialEq, Default)]
pub enum ItemOrderBy {
    #[default]
    #[graphql(name = "createdAt_DESC")]
    CreatedAtDesc,
    #[graphql(name = "createdAt_ASC")]
    CreatedAtAsc,
    #[graphql(name = "price_ASC")]
    PriceAsc,
    #[graphql(name = "price_DESC")]
    PriceDesc,
    #[graphql(name = "title_ASC")]
    TitleAsc,
    #[graphql(name = "title_DESC")]
    TitleDesc,
}

impl From<ItemOrderBy> for ItemOrder {
    fn from(o: ItemOrderBy) -> Self {
        match o {
            ItemOrderBy::CreatedAtDesc => Self::CreatedAtDesc,
            ItemOrderBy::CreatedAtAsc => Self::CreatedAtAsc,
            ItemOrderBy::PriceAsc => Self::PriceAsc,
            ItemOrderBy::PriceDesc => Self::PriceDesc,
            ItemOrderBy::TitleAsc => Self::TitleAsc,
            ItemOrderBy::TitleDesc => Self::TitleDesc,
        }
    }
}

#[derive(Enum, Copy, Clone, Debug, Eq, PartialEq)]
#[graphql(name = "OrderStatus", rename_items = "UPPERCASE")]
pub enum OrderStatusTag {
    Pending,
    Paid,
    Failed,
}

impl From<OrderStatus> for OrderStatusTag {
    fn from(s: OrderStatus) -> Self {
        match s {
            OrderStatus::Pending => Self::Pending,
            OrderStatus::Paid => Self::Paid,
            OrderStatus::Failed => Self::Failed,
        }
    }
}

// ── Objects ─────────────────────────────────────────────────────

#[derive(SimpleObject)]
#[graphql(name = "Message")]
pub struct MessageObject {
    pub message: String,
}

impl From<Message> for MessageObject {
    fn from(m: Message) -> Self {
        Self { message: m.message }
    }
}

#[derive(SimpleObject)]
pub struct AggregateItem {
    pub count: u64,
}

#[derive(SimpleObject)]
pub struct ItemConnection {
    pub aggregate: AggregateItem,
}

pub struct UserObject(pub User);

#[Object(name = "User")]
impl UserObject {
    async fn id(&self) -> ID {
        ID(self.0.id.clone())
    }

    async fn name(&self) -> &str {
        &self.0.name
    }

    async fn email(&self) -> &str {
        &self.0.email
    }

    async fn permissions(&self) -> Vec<PermissionTag> {
        self.0.permissions.iter().copied().map(Into::into).collect()
    }

    /// Visible to the user themself and to ADMIN.
    async fn cart(&self, ctx: &Context<'_>) -> async_graphql::Result<Vec<CartItemObject>> {
        let caller = request_context(ctx)
            .user()
            .ok_or(DomainError::Unauthenticated)
            .gql()?;
        if caller.id != self.0.id {
            has_permission(caller, &[Permission::Admin]).gql()?;
        }
        let lines = services(ctx)?.cart.lines_for_user(&self.0.id).await.gql()?;
        Ok(lines.into_iter().map(CartItemObject::from).collect())
    }

    async fn created_at(&self) -> DateTime<Utc> {
        self.0.created_at
    }
}

pub struct ItemObject(pub Item);

#[Object(name = "Item")]
impl ItemObject {
    async fn id(&self) -> ID {
        ID(self.0.id.clone())
    }

    async fn title(&self) -> &str {
        &self.0.title
    }

    async fn description(&self) -> &str {
        &self.0.description
    }

    async fn image(&self) -> Option<&str> {
        self.0.image.as_deref()
    }

    async fn large_image(&self) -> Option<&str> {
        self.0.large_image.as_deref()
    }

    /// Minor units (cents).
    async fn price(&self) -> i64 {
        self.0.price
    }

    async fn user(&self, ctx: &Context<'_>) -> async_graphql::Result<Option<UserObject>> {
        let user = services(ctx)?.accounts.user_by_id(&self.0.user_id).await.gql()?;
        Ok(user.map(UserObject))
    }

    async fn created_at(&self) -> DateTime<Utc> {
        self.0.created_at
    }

    async fn updated_at(&self) -> DateTime<Utc> {
        self.0.updated_at
    }
}

/// A cart row; `item` is preloaded when it came from a cart listing.
pub struct CartItemObject {
    pub cart_item: CartItem,
    pub item: Option<Item>,
}

impl From<CartLine> for CartItemObject {
    fn from(line: CartLine) -> Self {
        Self {
            cart_item: line.cart_item,
            item: Some(line.item),
        }
    }
}

impl From<CartItem> for CartItemObject {
    fn from(cart_item: CartItem) -> Self {
        Self {
            cart_item,
            item: None,
        }
    }
}

#[Object(name = "CartItem")]
impl CartItemObject {
    async fn id(&self) -> ID {
        ID(self.cart_item.id.clone())
    }

    async fn quantity(&self) -> i32 {
        self.cart_item.quantity
    }

    /// `null` once the item has been deleted.
    async fn item(&self, ctx: &Context<'_>) -> async_graphql::Result<Option<ItemObject>> {
        if let Some(item) = &self.item {
            return Ok(Some(ItemObject(item.clone())));
        }
        let item = services(ctx)?
            .catalog
            .item(&self.cart_item.item_id)
            .await
            .gql()?;
        Ok(item.map(ItemObject))
    }
}

pub struct OrderItemObject(pub OrderItem);

#[Object(name = "OrderItem")]
impl OrderItemObject {
    async fn id(&self) -> ID {
        ID(self.0.id.clone())
    }

    async fn title(&self) -> &str {
        &self.0.title
    }

    async fn description(&self) -> &str {
        &self.0.description
    }

    async fn image(&self) -> Option<&str> {
        self.0.image.as_deref()
    }

    async fn large_image(&self) -> Option<&str> {
        self.0.large_image.as_deref()
    }

    async fn price(&self) -> i64 {
        self.0.price
    }

    async fn quantity(&self) -> i32 {
        self.0.quantity
    }
}

pub struct OrderObject(pub Order);

#[Object(name = "Order")]
impl OrderObject {
    async fn id(&self) -> ID {
        ID(self.0.id.clone())
    }

    async fn total(&self) -> i64 {
        self.0.total
    }

    async fn charge(&self) -> Option<&str> {
        self.0.charge.as_deref()
    }

    async fn status(&self) -> OrderStatusTag {
        self.0.status.into()
    }

    async fn items(&self) -> Vec<OrderItemObject> {
        self.0.items.iter().cloned().map(OrderItemObject).collect()
    }

    async fn user(&self, ctx: &Context<'_>) -> async_graphql::Result<Option<UserObject>> {
        let user = services(ctx)?.accounts.user_by_id(&self.0.user_id).await.gql()?;
        Ok(user.map(UserObject))
    }

    async fn created_at(&self) -> DateTime<Utc> {
        self.0.created_at
    }
}
