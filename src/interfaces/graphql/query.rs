use async_graphql::{Context, Object, ID};

use super::error::GraphqlResultExt;
use super::types::{AggregateItem, ItemConnection, ItemObject, ItemOrderBy, OrderObject, UserObject};
use super::{request_context, services};
use crate::shared::PageWindow;

pub struct QueryRoot;

#[Object]
impl QueryRoot {
    /// One storefront page of items, newest first unless `orderBy` says otherwise.
    async fn items(
        &self,
        ctx: &Context<'_>,
        skip: Option<i32>,
        first: Option<i32>,
        order_by: Option<ItemOrderBy>,
    ) -> async_graphql::Result<Vec<ItemObject>> {
        let items = services(ctx)?
            .catalog
            .items(
                order_by.unwrap_or_default().into(),
                PageWindow::from_args(skip, first),
            )
            .await
            .gql()?;
        Ok(items.into_iter().map(ItemObject).collect())
    }

    async fn item(&self, ctx: &Context<'_>, id: ID) -> async_graphql::Result<Option<ItemObject>> {
        let item = services(ctx)?.catalog.item(&id).await.gql()?;
        Ok(item.map(ItemObject))
    }

    async fn items_connection(&self, ctx: &Context<'_>) -> async_graphql::Result<ItemConnection> {
        let count = services(ctx)?.catalog.count().await.gql()?;
        Ok(ItemConnection {
            aggregate: AggregateItem { count },
        })
    }

    /// The signed-in user, or `null`.
    async fn me(&self, ctx: &Context<'_>) -> Option<UserObject> {
        request_context(ctx).user().cloned().map(UserObject)
    }

    async fn users(&self, ctx: &Context<'_>) -> async_graphql::Result<Vec<UserObject>> {
        let users = services(ctx)?
            .accounts
            .list_users(request_context(ctx))
            .await
            .gql()?;
        Ok(users.into_iter().map(UserObject).collect())
    }

    async fn order(&self, ctx: &Context<'_>, id: ID) -> async_graphql::Result<OrderObject> {
        let order = services(ctx)?
            .checkout
            .order(request_context(ctx), &id)
            .await
            .gql()?;
        Ok(OrderObject(order))
    }

    async fn orders(&self, ctx: &Context<'_>) -> async_graphql::Result<Vec<OrderObject>> {
        let orders = services(ctx)?
            .checkout
            .orders(request_context(ctx))
            .await
            .gql()?;
        Ok(orders.into_iter().map(OrderObject).collect())
    }
}
