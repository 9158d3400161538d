use async_graphql::{Context, Object, ID};

use super::error::GraphqlResultExt;
use super::session::{clear_session, set_session};
use super::types::{CartItemObject, ItemObject, MessageObject, OrderObject, PermissionTag, UserObject};
use super::{request_context, services};
use crate::application::{CreateItemInput, Session, SignupInput};
use crate::domain::ItemChanges;

pub struct MutationRoot;

fn start_session(ctx: &Context<'_>, session: Session) -> async_graphql::Result<UserObject> {
    let lifetime_hours = services(ctx)?.accounts.settings().jwt.expiration_hours;
    set_session(ctx, session.token, lifetime_hours);
    Ok(UserObject(session.user))
}

#[Object]
impl MutationRoot {
    async fn create_item(
        &self,
        ctx: &Context<'_>,
        title: String,
        description: String,
        price: i64,
        image: Option<String>,
        large_image: Option<String>,
    ) -> async_graphql::Result<ItemObject> {
        let input = CreateItemInput {
            title,
            description,
            price,
            image,
            large_image,
        };
        let item = services(ctx)?
            .catalog
            .create_item(request_context(ctx), input)
            .await
            .gql()?;
        Ok(ItemObject(item))
    }

    /// The id selects the item; only the other supplied fields change.
    async fn update_item(
        &self,
        ctx: &Context<'_>,
        id: ID,
        title: Option<String>,
        description: Option<String>,
        price: Option<i64>,
        image: Option<String>,
        large_image: Option<String>,
    ) -> async_graphql::Result<ItemObject> {
        let changes = ItemChanges {
            title,
            description,
            image,
            large_image,
            price,
        };
        let item = services(ctx)?
            .catalog
            .update_item(request_context(ctx), &id, changes)
            .await
            .gql()?;
        Ok(ItemObject(item))
    }

    async fn delete_item(&self, ctx: &Context<'_>, id: ID) -> async_graphql::Result<ItemObject> {
        let item = services(ctx)?
            .catalog
            .delete_item(request_context(ctx), &id)
            .await
            .gql()?;
        Ok(ItemObject(item))
    }

    async fn signup(
        &self,
        ctx: &Context<'_>,
        email: String,
        password: String,
        name: String,
    ) -> async_graphql::Result<UserObject> {
        let session = services(ctx)?
            .accounts
            .signup(SignupInput {
                email,
                name,
                password,
            })
            .await
            .gql()?;
        start_session(ctx, session)
    }

    async fn signin(
        &self,
        ctx: &Context<'_>,
        email: String,
        password: String,
    ) -> async_graphql::Result<UserObject> {
        let session = services(ctx)?
            .accounts
            .signin(&email, &password)
            .await
            .gql()?;
        start_session(ctx, session)
    }

    async fn signout(&self, ctx: &Context<'_>) -> async_graphql::Result<MessageObject> {
        clear_session(ctx);
        Ok(services(ctx)?.accounts.signout().into())
    }

    async fn request_reset(
        &self,
        ctx: &Context<'_>,
        email: String,
    ) -> async_graphql::Result<MessageObject> {
        let message = services(ctx)?.accounts.request_reset(&email).await.gql()?;
        Ok(message.into())
    }

    async fn reset_password(
        &self,
        ctx: &Context<'_>,
        reset_token: String,
        password: String,
        confirm_password: String,
    ) -> async_graphql::Result<UserObject> {
        let session = services(ctx)?
            .accounts
            .reset_password(&reset_token, &password, &confirm_password)
            .await
            .gql()?;
        start_session(ctx, session)
    }

    async fn update_permissions(
        &self,
        ctx: &Context<'_>,
        permissions: Vec<PermissionTag>,
        user_id: ID,
    ) -> async_graphql::Result<UserObject> {
        let permissions = permissions.into_iter().map(Into::into).collect();
        let user = services(ctx)?
            .accounts
            .update_permissions(request_context(ctx), permissions, &user_id)
            .await
            .gql()?;
        Ok(UserObject(user))
    }

    async fn add_to_cart(&self, ctx: &Context<'_>, id: ID) -> async_graphql::Result<CartItemObject> {
        let line = services(ctx)?
            .cart
            .add_to_cart(request_context(ctx), &id)
            .await
            .gql()?;
        Ok(line.into())
    }

    async fn remove_from_cart(
        &self,
        ctx: &Context<'_>,
        id: ID,
    ) -> async_graphql::Result<CartItemObject> {
        let line = services(ctx)?
            .cart
            .remove_from_cart(request_context(ctx), &id)
            .await
            .gql()?;
        Ok(line.into())
    }

    async fn create_order(&self, ctx: &Context<'_>, token: String) -> async_graphql::Result<OrderObject> {
        let order = services(ctx)?
            .checkout
            .create_order(request_context(ctx), &token)
            .await
            .gql()?;
        Ok(OrderObject(order))
    }
}
