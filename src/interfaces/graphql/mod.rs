//! GraphQL interface
//!
//! - `query` / `mutation`: root resolvers, thin wrappers over the services
//! - `types`: output objects and enums exposed by the schema
//! - `error`: `DomainError` → GraphQL error with `extensions.code`
//! - `session`: session cookie issued by signup/signin/reset, cleared by signout

pub mod error;
pub mod mutation;
pub mod query;
pub mod session;
pub mod types;

use std::sync::Arc;

use async_graphql::{Context, EmptySubscription, Schema};

use crate::application::{AccountService, CartService, CatalogService, CheckoutService, RequestContext};

pub use mutation::MutationRoot;
pub use query::QueryRoot;

pub type StorefrontSchema = Schema<QueryRoot, MutationRoot, EmptySubscription>;

/// Application services shared by every resolver, stored as schema data.
#[derive(Clone)]
pub struct Services {
    pub accounts: Arc<AccountService>,
    pub catalog: Arc<CatalogService>,
    pub cart: Arc<CartService>,
    pub checkout: Arc<CheckoutService>,
}

pub fn build_schema(services: Services) -> StorefrontSchema {
    Schema::build(QueryRoot, MutationRoot, EmptySubscription)
        .data(services)
        .finish()
}

static ANONYMOUS: RequestContext = RequestContext::anonymous();

pub(crate) fn services<'a>(ctx: &Context<'a>) -> async_graphql::Result<&'a Services> {
    ctx.data::<Services>()
}

/// Caller identity attached to the request by the session middleware.
/// Requests executed without it (e.g. schema tests) run anonymously.
pub(crate) fn request_context<'a>(ctx: &Context<'a>) -> &'a RequestContext {
    ctx.data_opt::<RequestContext>().unwrap_or(&ANONYMOUS)
}
