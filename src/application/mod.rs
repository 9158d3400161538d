//! Application layer - use-case orchestration
//!
//! Services here sit between the GraphQL resolvers and the domain
//! repositories / outbound ports. Resolvers stay thin and delegate.

pub mod authorization;
pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod context;
pub mod identity;
pub mod message;

#[cfg(test)]
pub(crate) mod testing;

pub use authorization::{has_permission, owner_or_permitted, require_user};
pub use cart::CartService;
pub use catalog::{CatalogService, CreateItemInput};
pub use checkout::{CheckoutService, CheckoutSettings};
pub use context::RequestContext;
pub use identity::{AccountService, AccountSettings, Session, SignupInput};
pub use message::Message;
