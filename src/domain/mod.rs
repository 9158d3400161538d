//! Storefront domain: entities, permission tags, repository traits and
//! outbound ports. Nothing in here knows about HTTP, GraphQL or SQL.

pub mod cart;
pub mod item;
pub mod order;
pub mod permission;
pub mod ports;
pub mod repositories;
pub mod user;

pub use cart::{cart_total, CartItem, CartLine, CartRepository};
pub use item::{Item, ItemChanges, ItemOrder, ItemRepository, NewItem, MAX_PRICE};
pub use order::{NewOrder, NewOrderItem, Order, OrderItem, OrderRepository, OrderStatus};
pub use permission::Permission;
pub use ports::{Charge, ChargeRequest, MailMessage, Mailer, PaymentGateway};
pub use repositories::RepositoryProvider;
pub use user::{NewUser, User, UserRepository};

pub use crate::shared::errors::{DomainError, DomainResult};
