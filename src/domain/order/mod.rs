//! Order aggregate: checkout snapshots and their payment state.

pub mod model;
pub mod repository;

pub use model::{NewOrder, NewOrderItem, Order, OrderItem, OrderStatus};
pub use repository::OrderRepository;
