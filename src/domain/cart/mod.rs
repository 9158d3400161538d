//! Cart aggregate: one row per (user, item) with a quantity.

pub mod model;
pub mod repository;

pub use model::{cart_total, CartItem, CartLine};
pub use repository::CartRepository;
