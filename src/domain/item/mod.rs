//! Item aggregate: product listings owned by their creator.

pub mod model;
pub mod repository;

pub use model::{Item, ItemChanges, ItemOrder, NewItem, MAX_PRICE};
pub use repository::ItemRepository;
