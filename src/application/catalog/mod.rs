//! Catalog module: item listings and their lifecycle

pub mod service;

pub use service::{CatalogService, CreateItemInput};
