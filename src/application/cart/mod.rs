//! Cart module: per-user shopping cart

pub mod service;

pub use service::CartService;
