//! Checkout module: turning a cart into a paid order

pub mod service;

pub use service::{CheckoutService, CheckoutSettings};
