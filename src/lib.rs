//! # Sick Fits
//!
//! GraphQL backend for the Sick Fits storefront: catalog, accounts, cart and
//! checkout.
//!
//! ## Architecture
//!
//! The project follows Clean Architecture principles:
//!
//! - **domain**: Entities, permissions, repository and collaborator ports
//! - **application**: Use cases (accounts, catalog, cart, checkout) and authorization
//! - **infrastructure**: SeaORM persistence, in-memory store, crypto, Stripe, SMTP
//! - **interfaces**: GraphQL schema and the axum HTTP surface
//! - **shared**: Errors, pagination, retry, clock and shutdown signalling

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod interfaces;
pub mod shared;

pub use config::{default_config_path, AppConfig, ConfigError};

pub use infrastructure::{init_database, DatabaseConfig, SeaOrmRepositoryProvider};

pub use interfaces::graphql::{build_schema, Services, StorefrontSchema};
pub use interfaces::http::{create_router, AppState};
