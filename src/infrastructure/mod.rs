//! Infrastructure layer - external concerns

pub mod crypto;
pub mod database;
pub mod mail;
pub mod payment;
pub mod storage;

pub use database::{init_database, DatabaseConfig, SeaOrmRepositoryProvider};
pub use mail::{LogMailer, SmtpConfig, SmtpMailer};
pub use payment::{StripeConfig, StripeGateway};
pub use storage::InMemoryStore;
