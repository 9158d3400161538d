//! Database repository implementations
//!
//! Per-aggregate SeaORM repositories + unified RepositoryProvider.

pub mod cart_repository;
pub mod item_repository;
pub mod order_repository;
pub mod repository_provider;
pub mod user_repository;

pub use repository_provider::SeaOrmRepositoryProvider;

use sea_orm::{DbErr, SqlErr};

use crate::domain::DomainError;

pub(crate) fn db_err(e: DbErr) -> DomainError {
    DomainError::upstream("database", e)
}

/// Like [`db_err`], but reports unique-constraint violations as `Conflict`.
pub(crate) fn db_write_err(e: DbErr, conflict: impl FnOnce() -> String) -> DomainError {
    match e.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => DomainError::Conflict(conflict()),
        _ => db_err(e),
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use sea_orm::DatabaseConnection;
    use sea_orm_migration::MigratorTrait;

    use crate::infrastructure::database::migrator::Migrator;
    use crate::infrastructure::database::{init_database, DatabaseConfig};

    /// Fresh in-memory SQLite with every migration applied.
    pub async fn migrated_db() -> DatabaseConnection {
        let db = init_database(&DatabaseConfig::in_memory())
            .await
            .expect("connect to sqlite::memory:");
        Migrator::up(&db, None).await.expect("run migrations");
        db
    }
}
