//! Unified access to the per-aggregate repositories.

use super::{CartRepository, ItemRepository, OrderRepository, UserRepository};

/// Provides access to all domain repositories.
///
/// Consumers request only the repository they need:
///
/// ```ignore
/// async fn handle(repos: &dyn RepositoryProvider) {
///     let user = repos.users().find_by_id("u1").await?;
///     let lines = repos.cart().lines_for_user("u1").await?;
/// }
/// ```
pub trait RepositoryProvider: Send + Sync {
    fn users(&self) -> &dyn UserRepository;
    fn items(&self) -> &dyn ItemRepository;
    fn cart(&self) -> &dyn CartRepository;
    fn orders(&self) -> &dyn OrderRepository;
}
