//! Access checks shared by every use-case.

use crate::application::RequestContext;
use crate::domain::{DomainError, DomainResult, Permission, User};

/// The signed-in user, or `Unauthenticated`.
pub fn require_user(ctx: &RequestContext) -> DomainResult<&User> {
    ctx.user().ok_or(DomainError::Unauthenticated)
}

fn join(permissions: &[Permission]) -> String {
    permissions
        .iter()
        .map(Permission::as_str)
        .collect::<Vec<_>>()
        .join(",")
}

/// `Forbidden` unless the user holds at least one of `required`.
pub fn has_permission(user: &User, required: &[Permission]) -> DomainResult<()> {
    if user.has_any_permission(required) {
        return Ok(());
    }
    Err(DomainError::Forbidden(format!(
        "You do not have sufficient permissions: {}. You have: {}",
        join(required),
        join(&user.permissions)
    )))
}

/// Owners always pass; anyone else needs one of `required`.
pub fn owner_or_permitted(user: &User, owner_id: &str, required: &[Permission]) -> DomainResult<()> {
    if user.id == owner_id {
        return Ok(());
    }
    has_permission(user, required)
}
