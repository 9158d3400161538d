use chrono::{DateTime, Utc};

use crate::domain::Permission;

/// Registered shopper or staff member.
#[derive(Clone, Debug, PartialEq)]
pub struct User {
    pub id: String,
    pub name: String,
    /// Always stored lower-cased.
    pub email: String,
    pub password_hash: String,
    pub permissions: Vec<Permission>,
    pub reset_token: Option<String>,
    pub reset_token_expiry: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// True when the user holds at least one of `required`.
    pub fn has_any_permission(&self, required: &[Permission]) -> bool {
        self.permissions.iter().any(|p| required.contains(p))
    }
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub permissions: Vec<Permission>,
}
