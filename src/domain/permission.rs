//! Permission tags carried by every user.

use std::fmt;
use std::str::FromStr;

use crate::shared::DomainError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Permission {
    Admin,
    User,
    ItemCreate,
    ItemUpdate,
    ItemDelete,
    PermissionUpdate,
}

impl Permission {
    pub const ALL: [Permission; 6] = [
        Permission::Admin,
        Permission::User,
        Permission::ItemCreate,
        Permission::ItemUpdate,
        Permission::ItemDelete,
        Permission::PermissionUpdate,
    ];

    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "ADMIN",
            Self::User => "USER",
            Self::ItemCreate => "ITEMCREATE",
            Self::ItemUpdate => "ITEMUPDATE",
            Self::ItemDelete => "ITEMDELETE",
            Self::PermissionUpdate => "PERMISSIONUPDATE",
        }
    }

    /// Sort and de-duplicate a permission list.
    pub fn normalize(mut permissions: Vec<Permission>) -> Vec<Permission> {
        permissions.sort();
        permissions.dedup();
        permissions
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Permission {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|p| p.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| DomainError::Validation(format!("Unknown permission: {s}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_every_tag_case_insensitively() {
        for p in Permission::ALL {
            assert_eq!(p.as_str().parse::<Permission>().unwrap(), p);
            assert_eq!(p.as_str().to_lowercase().parse::<Permission>().unwrap(), p);
        }
        assert!("SUPERUSER".parse::<Permission>().is_err());
    }

    #[test]
    fn normalize_removes_duplicates() {
        let perms = Permission::normalize(vec![
            Permission::ItemDelete,
            Permission::User,
            Permission::ItemDelete,
        ]);
        assert_eq!(perms, vec![Permission::User, Permission::ItemDelete]);
    }
}
