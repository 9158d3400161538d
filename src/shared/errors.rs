use std::fmt::Display;

use thiserror::Error;

/// Failures surfaced by the storefront operations.
///
/// Every variant maps to a stable GraphQL error code via [`DomainError::code`].
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("You must be logged in to do that!")]
    Unauthenticated,

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Not found: {entity} with {field}={value}")]
    NotFound {
        entity: &'static str,
        field: &'static str,
        value: String,
    },

    #[error("Invalid password!")]
    InvalidCredential,

    #[error("Your passwords don't match!")]
    PasswordMismatch,

    #[error("This token is either invalid or expired!")]
    InvalidOrExpiredToken,

    #[error("Validation: {0}")]
    Validation(String),

    #[error("Already exists: {0}")]
    Conflict(String),

    #[error("{service} failure: {message}")]
    Upstream {
        service: &'static str,
        message: String,
    },
}

impl DomainError {
    pub fn not_found(entity: &'static str, field: &'static str, value: impl Into<String>) -> Self {
        Self::NotFound {
            entity,
            field,
            value: value.into(),
        }
    }

    pub fn upstream(service: &'static str, err: impl Display) -> Self {
        Self::Upstream {
            service,
            message: err.to_string(),
        }
    }

    /// Stable machine-readable code exposed in GraphQL error extensions.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Unauthenticated => "UNAUTHENTICATED",
            Self::Forbidden(_) => "FORBIDDEN",
            Self::NotFound { .. } => "NOT_FOUND",
            Self::InvalidCredential => "INVALID_CREDENTIAL",
            Self::PasswordMismatch => "PASSWORD_MISMATCH",
            Self::InvalidOrExpiredToken => "INVALID_OR_EXPIRED_TOKEN",
            Self::Validation(_) => "BAD_USER_INPUT",
            Self::Conflict(_) => "CONFLICT",
            Self::Upstream { .. } => "UPSTREAM_FAILURE",
        }
    }

    /// Whether this error is likely transient (e.g. DB connection lost)
    /// and the operation may succeed if retried.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Upstream { service: "database", .. })
    }
}

/// Result type for domain operations
pub type DomainResult<T> = Result<T, DomainError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_stable() {
        assert_eq!(DomainError::Unauthenticated.code(), "UNAUTHENTICATED");
        assert_eq!(DomainError::PasswordMismatch.code(), "PASSWORD_MISMATCH");
        assert_eq!(
            DomainError::not_found("Item", "id", "42").code(),
            "NOT_FOUND"
        );
    }

    #[test]
    fn only_database_failures_are_transient() {
        assert!(DomainError::upstream("database", "connection reset").is_transient());
        assert!(!DomainError::upstream("payment", "card declined").is_transient());
        assert!(!DomainError::Forbidden("nope".into()).is_transient());
    }

    #[test]
    fn not_found_message_names_the_lookup() {
        let err = DomainError::not_found("CartItem", "id", "abc");
        assert_eq!(err.to_string(), "Not found: CartItem with id=abc");
    }
}
