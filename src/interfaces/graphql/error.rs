use async_graphql::{Error, ErrorExtensions};

use crate::domain::{DomainError, DomainResult};

impl ErrorExtensions for DomainError {
    fn extend(&self) -> Error {
        Error::new(self.to_string()).extend_with(|_, ext| ext.set("code", self.code()))
    }
}

/// `?`-friendly conversion from service results to resolver results.
pub(crate) trait GraphqlResultExt<T> {
    fn gql(self) -> async_graphql::Result<T>;
}

impl<T> GraphqlResultExt<T> for DomainResult<T> {
    fn gql(self) -> async_graphql::Result<T> {
        self.map_err(|e| e.extend())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn code_lands_in_extensions() {
        let err = DomainError::PasswordMismatch.extend();
        assert_eq!(err.message, "Your passwords don't match!");
        let code = err
            .extensions
            .as_ref()
            .and_then(|ext| ext.get("code"))
            .cloned();
        assert_eq!(code, Some(async_graphql::Value::from("PASSWORD_MISMATCH")));
    }
}
