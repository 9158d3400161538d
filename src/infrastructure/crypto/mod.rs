//! Credential primitives: session JWTs, bcrypt hashes, reset tokens.

pub mod jwt;
pub mod password;
pub mod reset_token;

pub use jwt::{create_token, verify_token, JwtConfig, SessionClaims, DEFAULT_JWT_SECRET};
pub use password::{hash_password, verify_password, PASSWORD_HASH_COST};
pub use reset_token::generate_reset_token;
