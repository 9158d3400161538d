//! User aggregate
//!
//! Contains the User entity, creation DTO, and repository interface.

pub mod model;
pub mod repository;

pub use model::{NewUser, User};
pub use repository::UserRepository;
