//! Identity module: accounts, sessions and permissions
//!
//! Contains the `AccountService` which orchestrates signup, signin,
//! password reset and permission management.

pub mod service;

pub use service::{AccountService, AccountSettings, Session, SignupInput};
