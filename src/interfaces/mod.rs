//! Interface layer - inbound adapters

pub mod graphql;
pub mod http;
