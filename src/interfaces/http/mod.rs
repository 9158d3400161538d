//! HTTP interface
//!
//! - `router`: axum router (`/graphql`, `/health`, `/metrics`) and its state
//! - `middleware`: session cookie / bearer token → `RequestContext`
//! - `request_id`: `x-request-id` correlation + tracing span
//! - `metrics`: Prometheus scrape endpoint and request metrics

pub mod health;
pub mod metrics;
pub mod middleware;
pub mod request_id;
pub mod router;

pub use router::{create_router, AppState};
