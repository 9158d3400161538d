//! Storefront HTTP router

use std::sync::Arc;

use async_graphql::http::GraphiQLSource;
use async_graphql_axum::{GraphQLRequest, GraphQLResponse};
use axum::{
    extract::{FromRef, State},
    http::{header, HeaderValue, Method},
    middleware,
    response::{Html, IntoResponse},
    routing::get,
    Extension, Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::warn;

use super::health::{health_check, HealthState};
use super::metrics::{http_metrics_middleware, prometheus_metrics};
use super::middleware::session_middleware;
use super::request_id::request_id_middleware;
use crate::application::{AccountService, RequestContext};
use crate::interfaces::graphql::StorefrontSchema;

/// Unified router state. Handlers extract their slice via `FromRef`.
#[derive(Clone)]
pub struct AppState {
    pub schema: StorefrontSchema,
    pub accounts: Arc<AccountService>,
    pub health: HealthState,
    /// `None` disables `GET /metrics`.
    pub metrics: Option<PrometheusHandle>,
}

impl FromRef<AppState> for StorefrontSchema {
    fn from_ref(s: &AppState) -> Self {
        s.schema.clone()
    }
}

impl FromRef<AppState> for HealthState {
    fn from_ref(s: &AppState) -> Self {
        s.health.clone()
    }
}

async fn graphql_handler(
    State(schema): State<StorefrontSchema>,
    Extension(context): Extension<RequestContext>,
    request: GraphQLRequest,
) -> GraphQLResponse {
    schema.execute(request.into_inner().data(context)).await.into()
}

async fn graphiql() -> impl IntoResponse {
    Html(GraphiQLSource::build().endpoint("/graphql").finish())
}

/// The storefront is the only browser origin; cookies need credentials.
fn cors_layer(frontend_origin: &str) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .allow_credentials(true);
    match HeaderValue::from_str(frontend_origin.trim_end_matches('/')) {
        Ok(origin) => cors.allow_origin(origin),
        Err(_) => {
            warn!(origin = %frontend_origin, "Invalid frontend origin, CORS disabled");
            cors
        }
    }
}

/// Create the application router with all routes
pub fn create_router(state: AppState, frontend_origin: &str) -> Router {
    let graphql_routes = Router::new()
        .route("/graphql", get(graphiql).post(graphql_handler))
        .layer(middleware::from_fn_with_state(
            state.accounts.clone(),
            session_middleware,
        ));

    let mut router = Router::new()
        .route("/health", get(health_check))
        .merge(graphql_routes)
        .with_state(state.clone());

    if let Some(handle) = state.metrics {
        router = router.merge(
            Router::new()
                .route("/metrics", get(prometheus_metrics))
                .with_state(handle),
        );
    }

    router
        .layer(middleware::from_fn(http_metrics_middleware))
        .layer(cors_layer(frontend_origin))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(request_id_middleware))
}
