//! HTTP API route definitions.

use axum::http::{header, HeaderValue, Method};
use axum::middleware;
use axum::routing::{get, post, put};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::auth::{require_auth, require_role, ISSUE_REPORTERS, ISSUE_RESOLVERS};
use crate::config::Config;
use crate::error::Error;
use crate::metrics::track_requests;

use super::handlers::{health, metrics, AppState};
use super::issues;

/// Issue routes, all behind authentication.
///
/// Reads and comments are open to any authenticated caller; reporting needs
/// [`ISSUE_REPORTERS`], status changes need [`ISSUE_RESOLVERS`].
pub fn issue_routes(state: &AppState) -> Router<AppState> {
    let read_routes = Router::new()
        .route("/issues", get(issues::list_issues))
        .route("/issues/:id", get(issues::get_issue))
        .route(
            "/issues/:id/comments",
            get(issues::list_comments).post(issues::add_comment),
        );

    let report_routes = Router::new()
        .route("/issues", post(issues::create_issue))
        .route_layer(middleware::from_fn(require_role(ISSUE_REPORTERS)));

    let resolve_routes = Router::new()
        .route("/issues/:id/status", put(issues::update_issue_status))
        .route(
            "/issues/:id/computer/:computer_id",
            put(issues::update_issue_computer_status),
        )
        .route_layer(middleware::from_fn(require_role(ISSUE_RESOLVERS)));

    read_routes
        .merge(report_routes)
        .merge(resolve_routes)
        .route_layer(middleware::from_fn_with_state(
            state.jwt.clone(),
            require_auth,
        ))
}

/// Create the API router with issue routes under `api_prefix`.
pub fn create_router(state: AppState, api_prefix: Option<&str>) -> Router {
    let api = issue_routes(&state);

    let router = Router::new()
        .route("/health", get(health))
        .route("/metrics", get(metrics));

    let router = match api_prefix {
        Some(prefix) => router.nest(prefix, api),
        None => router.merge(api),
    };

    router
        .layer(middleware::from_fn(track_requests))
        .with_state(state)
}

/// Build the full application: routes plus tracing and CORS layers.
pub fn create_app(state: AppState, config: &Config) -> Result<Router, Error> {
    let origin = HeaderValue::from_str(&config.cors_origin)
        .map_err(|e| Error::InvalidConfig(format!("CORS_ORIGIN: {}", e)))?;

    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST, Method::PUT])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]);

    Ok(create_router(state, config.normalized_prefix())
        .layer(TraceLayer::new_for_http())
        .layer(cors))
}
