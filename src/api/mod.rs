//! HTTP API: issue endpoints plus health and metrics.

pub mod extract;
pub mod handlers;
pub mod issues;
pub mod routes;

pub use handlers::AppState;
pub use routes::{create_app, create_router};
