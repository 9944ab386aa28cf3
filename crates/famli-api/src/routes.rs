//! Route definitions

use axum::{
    Router, middleware,
    routing::{get, post},
};

use crate::handlers::{health, link, status, unlink};
use crate::middleware::auth::require_auth;
use crate::server::AppState;

/// REST routes. `/link` (POST and DELETE) sits behind JWT authentication.
pub fn routes(state: AppState) -> Router<AppState> {
    let protected = Router::new()
        .route("/link", post(link).delete(unlink))
        .route_layer(middleware::from_fn_with_state(state, require_auth));

    Router::new()
        .route("/health", get(health))
        .route("/status", get(status))
        .merge(protected)
}
