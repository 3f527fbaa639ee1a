use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::middleware;
use axum::routing::{get, post};

use crate::auth::require_auth;
use crate::core::ServerState;
use crate::handler;

/// Upload bodies carry three sheets; allow some headroom over the
/// per-sheet cap enforced in the handler
const MAX_UPLOAD_BODY: usize = 20 * 1024 * 1024;

/// Ratecard router - requires authentication
pub fn router(state: ServerState) -> Router<ServerState> {
    Router::new()
        .route(
            "/rate/upload",
            post(handler::ratecard::upload).layer(DefaultBodyLimit::max(MAX_UPLOAD_BODY)),
        )
        .route("/rate/download", post(handler::ratecard::download))
        .route("/rate/files", get(handler::ratecard::files))
        .route_layer(middleware::from_fn_with_state(state, require_auth))
}
