use axum::Router;
use axum::middleware;
use axum::routing::get;

use crate::auth::require_auth;
use crate::core::ServerState;
use crate::handler;

/// Country router - requires authentication
pub fn router(state: ServerState) -> Router<ServerState> {
    Router::new()
        .route(
            "/country",
            get(handler::country::list).post(handler::country::create),
        )
        .route(
            "/country/{id}",
            get(handler::country::show)
                .put(handler::country::update)
                .delete(handler::country::destroy),
        )
        .route("/country/{id}/rates", get(handler::country::rates))
        .route("/country/{id}/receivers", get(handler::country::receivers))
        .route_layer(middleware::from_fn_with_state(state, require_auth))
}
