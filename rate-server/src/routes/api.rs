use axum::Router;
use axum::routing::{get, post};

use crate::core::ServerState;
use crate::handler;

/// Public calculator API router
pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/api", get(handler::api::index))
        .route("/api/test-db", get(handler::api::test_db))
        .route("/api/sender", get(handler::api::senders))
        .route("/api/receiver", get(handler::api::receivers))
        .route("/api/package-type", get(handler::api::package_types))
        .route("/api/calculate", post(handler::api::calculate))
}
