use axum::Router;
use axum::routing::post;

use crate::core::ServerState;
use crate::handler;

/// Auth router - public login endpoint
pub fn router() -> Router<ServerState> {
    Router::new().route("/auth/login", post(handler::auth::login))
}
