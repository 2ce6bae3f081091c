//! Order history API module

mod handler;

use axum::{
    Router,
    routing::{get, put},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/orders", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/session/{session_id}", get(handler::by_session))
        .route("/kitchen", get(handler::kitchen_queue))
        .route("/{line_id}/delivered", put(handler::set_delivered))
}
