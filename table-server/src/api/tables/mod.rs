//! Table session API module

mod handler;

use axum::{
    Router,
    routing::{get, post},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/tables", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/{id}/status", get(handler::status))
        .route(
            "/{id}/session",
            post(handler::open_session).delete(handler::close_session),
        )
}
