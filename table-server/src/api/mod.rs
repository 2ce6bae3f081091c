//! HTTP API modules
//!
//! Each module contributes one router nested under its own path; handlers
//! live in the module's `handler.rs`.

pub mod health;
pub mod orders;
pub mod settings;
pub mod tables;

use axum::Router;

use crate::core::ServerState;

/// Assemble the full API router
pub fn router() -> Router<ServerState> {
    Router::new()
        .merge(health::router())
        .merge(tables::router())
        .merge(orders::router())
        .merge(settings::router())
}
