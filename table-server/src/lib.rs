//! Table Server - table-session order synchronization backend
//!
//! Customers at one table share a mutable pending order; this service keeps
//! it consistent across every connected client and pushes changes to diners
//! and kitchen staff in near-real-time.
//!
//! # Module structure
//!
//! ```text
//! table-server/src/
//! ├── core/          # configuration, state, HTTP server
//! ├── sessions/      # session store, mutation engine, cooldown policy
//! ├── message/       # topic bus, intent handler, TCP transport
//! ├── services/      # settings, catalog read model
//! ├── orders/        # submitted-order log (comande)
//! ├── api/           # HTTP routes and handlers
//! └── utils/         # errors, logging
//! ```

pub mod api;
pub mod core;
pub mod message;
pub mod orders;
pub mod services;
pub mod sessions;
pub mod utils;

// Re-export public types
pub use crate::core::{Config, Server, ServerState};
pub use crate::message::{IntentHandler, TableBus};
pub use crate::sessions::{SessionError, SessionManager, SessionStore};
pub use crate::utils::{AppError, AppResponse, AppResult};

/// Set up the process environment: dotenv, then logging
pub fn setup_environment() {
    dotenv::dotenv().ok();
    let log_level = std::env::var("LOG_LEVEL").ok();
    let log_dir = std::env::var("LOG_DIR").ok();
    utils::logger::init_logger_with_file(log_level.as_deref(), log_dir.as_deref());
}
