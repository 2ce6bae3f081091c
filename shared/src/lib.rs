//! Shared types for the table ordering system
//!
//! These types are used by both `table-server` and `table-client`:
//!
//! - **`models`**: domain entities (products, categories, tables, sessions,
//!   submitted order lines, ordering settings)
//! - **`message`**: topic/event envelope and intent types exchanged over the
//!   message bus, plus the wire framing
//! - **`error`**: wire-level session error codes
//! - **`util`**: timestamp and ID helpers

pub mod error;
pub mod message;
pub mod models;
pub mod util;

pub use error::SessionErrorCode;
pub use message::{EventKind, Frame, IntentKind, IntentMessage, Topic, TopicMessage};
pub use models::{Category, CourseClass, OrderLine, Product, SessionState, TableSession};
