//! Table client - per-browser-tab session controller
//!
//! One controller per connected client. It sends mutation intents to the
//! server, reconciles a local view from topic broadcasts, runs the
//! one-second cooldown countdown, and watches connection liveness. The
//! local view is a cache: the server stays authoritative, and a client that
//! loses its connection asks for a full reload instead of patching itself
//! up in place.

pub mod controller;
pub mod error;
pub mod transport;

pub use controller::{ConnectionState, ControllerConfig, LocalOrderView, SessionController};
pub use error::ClientError;
pub use transport::{ClientTransport, TcpClientTransport};

#[cfg(feature = "in-process")]
pub use transport::MemoryClientTransport;
