//! Server configuration
//!
//! Static knobs loaded once at startup. Everything the admin surface can
//! change at runtime (cooldown, course multiplier, kitchen hours) lives in
//! [`crate::services::SettingsService`] instead, never here.
//!
//! # Environment variables
//!
//! | Variable | Default | Meaning |
//! |----------|---------|---------|
//! | HTTP_PORT | 3000 | HTTP API port |
//! | BUS_TCP_PORT | 8081 | TCP message-bus port |
//! | ENABLE_BUS_TCP | true | Start the TCP bus listener |
//! | CHANNEL_CAPACITY | 1024 | Broadcast channel capacity |
//! | ENVIRONMENT | development | development \| staging \| production |
//! | LOG_DIR | (unset) | Daily-rolling log file directory |
//! | CATALOG_PATH | (unset) | JSON catalog feed from the catalog collaborator |

/// Server configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP API port
    pub http_port: u16,
    /// TCP message-bus port (browser gateways connect here)
    pub bus_tcp_port: u16,
    /// Whether to start the TCP bus listener
    pub enable_bus_tcp: bool,
    /// Capacity of every broadcast channel on the bus
    pub channel_capacity: usize,
    /// development | staging | production
    pub environment: String,
    /// Log file directory (stdout only when unset)
    pub log_dir: Option<String>,
    /// Catalog feed file (products + categories) supplied by the catalog
    /// collaborator
    pub catalog_path: Option<String>,
}

impl Config {
    /// Load configuration from environment variables, falling back to
    /// defaults for anything unset or unparseable
    pub fn from_env() -> Self {
        Self {
            http_port: std::env::var("HTTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3000),
            bus_tcp_port: std::env::var("BUS_TCP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8081),
            enable_bus_tcp: std::env::var("ENABLE_BUS_TCP")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(true),
            channel_capacity: std::env::var("CHANNEL_CAPACITY")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(1024),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into()),
            log_dir: std::env::var("LOG_DIR").ok(),
            catalog_path: std::env::var("CATALOG_PATH").ok(),
        }
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}
