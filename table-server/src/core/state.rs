//! Server state - singleton references to every service
//!
//! `ServerState` is cloned into every handler (cheap `Arc` copies) and is
//! the axum router state.

use std::sync::Arc;

use serde::Deserialize;
use shared::models::{Category, OrderingSettings, Product};

use crate::core::Config;
use crate::message::{BusTcpServer, IntentHandler, TableBus};
use crate::orders::{MemoryOrderLog, OrderLog};
use crate::services::{CatalogService, SettingsService};
use crate::sessions::{MemorySessionStore, SessionManager, SessionStore};

/// Shape of the catalog collaborator's feed file
#[derive(Debug, Deserialize)]
struct CatalogFeed {
    products: Vec<Product>,
    categories: Vec<Category>,
}

/// Server state - holds shared references to all services
#[derive(Clone)]
pub struct ServerState {
    pub config: Config,
    pub settings: SettingsService,
    pub catalog: Arc<CatalogService>,
    pub store: Arc<dyn SessionStore>,
    pub order_log: Arc<dyn OrderLog>,
    pub bus: TableBus,
    pub sessions: Arc<SessionManager>,
}

impl ServerState {
    /// Wire up all services with in-memory collaborator implementations
    pub fn initialize(config: &Config) -> Self {
        let settings = SettingsService::new(OrderingSettings::default());
        let catalog = Arc::new(CatalogService::new());
        let store: Arc<dyn SessionStore> = Arc::new(MemorySessionStore::new());
        let order_log: Arc<dyn OrderLog> = Arc::new(MemoryOrderLog::new());
        let bus = TableBus::with_capacity(config.channel_capacity);

        if let Some(path) = &config.catalog_path {
            match Self::load_catalog_feed(&catalog, path) {
                Ok((products, categories)) => {
                    tracing::info!(products, categories, path = %path, "Catalog feed loaded");
                }
                Err(e) => {
                    tracing::error!(path = %path, error = %e, "Failed to load catalog feed, starting empty");
                }
            }
        }

        let sessions = Arc::new(SessionManager::new(
            store.clone(),
            catalog.clone(),
            settings.clone(),
            order_log.clone(),
            bus.clone(),
        ));

        Self {
            config: config.clone(),
            settings,
            catalog,
            store,
            order_log,
            bus,
            sessions,
        }
    }

    fn load_catalog_feed(
        catalog: &CatalogService,
        path: &str,
    ) -> Result<(usize, usize), Box<dyn std::error::Error>> {
        let raw = std::fs::read_to_string(path)?;
        let feed: CatalogFeed = serde_json::from_str(&raw)?;
        let counts = (feed.products.len(), feed.categories.len());
        catalog.load(feed.products, feed.categories);
        Ok(counts)
    }

    /// Spawn background tasks. Must be called before `Server::run()`.
    ///
    /// Tasks:
    /// - intent handler (dispatches bus intents to the mutation engine)
    /// - TCP bus listener (when enabled)
    pub fn start_background_tasks(&self) {
        let handler = IntentHandler::new(
            self.bus.subscribe_intents(),
            self.sessions.clone(),
            self.bus.clone(),
            self.bus.shutdown_token().clone(),
        );
        tokio::spawn(handler.run());

        if self.config.enable_bus_tcp {
            let server = BusTcpServer::new(
                self.bus.clone(),
                format!("0.0.0.0:{}", self.config.bus_tcp_port),
            );
            tokio::spawn(async move {
                if let Err(e) = server.run().await {
                    tracing::error!(error = %e, "Bus TCP server exited");
                }
            });
        }
    }
}
