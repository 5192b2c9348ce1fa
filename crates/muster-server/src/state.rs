//! Shared server state

use std::sync::Arc;

use muster_core::config::ServerConfig;

use crate::connection::ConnectionTable;
use crate::registry::Registry;
use crate::relay::Relay;

/// State shared by the agent transport and the operator API.
///
/// Constructed once at startup and injected into the router; there is no
/// ambient global registry.
pub struct ServerState {
    /// Configuration
    pub config: ServerConfig,
    /// Agent session registry
    pub registry: Arc<Registry>,
    /// Live-connection table, owned by the transport layer
    pub connections: Arc<ConnectionTable>,
    /// Command relay
    pub relay: Relay,
}

impl ServerState {
    /// Create fresh server state from configuration
    pub fn new(config: ServerConfig) -> Self {
        let registry = Arc::new(Registry::new());
        let connections = Arc::new(ConnectionTable::new());
        let relay = Relay::new(Arc::clone(&registry), Arc::clone(&connections));

        Self {
            config,
            registry,
            connections,
            relay,
        }
    }
}
