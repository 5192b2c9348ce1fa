//! Command relay
//!
//! Resolves operator-selected targets against the registry and pushes one
//! command frame per live connection. Delivery is fire-and-forget: there is
//! no acknowledgment path, and a failed push is final for that call.

use std::sync::Arc;

use muster_core::AgentId;
use muster_protocol::{CommandFrame, Envelope};

use crate::connection::ConnectionTable;
use crate::registry::Registry;

/// Outcome of one target's delivery attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivery {
    /// The resolved target
    pub agent_id: AgentId,
    /// Whether the frame was handed to the connection's outbound queue
    pub sent: bool,
}

/// Aggregated per-target results of one dispatch call.
///
/// Unknown and offline targets are dropped during resolution and do not
/// appear here; they simply contribute nothing to the count.
#[derive(Debug, Clone, Default)]
pub struct DispatchReport {
    /// One entry per resolved live target, in resolution order
    pub deliveries: Vec<Delivery>,
}

impl DispatchReport {
    /// Number of successful pushes
    pub fn sent_count(&self) -> usize {
        self.deliveries.iter().filter(|d| d.sent).count()
    }
}

/// Pushes command frames to live agent connections
pub struct Relay {
    registry: Arc<Registry>,
    connections: Arc<ConnectionTable>,
}

impl Relay {
    /// Create a relay over the given registry and connection table
    pub fn new(registry: Arc<Registry>, connections: Arc<ConnectionTable>) -> Self {
        Self {
            registry,
            connections,
        }
    }

    /// Dispatch a command to the requested targets.
    ///
    /// Each live target gets its own push through the connection table's
    /// non-blocking queue, so one dead or slow peer cannot delay or abort
    /// delivery to the rest. The command payload is opaque here; `script`
    /// contents are the receiving agent's problem.
    pub fn dispatch(&self, agent_ids: &[AgentId], frame: CommandFrame) -> DispatchReport {
        let targets = self.registry.resolve_live(agent_ids, &self.connections);

        let mut report = DispatchReport::default();
        for (agent_id, connection) in targets {
            let sent = self
                .connections
                .push(connection, Envelope::Command(frame.clone()));

            if sent {
                tracing::debug!("Pushed {} command to {}", frame.cmd, agent_id);
            } else {
                // Connection closed or queue full between resolve and send
                tracing::warn!("Failed to push {} command to {}", frame.cmd, agent_id);
            }

            report.deliveries.push(Delivery { agent_id, sent });
        }

        report
    }
}
