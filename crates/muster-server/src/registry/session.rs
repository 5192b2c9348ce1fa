//! Per-agent session record

use std::time::Duration;

use muster_core::liveness::Responsiveness;
use muster_core::{AgentId, ConnectionId};
use muster_protocol::{BatteryStatus, StatusReport};

use crate::connection::ConnectionTable;

/// The registry's record of one agent's latest known state and its
/// live-connection binding.
///
/// Sessions are created on the first status report from an unseen agent ID
/// and survive disconnects with `connection` cleared, so metadata is
/// retained across reconnects. They are never destroyed.
#[derive(Debug, Clone)]
pub struct AgentSession {
    /// Stable identity supplied by the agent
    pub agent_id: AgentId,
    /// Machine hostname, last report wins
    pub hostname: String,
    /// Operating system family
    pub platform: String,
    /// Logged-in user
    pub user: String,
    /// Self-reported address
    pub ip: String,
    /// Current wireless network, the sole grouping dimension
    pub ssid: Option<String>,
    /// Battery state, if the machine has one
    pub battery: Option<BatteryStatus>,
    /// Weak back-reference to the transport connection currently bound to
    /// this agent. Cleared, not deleted, on disconnect.
    pub connection: Option<ConnectionId>,
    /// Unix milliseconds of the most recent accepted status report.
    /// Monotonically non-decreasing per session.
    pub last_seen: u64,
}

impl AgentSession {
    /// Build a fresh session from an agent's first status report
    pub fn from_report(report: &StatusReport, connection: ConnectionId, now_ms: u64) -> Self {
        Self {
            agent_id: AgentId::new(&report.agent_id),
            hostname: report.hostname.clone(),
            platform: report.platform.clone(),
            user: report.user.clone(),
            ip: report.ip.clone(),
            ssid: report.ssid.clone(),
            battery: report.battery,
            connection: Some(connection),
            last_seen: now_ms,
        }
    }

    /// Overwrite descriptive fields from a newer report and rebind the
    /// connection. The caller is responsible for the timestamp ordering
    /// check; this method applies unconditionally.
    pub fn apply_report(&mut self, report: &StatusReport, connection: ConnectionId, now_ms: u64) {
        self.hostname = report.hostname.clone();
        self.platform = report.platform.clone();
        self.user = report.user.clone();
        self.ip = report.ip.clone();
        self.ssid = report.ssid.clone();
        self.battery = report.battery;
        self.connection = Some(connection);
        self.last_seen = now_ms;
    }

    /// Structural liveness: bound to a handle the transport still holds.
    ///
    /// A session whose handle has been cleared, or whose handle the table
    /// no longer knows, is offline regardless of `last_seen` recency.
    pub fn is_online(&self, table: &ConnectionTable) -> bool {
        match self.connection {
            Some(id) => table.contains(id),
            None => false,
        }
    }

    /// Query-time responsiveness classification against the polling window
    pub fn responsiveness(&self, now_ms: u64, window: Duration) -> Responsiveness {
        Responsiveness::classify(self.last_seen, now_ms, window)
    }
}
