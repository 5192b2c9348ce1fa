//! Registry store
//!
//! In-memory directory of agent sessions, keyed by agent identity. This is
//! the one shared mutable resource in the process: status upserts and
//! disconnect handling interleave with operator queries from other tasks.
//! The map shards its locking, so updates to two different agents never
//! contend and overlapping reports for the same agent serialize.
//!
//! The registry holds no transport state. Whether a stored handle is still
//! live is always answered by the [`ConnectionTable`].

use std::collections::BTreeSet;

use dashmap::DashMap;

use muster_core::{AgentId, ConnectionId};
use muster_protocol::StatusReport;

use crate::connection::ConnectionTable;
use crate::registry::AgentSession;

/// In-memory agent session registry.
///
/// Rebuilt from scratch on server restart; nothing here persists.
pub struct Registry {
    sessions: DashMap<AgentId, AgentSession>,
}

impl Registry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self {
            sessions: DashMap::new(),
        }
    }

    /// Upsert a session from a status report arriving on `connection`.
    ///
    /// Binds the connection handle, overwrites descriptive fields, and
    /// advances `last_seen` to `now_ms`. A report timestamped earlier than
    /// the session's `last_seen` is rejected so the timestamp never
    /// regresses; the session is left untouched.
    ///
    /// Never fails on well-formed input. Malformed payloads are dropped at
    /// the transport boundary and never reach this method.
    pub fn report_status(&self, report: &StatusReport, connection: ConnectionId, now_ms: u64) {
        let agent_id = AgentId::new(&report.agent_id);

        match self.sessions.entry(agent_id.clone()) {
            dashmap::mapref::entry::Entry::Occupied(mut entry) => {
                let session = entry.get_mut();
                if now_ms < session.last_seen {
                    tracing::debug!(
                        "Rejecting out-of-order status for {} ({} < {})",
                        agent_id,
                        now_ms,
                        session.last_seen
                    );
                    return;
                }
                session.apply_report(report, connection, now_ms);
            }
            dashmap::mapref::entry::Entry::Vacant(entry) => {
                tracing::info!("New agent session: {}", agent_id);
                entry.insert(AgentSession::from_report(report, connection, now_ms));
            }
        }
    }

    /// Clear the connection binding of every session bound to `connection`.
    ///
    /// Sessions become offline but are not deleted, so their metadata
    /// survives the disconnect. Idempotent: repeating the call, or calling
    /// it for a handle that was never registered, changes nothing.
    ///
    /// Returns the IDs of the agents that went offline.
    pub fn handle_disconnect(&self, connection: ConnectionId) -> Vec<AgentId> {
        let mut affected = Vec::new();

        for mut entry in self.sessions.iter_mut() {
            if entry.connection == Some(connection) {
                entry.connection = None;
                affected.push(entry.agent_id.clone());
            }
        }

        affected
    }

    /// Snapshot of all online sessions, optionally narrowed to one SSID.
    ///
    /// Online means bound to a handle the connection table still holds.
    /// The result carries no duplicates; order is unspecified.
    pub fn list_agents(&self, table: &ConnectionTable, ssid: Option<&str>) -> Vec<AgentSession> {
        self.sessions
            .iter()
            .filter(|entry| entry.is_online(table))
            .filter(|entry| match ssid {
                Some(wanted) => entry.ssid.as_deref() == Some(wanted),
                None => true,
            })
            .map(|entry| entry.value().clone())
            .collect()
    }

    /// Every non-null SSID observed across all known sessions, online or
    /// not, deduplicated.
    pub fn list_distinct_ssids(&self) -> Vec<String> {
        let set: BTreeSet<String> = self
            .sessions
            .iter()
            .filter_map(|entry| entry.ssid.clone())
            .collect();
        set.into_iter().collect()
    }

    /// Resolve the subset of `agent_ids` that is currently online, with
    /// their connection handles. Unknown and offline IDs are silently
    /// dropped; resolution never fails.
    pub fn resolve_live(
        &self,
        agent_ids: &[AgentId],
        table: &ConnectionTable,
    ) -> Vec<(AgentId, ConnectionId)> {
        agent_ids
            .iter()
            .filter_map(|id| {
                let session = self.sessions.get(id)?;
                let connection = session.connection?;
                if table.contains(connection) {
                    Some((id.clone(), connection))
                } else {
                    None
                }
            })
            .collect()
    }

    /// Look up a session snapshot by agent ID
    pub fn get(&self, agent_id: &AgentId) -> Option<AgentSession> {
        self.sessions.get(agent_id).map(|entry| entry.value().clone())
    }

    /// Number of known sessions, online or offline
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    /// Check if the registry has no sessions
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}
