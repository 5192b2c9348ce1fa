//! Envelope types exchanged over agent connections
//!
//! Every frame on an agent connection is a tagged JSON object
//! `{"type": ..., "data": ...}`. Agents send `status` reports and `ack`
//! frames; the server pushes `command` frames.
//!
//! # Frame Flow
//!
//! 1. Agent connects and immediately sends a `status` envelope
//! 2. Agent re-sends `status` on its polling interval
//! 3. Server pushes `command` envelopes at any time
//! 4. Agent may send `ack` after executing a command; the server accepts
//!    these but currently attaches no behavior to them

use serde::{Deserialize, Serialize};

use crate::command::CommandFrame;
use crate::error::ProtocolError;

/// A single frame on an agent connection
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "lowercase")]
pub enum Envelope {
    /// Periodic agent status report (agent -> server)
    Status(StatusReport),
    /// Command delivery acknowledgment (agent -> server).
    ///
    /// Accepted but not acted upon; the payload shape is unconstrained.
    /// Kept as an extension point for delivery confirmation.
    Ack(Option<serde_json::Value>),
    /// Command push (server -> agent)
    Command(CommandFrame),
}

impl Envelope {
    /// Encode this envelope as a JSON text frame
    pub fn to_json(&self) -> Result<String, ProtocolError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Decode a JSON text frame into an envelope.
    ///
    /// Returns an error for malformed JSON, unknown frame types, or a
    /// `status` frame missing its `agentId`. Callers at the transport
    /// boundary drop such frames without surfacing them further.
    pub fn from_json(text: &str) -> Result<Self, ProtocolError> {
        Ok(serde_json::from_str(text)?)
    }
}

/// Descriptive state reported by an agent.
///
/// Field names are camelCase on the wire. `agentId` is the only required
/// field: it is the stable identity the registry keys sessions by, supplied
/// by the agent rather than derived from the transport connection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusReport {
    /// Stable unique identifier for this agent
    pub agent_id: String,
    /// Machine hostname
    #[serde(default)]
    pub hostname: String,
    /// Operating system family (e.g. "windows", "darwin", "linux")
    #[serde(default)]
    pub platform: String,
    /// Logged-in user name
    #[serde(default)]
    pub user: String,
    /// Address the agent sees itself reachable at
    #[serde(default)]
    pub ip: String,
    /// Current wireless network name, if any
    #[serde(default)]
    pub ssid: Option<String>,
    /// Battery state, absent on machines without a battery
    #[serde(default)]
    pub battery: Option<BatteryStatus>,
}

/// Battery charge state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatteryStatus {
    /// Charge percentage, 0-100; null when the sensor reports nothing
    pub percent: Option<u8>,
    /// Whether external power is connected
    #[serde(default)]
    pub plugged: bool,
}
