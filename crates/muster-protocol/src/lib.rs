//! muster-protocol: Wire protocol for the muster fleet control plane
//!
//! This crate defines the JSON envelope exchanged between agents and the
//! server over persistent duplex connections.

pub mod command;
pub mod envelope;
pub mod error;

pub use command::{CommandFrame, CommandKind, UnknownCommand};
pub use envelope::{BatteryStatus, Envelope, StatusReport};
pub use error::ProtocolError;
