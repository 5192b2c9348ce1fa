//! muster-core: Core abstractions and configuration for muster
//!
//! This crate provides shared types, liveness policy, and configuration
//! structures used by the control-plane server.

pub mod config;
pub mod error;
pub mod liveness;
pub mod time;
pub mod types;

pub use error::ConfigError;
pub use liveness::{Responsiveness, DEFAULT_POLL_WINDOW};
pub use types::{AgentId, ConnectionId};
