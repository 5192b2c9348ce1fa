//! muster-server: Fleet control-plane daemon
//!
//! The server accepts persistent WebSocket connections from remote agents,
//! reconciles their status reports into a live session registry, and relays
//! operator commands to the right connections. The HTTP surface for
//! operators and the agent transport share one process and one piece of
//! shared state: the registry.

pub mod api;
pub mod connection;
pub mod registry;
pub mod relay;
pub mod state;

pub use state::ServerState;
