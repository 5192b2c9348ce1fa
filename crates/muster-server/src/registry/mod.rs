//! Agent session registry

mod session;
mod store;

pub use session::AgentSession;
pub use store::Registry;
