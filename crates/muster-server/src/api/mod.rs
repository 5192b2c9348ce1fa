//! Transport adapter: operator HTTP API and agent WebSocket endpoint

pub mod agent_ws;
pub mod auth;
pub mod operator;

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;

use crate::state::ServerState;

/// Build the axum router serving both traffic classes.
///
/// Operator request/response endpoints live at the root; the agent
/// transport is namespaced under `/agent`.
pub fn router(state: Arc<ServerState>) -> Router {
    Router::new()
        .route("/login", post(operator::login))
        .route("/ssid", get(operator::list_ssids))
        .route("/agents", get(operator::list_agents))
        .route("/command", post(operator::dispatch_command))
        .route("/agent/ws", get(agent_ws::upgrade))
        .with_state(state)
}
