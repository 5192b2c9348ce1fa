//! Operator-facing request/response handlers

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use muster_core::time::current_time_millis;
use muster_core::AgentId;
use muster_protocol::{BatteryStatus, CommandFrame, CommandKind};

use crate::api::auth;
use crate::registry::AgentSession;
use crate::state::ServerState;

/// Errors surfaced to operators as structured HTTP responses
#[derive(Error, Debug)]
pub enum ApiError {
    /// Presented credential did not match the shared secret
    #[error("unauthorized")]
    Unauthorized,

    /// Request was missing required parameters or carried invalid ones
    #[error("{0}")]
    BadRequest(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                Json(serde_json::json!({"ok": false})),
            )
                .into_response(),
            ApiError::BadRequest(message) => (
                StatusCode::BAD_REQUEST,
                Json(serde_json::json!({"error": message})),
            )
                .into_response(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    password: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    ok: bool,
    token: String,
}

/// `POST /login` - shared-secret check producing an opaque session token
pub async fn login(
    State(state): State<Arc<ServerState>>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let presented = request.password.unwrap_or_default();

    if !auth::verify_password(&presented, &state.config.admin_password) {
        tracing::warn!("Operator login rejected");
        return Err(ApiError::Unauthorized);
    }

    tracing::info!("Operator login accepted");
    Ok(Json(LoginResponse {
        ok: true,
        token: auth::generate_token(),
    }))
}

#[derive(Debug, Serialize)]
pub struct SsidResponse {
    ssids: Vec<String>,
}

/// `GET /ssid` - every network name ever observed, online agents or not
pub async fn list_ssids(State(state): State<Arc<ServerState>>) -> Json<SsidResponse> {
    Json(SsidResponse {
        ssids: state.registry.list_distinct_ssids(),
    })
}

#[derive(Debug, Deserialize)]
pub struct AgentsQuery {
    #[serde(default)]
    ssid: Option<String>,
}

/// One agent entry in the `GET /agents` response
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentSummary {
    agent_id: String,
    hostname: String,
    ssid: Option<String>,
    battery: Option<BatteryStatus>,
    platform: String,
    user: String,
    ip: String,
    last_seen: u64,
    /// Query-time classification: reported within the polling window
    responsive: bool,
}

impl AgentSummary {
    fn from_session(session: AgentSession, now_ms: u64, window: std::time::Duration) -> Self {
        let responsive = session.responsiveness(now_ms, window).is_responsive();
        Self {
            agent_id: session.agent_id.0,
            hostname: session.hostname,
            ssid: session.ssid,
            battery: session.battery,
            platform: session.platform,
            user: session.user,
            ip: session.ip,
            last_seen: session.last_seen,
            responsive,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AgentsResponse {
    agents: Vec<AgentSummary>,
}

/// `GET /agents?ssid=` - online sessions, optionally narrowed to one SSID.
///
/// Responsiveness is recomputed against the wall clock on every call.
pub async fn list_agents(
    State(state): State<Arc<ServerState>>,
    Query(query): Query<AgentsQuery>,
) -> Json<AgentsResponse> {
    let now = current_time_millis();
    let window = state.config.poll_window;

    let agents = state
        .registry
        .list_agents(&state.connections, query.ssid.as_deref())
        .into_iter()
        .map(|session| AgentSummary::from_session(session, now, window))
        .collect();

    Json(AgentsResponse { agents })
}

#[derive(Debug, Deserialize)]
pub struct CommandRequest {
    #[serde(default)]
    agent_ids: Option<Vec<String>>,
    #[serde(default)]
    cmd: Option<String>,
    #[serde(default)]
    script: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CommandResponse {
    sent: usize,
}

/// `POST /command` - dispatch a command to the selected agents.
///
/// Missing `agent_ids` or `cmd`, or an unrecognized command name, is
/// rejected before any dispatch attempt. Offline or unknown targets are
/// not an error; they just do not count as sent.
pub async fn dispatch_command(
    State(state): State<Arc<ServerState>>,
    Json(request): Json<CommandRequest>,
) -> Result<Json<CommandResponse>, ApiError> {
    let (Some(agent_ids), Some(cmd)) = (request.agent_ids, request.cmd) else {
        return Err(ApiError::BadRequest("Missing params".to_string()));
    };

    let kind: CommandKind = cmd
        .parse()
        .map_err(|e: muster_protocol::UnknownCommand| ApiError::BadRequest(e.to_string()))?;

    let targets: Vec<AgentId> = agent_ids.iter().map(AgentId::new).collect();
    let frame = CommandFrame {
        cmd: kind,
        script: request.script,
    };

    let report = state.relay.dispatch(&targets, frame);
    tracing::info!(
        "Dispatched {} to {} of {} requested agents",
        kind,
        report.sent_count(),
        targets.len()
    );

    Ok(Json(CommandResponse {
        sent: report.sent_count(),
    }))
}
