//! Agent WebSocket transport
//!
//! Each agent holds one persistent duplex connection. The handler owns the
//! socket for the connection's lifetime: inbound frames are decoded and fed
//! to the registry, outbound command frames arrive through the bounded
//! channel registered in the connection table.
//!
//! A malformed frame is dropped and logged; the connection survives, and no
//! other agent's session is affected. Socket teardown removes the table
//! entry and marks the bound session offline.

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::IntoResponse;
use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc;

use muster_core::time::current_time_millis;
use muster_core::ConnectionId;
use muster_protocol::Envelope;

use crate::state::ServerState;

/// `GET /agent/ws` - upgrade an inbound agent connection
pub async fn upgrade(
    ws: WebSocketUpgrade,
    State(state): State<Arc<ServerState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_agent_socket(socket, state))
}

/// Drive one agent connection until it closes
async fn handle_agent_socket(socket: WebSocket, state: Arc<ServerState>) {
    let (command_tx, mut command_rx) =
        mpsc::channel::<Envelope>(state.config.command_queue_depth);
    let connection = state.connections.register(command_tx);
    tracing::info!("Agent connected: {}", connection);

    let (mut ws_tx, mut ws_rx) = socket.split();

    loop {
        tokio::select! {
            // Relay -> agent: drain the outbound queue
            outbound = command_rx.recv() => {
                let Some(envelope) = outbound else {
                    // Table entry removed; connection is being torn down
                    break;
                };
                match envelope.to_json() {
                    Ok(text) => {
                        if ws_tx.send(Message::Text(text)).await.is_err() {
                            tracing::debug!("Send failed on {}, closing", connection);
                            break;
                        }
                    }
                    Err(e) => {
                        tracing::error!("Failed to encode outbound frame: {}", e);
                    }
                }
            }

            // Agent -> server: decode and apply inbound frames
            inbound = ws_rx.next() => {
                match inbound {
                    Some(Ok(Message::Text(text))) => {
                        handle_frame(&state, connection, &text);
                    }
                    Some(Ok(Message::Close(_))) | None => {
                        break;
                    }
                    Some(Ok(_)) => {
                        // Ping/pong and binary frames carry no envelopes
                    }
                    Some(Err(e)) => {
                        tracing::warn!("WebSocket error on {}: {}", connection, e);
                        break;
                    }
                }
            }
        }
    }

    state.connections.remove(connection);
    let dropped = state.registry.handle_disconnect(connection);
    if dropped.is_empty() {
        tracing::info!("Agent connection {} closed before any status report", connection);
    } else {
        for agent_id in &dropped {
            tracing::info!("Agent {} went offline ({})", agent_id, connection);
        }
    }
}

/// Decode one inbound text frame and route it.
///
/// Malformed payloads (bad JSON, unknown type, status without an agentId)
/// are dropped here and never reach the registry.
fn handle_frame(state: &ServerState, connection: ConnectionId, text: &str) {
    match Envelope::from_json(text) {
        Ok(Envelope::Status(report)) => {
            state
                .registry
                .report_status(&report, connection, current_time_millis());
        }
        Ok(Envelope::Ack(payload)) => {
            // Accepted, not acted upon. Extension point for delivery
            // confirmation.
            tracing::trace!("Ack from {}: {:?}", connection, payload);
        }
        Ok(Envelope::Command(_)) => {
            tracing::warn!("Unexpected command frame from agent on {}", connection);
        }
        Err(e) => {
            tracing::warn!("Dropping malformed frame from {}: {}", connection, e);
        }
    }
}
