//! End-to-end agent lifecycle test
//!
//! Runs the real server on a loopback listener, connects a WebSocket
//! client playing the agent role, and drives the full report / query /
//! dispatch / disconnect cycle through the public surfaces.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use futures::{SinkExt, StreamExt};
use serde_json::{json, Value};
use tokio::time::{sleep, timeout};
use tokio_tungstenite::tungstenite::Message;
use tower::ServiceExt;

use muster_core::config::ServerConfig;
use muster_server::{api, ServerState};

async fn start_server() -> (Router, SocketAddr) {
    let mut config = ServerConfig::default();
    config.admin_password = "correct-horse".to_string();

    let state = Arc::new(ServerState::new(config));
    let app = api::router(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let serve_app = app.clone();
    tokio::spawn(async move {
        axum::serve(listener, serve_app).await.unwrap();
    });

    (app, addr)
}

async fn get(app: &Router, uri: &str) -> Value {
    let response = app
        .clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

async fn post(app: &Router, uri: &str, body: Value) -> Value {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

/// Poll an HTTP query until the predicate holds or the deadline passes
async fn wait_until<F>(app: &Router, uri: &str, predicate: F) -> Value
where
    F: Fn(&Value) -> bool,
{
    timeout(Duration::from_secs(5), async {
        loop {
            let body = get(app, uri).await;
            if predicate(&body) {
                return body;
            }
            sleep(Duration::from_millis(20)).await;
        }
    })
    .await
    .expect("condition not reached before timeout")
}

#[tokio::test]
async fn test_agent_lifecycle() {
    let (app, addr) = start_server().await;

    // Agent connects and reports in
    let (mut ws, _) = tokio_tungstenite::connect_async(format!("ws://{}/agent/ws", addr))
        .await
        .expect("WebSocket connect failed");

    let status_frame = json!({
        "type": "status",
        "data": {
            "agentId": "A1",
            "hostname": "lab-01",
            "platform": "windows",
            "user": "student",
            "ip": "10.0.0.17",
            "ssid": "Office",
            "battery": {"percent": 80, "plugged": false}
        }
    });
    ws.send(Message::Text(status_frame.to_string()))
        .await
        .unwrap();

    // The network appears in the SSID directory
    let body = wait_until(&app, "/ssid", |b| {
        b["ssids"].as_array().is_some_and(|s| !s.is_empty())
    })
    .await;
    assert_eq!(body["ssids"], json!(["Office"]));

    // The agent is listed online with its reported battery state
    let body = get(&app, "/agents").await;
    let agents = body["agents"].as_array().unwrap();
    assert_eq!(agents.len(), 1);
    assert_eq!(agents[0]["agentId"], "A1");
    assert_eq!(agents[0]["battery"]["percent"], 80);

    // A malformed frame is dropped without killing the connection
    ws.send(Message::Text("{not json".to_string())).await.unwrap();
    ws.send(Message::Text(json!({"type": "ack"}).to_string()))
        .await
        .unwrap();

    // Dispatch reaches the live connection
    let body = post(
        &app,
        "/command",
        json!({"agent_ids": ["A1"], "cmd": "reboot"}),
    )
    .await;
    assert_eq!(body["sent"], 1);

    let frame = timeout(Duration::from_secs(5), ws.next())
        .await
        .expect("no command frame before timeout")
        .expect("stream ended")
        .expect("WebSocket error");
    let pushed: Value = serde_json::from_str(frame.to_text().unwrap()).unwrap();
    assert_eq!(pushed["type"], "command");
    assert_eq!(pushed["data"]["cmd"], "reboot");

    // Agent disconnects: listing empties, networks stay advertised
    ws.close(None).await.unwrap();

    wait_until(&app, "/agents", |b| {
        b["agents"].as_array().is_some_and(|a| a.is_empty())
    })
    .await;

    let body = get(&app, "/ssid").await;
    assert_eq!(body["ssids"], json!(["Office"]));

    // Commands to the now-offline agent deliver nothing
    let body = post(
        &app,
        "/command",
        json!({"agent_ids": ["A1"], "cmd": "reboot"}),
    )
    .await;
    assert_eq!(body["sent"], 0);
}

#[tokio::test]
async fn test_reconnect_restores_visibility() {
    let (app, addr) = start_server().await;
    let url = format!("ws://{}/agent/ws", addr);

    let status_frame = json!({
        "type": "status",
        "data": {"agentId": "A2", "hostname": "lab-02", "ssid": "Lab"}
    })
    .to_string();

    let (mut ws, _) = tokio_tungstenite::connect_async(&url).await.unwrap();
    ws.send(Message::Text(status_frame.clone())).await.unwrap();
    wait_until(&app, "/agents", |b| {
        b["agents"].as_array().is_some_and(|a| a.len() == 1)
    })
    .await;

    ws.close(None).await.unwrap();
    wait_until(&app, "/agents", |b| {
        b["agents"].as_array().is_some_and(|a| a.is_empty())
    })
    .await;

    // Same identity on a fresh connection becomes one online session again
    let (mut ws, _) = tokio_tungstenite::connect_async(&url).await.unwrap();
    ws.send(Message::Text(status_frame)).await.unwrap();

    let body = wait_until(&app, "/agents", |b| {
        b["agents"].as_array().is_some_and(|a| a.len() == 1)
    })
    .await;
    assert_eq!(body["agents"][0]["agentId"], "A2");
}
