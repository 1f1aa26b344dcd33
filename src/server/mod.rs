//! HTTP server module for the state API and WebSocket push.
//!
//! - `GET /state`, `POST /state`: read and replace the shared document
//! - `GET /health`: liveness and connected client count
//! - `/`: WebSocket endpoint pushing state envelopes

pub mod error;
pub mod routes;
pub mod state;
pub mod ws;

use crate::error::Result;
use crate::server::routes::{health, state as state_routes};
use crate::server::state::AppState;
use crate::server::ws::ws_handler;

use axum::{routing::get, Router};
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

/// Builds the application router.
pub fn router(state: Arc<AppState>) -> Router {
    // Browser clients are served from other origins
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // WebSocket
        .route("/", get(ws_handler))
        // State API
        .route(
            "/state",
            get(state_routes::get_state).post(state_routes::post_state),
        )
        // Health check
        .route("/health", get(health::health_check))
        .layer(cors)
        .with_state(state)
}

/// Runs the server until `shutdown` resolves.
pub async fn serve<F>(state: Arc<AppState>, addr: SocketAddr, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("HTTP server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;

    tracing::info!("HTTP server stopped");
    Ok(())
}

#[cfg(test)]
pub(crate) fn test_state() -> Arc<AppState> {
    use crate::database::Database;
    use crate::store::StateService;

    let db = Database::open_in_memory().expect("in-memory database");
    Arc::new(AppState::new(StateService::new(db)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::{TcpListener, TcpStream};

    async fn spawn_app(state: Arc<AppState>) -> SocketAddr {
        let listener = TcpListener::bind(("127.0.0.1", 0)).await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move { axum::serve(listener, router(state)).await });
        addr
    }

    fn header_end(buf: &[u8]) -> Option<usize> {
        buf.windows(4).position(|w| w == b"\r\n\r\n").map(|p| p + 4)
    }

    /// Sends a raw HTTP/1.1 request and returns (status, body).
    async fn send_raw(addr: SocketAddr, request: String) -> (u16, String) {
        let mut stream = TcpStream::connect(addr).await.unwrap();
        stream.write_all(request.as_bytes()).await.unwrap();

        let mut buf = Vec::new();
        stream.read_to_end(&mut buf).await.unwrap();

        let text = String::from_utf8_lossy(&buf).to_string();
        let status = text
            .split_whitespace()
            .nth(1)
            .and_then(|code| code.parse().ok())
            .unwrap();
        let body = header_end(&buf)
            .map(|end| String::from_utf8_lossy(&buf[end..]).to_string())
            .unwrap_or_default();
        (status, body)
    }

    fn get(path: &str) -> String {
        format!("GET {path} HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n")
    }

    fn post(path: &str, content_type: &str, body: &str) -> String {
        format!(
            "POST {path} HTTP/1.1\r\nHost: localhost\r\nContent-Type: {content_type}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        )
    }

    #[tokio::test]
    async fn test_serve_stops_on_shutdown() {
        let addr = SocketAddr::from(([127, 0, 0, 1], 0));
        let result = serve(test_state(), addr, async {}).await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_state_roundtrip_over_http() {
        let addr = spawn_app(test_state()).await;

        let (status, body) = send_raw(addr, get("/state")).await;
        assert_eq!(status, 200);
        assert_eq!(
            serde_json::from_str::<Value>(&body).unwrap(),
            json!({ "todos": [], "bedtime": null, "timers": {}, "updatedAt": 0 })
        );

        let (status, body) = send_raw(
            addr,
            post("/state", "application/json", r#"{"todos":["dishes"],"updatedAt":1}"#),
        )
        .await;
        assert_eq!(status, 200);
        assert_eq!(serde_json::from_str::<Value>(&body).unwrap(), json!({ "ok": true }));

        let (_, body) = send_raw(addr, get("/state")).await;
        let stored: Value = serde_json::from_str(&body).unwrap();
        assert_eq!(stored["todos"], json!(["dishes"]));
        assert!(stored["updatedAt"].as_i64().unwrap() > 1);
    }

    #[tokio::test]
    async fn test_malformed_json_rejected_without_mutation() {
        let state = test_state();
        let addr = spawn_app(Arc::clone(&state)).await;

        let (status, _) = send_raw(addr, post("/state", "application/json", "{not json")).await;

        assert_eq!(status, 400);
        assert_eq!(state.service.database().fetch_state_json().unwrap(), None);
    }

    #[tokio::test]
    async fn test_wrong_content_type_rejected_without_mutation() {
        let state = test_state();
        let addr = spawn_app(Arc::clone(&state)).await;

        let (status, _) = send_raw(addr, post("/state", "text/plain", "{}")).await;

        assert_eq!(status, 415);
        assert_eq!(state.service.database().fetch_state_json().unwrap(), None);
    }

    #[tokio::test]
    async fn test_array_body_rejected_with_error_message() {
        let state = test_state();
        let addr = spawn_app(Arc::clone(&state)).await;

        let (status, body) = send_raw(addr, post("/state", "application/json", "[1]")).await;

        assert_eq!(status, 400);
        assert_eq!(
            serde_json::from_str::<Value>(&body).unwrap(),
            json!({ "error": "state must be an object" })
        );
        assert_eq!(state.service.database().fetch_state_json().unwrap(), None);
    }

    #[tokio::test]
    async fn test_websocket_root_sends_snapshot() {
        let state = test_state();
        let addr = spawn_app(Arc::clone(&state)).await;

        let mut stream = TcpStream::connect(addr).await.unwrap();
        stream
            .write_all(
                b"GET / HTTP/1.1\r\nHost: localhost\r\nConnection: Upgrade\r\nUpgrade: websocket\r\n\
                  Sec-WebSocket-Version: 13\r\nSec-WebSocket-Key: dGhlIHNhbXBsZSBub25jZQ==\r\n\r\n",
            )
            .await
            .unwrap();

        // Read the 101 response and one unmasked text frame
        let mut buf = Vec::new();
        let mut chunk = [0u8; 1024];
        let payload = loop {
            if let Some(end) = header_end(&buf) {
                let frame = &buf[end..];
                if frame.len() >= 2 {
                    let (len, offset) = match frame[1] & 0x7f {
                        126 if frame.len() >= 4 => {
                            (u16::from_be_bytes([frame[2], frame[3]]) as usize, 4)
                        }
                        126 => (usize::MAX, 0),
                        n => (n as usize, 2),
                    };
                    if len != usize::MAX && frame.len() >= offset + len {
                        assert_eq!(frame[0], 0x81);
                        break frame[offset..offset + len].to_vec();
                    }
                }
            }
            let n = stream.read(&mut chunk).await.unwrap();
            assert!(n > 0, "connection closed before first frame");
            buf.extend_from_slice(&chunk[..n]);
        };

        assert!(buf.starts_with(b"HTTP/1.1 101"));
        let envelope: Value = serde_json::from_slice(&payload).unwrap();
        assert_eq!(envelope["type"], "state");
        assert_eq!(envelope["payload"]["updatedAt"], 0);
        assert_eq!(state.registry.len(), 1);
    }
}
