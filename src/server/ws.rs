//! WebSocket handler for real-time state pushes.
//!
//! The channel is push-only: a client receives the current document on
//! connect and every accepted write afterwards. Inbound frames are ignored.

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::Response,
};
use chrono::Utc;
use futures::{Sink, SinkExt, Stream, StreamExt};
use std::sync::Arc;

use crate::push::{Envelope, Session, SessionId, SessionRegistry};
use crate::server::state::AppState;

/// WebSocket upgrade handler.
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<Arc<AppState>>) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Handles an individual WebSocket connection.
async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let (sender, receiver) = socket.split();
    run_connection(sender, receiver, state).await;
}

/// Removes the session from the registry when the connection ends,
/// whatever ended it.
struct Registration {
    registry: Arc<SessionRegistry>,
    id: SessionId,
}

impl Drop for Registration {
    fn drop(&mut self) {
        self.registry.unregister(self.id);
    }
}

/// Drives one connection from registration to teardown.
///
/// The snapshot is written straight to the socket before the queue
/// forwarder starts, so it is always the first frame. Broadcasts that land
/// in between wait in the session queue and follow it. A session pruned from
/// the registry (closed or too slow) ends the connection; the client
/// reconnects and gets a fresh snapshot.
pub(crate) async fn run_connection<S, R, E>(mut sender: S, mut receiver: R, state: Arc<AppState>)
where
    S: Sink<Message> + Unpin + Send + 'static,
    R: Stream<Item = Result<Message, E>> + Unpin + Send + 'static,
    E: Send + 'static,
{
    let (session, outbox) = Session::open();
    let (mut rx, mut evicted) = outbox.into_parts();
    let session_id = session.id();
    let connected_at = session.connected_at();

    state.registry.register(session);
    let registration = Registration {
        registry: Arc::clone(&state.registry),
        id: session_id,
    };

    tracing::info!(
        session_id,
        sessions = state.registry.len(),
        "WebSocket client connected"
    );

    let snapshot = state.service.load_state();
    let frame = match Envelope::state(&snapshot).to_frame() {
        Ok(frame) => frame,
        Err(e) => {
            tracing::error!(session_id, ?e, "Failed to serialize initial state");
            return;
        }
    };

    if sender.send(Message::Text(frame.to_string())).await.is_err() {
        tracing::warn!(session_id, "Initial state send failed, dropping connection");
        return;
    }

    // Forward queued broadcasts to the socket
    let mut send_task = tokio::spawn(async move {
        while let Some(frame) = rx.recv().await {
            if sender.send(Message::Text(frame.to_string())).await.is_err() {
                break;
            }
        }
    });

    // Drain inbound frames until the client goes away
    let mut recv_task = tokio::spawn(async move {
        while let Some(Ok(msg)) = receiver.next().await {
            if let Message::Close(_) = msg {
                break;
            }
        }
    });

    tokio::select! {
        _ = &mut send_task => recv_task.abort(),
        _ = &mut recv_task => send_task.abort(),
        _ = &mut evicted => {
            tracing::warn!(session_id, "Session pruned, closing connection");
            send_task.abort();
            recv_task.abort();
        }
    }

    drop(registration);
    tracing::info!(
        session_id,
        sessions = state.registry.len(),
        connected_secs = (Utc::now() - connected_at).num_seconds(),
        "WebSocket client disconnected"
    );
}
