//! A single push-capable connection.

use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::mpsc::error::{TryRecvError, TrySendError};
use tokio::sync::{mpsc, oneshot};

/// Unique session identifier, assigned on creation.
pub type SessionId = u64;

/// A serialized text frame. Cloning shares the same bytes.
pub type Frame = Arc<str>;

/// Frames a session may have queued before it counts as too slow.
pub const OUTBOX_CAPACITY: usize = 64;

static NEXT_SESSION_ID: AtomicU64 = AtomicU64::new(1);

/// Why a frame could not be handed to a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DeliveryError {
    /// The connection's writer has gone away.
    #[error("session closed")]
    Closed,

    /// The client is not reading; its queue is at capacity.
    #[error("session queue full")]
    Full,
}

/// Handle to one connected client.
///
/// Frames are queued on a bounded channel drained by the connection's writer
/// task, so delivery never waits on the socket. The session reads as closed
/// once that writer drops its receiver. Dropping the session resolves the
/// [`Outbox`] eviction signal so the connection can shut down.
#[derive(Debug)]
pub struct Session {
    id: SessionId,
    tx: mpsc::Sender<Frame>,
    connected_at: DateTime<Utc>,
    _evict: oneshot::Sender<()>,
}

/// Receiving side of a session: queued frames plus the eviction signal.
#[derive(Debug)]
pub struct Outbox {
    frames: mpsc::Receiver<Frame>,
    evicted: oneshot::Receiver<()>,
}

impl Outbox {
    /// Next queued frame; `None` once the session is gone and drained.
    pub async fn recv(&mut self) -> Option<Frame> {
        self.frames.recv().await
    }

    pub fn try_recv(&mut self) -> Result<Frame, TryRecvError> {
        self.frames.try_recv()
    }

    /// Splits into the frame queue and a future that resolves when the
    /// session has been dropped.
    pub fn into_parts(self) -> (mpsc::Receiver<Frame>, oneshot::Receiver<()>) {
        (self.frames, self.evicted)
    }
}

impl Session {
    /// Creates a session with an [`OUTBOX_CAPACITY`] queue.
    pub fn open() -> (Arc<Self>, Outbox) {
        Self::with_capacity(OUTBOX_CAPACITY)
    }

    /// Creates a session whose queue holds at most `capacity` frames.
    pub fn with_capacity(capacity: usize) -> (Arc<Self>, Outbox) {
        let (tx, frames) = mpsc::channel(capacity.max(1));
        let (evict, evicted) = oneshot::channel();
        let session = Arc::new(Self {
            id: NEXT_SESSION_ID.fetch_add(1, Ordering::Relaxed),
            tx,
            connected_at: Utc::now(),
            _evict: evict,
        });
        (session, Outbox { frames, evicted })
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn connected_at(&self) -> DateTime<Utc> {
        self.connected_at
    }

    /// Whether the connection is still accepting frames.
    pub fn is_open(&self) -> bool {
        !self.tx.is_closed()
    }

    /// Queues `frame` for this connection without waiting.
    pub fn deliver(&self, frame: &Frame) -> Result<(), DeliveryError> {
        self.tx.try_send(Arc::clone(frame)).map_err(|e| match e {
            TrySendError::Full(_) => DeliveryError::Full,
            TrySendError::Closed(_) => DeliveryError::Closed,
        })
    }
}
