//! Fan-out of state documents to every live session.

use std::sync::Arc;

use super::envelope::Envelope;
use super::registry::SessionRegistry;
use crate::store::Document;

/// Pushes documents to all registered sessions.
#[derive(Debug, Clone)]
pub struct Broadcaster {
    registry: Arc<SessionRegistry>,
}

impl Broadcaster {
    pub fn new(registry: Arc<SessionRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &Arc<SessionRegistry> {
        &self.registry
    }

    /// Sends `doc` wrapped in a state envelope to every live session.
    ///
    /// The envelope is serialized once and the same frame is queued for each
    /// session. Failed sessions are pruned; nothing is reported to the caller.
    pub fn broadcast(&self, doc: &Document) {
        let frame = match Envelope::state(doc).to_frame() {
            Ok(frame) => frame,
            Err(e) => {
                tracing::error!(?e, "Failed to serialize state envelope");
                return;
            }
        };

        let report = self.registry.for_each_live(|session| session.deliver(&frame));

        if report.pruned > 0 {
            tracing::warn!(pruned = report.pruned, "Dropped closed sessions during broadcast");
        }
        tracing::debug!(
            delivered = report.delivered,
            bytes = frame.len(),
            "State broadcast"
        );
    }
}
