//! Shared application state for the HTTP server.

use std::sync::Arc;

use crate::push::{Broadcaster, SessionRegistry};
use crate::store::StateService;

/// Application state shared across all handlers.
pub struct AppState {
    /// Load/save of the shared document.
    pub service: StateService,
    /// Connected WebSocket sessions.
    pub registry: Arc<SessionRegistry>,
    /// Fan-out over `registry`.
    pub broadcaster: Broadcaster,
}

impl AppState {
    /// Creates app state with an empty session registry.
    pub fn new(service: StateService) -> Self {
        let registry = Arc::new(SessionRegistry::new());
        let broadcaster = Broadcaster::new(Arc::clone(&registry));
        Self {
            service,
            registry,
            broadcaster,
        }
    }
}
