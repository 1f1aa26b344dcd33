//! Set of currently connected sessions.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use super::session::{DeliveryError, Session, SessionId};

/// Outcome of one [`SessionRegistry::for_each_live`] pass.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PassReport {
    /// Sessions the callback succeeded for.
    pub delivered: usize,
    /// Sessions found closed or failing, now removed.
    pub pruned: usize,
}

/// Thread-safe registry of live sessions, keyed by session identity.
///
/// Entries may already be closed; they are pruned lazily during
/// [`for_each_live`](Self::for_each_live). The lock is only held to copy or
/// edit the member map, never while delivering.
#[derive(Debug, Default)]
pub struct SessionRegistry {
    sessions: Mutex<HashMap<SessionId, Arc<Session>>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn members(&self) -> MutexGuard<'_, HashMap<SessionId, Arc<Session>>> {
        // The map stays consistent even if a holder panicked
        self.sessions.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Adds a session. Returns `false` if it was already registered.
    pub fn register(&self, session: Arc<Session>) -> bool {
        let id = session.id();
        let mut members = self.members();
        if members.contains_key(&id) {
            return false;
        }
        members.insert(id, session);
        tracing::debug!(session_id = id, sessions = members.len(), "Session registered");
        true
    }

    /// Removes a session. Returns `false` if it was not registered.
    pub fn unregister(&self, id: SessionId) -> bool {
        let mut members = self.members();
        let removed = members.remove(&id).is_some();
        if removed {
            tracing::debug!(session_id = id, sessions = members.len(), "Session unregistered");
        }
        removed
    }

    pub fn contains(&self, id: SessionId) -> bool {
        self.members().contains_key(&id)
    }

    /// Number of registered sessions, including not-yet-pruned closed ones.
    pub fn len(&self) -> usize {
        self.members().len()
    }

    pub fn is_empty(&self) -> bool {
        self.members().is_empty()
    }

    /// Copies the current members.
    pub fn snapshot(&self) -> Vec<Arc<Session>> {
        self.members().values().cloned().collect()
    }

    /// Runs `deliver` for every open session in a snapshot of the registry.
    ///
    /// Sessions that are closed before delivery, or whose delivery fails, are
    /// removed afterwards. Sessions registered while the pass runs are kept
    /// and will be part of the next pass.
    pub fn for_each_live<F>(&self, mut deliver: F) -> PassReport
    where
        F: FnMut(&Session) -> Result<(), DeliveryError>,
    {
        let mut report = PassReport::default();
        let mut dead = Vec::new();

        for session in self.snapshot() {
            if !session.is_open() {
                dead.push(session);
                continue;
            }
            match deliver(&session) {
                Ok(()) => report.delivered += 1,
                Err(_) => dead.push(session),
            }
        }

        if !dead.is_empty() {
            let mut members = self.members();
            for session in &dead {
                let same = members
                    .get(&session.id())
                    .is_some_and(|current| Arc::ptr_eq(current, session));
                if same {
                    members.remove(&session.id());
                    report.pruned += 1;
                }
            }
        }

        report
    }
}
