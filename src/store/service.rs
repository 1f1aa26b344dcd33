//! Load and save the shared document.

use super::document::{default_document, now_millis, parse_document, stamp, Document};
use crate::database::Database;
use crate::error::Result;

/// Reads and replaces the shared document.
///
/// Writes are whole-document replacements. There is no merge with the
/// previous value and no version check.
#[derive(Clone)]
pub struct StateService {
    db: Database,
}

impl StateService {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Underlying store.
    pub fn database(&self) -> &Database {
        &self.db
    }

    /// Returns the current document.
    ///
    /// Never fails: a missing, corrupt or unreadable document degrades to
    /// [`default_document`].
    pub fn load_state(&self) -> Document {
        let raw = match self.db.fetch_state_json() {
            Ok(raw) => raw,
            Err(e) => {
                tracing::error!(?e, "Failed to read shared state, serving default");
                return default_document();
            }
        };

        let Some(raw) = raw else {
            return default_document();
        };

        match parse_document(&raw) {
            Some(doc) => doc,
            None => {
                tracing::warn!(bytes = raw.len(), "Stored state is not a JSON object, serving default");
                default_document()
            }
        }
    }

    /// Stamps `updatedAt` and persists `candidate` as the new document.
    ///
    /// Returns the stamped document exactly as stored. On failure the
    /// previously stored document is left untouched.
    pub fn save_state(&self, mut candidate: Document) -> Result<Document> {
        stamp(&mut candidate, now_millis());

        let json = serde_json::to_string(&candidate)?;
        self.db.update_state_json(&json)?;

        tracing::debug!(bytes = json.len(), "Shared state saved");
        Ok(candidate)
    }
}
