//! SQLite storage for the shared state document.
//!
//! The whole application state lives in a single row: the document as JSON
//! text plus the time it was last replaced. Writes replace the row contents
//! unconditionally, so concurrent writers resolve to last-writer-wins.

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::error::{Result, SyncError};

/// Database wrapper with thread-safe connection.
#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    /// Opens or creates the database at `path`.
    ///
    /// Missing parent directories are created.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        tracing::info!(path = ?path, "Opening database");

        let conn = Connection::open(path)?;

        // WAL keeps readers off the writer's lock
        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.pragma_update(None, "synchronous", "NORMAL")?;

        let db = Self {
            conn: Arc::new(Mutex::new(conn)),
        };

        db.init_schema()?;

        Ok(db)
    }

    /// Opens an in-memory database (for testing).
    #[cfg(test)]
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        db.init_schema()?;
        Ok(db)
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| SyncError::LockPoisoned)
    }

    /// Initializes the schema and seeds the single state row.
    fn init_schema(&self) -> Result<()> {
        let conn = self.lock()?;

        conn.execute_batch(
            r#"
            -- One row, id = 1. NULL state means nothing was ever saved.
            CREATE TABLE IF NOT EXISTS shared_state (
                id INTEGER PRIMARY KEY CHECK (id = 1),
                state TEXT,
                updated_at TEXT NOT NULL
            );
            "#,
        )?;

        let seeded = conn.execute(
            "INSERT OR IGNORE INTO shared_state (id, state, updated_at) VALUES (1, NULL, ?1)",
            params![Utc::now().to_rfc3339()],
        )?;
        if seeded > 0 {
            tracing::info!("Seeded empty shared_state row");
        }

        tracing::debug!("Database schema initialized");
        Ok(())
    }

    /// Returns the stored document text, or `None` if nothing was saved yet.
    pub fn fetch_state_json(&self) -> Result<Option<String>> {
        let conn = self.lock()?;

        let state = conn
            .query_row("SELECT state FROM shared_state WHERE id = 1", [], |row| {
                row.get::<_, Option<String>>(0)
            })
            .optional()?;

        Ok(state.flatten())
    }

    /// Replaces the stored document text and bumps the modification time.
    pub fn update_state_json(&self, state_json: &str) -> Result<()> {
        let conn = self.lock()?;

        conn.execute(
            "INSERT INTO shared_state (id, state, updated_at) VALUES (1, ?1, ?2)
             ON CONFLICT(id) DO UPDATE SET state = excluded.state, updated_at = excluded.updated_at",
            params![state_json, Utc::now().to_rfc3339()],
        )?;

        Ok(())
    }

    /// Time of the last successful write, if any write happened.
    pub fn last_modified(&self) -> Result<Option<DateTime<Utc>>> {
        let conn = self.lock()?;

        let row: Option<(Option<String>, String)> = conn
            .query_row(
                "SELECT state, updated_at FROM shared_state WHERE id = 1",
                [],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;

        Ok(row
            .filter(|(state, _)| state.is_some())
            .and_then(|(_, updated_at)| DateTime::parse_from_rfc3339(&updated_at).ok())
            .map(|t| t.with_timezone(&Utc)))
    }
}
