//! statesync - shared state store with real-time fan-out.
//!
//! Clients read and replace a single JSON document over HTTP. Every accepted
//! write is pushed to all connected WebSocket clients.

pub mod config;
pub mod database;
pub mod error;
pub mod push;
pub mod server;
pub mod store;

pub use error::{Result, SyncError};
