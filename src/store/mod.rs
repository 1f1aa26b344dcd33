//! Shared document model and the state service around it.
//!
//! The service owns the load/stamp/persist sequence for the one document
//! every client reads and writes.

pub mod document;
pub mod service;

pub use document::*;
pub use service::*;
