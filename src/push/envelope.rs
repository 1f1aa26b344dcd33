//! Wire wrapper for pushed documents.

use serde::Serialize;

use super::session::Frame;
use crate::store::Document;

/// `{"type": "state", "payload": <document>}`
#[derive(Debug, Serialize)]
pub struct Envelope<'a> {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub payload: &'a Document,
}

impl<'a> Envelope<'a> {
    /// Message type for full-state pushes.
    pub const STATE: &'static str = "state";

    pub fn state(payload: &'a Document) -> Self {
        Self {
            kind: Self::STATE,
            payload,
        }
    }

    /// Serializes the envelope into a text frame.
    pub fn to_frame(&self) -> serde_json::Result<Frame> {
        serde_json::to_string(self).map(Frame::from)
    }
}
