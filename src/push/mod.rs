//! Real-time push to connected clients.
//!
//! Every connection gets a [`Session`] with its own bounded outbound queue. The
//! [`SessionRegistry`] tracks live sessions and the [`Broadcaster`] fans a
//! serialized [`Envelope`] out to all of them, pruning closed ones on the way.

pub mod broadcast;
pub mod envelope;
pub mod registry;
pub mod session;

pub use broadcast::Broadcaster;
pub use envelope::Envelope;
pub use registry::{PassReport, SessionRegistry};
pub use session::{DeliveryError, Frame, Outbox, Session, SessionId, OUTBOX_CAPACITY};
