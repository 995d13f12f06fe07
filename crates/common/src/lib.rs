//! Shared value types for the projection pipeline.
//!
//! - [`SequenceNumber`] — zero-based position in the ordered message stream
//! - [`MessageId`] — unique identity of a single message
//! - [`MessageEnvelope`] — a message payload together with its stream metadata

pub mod envelope;
pub mod types;

pub use envelope::{MessageEnvelope, MessageEnvelopeBuilder};
pub use types::{MessageId, SequenceNumber};
