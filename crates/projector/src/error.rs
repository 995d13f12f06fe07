//! Projector error types.

use common::SequenceNumber;
use thiserror::Error;

/// Errors that can occur while orchestrating projections.
#[derive(Debug, Error)]
pub enum ProjectorError {
    /// The projector was constructed without any projections.
    #[error("no projections registered")]
    NoProjections,

    /// A submitted message did not carry the expected sequence number.
    /// Earlier messages in the batch remain applied; nothing after the
    /// offending message is processed.
    #[error(
        "message {message_type} has invalid sequence number {actual} instead of {expected}"
    )]
    SequenceMismatch {
        message_type: String,
        expected: SequenceNumber,
        actual: SequenceNumber,
    },

    /// A projection handled a message but did not advance its next sequence
    /// number by exactly one. This is a defect in the projection, not a
    /// transient failure.
    #[error(
        "projection {projection} did not increment its next sequence number ({sequence}) after handling {message_type}"
    )]
    NotAdvanced {
        projection: &'static str,
        message_type: String,
        sequence: SequenceNumber,
    },

    /// A projection asked the active scope for a resource type it does not provide.
    #[error("resource {type_name} is not available in the current scope")]
    ResourceUnavailable { type_name: &'static str },

    /// A projection failed while reading its progress or handling a message.
    #[error("projection {projection} failed: {source}")]
    Handler {
        projection: &'static str,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl ProjectorError {
    /// Wraps a projection's own failure, preserving the source error.
    pub fn handler(
        projection: &'static str,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Self::Handler {
            projection,
            source: source.into(),
        }
    }
}

/// Result type for projector operations.
pub type Result<T> = std::result::Result<T, ProjectorError>;
