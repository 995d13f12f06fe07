use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{MessageId, SequenceNumber};

/// A message envelope pairing a domain message with its stream metadata.
///
/// Envelopes are created by the upstream producer and are never mutated.
/// The payload is opaque to the pipeline; only the sequence number matters
/// for ordering.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageEnvelope {
    /// Unique identifier for this message.
    pub message_id: MessageId,

    /// The type of the message (e.g., "OrderCreated", "UserRegistered").
    pub message_type: String,

    /// Position of this message in the ordered stream.
    pub sequence_number: SequenceNumber,

    /// When the message was produced.
    pub timestamp: DateTime<Utc>,

    /// The message payload as JSON.
    pub payload: serde_json::Value,

    /// Additional metadata about the message.
    pub metadata: HashMap<String, serde_json::Value>,
}

impl MessageEnvelope {
    /// Creates a new message envelope builder.
    pub fn builder() -> MessageEnvelopeBuilder {
        MessageEnvelopeBuilder::default()
    }
}

/// Builder for constructing message envelopes.
#[derive(Debug, Default)]
pub struct MessageEnvelopeBuilder {
    message_id: Option<MessageId>,
    message_type: Option<String>,
    sequence_number: Option<SequenceNumber>,
    timestamp: Option<DateTime<Utc>>,
    payload: Option<serde_json::Value>,
    metadata: HashMap<String, serde_json::Value>,
}

impl MessageEnvelopeBuilder {
    /// Sets the message ID. If not set, a new ID will be generated.
    pub fn message_id(mut self, id: MessageId) -> Self {
        self.message_id = Some(id);
        self
    }

    /// Sets the message type.
    pub fn message_type(mut self, message_type: impl Into<String>) -> Self {
        self.message_type = Some(message_type.into());
        self
    }

    /// Sets the sequence number.
    pub fn sequence_number(mut self, sequence_number: impl Into<SequenceNumber>) -> Self {
        self.sequence_number = Some(sequence_number.into());
        self
    }

    /// Sets the timestamp. If not set, the current time will be used.
    pub fn timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    /// Sets the payload from a serializable value.
    pub fn payload<T: Serialize>(mut self, payload: &T) -> Result<Self, serde_json::Error> {
        self.payload = Some(serde_json::to_value(payload)?);
        Ok(self)
    }

    /// Sets the payload from a raw JSON value.
    pub fn payload_raw(mut self, payload: serde_json::Value) -> Self {
        self.payload = Some(payload);
        self
    }

    /// Adds a metadata entry.
    pub fn metadata(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }

    /// Builds the message envelope.
    ///
    /// # Panics
    ///
    /// Panics if required fields (message_type, sequence_number, payload)
    /// are not set.
    pub fn build(self) -> MessageEnvelope {
        MessageEnvelope {
            message_id: self.message_id.unwrap_or_default(),
            message_type: self.message_type.expect("message_type is required"),
            sequence_number: self.sequence_number.expect("sequence_number is required"),
            timestamp: self.timestamp.unwrap_or_else(Utc::now),
            payload: self.payload.expect("payload is required"),
            metadata: self.metadata,
        }
    }

    /// Tries to build the message envelope, returning None if required fields are missing.
    pub fn try_build(self) -> Option<MessageEnvelope> {
        Some(MessageEnvelope {
            message_id: self.message_id.unwrap_or_default(),
            message_type: self.message_type?,
            sequence_number: self.sequence_number?,
            timestamp: self.timestamp.unwrap_or_else(Utc::now),
            payload: self.payload?,
            metadata: self.metadata,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn envelope_builder_sets_all_fields() {
        let payload = serde_json::json!({"order": "test"});

        let envelope = MessageEnvelope::builder()
            .message_type("OrderCreated")
            .sequence_number(7)
            .payload_raw(payload.clone())
            .metadata("correlation_id", serde_json::json!("123"))
            .build();

        assert_eq!(envelope.message_type, "OrderCreated");
        assert_eq!(envelope.sequence_number, SequenceNumber::new(7));
        assert_eq!(envelope.payload, payload);
        assert_eq!(
            envelope.metadata.get("correlation_id"),
            Some(&serde_json::json!("123"))
        );
    }

    #[test]
    fn envelope_builder_generates_id_and_timestamp() {
        let e1 = MessageEnvelope::builder()
            .message_type("Ping")
            .sequence_number(0)
            .payload_raw(serde_json::json!({}))
            .build();
        let e2 = MessageEnvelope::builder()
            .message_type("Ping")
            .sequence_number(1)
            .payload_raw(serde_json::json!({}))
            .build();

        assert_ne!(e1.message_id, e2.message_id);
    }

    #[test]
    fn envelope_try_build_returns_none_on_missing_fields() {
        let result = MessageEnvelope::builder().try_build();
        assert!(result.is_none());
    }

    #[test]
    fn envelope_payload_from_serializable() {
        #[derive(Serialize)]
        struct Created {
            name: &'static str,
        }

        let envelope = MessageEnvelope::builder()
            .message_type("Created")
            .sequence_number(3)
            .payload(&Created { name: "widget" })
            .unwrap()
            .build();

        assert_eq!(envelope.payload, serde_json::json!({"name": "widget"}));
    }
}
