//! Orchestrator dispatching an ordered message stream to projections.

use std::sync::Arc;

use common::{MessageEnvelope, SequenceNumber};
use tokio_util::sync::CancellationToken;

use crate::error::{ProjectorError, Result};
use crate::projection::Projection;
use crate::scope::ScopeFactory;

/// Dispatches ordered messages to a fixed set of projections, advancing a
/// stream watermark one message at a time.
///
/// The watermark is the minimum of all projections' next sequence numbers:
/// a message is only safe to deliver once every projection either needs it
/// or has already passed it. It is computed lazily on first use and advanced
/// in place as messages are processed.
///
/// All mutating entry points take `&mut self`, so one `Projector` instance
/// serves one stream with serialized calls; callers needing concurrent
/// orchestration own one instance per independent stream.
///
/// Messages within one call are processed strictly in order, and projections
/// are awaited one at a time per message. If a call is cancelled between two
/// projections handling the same message, that message is partially applied
/// and the watermark is not advanced for it; on the next dispatch of the
/// same sequence number the per-projection position check skips projections
/// that already advanced past it, so redelivery is safe without requiring
/// idempotent handlers.
pub struct Projector<F: ScopeFactory> {
    projections: Vec<Arc<dyn Projection>>,
    scope_factory: F,
    watermark: Option<SequenceNumber>,
}

impl<F: ScopeFactory> Projector<F> {
    /// Creates a projector over the given projections and scope factory.
    ///
    /// Fails with [`ProjectorError::NoProjections`] when `projections` is
    /// empty. The projection set is fixed for the lifetime of the projector.
    pub fn new(projections: Vec<Arc<dyn Projection>>, scope_factory: F) -> Result<Self> {
        if projections.is_empty() {
            return Err(ProjectorError::NoProjections);
        }
        Ok(Self {
            projections,
            scope_factory,
            watermark: None,
        })
    }

    /// Returns the number of registered projections.
    pub fn projection_count(&self) -> usize {
        self.projections.len()
    }

    /// Returns the next sequence number needed by the most out-of-date
    /// projection.
    ///
    /// Computed once by querying every projection through a fresh scope and
    /// taking the minimum; subsequent calls return the cached value, which
    /// only moves forward as messages are projected.
    #[tracing::instrument(skip(self))]
    pub async fn next_sequence_number(&mut self) -> Result<SequenceNumber> {
        if let Some(watermark) = self.watermark {
            return Ok(watermark);
        }

        let scope = self.scope_factory.begin_scope();
        let mut minimum: Option<SequenceNumber> = None;
        for projection in &self.projections {
            let next = projection.next_sequence_number(scope.as_ref()).await?;
            minimum = Some(match minimum {
                Some(current) if current <= next => current,
                _ => next,
            });
        }

        // The constructor guarantees a non-empty projection set.
        let watermark = minimum.ok_or(ProjectorError::NoProjections)?;
        tracing::debug!(watermark = watermark.as_i64(), "initialized watermark");
        self.watermark = Some(watermark);
        Ok(watermark)
    }

    /// Projects a single message to all registered projections.
    pub async fn project(&mut self, envelope: &MessageEnvelope) -> Result<()> {
        self.project_with(envelope, &CancellationToken::new()).await
    }

    /// Projects a single message with cancellation support.
    pub async fn project_with(
        &mut self,
        envelope: &MessageEnvelope,
        cancel: &CancellationToken,
    ) -> Result<()> {
        self.project_batch_with(std::slice::from_ref(envelope), cancel)
            .await
    }

    /// Projects an ordered batch of messages to all registered projections.
    pub async fn project_batch(&mut self, envelopes: &[MessageEnvelope]) -> Result<()> {
        self.project_batch_with(envelopes, &CancellationToken::new())
            .await
    }

    /// Projects an ordered batch of messages with cancellation support.
    ///
    /// Each message must carry the sequence number the watermark currently
    /// expects; the batch shares one resource scope, released when the call
    /// returns. Cancellation stops dispatch at the next boundary and is not
    /// an error: effects of fully completed messages stand, and the
    /// watermark reflects exactly those messages.
    #[tracing::instrument(skip(self, envelopes, cancel), fields(messages = envelopes.len()))]
    pub async fn project_batch_with(
        &mut self,
        envelopes: &[MessageEnvelope],
        cancel: &CancellationToken,
    ) -> Result<()> {
        let mut watermark = self.next_sequence_number().await?;
        let scope = self.scope_factory.begin_scope();

        for envelope in envelopes {
            if cancel.is_cancelled() {
                tracing::debug!(
                    watermark = watermark.as_i64(),
                    "cancellation requested, stopping dispatch"
                );
                return Ok(());
            }

            if envelope.sequence_number != watermark {
                return Err(ProjectorError::SequenceMismatch {
                    message_type: envelope.message_type.clone(),
                    expected: watermark,
                    actual: envelope.sequence_number,
                });
            }

            for projection in &self.projections {
                // A projection past this message (from an earlier partial
                // dispatch) reports a higher position and is skipped.
                let next = projection.next_sequence_number(scope.as_ref()).await?;
                if next != envelope.sequence_number {
                    continue;
                }

                projection.handle(scope.as_ref(), envelope, cancel).await?;

                // Cancelled mid-message: the message is partially applied
                // and the watermark stays behind it until redelivery.
                if cancel.is_cancelled() {
                    tracing::debug!(
                        projection = projection.name(),
                        sequence = envelope.sequence_number.as_i64(),
                        "cancellation requested after handling, stopping dispatch"
                    );
                    return Ok(());
                }

                let advanced = projection.next_sequence_number(scope.as_ref()).await?;
                if advanced != envelope.sequence_number.next() {
                    return Err(ProjectorError::NotAdvanced {
                        projection: projection.name(),
                        message_type: envelope.message_type.clone(),
                        sequence: envelope.sequence_number,
                    });
                }

                metrics::counter!("projector_messages_handled").increment(1);
            }

            watermark = watermark.next();
            self.watermark = Some(watermark);
            metrics::counter!("projector_messages_projected").increment(1);
        }

        Ok(())
    }
}
