//! Core projection trait.

use async_trait::async_trait;
use common::{MessageEnvelope, SequenceNumber};
use tokio_util::sync::CancellationToken;

use crate::Result;
use crate::scope::ResourceScope;

/// A projection that processes an ordered message stream into a read model
/// while tracking its own persisted progress.
///
/// Each projection owns a durable progress counter stored behind whatever
/// resource it resolves from the scope (e.g. a row in its own store). The
/// projector never touches that storage directly; it only compares the
/// reported positions.
///
/// Contract: after a successful [`handle`](Projection::handle) of the
/// message at sequence N, [`next_sequence_number`](Projection::next_sequence_number)
/// must return N+1. The projector verifies this after every dispatch and
/// treats a violation as a defect in the projection, not a transient error.
#[async_trait]
pub trait Projection: Send + Sync {
    /// Returns the name of this projection, used in errors and logs.
    fn name(&self) -> &'static str;

    /// Returns the next sequence number this projection has not yet processed.
    ///
    /// May read persisted state through the supplied scope. Must be safe to
    /// call repeatedly without affecting the projection's progress.
    async fn next_sequence_number(&self, scope: &dyn ResourceScope) -> Result<SequenceNumber>;

    /// Handles one message and advances this projection's persisted progress
    /// to `envelope.sequence_number.next()`, as a single logical operation.
    ///
    /// The progress must advance even when the projection ignores the
    /// message's payload. Handlers may suspend on I/O and may observe
    /// `cancel`; what happens to partially persisted work on cancellation is
    /// up to the projection.
    async fn handle(
        &self,
        scope: &dyn ResourceScope,
        envelope: &MessageEnvelope,
        cancel: &CancellationToken,
    ) -> Result<()>;
}
