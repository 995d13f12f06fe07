//! Registration builder for assembling a [`Projector`].

use std::sync::Arc;

use crate::Result;
use crate::projection::Projection;
use crate::projector::Projector;
use crate::scope::ScopeFactory;

/// Collects projections and wires them into a [`Projector`].
///
/// Registration has set semantics: registering the same projection instance
/// twice (same `Arc`) is a no-op, so a projection never receives a message
/// more than once per dispatch.
#[derive(Default)]
pub struct ProjectorBuilder {
    projections: Vec<Arc<dyn Projection>>,
}

impl ProjectorBuilder {
    /// Creates an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a projection, skipping instances already registered.
    pub fn register(mut self, projection: Arc<dyn Projection>) -> Self {
        let duplicate = self
            .projections
            .iter()
            .any(|existing| Arc::ptr_eq(existing, &projection));
        if !duplicate {
            self.projections.push(projection);
        }
        self
    }

    /// Builds the projector over the registered set.
    ///
    /// Fails when no projections were registered.
    pub fn build<F: ScopeFactory>(self, scope_factory: F) -> Result<Projector<F>> {
        Projector::new(self.projections, scope_factory)
    }
}
