//! Ordered message dispatch to independently-progressing projections.
//!
//! This crate coordinates a set of projections against a single strictly
//! ordered message stream:
//! - [`Projection`] trait for read-model builders that track their own progress
//! - [`Projector`] orchestrator computing the stream watermark and dispatching
//!   messages one sequence number at a time
//! - [`ProjectorBuilder`] for registration
//! - [`ScopeFactory`]/[`ResourceScope`] contracts for per-batch resource
//!   handles, with an in-memory [`ResourceRegistry`] implementation

pub mod builder;
pub mod error;
pub mod projection;
pub mod projector;
pub mod scope;

pub use builder::ProjectorBuilder;
pub use error::{ProjectorError, Result};
pub use projection::Projection;
pub use projector::Projector;
pub use scope::{ResourceRegistry, ResourceScope, ScopeFactory};
