//! Resource scope contracts and an in-memory scope factory.
//!
//! A [`ResourceScope`] is a disposable unit of per-batch resource handles
//! (connections, transactions, clients). The projector opens one scope per
//! dispatch call; every projection resolves its own handle from it, so
//! handle lifetimes are batched together without the handles themselves
//! being shared across resource types. Release is RAII: dropping the scope
//! releases its handles on every exit path exactly once.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::error::{ProjectorError, Result};

/// A scoped set of resource handles, alive for one dispatch call.
///
/// Implementations release their handles in `Drop`.
pub trait ResourceScope: Send + Sync {
    /// Resolves the handle registered for the given type, if any.
    fn resolve(&self, type_id: TypeId) -> Option<Arc<dyn Any + Send + Sync>>;
}

impl<'a> dyn ResourceScope + 'a {
    /// Resolves a handle of a concrete type from this scope.
    ///
    /// Fails with [`ProjectorError::ResourceUnavailable`] when the scope does
    /// not provide the requested type.
    pub fn resolve_as<T: Any + Send + Sync>(&self) -> Result<Arc<T>> {
        self.resolve(TypeId::of::<T>())
            .and_then(|handle| handle.downcast::<T>().ok())
            .ok_or(ProjectorError::ResourceUnavailable {
                type_name: std::any::type_name::<T>(),
            })
    }
}

/// Creates one [`ResourceScope`] per dispatch call.
pub trait ScopeFactory: Send + Sync {
    /// Opens a new scope. The caller drops it when the dispatch is done.
    fn begin_scope(&self) -> Box<dyn ResourceScope>;
}

type ResourceFn = Arc<dyn Fn() -> Arc<dyn Any + Send + Sync> + Send + Sync>;

/// In-memory scope factory backed by per-type resource constructors.
///
/// Each scope constructs a handle lazily on first resolve and caches it for
/// the lifetime of the scope, so projections resolving the same resource
/// type within one batch observe the same handle, while a new batch gets a
/// fresh one.
#[derive(Clone, Default)]
pub struct ResourceRegistry {
    factories: HashMap<TypeId, ResourceFn>,
}

impl ResourceRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a constructor for resources of type `T`.
    pub fn provide<T, F>(mut self, factory: F) -> Self
    where
        T: Any + Send + Sync,
        F: Fn() -> T + Send + Sync + 'static,
    {
        self.factories.insert(
            TypeId::of::<T>(),
            Arc::new(move || Arc::new(factory()) as Arc<dyn Any + Send + Sync>),
        );
        self
    }

    /// Returns the number of registered resource types.
    pub fn len(&self) -> usize {
        self.factories.len()
    }

    /// Returns true when no resource types are registered.
    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }
}

impl ScopeFactory for ResourceRegistry {
    fn begin_scope(&self) -> Box<dyn ResourceScope> {
        Box::new(RegistryScope {
            factories: self.factories.clone(),
            cache: Mutex::new(HashMap::new()),
        })
    }
}

struct RegistryScope {
    factories: HashMap<TypeId, ResourceFn>,
    cache: Mutex<HashMap<TypeId, Arc<dyn Any + Send + Sync>>>,
}

impl ResourceScope for RegistryScope {
    fn resolve(&self, type_id: TypeId) -> Option<Arc<dyn Any + Send + Sync>> {
        let mut cache = self.cache.lock().expect("scope cache poisoned");
        if let Some(handle) = cache.get(&type_id) {
            return Some(Arc::clone(handle));
        }
        let factory = self.factories.get(&type_id)?;
        let handle = factory();
        cache.insert(type_id, Arc::clone(&handle));
        Some(handle)
    }
}
