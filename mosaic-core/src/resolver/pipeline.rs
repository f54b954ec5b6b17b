use std::collections::HashMap;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use super::{ContentContextResolver, ContextResolver, ContextResolverResult, ProfileContextResolver};
use crate::cancel;
use crate::error::Result;
use crate::runtime::RuntimeContext;
use crate::store::{ContextStore, EntityStore, ProfileStore};

/// Ordered, editable list of resolvers.
#[derive(Clone, Default)]
pub struct ResolverRegistry {
    resolvers: Vec<Arc<dyn ContextResolver>>,
}

impl ResolverRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Profile resolver, then content resolver.
    pub fn with_defaults(
        entities: Arc<dyn EntityStore>,
        contexts: Arc<dyn ContextStore>,
        profiles: Arc<dyn ProfileStore>,
    ) -> Self {
        let mut registry = Self::new();
        registry.append(ProfileContextResolver::new(profiles, contexts.clone()));
        registry.append(ContentContextResolver::new(entities, contexts));
        registry
    }

    /// Append a resolver.
    pub fn append(&mut self, resolver: impl ContextResolver + 'static) -> &mut Self {
        self.resolvers.push(Arc::new(resolver));
        self
    }

    /// Insert a resolver before the one named `before`.
    ///
    /// Returns `false` (and inserts nothing) if no resolver has that name.
    pub fn insert_before(&mut self, before: &str, resolver: impl ContextResolver + 'static) -> bool {
        match self.position(before) {
            Some(index) => {
                self.resolvers.insert(index, Arc::new(resolver));
                true
            }
            None => false,
        }
    }

    /// Remove the resolver named `name`. Returns `true` if one was removed.
    pub fn remove(&mut self, name: &str) -> bool {
        match self.position(name) {
            Some(index) => {
                self.resolvers.remove(index);
                true
            }
            None => false,
        }
    }

    /// Registered names in execution order.
    pub fn names(&self) -> Vec<&str> {
        self.resolvers.iter().map(|r| r.name()).collect()
    }

    /// Number of registered resolvers.
    pub fn len(&self) -> usize {
        self.resolvers.len()
    }

    /// True if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.resolvers.is_empty()
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.resolvers.iter().position(|r| r.name() == name)
    }
}

impl std::fmt::Debug for ResolverRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResolverRegistry")
            .field("resolvers", &self.names())
            .finish()
    }
}

/// Runs resolvers in order and folds their results.
#[derive(Debug, Clone, Default)]
pub struct ContextResolutionService {
    registry: ResolverRegistry,
}

impl ContextResolutionService {
    /// Build a service from a registry.
    pub fn new(registry: ResolverRegistry) -> Self {
        Self { registry }
    }

    /// Resolver names in execution order.
    pub fn names(&self) -> Vec<&str> {
        self.registry.names()
    }

    /// Run every resolver and fold the results.
    ///
    /// A resource whose id was already emitted by an earlier resolver
    /// replaces that entry, keeping its position. Sources are concatenated.
    /// The first error aborts the fold.
    pub async fn resolve(
        &self,
        runtime: &RuntimeContext,
        cancel: &CancellationToken,
    ) -> Result<ContextResolverResult> {
        let mut merged = ContextResolverResult::empty();
        let mut positions: HashMap<Uuid, usize> = HashMap::new();

        for resolver in &self.registry.resolvers {
            let result = cancel::run(cancel, resolver.resolve(runtime, cancel)).await?;

            tracing::debug!(
                resolver = resolver.name(),
                resources = result.resources.len(),
                sources = result.sources.len(),
                "resolver finished"
            );

            for resource in result.resources {
                match positions.get(&resource.id).copied() {
                    Some(index) => {
                        tracing::trace!(id = %resource.id, resolver = resolver.name(), "resource overridden");
                        merged.resources[index] = resource;
                    }
                    None => {
                        positions.insert(resource.id, merged.resources.len());
                        merged.resources.push(resource);
                    }
                }
            }
            merged.sources.extend(result.sources);
        }

        Ok(merged)
    }
}
