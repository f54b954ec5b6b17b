//! End-to-end assembly of one request's runtime context.

use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use crate::contributor::{ContributorPipeline, ContributorRegistry};
use crate::error::Result;
use crate::resolver::{ContextResolutionService, ResolverRegistry};
use crate::runtime::{keys, AmbientState, RequestContextItem, RuntimeContext};
use crate::store::{ContextStore, EntityStore, ProfileStore};

/// Builds a [`RuntimeContext`] for one request.
///
/// 1. Seeds the data bag from [`AmbientState`] (entity, parent, profile).
/// 2. Runs the contributor pipeline. Entity ids found in request items
///    overwrite the ambient ones.
/// 3. Runs the resolver pipeline and stores its result under
///    [`keys::RESOLVED_CONTEXT`].
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use mosaic_core::runtime::{keys, AmbientState, RequestContextItem};
/// use mosaic_core::store::MemoryStore;
/// use mosaic_core::ContextAssembler;
/// use tokio_util::sync::CancellationToken;
///
/// # tokio_test::block_on(async {
/// let store = Arc::new(MemoryStore::new());
/// let assembler = ContextAssembler::with_stores(store.clone(), store.clone(), store);
///
/// let runtime = assembler
///     .assemble(
///         vec![RequestContextItem::new("Tone: friendly")],
///         &AmbientState::new(),
///         &CancellationToken::new(),
///     )
///     .await
///     .unwrap();
///
/// assert_eq!(runtime.system_message().as_deref(), Some("Context: Tone: friendly"));
/// assert!(runtime.data().get(keys::RESOLVED_CONTEXT).unwrap().is_empty());
/// # });
/// ```
#[derive(Debug, Clone)]
pub struct ContextAssembler {
    contributors: ContributorPipeline,
    resolution: ContextResolutionService,
}

impl ContextAssembler {
    /// Create an assembler from explicit pipelines.
    pub fn new(contributors: ContributorPipeline, resolution: ContextResolutionService) -> Self {
        Self {
            contributors,
            resolution,
        }
    }

    /// Default contributors and resolvers over the given stores.
    pub fn with_stores(
        entities: Arc<dyn EntityStore>,
        contexts: Arc<dyn ContextStore>,
        profiles: Arc<dyn ProfileStore>,
    ) -> Self {
        Self::new(
            ContributorPipeline::new(ContributorRegistry::with_defaults()),
            ContextResolutionService::new(ResolverRegistry::with_defaults(
                entities, contexts, profiles,
            )),
        )
    }

    /// The contributor pipeline.
    pub fn contributors(&self) -> &ContributorPipeline {
        &self.contributors
    }

    /// The resolution service.
    pub fn resolution(&self) -> &ContextResolutionService {
        &self.resolution
    }

    /// Assemble the runtime context for one request.
    pub async fn assemble(
        &self,
        items: Vec<RequestContextItem>,
        ambient: &AmbientState,
        cancel: &CancellationToken,
    ) -> Result<RuntimeContext> {
        let mut runtime = RuntimeContext::new(items);
        seed(&mut runtime, ambient);

        self.contributors
            .contribute(&mut runtime, ambient, cancel)
            .await?;

        let resolved = self.resolution.resolve(&runtime, cancel).await?;

        tracing::debug!(
            items = runtime.request_items().len(),
            parts = runtime.system_message_parts().len(),
            variables = runtime.variables().len(),
            resources = resolved.resources.len(),
            "runtime context assembled"
        );

        runtime.data_mut().set(keys::RESOLVED_CONTEXT, resolved);
        Ok(runtime)
    }
}

fn seed(runtime: &mut RuntimeContext, ambient: &AmbientState) {
    let data = runtime.data_mut();
    if let Some(id) = ambient.entity_id {
        data.set(keys::ENTITY_ID, id);
    }
    if let Some(id) = ambient.parent_entity_id {
        data.set(keys::PARENT_ENTITY_ID, id);
    }
    if let Some(id) = ambient.profile_id {
        data.set(keys::PROFILE_ID, id);
    }
}
