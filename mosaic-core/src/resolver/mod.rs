//! Context resolver pipeline.
//!
//! Resolvers discover reusable context resources relevant to the current
//! request. They run in registration order and their results are folded by
//! [`ContextResolutionService`]: resources accumulate in order, and a
//! resource whose id was already emitted replaces the earlier entry in place.
//! Provenance sources are concatenated as-is.
//!
//! The default order is profile first, content second, so content-level
//! resources override profile-level ones.

mod content;
mod pipeline;
mod profile;

pub use content::{ContentContextResolver, ContentTreeWalker, NearestContexts};
pub use pipeline::{ContextResolutionService, ResolverRegistry};
pub use profile::ProfileContextResolver;

pub use crate::store::InjectionMode;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::error::Result;
use crate::runtime::RuntimeContext;
use crate::store::AiContext;

/// A resource discovered by a resolver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContextResolverResource {
    /// Resource id; the identity used for override on duplicates.
    pub id: Uuid,
    /// Resource type.
    pub resource_type_id: String,
    /// Display name.
    pub name: String,
    /// Optional description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Type-specific payload.
    #[serde(default)]
    pub data: serde_json::Value,
    /// How the resource is injected.
    #[serde(default)]
    pub injection_mode: InjectionMode,
    /// Name of the context the resource came from.
    pub source_context_name: String,
}

/// Where a resolved context came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContextResolverSource {
    /// The entity (or profile) the context was attached to.
    pub entity_name: String,
    /// The context name.
    pub context_name: String,
}

/// Resources and provenance produced by one resolver or by the whole pipeline.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContextResolverResult {
    /// Resources in order.
    pub resources: Vec<ContextResolverResource>,
    /// Provenance pairs in order.
    pub sources: Vec<ContextResolverSource>,
}

impl ContextResolverResult {
    /// An empty result.
    pub fn empty() -> Self {
        Self::default()
    }

    /// True if no resources and no sources.
    pub fn is_empty(&self) -> bool {
        self.resources.is_empty() && self.sources.is_empty()
    }

    /// Append a freshly fetched context: one source pair, then its resources
    /// ordered by sort order.
    pub fn push_context(&mut self, entity_name: impl Into<String>, context: AiContext) {
        self.sources.push(ContextResolverSource {
            entity_name: entity_name.into(),
            context_name: context.name.clone(),
        });

        let mut resources = context.resources;
        resources.sort_by_key(|r| r.sort_order);
        self.resources
            .extend(resources.into_iter().map(|r| ContextResolverResource {
                id: r.id,
                resource_type_id: r.resource_type_id,
                name: r.name,
                description: r.description,
                data: r.data,
                injection_mode: r.injection_mode,
                source_context_name: context.name.clone(),
            }));
    }

    /// Resources injected into every request.
    pub fn injected_resources(&self) -> impl Iterator<Item = &ContextResolverResource> {
        self.resources
            .iter()
            .filter(|r| r.injection_mode == InjectionMode::Always)
    }

    /// Resources the model may request on demand.
    pub fn on_demand_resources(&self) -> impl Iterator<Item = &ContextResolverResource> {
        self.resources
            .iter()
            .filter(|r| r.injection_mode == InjectionMode::OnDemand)
    }
}

/// A pipeline stage discovering context resources.
///
/// Missing data (no entity id, unknown entity, nothing attached) yields an
/// empty result. Errors are reserved for store failures and cancellation.
#[async_trait]
pub trait ContextResolver: Send + Sync {
    /// Name used for registration and logging.
    fn name(&self) -> &str;

    /// Resolve resources for the current request.
    async fn resolve(
        &self,
        runtime: &RuntimeContext,
        cancel: &CancellationToken,
    ) -> Result<ContextResolverResult>;
}
