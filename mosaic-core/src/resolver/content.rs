//! Content tree resolver.
//!
//! Finds the nearest context picker on the current entity or its ancestors
//! that references at least one existing context. A picker whose contexts
//! are all missing does not stop the walk. The starting entity is the
//! parent entity when known (a not-yet-created child inherits from its
//! intended parent), otherwise the entity itself.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashSet;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use super::{ContextResolver, ContextResolverResult};
use crate::cancel;
use crate::error::Result;
use crate::runtime::{keys, RuntimeContext};
use crate::store::{
    AiContext, ContentNode, ContextStore, EntityStore, NodeProperty, CONTEXT_PICKER_EDITOR_ALIAS,
};

/// The node where a context reference was found and the contexts it resolves to.
#[derive(Debug, Clone, PartialEq)]
pub struct NearestContexts {
    /// The node carrying the reference (the start node or an ancestor).
    pub node: ContentNode,
    /// Referenced contexts that exist, in property order. Never empty.
    pub contexts: Vec<AiContext>,
}

/// Walks a node and its ancestors, closest first.
#[derive(Clone)]
pub struct ContentTreeWalker {
    entities: Arc<dyn EntityStore>,
    contexts: Arc<dyn ContextStore>,
}

impl ContentTreeWalker {
    /// Create a walker over entity and context stores.
    pub fn new(entities: Arc<dyn EntityStore>, contexts: Arc<dyn ContextStore>) -> Self {
        Self { entities, contexts }
    }

    /// Find the nearest node whose context picker references an existing context.
    ///
    /// Contexts are fetched fresh for every picker visited. A picker whose
    /// referenced contexts are all missing counts as no reference and the
    /// walk moves on to the parent.
    ///
    /// Returns `Ok(None)` if the start node does not exist, no node on the
    /// path carries a usable reference, or the parent chain loops. The walk
    /// stops at the first hit; references further up are never read.
    pub async fn find_nearest(
        &self,
        start: Uuid,
        cancel: &CancellationToken,
    ) -> Result<Option<NearestContexts>> {
        let mut visited = HashSet::new();
        let mut next = Some(start);

        while let Some(id) = next {
            if !visited.insert(id) {
                tracing::warn!(%id, "cycle in content tree parent chain");
                return Ok(None);
            }

            let node = cancel::run(cancel, self.entities.get_entity(id)).await?;
            let Some(node) = node else {
                tracing::trace!(%id, "content node not found");
                return Ok(None);
            };

            tracing::trace!(%id, name = %node.name, depth = visited.len() - 1, "visiting content node");

            if let Some(context_ids) = picker_value(&node.properties) {
                let contexts = self.load_contexts(&node, &context_ids, cancel).await?;
                if !contexts.is_empty() {
                    return Ok(Some(NearestContexts { node, contexts }));
                }
                tracing::debug!(%id, "context picker references no existing context, continuing to parent");
            }
            next = node.parent_id;
        }

        Ok(None)
    }

    async fn load_contexts(
        &self,
        node: &ContentNode,
        context_ids: &[Uuid],
        cancel: &CancellationToken,
    ) -> Result<Vec<AiContext>> {
        let mut contexts = Vec::with_capacity(context_ids.len());
        for &context_id in context_ids {
            match cancel::run(cancel, self.contexts.get_context(context_id)).await? {
                Some(context) => contexts.push(context),
                None => tracing::warn!(%context_id, node = %node.id, "referenced context not found"),
            }
        }
        Ok(contexts)
    }
}

/// Context ids from the first context picker property with a non-empty value.
fn picker_value(properties: &[NodeProperty]) -> Option<Vec<Uuid>> {
    properties
        .iter()
        .filter(|p| p.editor_alias == CONTEXT_PICKER_EDITOR_ALIAS)
        .map(|p| context_ids(&p.value))
        .find(|ids| !ids.is_empty())
}

/// A picker value is a single id string or an array of id strings.
/// Anything unparseable is ignored.
fn context_ids(value: &Value) -> Vec<Uuid> {
    let parse = |v: &Value| v.as_str().and_then(|s| Uuid::parse_str(s.trim()).ok());
    match value {
        Value::Array(items) => items.iter().filter_map(parse).collect(),
        other => parse(other).into_iter().collect(),
    }
}

/// Resolves contexts attached to the content tree.
#[derive(Clone)]
pub struct ContentContextResolver {
    walker: ContentTreeWalker,
}

impl ContentContextResolver {
    /// Create a resolver over entity and context stores.
    pub fn new(entities: Arc<dyn EntityStore>, contexts: Arc<dyn ContextStore>) -> Self {
        Self {
            walker: ContentTreeWalker::new(entities, contexts),
        }
    }
}

#[async_trait]
impl ContextResolver for ContentContextResolver {
    fn name(&self) -> &str {
        "content"
    }

    async fn resolve(
        &self,
        runtime: &RuntimeContext,
        cancel: &CancellationToken,
    ) -> Result<ContextResolverResult> {
        let start = runtime
            .data()
            .get(keys::PARENT_ENTITY_ID)
            .or_else(|| runtime.data().get(keys::ENTITY_ID))
            .copied();
        let Some(start) = start else {
            return Ok(ContextResolverResult::empty());
        };

        let Some(nearest) = self.walker.find_nearest(start, cancel).await? else {
            return Ok(ContextResolverResult::empty());
        };

        let entity_name = format!("{} ({})", nearest.node.name, nearest.node.id);
        let mut result = ContextResolverResult::empty();

        for context in nearest.contexts {
            result.push_context(entity_name.clone(), context);
        }

        Ok(result)
    }
}
