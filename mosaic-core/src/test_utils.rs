//! Test utilities for mosaic-core.
//!
//! Builders for content trees and contexts, plus stores that fail or stall
//! on demand.
//!
//! Enable with the `test-utils` feature:
//!
//! ```toml
//! [dev-dependencies]
//! mosaic-core = { version = "...", features = ["test-utils"] }
//! ```
//!
//! # Example
//!
//! ```rust
//! use mosaic_core::test_utils::{context, resource, TreeBuilder};
//! use uuid::Uuid;
//!
//! let brand = context("Brand", vec![resource(Uuid::new_v4(), "Voice", 0)]);
//! let tree = TreeBuilder::new()
//!     .node("Root")
//!     .node_with_context("Section", &[brand.id])
//!     .node("Page");
//!
//! assert_eq!(tree.ids().len(), 3);
//! ```

use async_trait::async_trait;
use std::time::Duration;
use uuid::Uuid;

use crate::store::{
    AiContext, AiProfile, ContentNode, ContextResource, ContextStore, EntityStore, InjectionMode,
    MemoryStore, ProfileStore, StoreError,
};

/// Create a context with a generated id.
pub fn context(name: &str, resources: Vec<ContextResource>) -> AiContext {
    AiContext {
        id: Uuid::new_v4(),
        alias: name.to_lowercase().replace(' ', "-"),
        name: name.to_string(),
        resources,
    }
}

/// Create a text resource that is always injected.
pub fn resource(id: Uuid, name: &str, sort_order: i32) -> ContextResource {
    ContextResource {
        id,
        resource_type_id: "text".to_string(),
        name: name.to_string(),
        description: None,
        sort_order,
        data: serde_json::json!({ "content": name }),
        injection_mode: InjectionMode::Always,
    }
}

/// Create a profile referencing the given contexts.
pub fn profile(name: &str, context_ids: Vec<Uuid>) -> AiProfile {
    AiProfile {
        id: Uuid::new_v4(),
        alias: name.to_lowercase(),
        name: name.to_string(),
        context_ids,
    }
}

/// Builds a single root-to-leaf chain of content nodes.
///
/// Each `node*` call adds a child of the previously added node.
#[derive(Debug, Default)]
pub struct TreeBuilder {
    nodes: Vec<ContentNode>,
}

impl TreeBuilder {
    /// Start an empty chain.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node without a context picker.
    pub fn node(self, name: &str) -> Self {
        self.push(ContentNode::new(Uuid::new_v4(), name))
    }

    /// Add a node whose context picker references `context_ids`.
    pub fn node_with_context(self, name: &str, context_ids: &[Uuid]) -> Self {
        self.push(ContentNode::new(Uuid::new_v4(), name).with_context_picker("aiContext", context_ids))
    }

    fn push(mut self, node: ContentNode) -> Self {
        let node = match self.nodes.last() {
            Some(parent) => node.with_parent(parent.id),
            None => node,
        };
        self.nodes.push(node);
        self
    }

    /// Node ids from root to leaf.
    pub fn ids(&self) -> Vec<Uuid> {
        self.nodes.iter().map(|n| n.id).collect()
    }

    /// The deepest node's id.
    pub fn leaf(&self) -> Option<Uuid> {
        self.nodes.last().map(|n| n.id)
    }

    /// Insert every node into `store`.
    pub fn insert_into(&self, store: &MemoryStore) {
        for node in &self.nodes {
            store.insert_node(node.clone());
        }
    }
}

/// A store whose every lookup fails with [`StoreError::Unavailable`].
#[derive(Debug, Clone, Default)]
pub struct FailingStore;

#[async_trait]
impl EntityStore for FailingStore {
    async fn get_entity(&self, _id: Uuid) -> Result<Option<ContentNode>, StoreError> {
        Err(StoreError::Unavailable("entity store offline".to_string()))
    }
}

#[async_trait]
impl ContextStore for FailingStore {
    async fn get_context(&self, _id: Uuid) -> Result<Option<AiContext>, StoreError> {
        Err(StoreError::Unavailable("context store offline".to_string()))
    }
}

#[async_trait]
impl ProfileStore for FailingStore {
    async fn get_profile(&self, _id: Uuid) -> Result<Option<AiProfile>, StoreError> {
        Err(StoreError::Unavailable("profile store offline".to_string()))
    }
}

/// Wraps a [`MemoryStore`] and delays every entity lookup.
#[derive(Debug)]
pub struct SlowStore {
    inner: MemoryStore,
    delay: Duration,
}

impl SlowStore {
    /// Delay lookups on `inner` by `delay`.
    pub fn new(inner: MemoryStore, delay: Duration) -> Self {
        Self { inner, delay }
    }
}

#[async_trait]
impl EntityStore for SlowStore {
    async fn get_entity(&self, id: Uuid) -> Result<Option<ContentNode>, StoreError> {
        tokio::time::sleep(self.delay).await;
        self.inner.get_entity(id).await
    }
}
