//! Read-only lookups the pipelines depend on.
//!
//! The core never persists anything. It reads content nodes (to walk the
//! content tree), AI contexts (to fetch resources) and AI profiles (to find
//! profile-level contexts) through the traits below. Backends are supplied by
//! the host; [`memory`] provides in-memory implementations for tests and the
//! CLI.

pub mod memory;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub use memory::{load_world, MemoryStore, World};

/// Property editor alias that marks a context picker property.
pub const CONTEXT_PICKER_EDITOR_ALIAS: &str = "Uai.ContextPicker";

/// Errors that can occur in store lookups.
///
/// Any of these aborts the request. "Not found" is not an error; lookups
/// return `Ok(None)` for that.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The backing store could not be reached.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// The store returned data that cannot be interpreted.
    #[error("corrupt store data: {0}")]
    Corrupt(String),

    /// IO error while reading store data.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A node in the hierarchical content store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentNode {
    /// Node key.
    pub id: Uuid,
    /// Display name.
    pub name: String,
    /// Parent node, `None` for a root.
    #[serde(default)]
    pub parent_id: Option<Uuid>,
    /// Property values.
    #[serde(default)]
    pub properties: Vec<NodeProperty>,
}

impl ContentNode {
    /// Create a root node with no properties.
    pub fn new(id: Uuid, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            parent_id: None,
            properties: Vec::new(),
        }
    }

    /// Set the parent node.
    pub fn with_parent(mut self, parent_id: Uuid) -> Self {
        self.parent_id = Some(parent_id);
        self
    }

    /// Add a property.
    pub fn with_property(mut self, property: NodeProperty) -> Self {
        self.properties.push(property);
        self
    }

    /// Add a context picker property referencing the given contexts.
    pub fn with_context_picker(self, alias: impl Into<String>, context_ids: &[Uuid]) -> Self {
        let ids = context_ids
            .iter()
            .map(|id| serde_json::Value::String(id.to_string()))
            .collect();
        self.with_property(NodeProperty {
            alias: alias.into(),
            editor_alias: CONTEXT_PICKER_EDITOR_ALIAS.to_string(),
            value: serde_json::Value::Array(ids),
        })
    }
}

/// A stored property value on a [`ContentNode`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeProperty {
    /// Property alias.
    pub alias: String,
    /// Property editor alias (e.g. [`CONTEXT_PICKER_EDITOR_ALIAS`]).
    pub editor_alias: String,
    /// Raw stored value.
    #[serde(default)]
    pub value: serde_json::Value,
}

/// How a context resource reaches the model.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum InjectionMode {
    /// Injected into every request.
    #[default]
    Always,
    /// Made available for the model to request explicitly.
    OnDemand,
}

/// A reusable piece of organizational knowledge inside an [`AiContext`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContextResource {
    /// Resource key.
    pub id: Uuid,
    /// Resource type (e.g. `brand-voice`, `text`).
    pub resource_type_id: String,
    /// Display name.
    pub name: String,
    /// Optional description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Ordering within the owning context.
    #[serde(default)]
    pub sort_order: i32,
    /// Type-specific payload.
    #[serde(default)]
    pub data: serde_json::Value,
    /// How the resource is injected.
    #[serde(default)]
    pub injection_mode: InjectionMode,
}

/// A named collection of context resources.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AiContext {
    /// Context key.
    pub id: Uuid,
    /// Unique alias.
    pub alias: String,
    /// Display name.
    pub name: String,
    /// Resources, in storage order.
    #[serde(default)]
    pub resources: Vec<ContextResource>,
}

/// An AI profile with contexts attached at profile level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AiProfile {
    /// Profile key.
    pub id: Uuid,
    /// Unique alias.
    pub alias: String,
    /// Display name.
    pub name: String,
    /// Attached contexts, in order.
    #[serde(default)]
    pub context_ids: Vec<Uuid>,
}

/// Read access to the content tree.
#[async_trait]
pub trait EntityStore: Send + Sync {
    /// Fetch a content node by id.
    async fn get_entity(&self, id: Uuid) -> Result<Option<ContentNode>, StoreError>;
}

/// Read access to AI contexts.
#[async_trait]
pub trait ContextStore: Send + Sync {
    /// Fetch a context (with its resources) by id.
    async fn get_context(&self, id: Uuid) -> Result<Option<AiContext>, StoreError>;
}

/// Read access to AI profiles.
#[async_trait]
pub trait ProfileStore: Send + Sync {
    /// Fetch a profile by id.
    async fn get_profile(&self, id: Uuid) -> Result<Option<AiProfile>, StoreError>;
}
