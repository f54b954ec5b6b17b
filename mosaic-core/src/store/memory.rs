//! In-memory store implementations.

use async_trait::async_trait;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use uuid::Uuid;

use super::{
    AiContext, AiProfile, ContentNode, ContextStore, EntityStore, ProfileStore, StoreError,
};

/// A snapshot of everything the stores hold, in a JSON-friendly layout.
///
/// ```json
/// {
///   "nodes": [{"id": "...", "name": "Home", "properties": []}],
///   "contexts": [{"id": "...", "alias": "brand", "name": "Brand", "resources": []}],
///   "profiles": [{"id": "...", "alias": "default", "name": "Default", "contextIds": []}]
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct World {
    /// Content nodes.
    #[serde(default)]
    pub nodes: Vec<ContentNode>,
    /// AI contexts.
    #[serde(default)]
    pub contexts: Vec<AiContext>,
    /// AI profiles.
    #[serde(default)]
    pub profiles: Vec<AiProfile>,
}

/// Load a [`World`] from a JSON file.
pub async fn load_world(path: impl AsRef<Path>) -> Result<World, StoreError> {
    let content = tokio::fs::read_to_string(path.as_ref()).await?;
    let world: World = serde_json::from_str(&content)?;
    tracing::debug!(
        path = %path.as_ref().display(),
        nodes = world.nodes.len(),
        contexts = world.contexts.len(),
        profiles = world.profiles.len(),
        "loaded world"
    );
    Ok(world)
}

/// In-memory entity, context and profile store.
///
/// Lookups clone the stored value, so every call sees a fresh copy.
#[derive(Debug, Default)]
pub struct MemoryStore {
    nodes: RwLock<HashMap<Uuid, ContentNode>>,
    contexts: RwLock<HashMap<Uuid, AiContext>>,
    profiles: RwLock<HashMap<Uuid, AiProfile>>,
}

impl MemoryStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store populated from a [`World`].
    pub fn from_world(world: World) -> Self {
        let store = Self::new();
        for node in world.nodes {
            store.insert_node(node);
        }
        for context in world.contexts {
            store.insert_context(context);
        }
        for profile in world.profiles {
            store.insert_profile(profile);
        }
        store
    }

    /// Insert or replace a content node.
    pub fn insert_node(&self, node: ContentNode) {
        self.nodes.write().insert(node.id, node);
    }

    /// Insert or replace a context.
    pub fn insert_context(&self, context: AiContext) {
        self.contexts.write().insert(context.id, context);
    }

    /// Insert or replace a profile.
    pub fn insert_profile(&self, profile: AiProfile) {
        self.profiles.write().insert(profile.id, profile);
    }

    /// Remove a context. Returns `true` if it existed.
    pub fn remove_context(&self, id: Uuid) -> bool {
        self.contexts.write().remove(&id).is_some()
    }

    /// Number of stored nodes.
    pub fn node_count(&self) -> usize {
        self.nodes.read().len()
    }
}

#[async_trait]
impl EntityStore for MemoryStore {
    async fn get_entity(&self, id: Uuid) -> Result<Option<ContentNode>, StoreError> {
        Ok(self.nodes.read().get(&id).cloned())
    }
}

#[async_trait]
impl ContextStore for MemoryStore {
    async fn get_context(&self, id: Uuid) -> Result<Option<AiContext>, StoreError> {
        Ok(self.contexts.read().get(&id).cloned())
    }
}

#[async_trait]
impl ProfileStore for MemoryStore {
    async fn get_profile(&self, id: Uuid) -> Result<Option<AiProfile>, StoreError> {
        Ok(self.profiles.read().get(&id).cloned())
    }
}
