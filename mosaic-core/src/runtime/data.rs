//! Typed data bag shared by contributors and resolvers.

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::marker::PhantomData;

/// A well-known key with a fixed value type.
///
/// Keys compare by name; two keys with the same name must use the same type.
pub struct ContextKey<T> {
    name: &'static str,
    _marker: PhantomData<fn() -> T>,
}

impl<T> ContextKey<T> {
    /// Declare a key.
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            _marker: PhantomData,
        }
    }

    /// The key name.
    pub const fn name(&self) -> &'static str {
        self.name
    }
}

impl<T> Clone for ContextKey<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for ContextKey<T> {}

impl<T> fmt::Debug for ContextKey<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ContextKey").field(&self.name).finish()
    }
}

/// Well-known data keys.
pub mod keys {
    use super::ContextKey;
    use crate::entity::SerializedEntity;
    use crate::resolver::ContextResolverResult;
    use uuid::Uuid;

    /// Id of the entity the request is about.
    pub const ENTITY_ID: ContextKey<Uuid> = ContextKey::new("entityId");

    /// Id of the intended parent of a not-yet-created entity.
    pub const PARENT_ENTITY_ID: ContextKey<Uuid> = ContextKey::new("parentEntityId");

    /// Entity type of the current entity.
    pub const ENTITY_TYPE: ContextKey<String> = ContextKey::new("entityType");

    /// The last serialized entity found in the request items.
    pub const SERIALIZED_ENTITY: ContextKey<SerializedEntity> =
        ContextKey::new("serializedEntity");

    /// Id of the AI profile handling the request.
    pub const PROFILE_ID: ContextKey<Uuid> = ContextKey::new("profileId");

    /// Result of the resolver pipeline.
    pub const RESOLVED_CONTEXT: ContextKey<ContextResolverResult> =
        ContextKey::new("resolvedContext");
}

/// Heterogeneous map from [`ContextKey`] to value.
#[derive(Default)]
pub struct ContextData {
    values: HashMap<&'static str, Box<dyn Any + Send + Sync>>,
}

impl ContextData {
    /// Create an empty bag.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a value. `None` if unset or stored with a different type.
    pub fn get<T: Any + Send + Sync>(&self, key: ContextKey<T>) -> Option<&T> {
        self.values.get(key.name)?.downcast_ref()
    }

    /// Set a value, replacing any previous one.
    pub fn set<T: Any + Send + Sync>(&mut self, key: ContextKey<T>, value: T) {
        self.values.insert(key.name, Box::new(value));
    }

    /// Remove and return a value.
    pub fn remove<T: Any + Send + Sync>(&mut self, key: ContextKey<T>) -> Option<T> {
        let boxed = self.values.remove(key.name)?;
        boxed.downcast().ok().map(|value| *value)
    }

    /// Check whether a key is set.
    pub fn contains<T>(&self, key: ContextKey<T>) -> bool {
        self.values.contains_key(key.name)
    }

    /// Number of set keys.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// True if nothing is set.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl fmt::Debug for ContextData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<_> = self.values.keys().collect();
        names.sort_unstable();
        f.debug_struct("ContextData").field("keys", &names).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    const COUNT: ContextKey<u32> = ContextKey::new("count");
    const COUNT_AS_STRING: ContextKey<String> = ContextKey::new("count");

    #[test]
    fn test_set_get_remove() {
        let mut data = ContextData::new();
        let id = Uuid::new_v4();

        data.set(keys::ENTITY_ID, id);
        assert_eq!(data.get(keys::ENTITY_ID), Some(&id));
        assert!(data.contains(keys::ENTITY_ID));
        assert!(!data.contains(keys::PARENT_ENTITY_ID));

        assert_eq!(data.remove(keys::ENTITY_ID), Some(id));
        assert!(data.is_empty());
    }

    #[test]
    fn test_set_replaces() {
        let mut data = ContextData::new();
        data.set(keys::ENTITY_TYPE, "document".to_string());
        data.set(keys::ENTITY_TYPE, "media".to_string());

        assert_eq!(data.get(keys::ENTITY_TYPE).map(String::as_str), Some("media"));
        assert_eq!(data.len(), 1);
    }

    #[test]
    fn test_type_mismatch_returns_none() {
        let mut data = ContextData::new();
        data.set(COUNT, 3);

        assert!(data.get(COUNT_AS_STRING).is_none());
        assert_eq!(data.get(COUNT), Some(&3));
    }

    #[test]
    fn test_debug_lists_keys() {
        let mut data = ContextData::new();
        data.set(COUNT, 1);
        assert_eq!(format!("{:?}", data), r#"ContextData { keys: ["count"] }"#);
    }
}
