//! Per-request ambient inputs.
//!
//! Hosts often keep the current user and the current entity in
//! request-scoped singletons. Here they are passed explicitly so pipelines
//! can be exercised without any surrounding environment.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The authenticated backoffice user, if any.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserIdentity {
    /// User key.
    pub key: Uuid,
    /// Display name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Login name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    /// UI language (e.g. `en-US`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    /// Group names.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub groups: Vec<String>,
}

impl UserIdentity {
    /// Create an identity with only a key.
    pub fn new(key: Uuid) -> Self {
        Self {
            key,
            name: None,
            username: None,
            language: None,
            groups: Vec::new(),
        }
    }

    /// Set the display name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the login name.
    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    /// Set the language.
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    /// Add a group.
    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.groups.push(group.into());
        self
    }
}

/// Ambient state for one request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AmbientState {
    /// Current identity. `None` for system-initiated calls.
    #[serde(default)]
    pub identity: Option<UserIdentity>,
    /// Entity id set earlier in the call chain.
    #[serde(default)]
    pub entity_id: Option<Uuid>,
    /// Parent entity id, for entities that do not exist yet.
    #[serde(default)]
    pub parent_entity_id: Option<Uuid>,
    /// AI profile handling the request.
    #[serde(default)]
    pub profile_id: Option<Uuid>,
}

impl AmbientState {
    /// Empty ambient state (anonymous, no entity).
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the identity.
    pub fn with_identity(mut self, identity: UserIdentity) -> Self {
        self.identity = Some(identity);
        self
    }

    /// Set the current entity.
    pub fn with_entity(mut self, entity_id: Uuid) -> Self {
        self.entity_id = Some(entity_id);
        self
    }

    /// Set the parent entity.
    pub fn with_parent_entity(mut self, parent_entity_id: Uuid) -> Self {
        self.parent_entity_id = Some(parent_entity_id);
        self
    }

    /// Set the profile.
    pub fn with_profile(mut self, profile_id: Uuid) -> Self {
        self.profile_id = Some(profile_id);
        self
    }
}
