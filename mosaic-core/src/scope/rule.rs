//! Scope and rule data model.
//!
//! A [`Scope`] is attached to an agent, prompt or tool and stored by an
//! external repository as a serialized blob. The serde layout below is the
//! contract for that blob: camelCase names, absent dimensions omitted, rule
//! order and value order preserved.

use serde::{Deserialize, Serialize};

use super::dimension::ScopeDimension;

/// Allow/deny rule sets gating where an agent, prompt or tool may run.
///
/// A missing scope (`Option::None` at the call site) means "available
/// everywhere"; see [`crate::scope::evaluate`].
///
/// # Example
///
/// ```rust
/// use mosaic_core::scope::{Scope, ScopeRule};
///
/// let scope = Scope::new()
///     .allow(ScopeRule::new().sections(["content"]))
///     .deny(ScopeRule::new().entity_types(["member"]));
///
/// assert_eq!(scope.allow_rules.len(), 1);
/// assert_eq!(scope.deny_rules.len(), 1);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scope {
    /// Rules that grant availability (OR between rules).
    #[serde(default)]
    pub allow_rules: Vec<ScopeRule>,

    /// Rules that revoke availability. Checked first, always win.
    #[serde(default)]
    pub deny_rules: Vec<ScopeRule>,
}

impl Scope {
    /// Create a scope with no rules (open unless something is denied).
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an allow rule.
    pub fn allow(mut self, rule: ScopeRule) -> Self {
        self.allow_rules.push(rule);
        self
    }

    /// Append a deny rule.
    pub fn deny(mut self, rule: ScopeRule) -> Self {
        self.deny_rules.push(rule);
        self
    }

    /// Parse a scope from its serialized form.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Serialize the scope for storage.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// A sparse set of dimension constraints.
///
/// Each dimension is either absent (wildcard) or a list of accepted values.
/// An empty list is also treated as a wildcard. Values compare
/// case-insensitively.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScopeRule {
    /// Accepted section aliases.
    #[serde(default, alias = "sections", skip_serializing_if = "Option::is_none")]
    pub section_aliases: Option<Vec<String>>,

    /// Accepted entity types.
    #[serde(default, alias = "entityTypes", skip_serializing_if = "Option::is_none")]
    pub entity_type_aliases: Option<Vec<String>>,

    /// Accepted workspace aliases.
    #[serde(default, alias = "workspaces", skip_serializing_if = "Option::is_none")]
    pub workspace_aliases: Option<Vec<String>>,

    /// Accepted property aliases.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub property_aliases: Option<Vec<String>>,

    /// Accepted property editor UI aliases.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub property_editor_ui_aliases: Option<Vec<String>>,

    /// Accepted content type aliases.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_type_aliases: Option<Vec<String>>,
}

fn collect<I, S>(values: I) -> Option<Vec<String>>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    Some(values.into_iter().map(Into::into).collect())
}

impl ScopeRule {
    /// Create a rule with every dimension unconstrained.
    pub fn new() -> Self {
        Self::default()
    }

    /// Constrain the section dimension.
    pub fn sections<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.section_aliases = collect(values);
        self
    }

    /// Constrain the entity type dimension.
    pub fn entity_types<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.entity_type_aliases = collect(values);
        self
    }

    /// Constrain the workspace dimension.
    pub fn workspaces<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.workspace_aliases = collect(values);
        self
    }

    /// Constrain the property alias dimension.
    pub fn property_aliases<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.property_aliases = collect(values);
        self
    }

    /// Constrain the property editor UI alias dimension.
    pub fn property_editor_ui_aliases<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.property_editor_ui_aliases = collect(values);
        self
    }

    /// Constrain the content type alias dimension.
    pub fn content_type_aliases<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.content_type_aliases = collect(values);
        self
    }

    /// Accepted values for a dimension, or `None` when it is a wildcard.
    ///
    /// Empty lists are reported as `None`.
    pub fn values(&self, dimension: ScopeDimension) -> Option<&[String]> {
        let values = match dimension {
            ScopeDimension::Section => &self.section_aliases,
            ScopeDimension::EntityType => &self.entity_type_aliases,
            ScopeDimension::Workspace => &self.workspace_aliases,
            ScopeDimension::PropertyAlias => &self.property_aliases,
            ScopeDimension::PropertyEditorUiAlias => &self.property_editor_ui_aliases,
            ScopeDimension::ContentTypeAlias => &self.content_type_aliases,
        };
        values.as_deref().filter(|v| !v.is_empty())
    }

    /// True if no dimension is constrained.
    pub fn is_unconstrained(&self) -> bool {
        ScopeDimension::ALL
            .into_iter()
            .all(|d| self.values(d).is_none())
    }
}
