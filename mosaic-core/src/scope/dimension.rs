//! Scope dimensions and dimension sets.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// A named axis of the caller's situation that a scope rule can constrain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ScopeDimension {
    /// Backoffice section (e.g. `content`, `media`).
    Section,
    /// Entity type being edited (e.g. `document`, `member`).
    EntityType,
    /// Workspace alias.
    Workspace,
    /// Property alias the action was triggered from.
    PropertyAlias,
    /// Property editor UI alias.
    PropertyEditorUiAlias,
    /// Content type alias of the entity.
    ContentTypeAlias,
}

impl ScopeDimension {
    /// All dimensions in canonical order.
    pub const ALL: [ScopeDimension; 6] = [
        ScopeDimension::Section,
        ScopeDimension::EntityType,
        ScopeDimension::Workspace,
        ScopeDimension::PropertyAlias,
        ScopeDimension::PropertyEditorUiAlias,
        ScopeDimension::ContentTypeAlias,
    ];

    /// Canonical name used in configuration and fixtures.
    pub fn as_str(&self) -> &'static str {
        match self {
            ScopeDimension::Section => "section",
            ScopeDimension::EntityType => "entityType",
            ScopeDimension::Workspace => "workspace",
            ScopeDimension::PropertyAlias => "propertyAlias",
            ScopeDimension::PropertyEditorUiAlias => "propertyEditorUiAlias",
            ScopeDimension::ContentTypeAlias => "contentTypeAlias",
        }
    }
}

impl fmt::Display for ScopeDimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a dimension name is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown scope dimension: {0}")]
pub struct UnknownDimension(pub String);

impl FromStr for ScopeDimension {
    type Err = UnknownDimension;

    /// Names are matched case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ScopeDimension::ALL
            .into_iter()
            .find(|d| d.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownDimension(s.to_string()))
    }
}

impl Serialize for ScopeDimension {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ScopeDimension {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        name.parse().map_err(serde::de::Error::custom)
    }
}

/// The set of dimensions a calling surface declares it cares about.
///
/// Rule dimensions outside this set are ignored during evaluation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DimensionSet(BTreeSet<ScopeDimension>);

impl DimensionSet {
    /// An empty set. Every rule matches vacuously against it.
    pub fn new() -> Self {
        Self(BTreeSet::new())
    }

    /// Every known dimension.
    pub fn all() -> Self {
        ScopeDimension::ALL.into_iter().collect()
    }

    /// Add a dimension.
    pub fn with(mut self, dimension: ScopeDimension) -> Self {
        self.0.insert(dimension);
        self
    }

    /// Check whether a dimension is declared.
    pub fn contains(&self, dimension: ScopeDimension) -> bool {
        self.0.contains(&dimension)
    }

    /// Number of declared dimensions.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True if no dimension is declared.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate in canonical order.
    pub fn iter(&self) -> impl Iterator<Item = ScopeDimension> + '_ {
        self.0.iter().copied()
    }

    /// Parse a list of dimension names.
    pub fn parse<I, S>(names: I) -> Result<Self, UnknownDimension>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        names
            .into_iter()
            .map(|name| name.as_ref().parse::<ScopeDimension>())
            .collect()
    }
}

impl FromIterator<ScopeDimension> for DimensionSet {
    fn from_iter<T: IntoIterator<Item = ScopeDimension>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<const N: usize> From<[ScopeDimension; N]> for DimensionSet {
    fn from(dimensions: [ScopeDimension; N]) -> Self {
        dimensions.into_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!(
            "ENTITYTYPE".parse::<ScopeDimension>().unwrap(),
            ScopeDimension::EntityType
        );
        assert_eq!(
            "propertyeditoruialias".parse::<ScopeDimension>().unwrap(),
            ScopeDimension::PropertyEditorUiAlias
        );
    }

    #[test]
    fn test_parse_unknown() {
        let err = "colour".parse::<ScopeDimension>().unwrap_err();
        assert_eq!(err, UnknownDimension("colour".to_string()));
    }

    #[test]
    fn test_dimension_set_parse() {
        let set = DimensionSet::parse(["section", "entityType"]).unwrap();
        assert_eq!(set.len(), 2);
        assert!(set.contains(ScopeDimension::Section));
        assert!(set.contains(ScopeDimension::EntityType));
        assert!(!set.contains(ScopeDimension::Workspace));

        assert!(DimensionSet::parse(["section", "nope"]).is_err());
    }

    #[test]
    fn test_dimension_set_serialization() {
        let set = DimensionSet::from([ScopeDimension::EntityType, ScopeDimension::Section]);
        let json = serde_json::to_string(&set).unwrap();
        assert_eq!(json, r#"["section","entityType"]"#);

        let parsed: DimensionSet = serde_json::from_str(r#"["Section","ENTITYTYPE"]"#).unwrap();
        assert_eq!(parsed, set);
    }
}
