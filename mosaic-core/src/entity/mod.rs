//! Serialized entity snapshots sent by the editing UI.
//!
//! The UI sends the entity being edited as a JSON request item. There is no
//! type tag; an item is recognized structurally by carrying an `entityType`
//! field and a `properties` list. [`SerializedEntity::parse`] turns "is this
//! an entity?" into an explicit `Result`.

mod format;

pub use format::{DefaultEntityFormatter, EntityFormatter, EntityFormatters};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Why a request item value is not a serialized entity.
#[derive(Debug, thiserror::Error)]
pub enum EntityParseError {
    /// The value is not JSON at all.
    #[error("not JSON: {0}")]
    NotJson(#[from] serde_json::Error),

    /// The value is JSON but not an object.
    #[error("not a JSON object")]
    NotAnObject,

    /// The structural signature (`entityType` + `properties`) is missing.
    #[error("missing entity signature field '{0}'")]
    MissingSignature(&'static str),

    /// A required field is missing, empty or of the wrong type.
    #[error("invalid field '{field}': expected {expected}")]
    InvalidField {
        /// Field name.
        field: &'static str,
        /// What was expected.
        expected: &'static str,
    },
}

/// A property value on a [`SerializedEntity`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SerializedProperty {
    /// Property alias.
    pub alias: String,
    /// Human-readable label.
    pub label: String,
    /// Property editor alias.
    pub editor_alias: String,
    /// Current value, `Null` when unset.
    #[serde(default)]
    pub value: Value,
}

/// Snapshot of the entity being edited.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SerializedEntity {
    /// Entity type (e.g. `document`, `media`).
    pub entity_type: String,
    /// Entity identifier as sent by the UI. Usually, not always, a UUID.
    pub unique: String,
    /// Display name.
    pub name: String,
    /// Content type alias.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    /// Identifier of the parent, for entities that do not exist yet.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_unique: Option<String>,
    /// Property values in UI order.
    #[serde(default)]
    pub properties: Vec<SerializedProperty>,
}

fn required_str(object: &Map<String, Value>, field: &'static str) -> Result<String, EntityParseError> {
    match object.get(field).and_then(Value::as_str) {
        Some(value) if !value.is_empty() => Ok(value.to_string()),
        _ => Err(EntityParseError::InvalidField {
            field,
            expected: "a non-empty string",
        }),
    }
}

fn optional_str(object: &Map<String, Value>, field: &str) -> Option<String> {
    object
        .get(field)
        .and_then(Value::as_str)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

impl SerializedProperty {
    /// Parse one property. Properties without alias, label or editor alias
    /// are not usable and yield `None`.
    fn from_value(value: &Value) -> Option<Self> {
        let object = value.as_object()?;
        Some(Self {
            alias: optional_str(object, "alias")?,
            label: optional_str(object, "label")?,
            editor_alias: optional_str(object, "editorAlias")?,
            value: object.get("value").cloned().unwrap_or(Value::Null),
        })
    }

    /// The value as plain text for template variables.
    ///
    /// Strings are used as-is, numbers and booleans are stringified, `null`
    /// becomes empty and anything else is rendered as compact JSON.
    pub fn value_text(&self) -> String {
        value_text(&self.value)
    }
}

pub(crate) fn value_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        other => other.to_string(),
    }
}

impl SerializedEntity {
    /// Parse a request item value.
    ///
    /// # Example
    ///
    /// ```rust
    /// use mosaic_core::entity::SerializedEntity;
    ///
    /// let entity = SerializedEntity::parse(
    ///     r#"{"entityType":"document","unique":"a1","name":"Home","properties":[]}"#,
    /// ).unwrap();
    /// assert_eq!(entity.entity_type, "document");
    ///
    /// assert!(SerializedEntity::parse("just some text").is_err());
    /// assert!(SerializedEntity::parse(r#"{"entityType":"document"}"#).is_err());
    /// ```
    pub fn parse(value: &str) -> Result<Self, EntityParseError> {
        let json: Value = serde_json::from_str(value.trim())?;
        let object = json.as_object().ok_or(EntityParseError::NotAnObject)?;

        if !object.contains_key("entityType") {
            return Err(EntityParseError::MissingSignature("entityType"));
        }
        let properties = object
            .get("properties")
            .ok_or(EntityParseError::MissingSignature("properties"))?
            .as_array()
            .ok_or(EntityParseError::InvalidField {
                field: "properties",
                expected: "an array",
            })?;

        Ok(Self {
            entity_type: required_str(object, "entityType")?,
            unique: required_str(object, "unique")?,
            name: required_str(object, "name")?,
            content_type: optional_str(object, "contentType"),
            parent_unique: optional_str(object, "parentUnique"),
            properties: properties
                .iter()
                .filter_map(SerializedProperty::from_value)
                .collect(),
        })
    }

    /// Template variables for this entity.
    ///
    /// Always contains `entityType`, `entityId` and `entityName`; adds
    /// `contentType` when known and one entry per property alias. A property
    /// alias that collides with a built-in name overrides it.
    pub fn variables(&self) -> BTreeMap<String, String> {
        let mut variables = BTreeMap::new();
        variables.insert("entityType".to_string(), self.entity_type.clone());
        variables.insert("entityId".to_string(), self.unique.clone());
        variables.insert("entityName".to_string(), self.name.clone());
        if let Some(content_type) = &self.content_type {
            variables.insert("contentType".to_string(), content_type.clone());
        }
        for property in &self.properties {
            variables.insert(property.alias.clone(), property.value_text());
        }
        variables
    }
}
