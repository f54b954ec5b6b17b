//! Rendering serialized entities as system-message text.

use std::fmt::Write as _;
use std::sync::Arc;

use super::SerializedEntity;

/// Renders an entity for the model.
pub trait EntityFormatter: Send + Sync {
    /// Entity type this formatter handles. `None` for a generic formatter.
    fn entity_type(&self) -> Option<&str>;

    /// Render the entity as one system-message block.
    fn format(&self, entity: &SerializedEntity) -> String;
}

/// Generic Markdown rendering used when no type-specific formatter exists.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultEntityFormatter;

impl EntityFormatter for DefaultEntityFormatter {
    fn entity_type(&self) -> Option<&str> {
        None
    }

    fn format(&self, entity: &SerializedEntity) -> String {
        let mut out = String::from("## Current Entity\n");
        let _ = writeln!(out, "- Type: {}", entity.entity_type);
        let _ = writeln!(out, "- Name: {}", entity.name);
        let _ = writeln!(out, "- Id: {}", entity.unique);
        if let Some(content_type) = &entity.content_type {
            let _ = writeln!(out, "- Content Type: {}", content_type);
        }
        if let Some(parent) = &entity.parent_unique {
            let _ = writeln!(out, "- Parent Id: {}", parent);
        }

        if !entity.properties.is_empty() {
            out.push_str("\n### Properties\n");
            for property in &entity.properties {
                let _ = writeln!(
                    out,
                    "- {} ({}): {}",
                    property.label,
                    property.alias,
                    property.value_text()
                );
            }
        }

        out.truncate(out.trim_end().len());
        out
    }
}

/// Formatter lookup by entity type.
///
/// Registered formatters are consulted in registration order; the first one
/// whose entity type matches (case-insensitively) wins. Anything else falls
/// back to the generic formatter.
#[derive(Clone)]
pub struct EntityFormatters {
    formatters: Vec<Arc<dyn EntityFormatter>>,
    fallback: Arc<dyn EntityFormatter>,
}

impl EntityFormatters {
    /// Only the generic formatter.
    pub fn new() -> Self {
        Self {
            formatters: Vec::new(),
            fallback: Arc::new(DefaultEntityFormatter),
        }
    }

    /// Register a formatter.
    ///
    /// A formatter without an entity type replaces the generic fallback.
    pub fn register(mut self, formatter: impl EntityFormatter + 'static) -> Self {
        let formatter: Arc<dyn EntityFormatter> = Arc::new(formatter);
        if formatter.entity_type().is_some() {
            self.formatters.push(formatter);
        } else {
            self.fallback = formatter;
        }
        self
    }

    /// Formatter for an entity type.
    pub fn get(&self, entity_type: &str) -> &dyn EntityFormatter {
        let formatter = self
            .formatters
            .iter()
            .find(|f| {
                f.entity_type()
                    .is_some_and(|t| t.eq_ignore_ascii_case(entity_type))
            })
            .unwrap_or(&self.fallback);
        &**formatter
    }

    /// Render an entity with its formatter.
    pub fn format(&self, entity: &SerializedEntity) -> String {
        self.get(&entity.entity_type).format(entity)
    }
}

impl Default for EntityFormatters {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for EntityFormatters {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let types: Vec<_> = self
            .formatters
            .iter()
            .filter_map(|f| f.entity_type())
            .collect();
        f.debug_struct("EntityFormatters")
            .field("entity_types", &types)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::SerializedProperty;

    struct MediaFormatter;

    impl EntityFormatter for MediaFormatter {
        fn entity_type(&self) -> Option<&str> {
            Some("media")
        }

        fn format(&self, entity: &SerializedEntity) -> String {
            format!("Media item: {}", entity.name)
        }
    }

    fn entity(entity_type: &str) -> SerializedEntity {
        SerializedEntity {
            entity_type: entity_type.to_string(),
            unique: "abc".to_string(),
            name: "Landscape".to_string(),
            content_type: Some("image".to_string()),
            parent_unique: None,
            properties: vec![SerializedProperty {
                alias: "altText".to_string(),
                label: "Alt text".to_string(),
                editor_alias: "Umb.TextBox".to_string(),
                value: serde_json::json!("Mountains"),
            }],
        }
    }

    #[test]
    fn test_default_format() {
        let text = DefaultEntityFormatter.format(&entity("document"));

        assert!(text.starts_with("## Current Entity\n"));
        assert!(text.contains("- Type: document"));
        assert!(text.contains("- Content Type: image"));
        assert!(!text.contains("Parent Id"));
        assert!(text.contains("### Properties\n- Alt text (altText): Mountains"));
        assert!(!text.ends_with('\n'));
    }

    #[test]
    fn test_typed_formatter_lookup() {
        let formatters = EntityFormatters::new().register(MediaFormatter);

        assert_eq!(formatters.format(&entity("Media")), "Media item: Landscape");
        assert!(formatters
            .format(&entity("document"))
            .starts_with("## Current Entity"));
    }
}
