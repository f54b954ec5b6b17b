//! Common test utilities shared across test files.
//!
//! Items here may not be used by all test files, hence the module-level allow.
#![allow(dead_code)]

use mosaic_core::store::MemoryStore;
use mosaic_core::{ContextAssembler, RequestContextItem};
use serde_json::json;
use std::path::PathBuf;
use std::sync::Arc;
use uuid::Uuid;

/// Path to a fixture file under `tests/fixtures`.
pub fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

/// An assembler with default pipelines over a single memory store.
pub fn assembler(store: Arc<MemoryStore>) -> ContextAssembler {
    ContextAssembler::with_stores(store.clone(), store.clone(), store)
}

/// A request item carrying a serialized document.
pub fn entity_item(unique: &str, parent_unique: Option<&str>, name: &str) -> RequestContextItem {
    let mut value = json!({
        "entityType": "document",
        "unique": unique,
        "name": name,
        "contentType": "article",
        "properties": [
            {"alias": "title", "label": "Title", "editorAlias": "Umb.TextBox", "value": name}
        ]
    });
    if let Some(parent) = parent_unique {
        value["parentUnique"] = json!(parent);
    }
    RequestContextItem::with_value(format!("Current entity: {}", name), value.to_string())
}

/// Document item for an existing entity id.
pub fn document_item(id: Uuid, name: &str) -> RequestContextItem {
    entity_item(&id.to_string(), None, name)
}
