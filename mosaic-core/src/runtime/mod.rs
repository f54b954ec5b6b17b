//! Per-request runtime context.
//!
//! A [`RuntimeContext`] is created at the start of one request and dropped at
//! the end. Contributors and resolvers write into it; the host formats the
//! result into the outbound model request.

mod ambient;
mod data;
mod items;

pub use ambient::{AmbientState, UserIdentity};
pub use data::{keys, ContextData, ContextKey};
pub use items::{RequestContextItem, RequestContextItemCollection};

use std::collections::BTreeMap;

/// Separator used by [`RuntimeContext::system_message`].
pub const SYSTEM_MESSAGE_SEPARATOR: &str = "\n\n";

/// The per-request accumulator.
///
/// # Example
///
/// ```rust
/// use mosaic_core::runtime::{keys, RequestContextItem, RuntimeContext};
///
/// let mut ctx = RuntimeContext::new(vec![RequestContextItem::new("Selected text")]);
/// ctx.add_system_message_part("## Current User\n- Name: Ada");
/// ctx.set_variable("entityType", "document");
/// ctx.data_mut().set(keys::ENTITY_TYPE, "document".to_string());
///
/// assert_eq!(ctx.system_message_parts().len(), 1);
/// assert_eq!(ctx.variables()["entityType"], "document");
/// assert_eq!(ctx.request_items().handled_count(), 0);
/// ```
#[derive(Debug, Default)]
pub struct RuntimeContext {
    items: RequestContextItemCollection,
    system_message_parts: Vec<String>,
    variables: BTreeMap<String, String>,
    data: ContextData,
}

impl RuntimeContext {
    /// Create a context for the given request items.
    pub fn new(items: Vec<RequestContextItem>) -> Self {
        Self {
            items: RequestContextItemCollection::new(items),
            ..Default::default()
        }
    }

    /// Append a system message fragment.
    pub fn add_system_message_part(&mut self, part: impl Into<String>) {
        self.system_message_parts.push(part.into());
    }

    /// System message fragments in contribution order.
    pub fn system_message_parts(&self) -> &[String] {
        &self.system_message_parts
    }

    /// All fragments joined by a blank line. `None` if there are none.
    pub fn system_message(&self) -> Option<String> {
        if self.system_message_parts.is_empty() {
            return None;
        }
        Some(self.system_message_parts.join(SYSTEM_MESSAGE_SEPARATOR))
    }

    /// Set a template variable, replacing any previous value.
    pub fn set_variable(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.variables.insert(name.into(), value.into());
    }

    /// Template variables.
    pub fn variables(&self) -> &BTreeMap<String, String> {
        &self.variables
    }

    /// Typed data bag.
    pub fn data(&self) -> &ContextData {
        &self.data
    }

    /// Mutable typed data bag.
    pub fn data_mut(&mut self) -> &mut ContextData {
        &mut self.data
    }

    /// Request items and their handled state.
    pub fn request_items(&self) -> &RequestContextItemCollection {
        &self.items
    }

    /// Mutable request items.
    pub fn request_items_mut(&mut self) -> &mut RequestContextItemCollection {
        &mut self.items
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_message_join_is_stable() {
        let mut ctx = RuntimeContext::new(vec![]);
        assert!(ctx.system_message().is_none());

        ctx.add_system_message_part("one");
        ctx.add_system_message_part("two");
        ctx.add_system_message_part("three");

        assert_eq!(ctx.system_message().unwrap(), "one\n\ntwo\n\nthree");
    }

    #[test]
    fn test_variables_overwrite() {
        let mut ctx = RuntimeContext::default();
        ctx.set_variable("title", "a");
        ctx.set_variable("title", "b");
        assert_eq!(ctx.variables().len(), 1);
        assert_eq!(ctx.variables()["title"], "b");
    }

    #[test]
    fn test_request_items_exposed() {
        let mut ctx = RuntimeContext::new(vec![RequestContextItem::new("x")]);
        ctx.request_items_mut().mark_handled(0);
        assert_eq!(ctx.request_items().handled_count(), 1);
    }
}
