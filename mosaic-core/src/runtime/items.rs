//! Caller-supplied request context items and their handled state.

use serde::{Deserialize, Serialize};

/// An item of context supplied by the invoking surface.
///
/// `value` is opaque. It may encode structured data such as a serialized
/// entity, but nothing here assumes a shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestContextItem {
    /// Human-readable description.
    pub description: String,
    /// Optional payload.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

impl RequestContextItem {
    /// Create an item with a description only.
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            value: None,
        }
    }

    /// Create an item with a description and a value.
    pub fn with_value(description: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            value: Some(value.into()),
        }
    }
}

/// Ordered request items plus a handled flag per item.
///
/// Once an item is handled it is invisible to every `handle*` call and to
/// [`unhandled`](Self::unhandled). Handled state cannot be reverted.
#[derive(Debug, Clone, Default)]
pub struct RequestContextItemCollection {
    items: Vec<RequestContextItem>,
    handled: Vec<bool>,
}

impl RequestContextItemCollection {
    /// Wrap a list of items, all unhandled.
    pub fn new(items: Vec<RequestContextItem>) -> Self {
        let handled = vec![false; items.len()];
        Self { items, handled }
    }

    /// Number of items, handled or not.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// True if there are no items.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Item at `index`.
    pub fn get(&self, index: usize) -> Option<&RequestContextItem> {
        self.items.get(index)
    }

    /// All items in order, handled or not.
    pub fn iter(&self) -> impl Iterator<Item = &RequestContextItem> {
        self.items.iter()
    }

    /// Unhandled items with their indices, in order.
    pub fn unhandled(&self) -> impl Iterator<Item = (usize, &RequestContextItem)> {
        self.items
            .iter()
            .enumerate()
            .filter(|(index, _)| !self.handled[*index])
    }

    /// Whether the item at `index` is handled. Out-of-range indices are not.
    pub fn is_handled(&self, index: usize) -> bool {
        self.handled.get(index).copied().unwrap_or(false)
    }

    /// Mark the item at `index` handled. Returns `false` if out of range.
    pub fn mark_handled(&mut self, index: usize) -> bool {
        match self.handled.get_mut(index) {
            Some(flag) => {
                *flag = true;
                true
            }
            None => false,
        }
    }

    /// Number of handled items.
    pub fn handled_count(&self) -> usize {
        self.handled.iter().filter(|h| **h).count()
    }

    /// Handle the first unhandled item matching `predicate`.
    ///
    /// Returns `true` if an item was handled.
    pub fn handle<P, F>(&mut self, mut predicate: P, action: F) -> bool
    where
        P: FnMut(&RequestContextItem) -> bool,
        F: FnOnce(&RequestContextItem),
    {
        let found = self
            .unhandled()
            .find(|&(_, item)| predicate(item))
            .map(|(index, _)| index);
        match found {
            Some(index) => {
                action(&self.items[index]);
                self.handled[index] = true;
                true
            }
            None => false,
        }
    }

    /// Handle every unhandled item matching `predicate`.
    ///
    /// Returns the number of items handled.
    pub fn handle_all<P, F>(&mut self, mut predicate: P, mut action: F) -> usize
    where
        P: FnMut(&RequestContextItem) -> bool,
        F: FnMut(&RequestContextItem),
    {
        let mut count = 0;
        for (index, item) in self.items.iter().enumerate() {
            if self.handled[index] || !predicate(item) {
                continue;
            }
            action(item);
            self.handled[index] = true;
            count += 1;
        }
        count
    }

    /// Handle every item that is still unhandled.
    pub fn handle_unhandled<F>(&mut self, action: F) -> usize
    where
        F: FnMut(&RequestContextItem),
    {
        self.handle_all(|_| true, action)
    }

    /// Claim the first unhandled item that `interpret` accepts.
    ///
    /// Items for which `interpret` returns `None` stay unhandled so later
    /// contributors still see them. Items after the claimed one are not
    /// offered.
    pub fn claim_first<T, F>(&mut self, mut interpret: F) -> Option<T>
    where
        F: FnMut(&RequestContextItem) -> Option<T>,
    {
        let (index, value) = self
            .unhandled()
            .find_map(|(index, item)| interpret(item).map(|value| (index, value)))?;
        self.handled[index] = true;
        Some(value)
    }
}

impl From<Vec<RequestContextItem>> for RequestContextItemCollection {
    fn from(items: Vec<RequestContextItem>) -> Self {
        Self::new(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn items() -> RequestContextItemCollection {
        RequestContextItemCollection::new(vec![
            RequestContextItem::with_value("a", "1"),
            RequestContextItem::with_value("b", "2"),
            RequestContextItem::new("c"),
        ])
    }

    #[test]
    fn test_handle_first_match_only() {
        let mut items = items();
        let mut seen = Vec::new();

        let handled = items.handle(|i| i.value.is_some(), |i| seen.push(i.description.clone()));

        assert!(handled);
        assert_eq!(seen, vec!["a"]);
        assert!(items.is_handled(0));
        assert!(!items.is_handled(1));
        assert_eq!(items.handled_count(), 1);
    }

    #[test]
    fn test_handle_skips_handled() {
        let mut items = items();
        items.mark_handled(0);

        let mut seen = Vec::new();
        items.handle(|_| true, |i| seen.push(i.description.clone()));
        assert_eq!(seen, vec!["b"]);
    }

    #[test]
    fn test_handle_no_match() {
        let mut items = items();
        assert!(!items.handle(|i| i.description == "zzz", |_| {}));
        assert_eq!(items.handled_count(), 0);
    }

    #[test]
    fn test_handle_all_and_unhandled() {
        let mut items = items();
        assert_eq!(items.handle_all(|i| i.value.is_some(), |_| {}), 2);

        let remaining: Vec<_> = items.unhandled().map(|(i, _)| i).collect();
        assert_eq!(remaining, vec![2]);

        assert_eq!(items.handle_unhandled(|_| {}), 1);
        assert_eq!(items.handled_count(), 3);
        assert_eq!(items.handle_unhandled(|_| {}), 0);
    }

    #[test]
    fn test_claim_first_skips_failures_and_stops_at_match() {
        let mut items = RequestContextItemCollection::new(vec![
            RequestContextItem::with_value("a", "x"),
            RequestContextItem::with_value("b", "2"),
            RequestContextItem::with_value("c", "3"),
        ]);
        let mut offered = Vec::new();
        let parsed: Option<i32> = items.claim_first(|i| {
            offered.push(i.description.clone());
            i.value.as_deref()?.parse().ok()
        });

        assert_eq!(parsed, Some(2));
        assert_eq!(offered, vec!["a", "b"]);
        assert!(!items.is_handled(0));
        assert!(items.is_handled(1));
        assert!(!items.is_handled(2));

        assert_eq!(items.claim_first(|i| i.value.as_deref()?.parse::<i32>().ok()), Some(3));
        assert_eq!(items.claim_first(|i| i.value.as_deref()?.parse::<i32>().ok()), None);
    }

    #[test]
    fn test_mark_handled_out_of_range() {
        let mut items = items();
        assert!(!items.mark_handled(10));
        assert!(!items.is_handled(10));
        assert_eq!(items.len(), 3);
        assert_eq!(items.get(2).unwrap().description, "c");
    }

    #[test]
    fn test_item_deserialization_without_value() {
        let item: RequestContextItem = serde_json::from_str(r#"{"description":"x"}"#).unwrap();
        assert_eq!(item, RequestContextItem::new("x"));
    }
}
