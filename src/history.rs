//! In-memory, newest-first record of completed generations.

use crate::media::GeneratedItem;
use std::collections::VecDeque;
use uuid::Uuid;

/// Session history. Lives only as long as the process.
#[derive(Debug, Clone, Default)]
pub struct SessionHistory {
    items: VecDeque<GeneratedItem>,
}

impl SessionHistory {
    /// Creates an empty history.
    pub fn new() -> Self {
        Self::default()
    }

    /// Puts `item` in front of everything recorded so far.
    pub fn record(&mut self, item: GeneratedItem) {
        tracing::debug!(id = %item.id, kind = %item.media_kind, "recorded generation");
        self.items.push_front(item);
    }

    /// Drops every item.
    pub fn clear(&mut self) {
        if !self.items.is_empty() {
            tracing::debug!(count = self.items.len(), "cleared history");
        }
        self.items.clear();
    }

    /// Number of recorded items.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// True if nothing is recorded.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Items, newest first.
    pub fn iter(&self) -> impl Iterator<Item = &GeneratedItem> {
        self.items.iter()
    }

    /// Looks up an item by id.
    pub fn get(&self, id: Uuid) -> Option<&GeneratedItem> {
        self.items.iter().find(|item| item.id == id)
    }

    /// Copies the items out, newest first.
    pub fn to_vec(&self) -> Vec<GeneratedItem> {
        self.items.iter().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::media::{Locator, MediaKind};

    fn item(prompt: &str) -> GeneratedItem {
        GeneratedItem::new(
            MediaKind::Image,
            Locator::Data("data:image/png;base64,AA==".into()),
            prompt,
            None,
        )
    }

    #[test]
    fn test_record_prepends() {
        let mut history = SessionHistory::new();
        history.record(item("first"));
        history.record(item("second"));

        let prompts: Vec<_> = history.iter().map(|i| i.prompt.as_str()).collect();
        assert_eq!(prompts, vec!["second", "first"]);
        assert_eq!(history.len(), 2);
    }

    #[test]
    fn test_no_dedup() {
        let mut history = SessionHistory::new();
        let first = item("same");
        let second = item("same");
        assert_ne!(first.id, second.id);
        history.record(first);
        history.record(second);
        assert_eq!(history.len(), 2);
    }

    #[test]
    fn test_clear() {
        let mut history = SessionHistory::new();
        history.record(item("a"));
        history.record(item("b"));
        history.clear();
        assert!(history.is_empty());

        // Clearing an empty history is a no-op.
        history.clear();
        assert!(history.is_empty());
    }

    #[test]
    fn test_get_by_id() {
        let mut history = SessionHistory::new();
        let target = item("target");
        let id = target.id;
        history.record(target);
        history.record(item("other"));

        assert_eq!(history.get(id).unwrap().prompt, "target");
        assert!(history.get(Uuid::new_v4()).is_none());
    }
}
