use crate::model::Layout;

pub const HISTORY_LIMIT: usize = 10;

/// Bounded undo stack of whole-layout snapshots. There is no redo side.
#[derive(Clone, Debug)]
pub struct History {
    entries: Vec<Layout>,
    limit: usize,
}

impl Default for History {
    fn default() -> Self {
        Self::with_limit(HISTORY_LIMIT)
    }
}

impl History {
    pub fn with_limit(limit: usize) -> Self {
        Self {
            entries: Vec::new(),
            limit: limit.max(1),
        }
    }

    /// Records a copy of `layout`, evicting the oldest entries past the limit.
    pub fn push(&mut self, layout: &Layout) {
        self.entries.push(layout.clone());
        if self.entries.len() > self.limit {
            let overflow = self.entries.len() - self.limit;
            self.entries.drain(0..overflow);
        }
    }

    /// Installs the most recent snapshot into `current`. Returns false and
    /// leaves `current` alone when there is nothing to undo.
    pub fn undo(&mut self, current: &mut Layout) -> bool {
        let Some(prev) = self.entries.pop() else {
            return false;
        };
        *current = prev;
        true
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn can_undo(&self) -> bool {
        !self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn oldest(&self) -> Option<&Layout> {
        self.entries.first()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::LayoutItem;

    fn layout_at(y: u32) -> Layout {
        Layout::new(vec![LayoutItem::new("a", 0, y, 4, 2)])
    }

    #[test]
    fn test_undo_on_empty_is_noop() {
        let mut history = History::default();
        let mut current = layout_at(3);
        assert!(!history.undo(&mut current));
        assert_eq!(current, layout_at(3));
    }

    #[test]
    fn test_undo_restores_last_push() {
        let mut history = History::default();
        let mut current = layout_at(0);
        history.push(&current);
        current = layout_at(5);
        assert!(history.undo(&mut current));
        assert_eq!(current, layout_at(0));
        assert!(history.is_empty());
    }

    #[test]
    fn test_push_copies_the_layout() {
        let mut history = History::default();
        let mut current = layout_at(0);
        history.push(&current);
        current.get_mut(&"a".into()).unwrap().y = 9;
        assert_eq!(history.oldest(), Some(&layout_at(0)));
    }

    #[test]
    fn test_eleven_pushes_keep_ten() {
        let mut history = History::default();
        for y in 0..11 {
            history.push(&layout_at(y));
        }
        assert_eq!(history.len(), HISTORY_LIMIT);
        // Snapshot 0 was evicted.
        assert_eq!(history.oldest(), Some(&layout_at(1)));
    }
}
