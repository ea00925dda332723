//! Ordered collection with a position

/// An ordered list of records plus the index of the current one.
///
/// Invariant: `index < items.len()` whenever the list is non-empty, and
/// `index == 0` when it is empty.
#[derive(Debug, Clone, PartialEq)]
pub struct CursorList<T> {
    items: Vec<T>,
    index: usize,
}

impl<T> Default for CursorList<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            index: 0,
        }
    }
}

impl<T> CursorList<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_items(items: Vec<T>) -> Self {
        Self { items, index: 0 }
    }

    /// Replace every item; the index is clamped into the new range
    pub fn replace(&mut self, items: Vec<T>) {
        self.items = items;
        self.index = self.index.min(self.items.len().saturating_sub(1));
    }

    /// Append items, keeping order and position
    pub fn extend(&mut self, items: impl IntoIterator<Item = T>) {
        self.items.extend(items);
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn current(&self) -> Option<&T> {
        self.items.get(self.index)
    }

    pub fn has_next(&self) -> bool {
        self.index + 1 < self.items.len()
    }

    pub fn has_previous(&self) -> bool {
        self.index > 0
    }

    pub fn peek_next(&self) -> Option<&T> {
        self.items.get(self.index + 1)
    }

    pub fn peek_previous(&self) -> Option<&T> {
        self.index.checked_sub(1).and_then(|i| self.items.get(i))
    }

    /// Move forward one item; returns false (and stays put) at the end
    pub fn advance(&mut self) -> bool {
        if !self.has_next() {
            return false;
        }
        self.index += 1;
        true
    }

    /// Move back one item; returns false (and stays put) at the start
    pub fn retreat(&mut self) -> bool {
        if !self.has_previous() {
            return false;
        }
        self.index -= 1;
        true
    }

    /// Jump to `index`; out-of-range positions are rejected
    pub fn seek(&mut self, index: usize) -> bool {
        if index >= self.items.len() {
            return false;
        }
        self.index = index;
        true
    }

    /// Jump to the first item matching `pred`
    pub fn seek_by<F>(&mut self, pred: F) -> bool
    where
        F: FnMut(&T) -> bool,
    {
        match self.items.iter().position(pred) {
            Some(index) => {
                self.index = index;
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_follow_index_and_length() {
        for len in 0..5usize {
            let mut list = CursorList::from_items((0..len).collect());
            loop {
                let i = list.index();
                assert_eq!(list.has_next(), i + 1 < len);
                assert_eq!(list.has_previous(), i > 0);
                if !list.advance() {
                    break;
                }
            }
            if len > 0 {
                assert_eq!(list.index(), len - 1);
            }
        }
    }

    #[test]
    fn test_advance_and_retreat_are_checked() {
        let mut list = CursorList::from_items(vec!['a', 'b']);
        assert!(!list.retreat());
        assert_eq!(list.index(), 0);
        assert!(list.advance());
        assert!(!list.advance());
        assert_eq!(list.index(), 1);
        assert_eq!(list.current(), Some(&'b'));
    }

    #[test]
    fn test_replace_clamps_index() {
        let mut list = CursorList::from_items(vec![1, 2, 3, 4]);
        assert!(list.seek(3));
        list.replace(vec![9, 8]);
        assert_eq!(list.index(), 1);
        list.replace(Vec::new());
        assert_eq!(list.index(), 0);
        assert!(list.current().is_none());
        assert!(!list.has_next());
        assert!(!list.has_previous());
    }

    #[test]
    fn test_peek_and_seek_by() {
        let mut list = CursorList::from_items(vec!["x", "y", "z"]);
        assert!(list.seek_by(|s| *s == "y"));
        assert_eq!(list.peek_previous(), Some(&"x"));
        assert_eq!(list.peek_next(), Some(&"z"));
        assert!(!list.seek_by(|s| *s == "w"));
        assert_eq!(list.index(), 1);
        assert!(!list.seek(3));
    }
}
