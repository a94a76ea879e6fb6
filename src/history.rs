use std::collections::VecDeque;

use crate::error::{EditError, EditResult};

/// Undo/redo bookkeeping.
///
/// `past` holds applied entries (most recent last); `future` holds undone
/// entries (most recently undone last). The stack never touches pixels: the
/// engine recomputes the document from whatever this returns.
#[derive(Debug, Clone)]
pub struct HistoryStack<T> {
    past: VecDeque<T>,
    future: Vec<T>,
    max_depth: Option<usize>,
}

impl<T> Default for HistoryStack<T> {
    fn default() -> Self {
        Self::new(None)
    }
}

impl<T> HistoryStack<T> {
    pub const fn new(max_depth: Option<usize>) -> Self {
        Self {
            past: VecDeque::new(),
            future: Vec::new(),
            max_depth,
        }
    }

    /// Push a new entry and drop the redo branch.
    ///
    /// Returns the oldest entry when the depth limit pushed it out; the
    /// caller must fold it into its base state.
    pub fn record(&mut self, entry: T) -> Option<T> {
        self.future.clear();
        self.past.push_back(entry);
        match self.max_depth {
            Some(limit) if self.past.len() > limit => self.past.pop_front(),
            _ => None,
        }
    }

    pub fn can_undo(&self) -> bool {
        !self.past.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.future.is_empty()
    }

    /// Move the most recent entry to the redo stack and return it.
    pub fn undo(&mut self) -> EditResult<&T> {
        let entry = self.past.pop_back().ok_or(EditError::EmptyHistory)?;
        self.future.push(entry);
        self.future.last().ok_or(EditError::EmptyHistory)
    }

    /// Move the most recently undone entry back and return it.
    pub fn redo(&mut self) -> EditResult<&T> {
        let entry = self.future.pop().ok_or(EditError::EmptyHistory)?;
        self.past.push_back(entry);
        self.past.back().ok_or(EditError::EmptyHistory)
    }

    /// Undo or redo until exactly `position` entries are applied.
    pub fn seek(&mut self, position: usize) -> EditResult<()> {
        if position > self.len() {
            return Err(EditError::HistoryOutOfRange {
                target: position,
                len: self.len(),
            });
        }
        while self.past.len() > position {
            self.undo()?;
        }
        while self.past.len() < position {
            self.redo()?;
        }
        Ok(())
    }

    pub fn peek_undo(&self) -> Option<&T> {
        self.past.back()
    }

    pub fn peek_redo(&self) -> Option<&T> {
        self.future.last()
    }

    /// Number of applied entries.
    pub fn position(&self) -> usize {
        self.past.len()
    }

    /// Applied plus undone entries.
    pub fn len(&self) -> usize {
        self.past.len() + self.future.len()
    }

    pub fn is_empty(&self) -> bool {
        self.past.is_empty() && self.future.is_empty()
    }

    /// Applied entries, oldest first.
    pub fn past(&self) -> impl DoubleEndedIterator<Item = &T> + ExactSizeIterator {
        self.past.iter()
    }

    /// Undone entries, most recently undone first.
    pub fn future(&self) -> impl DoubleEndedIterator<Item = &T> + ExactSizeIterator {
        self.future.iter().rev()
    }

    /// Every entry in chronological order: applied ones, then the undone
    /// ones in the order a sequence of redos would reapply them.
    pub fn timeline(&self) -> impl Iterator<Item = &T> {
        self.past.iter().chain(self.future.iter().rev())
    }

    pub fn clear(&mut self) {
        self.past.clear();
        self.future.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stack_with(entries: &[u32]) -> HistoryStack<u32> {
        let mut stack = HistoryStack::default();
        for &entry in entries {
            assert!(stack.record(entry).is_none());
        }
        stack
    }

    fn past(stack: &HistoryStack<u32>) -> Vec<u32> {
        stack.past().copied().collect()
    }

    fn future(stack: &HistoryStack<u32>) -> Vec<u32> {
        stack.future().copied().collect()
    }

    #[test]
    fn empty_stack_rejects_undo_and_redo() {
        let mut stack: HistoryStack<u32> = HistoryStack::default();
        assert!(!stack.can_undo());
        assert!(!stack.can_redo());
        assert!(matches!(stack.undo(), Err(EditError::EmptyHistory)));
        assert!(matches!(stack.redo(), Err(EditError::EmptyHistory)));
    }

    #[test]
    fn undo_moves_entries_to_future() {
        let mut stack = stack_with(&[1, 2, 3]);
        assert_eq!(*stack.undo().expect("undo"), 3);
        assert_eq!(*stack.undo().expect("undo"), 2);
        assert_eq!(past(&stack), vec![1]);
        assert_eq!(future(&stack), vec![2, 3]);
        assert_eq!(*stack.redo().expect("redo"), 2);
        assert_eq!(past(&stack), vec![1, 2]);
        assert_eq!(future(&stack), vec![3]);
    }

    #[test]
    fn undo_then_redo_leaves_stacks_unchanged() {
        let mut stack = stack_with(&[1, 2, 3]);
        stack.undo().expect("undo");
        let (before_past, before_future) = (past(&stack), future(&stack));
        stack.undo().expect("undo");
        stack.redo().expect("redo");
        assert_eq!(past(&stack), before_past);
        assert_eq!(future(&stack), before_future);
    }

    #[test]
    fn record_clears_redo_branch() {
        let mut stack = stack_with(&[1, 2, 3]);
        stack.undo().expect("undo");
        stack.undo().expect("undo");
        stack.record(9);
        assert_eq!(past(&stack), vec![1, 9]);
        assert!(!stack.can_redo());
        assert!(matches!(stack.redo(), Err(EditError::EmptyHistory)));
    }

    #[test]
    fn depth_limit_evicts_oldest() {
        let mut stack = HistoryStack::new(Some(2));
        assert_eq!(stack.record(1), None);
        assert_eq!(stack.record(2), None);
        assert_eq!(stack.record(3), Some(1));
        assert_eq!(past(&stack), vec![2, 3]);
    }

    #[test]
    fn seek_walks_both_directions() {
        let mut stack = stack_with(&[1, 2, 3, 4]);
        stack.seek(1).expect("seek back");
        assert_eq!(past(&stack), vec![1]);
        assert_eq!(future(&stack), vec![2, 3, 4]);
        assert_eq!(stack.timeline().copied().collect::<Vec<_>>(), vec![1, 2, 3, 4]);
        stack.seek(3).expect("seek forward");
        assert_eq!(past(&stack), vec![1, 2, 3]);
        assert!(matches!(
            stack.seek(5),
            Err(EditError::HistoryOutOfRange { target: 5, len: 4 })
        ));
        assert_eq!(stack.position(), 3);
    }

    #[test]
    fn peeks_report_next_entries() {
        let mut stack = stack_with(&[1, 2]);
        assert_eq!(stack.peek_undo(), Some(&2));
        assert_eq!(stack.peek_redo(), None);
        stack.undo().expect("undo");
        assert_eq!(stack.peek_undo(), Some(&1));
        assert_eq!(stack.peek_redo(), Some(&2));
        stack.clear();
        assert!(stack.is_empty());
    }
}
