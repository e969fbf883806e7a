//! History stack backends.
//!
//! A [`HistoryBackend`] owns the ordered entries and the pointer to the
//! current one. The transition coordinator asks it to push or replace only
//! after a transition has been confirmed, and [`go`](crate::History::go)
//! moves its pointer before asking for confirmation of the resulting POP.
//!
//! [`MemoryStack`] is the in-memory backend used by
//! [`create_memory_history`](crate::create_memory_history).

use crate::action::Action;
use crate::error::HistoryError;
use crate::location::Location;
use crate::path::parse_path;
use crate::storage::StateStore;
use crate::trace_log;
use std::fmt;

/// Storage of history entries plus a current index.
///
/// Implementations must keep `current_index() < len()` at all times.
pub trait HistoryBackend {
    /// Rebuild the location at the current index, with its state read back
    /// from the state store and its action set to [`Action::Pop`].
    fn current_location(&self) -> Result<Location, HistoryError>;

    /// Offset of the current entry.
    fn current_index(&self) -> usize;

    /// Number of entries.
    fn len(&self) -> usize;

    /// Whether the stack holds no entries.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Entry keys in stack order.
    fn keys(&self) -> Vec<String>;

    /// Whether `current_index() + n` is a valid index.
    fn can_go(&self, n: isize) -> bool;

    /// Move the current index by `n`. Does nothing if `can_go(n)` is false.
    fn advance(&mut self, n: isize);

    /// Discard entries after the current one, append `location` and make it
    /// current. Returns `false` if the backend refused the mutation.
    fn push_location(&mut self, location: &Location) -> Result<bool, HistoryError>;

    /// Overwrite the current entry with `location`. Returns `false` if the
    /// backend refused the mutation.
    fn replace_location(&mut self, location: &Location) -> Result<bool, HistoryError>;
}

/// In-memory history stack.
pub struct MemoryStack {
    entries: Vec<Location>,
    current: usize,
    store: Box<dyn StateStore>,
}

impl MemoryStack {
    /// Create a stack from its initial entries.
    ///
    /// `current` defaults to the last entry and must point into `entries`.
    /// Entries that carry state have it seeded into `store`.
    pub fn new(
        entries: Vec<Location>,
        current: Option<usize>,
        mut store: Box<dyn StateStore>,
    ) -> Result<Self, HistoryError> {
        let len = entries.len();
        let current = current.unwrap_or_else(|| len.saturating_sub(1));
        if current >= len {
            return Err(HistoryError::CurrentOutOfBounds { current, len });
        }

        for entry in entries.iter().filter(|entry| entry.state.is_some()) {
            store.save(&entry.key, entry.state.as_ref())?;
        }

        Ok(Self {
            entries,
            current,
            store,
        })
    }

    /// The stored entries, in order.
    pub fn entries(&self) -> &[Location] {
        &self.entries
    }

    fn offset(&self, n: isize) -> Option<usize> {
        self.current
            .checked_add_signed(n)
            .filter(|index| *index < self.entries.len())
    }
}

impl HistoryBackend for MemoryStack {
    fn current_location(&self) -> Result<Location, HistoryError> {
        let entry = self
            .entries
            .get(self.current)
            .ok_or(HistoryError::MissingEntry {
                index: self.current,
            })?;

        let parts = parse_path(&entry.path());
        Ok(Location {
            pathname: parts.pathname,
            search: parts.search,
            hash: parts.hash,
            state: self.store.read(&entry.key),
            key: entry.key.clone(),
            action: Action::Pop,
        })
    }

    fn current_index(&self) -> usize {
        self.current
    }

    fn len(&self) -> usize {
        self.entries.len()
    }

    fn keys(&self) -> Vec<String> {
        self.entries.iter().map(|entry| entry.key.clone()).collect()
    }

    fn can_go(&self, n: isize) -> bool {
        self.offset(n).is_some()
    }

    fn advance(&mut self, n: isize) {
        if let Some(index) = self.offset(n) {
            self.current = index;
        }
    }

    fn push_location(&mut self, location: &Location) -> Result<bool, HistoryError> {
        // Persist first so a failed save leaves the stack untouched.
        self.store.save(&location.key, location.state.as_ref())?;

        self.current += 1;
        if self.current < self.entries.len() {
            trace_log!(
                "Discarding {} forward entries",
                self.entries.len() - self.current
            );
            self.entries.truncate(self.current);
        }
        self.entries.push(location.clone());
        Ok(true)
    }

    fn replace_location(&mut self, location: &Location) -> Result<bool, HistoryError> {
        self.store.save(&location.key, location.state.as_ref())?;

        self.entries[self.current] = location.clone();
        Ok(true)
    }
}

impl fmt::Debug for MemoryStack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryStack")
            .field("entries", &self.entries)
            .field("current", &self.current)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::location::{create_location, PartialLocation};
    use crate::storage::{MemoryStateStore, MemoryStorageArea, SessionStateStore};
    use serde_json::json;

    fn stack(paths: &[&str], current: Option<usize>) -> MemoryStack {
        let entries = paths
            .iter()
            .map(|path| create_location(*path, None, None))
            .collect();
        MemoryStack::new(entries, current, Box::new(MemoryStateStore::new())).unwrap()
    }

    fn paths(stack: &MemoryStack) -> Vec<String> {
        stack.entries().iter().map(Location::path).collect()
    }

    #[test]
    fn test_current_defaults_to_last() {
        let stack = stack(&["/", "/a", "/b"], None);
        assert_eq!(stack.current_index(), 2);
        assert_eq!(stack.current_location().unwrap().pathname, "/b");
    }

    #[test]
    fn test_out_of_bounds_current_is_rejected() {
        let entries = vec![create_location("/", None, None)];
        let err = MemoryStack::new(entries, Some(1), Box::new(MemoryStateStore::new())).unwrap_err();
        assert!(matches!(
            err,
            HistoryError::CurrentOutOfBounds { current: 1, len: 1 }
        ));

        let err = MemoryStack::new(Vec::new(), None, Box::new(MemoryStateStore::new())).unwrap_err();
        assert!(matches!(
            err,
            HistoryError::CurrentOutOfBounds { current: 0, len: 0 }
        ));
    }

    #[test]
    fn test_can_go() {
        let stack = stack(&["/", "/a", "/b"], Some(1));
        assert!(stack.can_go(-1));
        assert!(stack.can_go(1));
        assert!(stack.can_go(0));
        assert!(!stack.can_go(-2));
        assert!(!stack.can_go(2));
    }

    #[test]
    fn test_advance_ignores_out_of_range() {
        let mut stack = stack(&["/", "/a"], Some(1));
        stack.advance(5);
        assert_eq!(stack.current_index(), 1);
        stack.advance(-1);
        assert_eq!(stack.current_index(), 0);
    }

    #[test]
    fn test_push_truncates_forward_entries() {
        let mut stack = stack(&["/", "/a", "/b"], Some(0));
        let next = create_location("/c", Some(Action::Push), None);

        assert!(stack.push_location(&next).unwrap());
        assert_eq!(paths(&stack), vec!["/", "/c"]);
        assert_eq!(stack.current_index(), 1);
    }

    #[test]
    fn test_replace_overwrites_current() {
        let mut stack = stack(&["/", "/a"], Some(0));
        let next = create_location("/z", Some(Action::Replace), None);

        assert!(stack.replace_location(&next).unwrap());
        assert_eq!(paths(&stack), vec!["/z", "/a"]);
        assert_eq!(stack.current_index(), 0);
        assert_eq!(stack.keys()[0], next.key);
    }

    #[test]
    fn test_current_location_hydrates_state_from_store() {
        let mut stack = stack(&["/"], None);
        let next = create_location(
            PartialLocation::new().pathname("/s").state(json!({ "n": 1 })),
            Some(Action::Push),
            None,
        );
        stack.push_location(&next).unwrap();

        let current = stack.current_location().unwrap();
        assert_eq!(current.state, Some(json!({ "n": 1 })));
        assert_eq!(current.key, next.key);
        assert_eq!(current.action, Action::Pop);
    }

    #[test]
    fn test_initial_state_is_seeded() {
        let entries = vec![
            create_location("/", None, None),
            create_location(
                PartialLocation::new().pathname("/seeded").state(json!("hello")),
                None,
                None,
            ),
        ];
        let stack = MemoryStack::new(entries, None, Box::new(MemoryStateStore::new())).unwrap();
        assert_eq!(stack.current_location().unwrap().state, Some(json!("hello")));
    }

    #[test]
    fn test_failed_save_leaves_stack_untouched() {
        let entries = vec![create_location(
            PartialLocation::new().pathname("/").state(json!("x")),
            None,
            None,
        )];
        let store = SessionStateStore::new(MemoryStorageArea::new().with_quota(24));
        let mut stack = MemoryStack::new(entries, None, Box::new(store)).unwrap();

        let next = create_location(
            PartialLocation::new()
                .pathname("/big")
                .state(json!("far too large for the remaining quota")),
            Some(Action::Push),
            None,
        );
        assert!(stack.push_location(&next).is_err());
        assert_eq!(stack.len(), 1);
        assert_eq!(stack.current_index(), 0);
    }
}
