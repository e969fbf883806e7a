//! Ordered subscriber lists.
//!
//! Both the before-hooks and the after-commit listeners of a
//! [`History`](crate::History) live in a [`ListenerRegistry`]. Subscribers
//! fire in registration order, and each registration gets its own
//! [`ListenerId`], so registering the same closure twice yields two
//! independent subscriptions.

use crate::location::Location;
use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

/// Callback notified after a transition commits.
pub type Listener = dyn Fn(&Location);

/// Identifier of one registration in a [`ListenerRegistry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u64);

/// Subscribers kept in registration order.
pub struct ListenerRegistry<T: ?Sized> {
    next_id: u64,
    entries: Vec<(ListenerId, Rc<T>)>,
}

impl<T: ?Sized> ListenerRegistry<T> {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            next_id: 0,
            entries: Vec::new(),
        }
    }

    /// Append a subscriber and return its id.
    pub fn add(&mut self, item: Rc<T>) -> ListenerId {
        self.next_id += 1;
        let id = ListenerId(self.next_id);
        self.entries.push((id, item));
        id
    }

    /// Remove the subscriber registered under `id`.
    ///
    /// Returns `false` if it was already removed.
    pub fn remove(&mut self, id: ListenerId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(entry_id, _)| *entry_id != id);
        self.entries.len() != before
    }

    /// The current subscribers, in registration order.
    ///
    /// The copy is detached from the registry, so subscribers may register
    /// or unregister while the snapshot is being iterated.
    pub fn snapshot(&self) -> Vec<Rc<T>> {
        self.entries.iter().map(|(_, item)| Rc::clone(item)).collect()
    }

    /// Number of subscribers.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether there are no subscribers.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<T: ?Sized> Default for ListenerRegistry<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: ?Sized> fmt::Debug for ListenerRegistry<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListenerRegistry")
            .field("len", &self.entries.len())
            .finish()
    }
}

/// Handle returned by [`listen`](crate::History::listen) and
/// [`listen_before`](crate::History::listen_before).
///
/// Calling [`unlisten`](Self::unlisten) removes the subscription; further
/// calls do nothing. Dropping the handle keeps the subscription alive.
pub struct Unlisten {
    remove: Cell<Option<Box<dyn FnOnce()>>>,
}

impl Unlisten {
    pub(crate) fn new(remove: impl FnOnce() + 'static) -> Self {
        Self {
            remove: Cell::new(Some(Box::new(remove))),
        }
    }

    /// Remove the subscription.
    pub fn unlisten(&self) {
        if let Some(remove) = self.remove.take() {
            remove();
        }
    }
}

impl fmt::Debug for Unlisten {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Unlisten").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    #[test]
    fn test_snapshot_keeps_registration_order() {
        let mut registry: ListenerRegistry<str> = ListenerRegistry::new();
        registry.add(Rc::from("first"));
        registry.add(Rc::from("second"));
        registry.add(Rc::from("third"));

        let names: Vec<String> = registry.snapshot().iter().map(|s| s.to_string()).collect();
        assert_eq!(names, vec!["first", "second", "third"]);
    }

    #[test]
    fn test_remove_is_idempotent() {
        let mut registry: ListenerRegistry<str> = ListenerRegistry::new();
        let a = registry.add(Rc::from("a"));
        registry.add(Rc::from("b"));

        assert!(registry.remove(a));
        assert!(!registry.remove(a));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_same_item_registered_twice_is_two_subscriptions() {
        let mut registry: ListenerRegistry<str> = ListenerRegistry::new();
        let item: Rc<str> = Rc::from("shared");
        let first = registry.add(Rc::clone(&item));
        let second = registry.add(item);
        assert_ne!(first, second);

        registry.remove(first);
        assert_eq!(registry.len(), 1);
        registry.remove(second);
        assert!(registry.is_empty());
    }

    #[test]
    fn test_unlisten_runs_once() {
        let count = Rc::new(RefCell::new(0));
        let counter = Rc::clone(&count);
        let handle = Unlisten::new(move || *counter.borrow_mut() += 1);

        handle.unlisten();
        handle.unlisten();
        assert_eq!(*count.borrow(), 1);
    }
}
