//! Shared fixtures for the integration tests.

#![allow(dead_code)]

use navigation_history::*;
use std::cell::RefCell;
use std::rc::Rc;

/// Route test logs through `env_logger` once per test binary.
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Memory history over `paths`, positioned at `current` (or the last entry).
pub fn history_with(paths: &[&str], current: Option<usize>) -> History {
    init_logging();
    let mut options = HistoryOptions::new().entries(paths.iter().copied());
    if let Some(current) = current {
        options = options.current(current);
    }
    create_memory_history(options).expect("valid history options")
}

/// Memory history with default options.
pub fn fresh_history() -> History {
    init_logging();
    create_memory_history(HistoryOptions::default()).expect("default options are valid")
}

/// Collects every location a listener is notified with.
#[derive(Clone, Default)]
pub struct Recorder {
    seen: Rc<RefCell<Vec<Location>>>,
}

impl Recorder {
    /// Subscribe a new recorder to `history`.
    pub fn attach(history: &History) -> Self {
        let recorder = Self::default();
        let sink = Rc::clone(&recorder.seen);
        history.listen(move |location| sink.borrow_mut().push(location.clone()));
        recorder
    }

    pub fn locations(&self) -> Vec<Location> {
        self.seen.borrow().clone()
    }

    pub fn len(&self) -> usize {
        self.seen.borrow().len()
    }

    pub fn last(&self) -> Option<Location> {
        self.seen.borrow().last().cloned()
    }

    /// `(action, path)` pairs in notification order.
    pub fn summary(&self) -> Vec<(Action, String)> {
        self.seen
            .borrow()
            .iter()
            .map(|location| (location.action, location.path()))
            .collect()
    }
}

/// Hook callbacks parked by a deferred hook, completed by the test later.
#[derive(Clone, Default)]
pub struct Parked {
    callbacks: Rc<RefCell<Vec<(String, HookCallback)>>>,
}

impl Parked {
    /// Register a deferred hook on `history` that parks every callback.
    pub fn attach(history: &History) -> Self {
        let parked = Self::default();
        let sink = Rc::clone(&parked.callbacks);
        history.listen_before(BeforeHook::deferred(move |location, done| {
            sink.borrow_mut().push((location.path(), done));
        }));
        parked
    }

    pub fn len(&self) -> usize {
        self.callbacks.borrow().len()
    }

    pub fn paths(&self) -> Vec<String> {
        self.callbacks
            .borrow()
            .iter()
            .map(|(path, _)| path.clone())
            .collect()
    }

    /// Complete the callback parked for `path` with `outcome`.
    pub fn complete(&self, path: &str, outcome: HookOutcome) {
        let callback = {
            let mut callbacks = self.callbacks.borrow_mut();
            let index = callbacks
                .iter()
                .position(|(parked, _)| parked == path)
                .unwrap_or_else(|| panic!("no callback parked for '{}'", path));
            callbacks.remove(index).1
        };
        callback.complete(outcome);
    }
}

/// Check the stack invariants that must hold between operations.
pub fn assert_invariants(history: &History) {
    assert!(
        history.current_index() < history.len(),
        "current index {} out of bounds for {} entries",
        history.current_index(),
        history.len()
    );
    assert_eq!(
        history.all_keys(),
        history.entry_keys(),
        "all-keys index does not mirror the stack"
    );
}
