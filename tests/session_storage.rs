//! Histories persisting state through a session storage area.

mod common;

use common::*;
use navigation_history::storage::{MemoryStorageArea, SessionStateStore, StateStore, KEY_PREFIX};
use navigation_history::*;
use serde_json::{json, Value};
use std::cell::RefCell;
use std::rc::Rc;

/// A state store shared between the test and the history, so the test can
/// inspect what was written.
#[derive(Clone)]
struct SharedStore(Rc<RefCell<SessionStateStore<MemoryStorageArea>>>);

impl SharedStore {
    fn new(area: MemoryStorageArea) -> Self {
        Self(Rc::new(RefCell::new(SessionStateStore::new(area))))
    }

    fn raw(&self, key: &str) -> Option<String> {
        let store = self.0.borrow();
        store
            .area()
            .and_then(|area| area.raw(&format!("{KEY_PREFIX}{key}")))
            .map(str::to_string)
    }
}

impl StateStore for SharedStore {
    fn save(
        &mut self,
        key: &str,
        state: Option<&Value>,
    ) -> Result<(), navigation_history::storage::StorageError> {
        self.0.borrow_mut().save(key, state)
    }

    fn read(&self, key: &str) -> Option<Value> {
        self.0.borrow().read(key)
    }
}

fn history_over(store: &SharedStore) -> History {
    init_logging();
    create_memory_history(HistoryOptions::new().state_store(store.clone())).unwrap()
}

#[test]
fn test_state_round_trips_through_storage() {
    let store = SharedStore::new(MemoryStorageArea::new());
    let history = history_over(&store);

    history.push(
        PartialLocation::new()
            .pathname("/cart")
            .state(json!({ "items": [1, 2, 3] })),
    );
    let key = history.get_current_location().unwrap().key;
    assert_eq!(store.raw(&key).as_deref(), Some("{\"items\":[1,2,3]}"));

    history.push("/checkout");
    history.go_back().unwrap();
    assert_eq!(
        history.get_current_location().unwrap().state,
        Some(json!({ "items": [1, 2, 3] }))
    );
}

#[test]
fn test_replace_without_state_stores_nothing() {
    let store = SharedStore::new(MemoryStorageArea::new());
    let history = history_over(&store);
    history.push(PartialLocation::new().pathname("/a").state(json!(1)));
    let key = history.get_current_location().unwrap().key;

    history.replace(PartialLocation::new().pathname("/a").key(key.clone()));

    // Replace always mints a fresh key; the old item is left as is.
    let current = history.get_current_location().unwrap();
    assert_ne!(current.key, key);
    assert_eq!(current.state, None);
    assert!(store.raw(&current.key).is_none());
}

#[test]
fn test_blocked_storage_still_navigates() {
    let store = SharedStore::new(MemoryStorageArea::new().blocked());
    let history = history_over(&store);
    let recorder = Recorder::attach(&history);

    history.push(PartialLocation::new().pathname("/a").state(json!({ "lost": true })));
    history.push("/b");
    history.go_back().unwrap();

    assert_eq!(
        recorder.summary(),
        vec![
            (Action::Push, "/a".to_string()),
            (Action::Push, "/b".to_string()),
            (Action::Pop, "/a".to_string()),
        ]
    );
    assert_eq!(recorder.locations()[0].state, Some(json!({ "lost": true })));
    assert_eq!(recorder.last().unwrap().state, None);
    assert_invariants(&history);
}

#[test]
fn test_quota_exceeded_leaves_push_uncommitted() {
    let mut area = MemoryStorageArea::new().with_quota(64);
    area.insert_raw("unrelated", "x");
    let store = SharedStore::new(area);
    let history = history_over(&store);
    let recorder = Recorder::attach(&history);

    history.push(
        PartialLocation::new()
            .pathname("/big")
            .state(json!({ "payload": "x".repeat(128) })),
    );

    assert_eq!(recorder.len(), 0);
    assert_eq!(history.len(), 1);
    assert_eq!(history.get_current_location().unwrap().pathname, "/");
    assert!(history.pending_location().is_none());
    assert_invariants(&history);

    history.push("/small");
    assert_eq!(recorder.summary(), vec![(Action::Push, "/small".to_string())]);
}

#[test]
fn test_unavailable_store_reads_nothing() {
    init_logging();
    let history = create_memory_history(
        HistoryOptions::new()
            .entry(PartialLocation::new().pathname("/").state(json!("seed")))
            .state_store(SessionStateStore::<MemoryStorageArea>::unavailable()),
    )
    .unwrap();

    assert_eq!(history.get_current_location().unwrap().state, None);
}
