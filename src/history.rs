//! The history session: one owned aggregate holding the stack, the
//! coordinator and the subscriber lists, shared through a cloneable
//! [`History`] handle.
//!
//! # Example
//!
//! ```
//! use navigation_history::{create_memory_history, Action, BeforeHook, HistoryOptions, HookOutcome};
//! use std::cell::RefCell;
//! use std::rc::{Rc, Weak};
//!
//! let history = create_memory_history(HistoryOptions::default()).unwrap();
//!
//! let seen = Rc::new(RefCell::new(Vec::new()));
//! let sink = Rc::clone(&seen);
//! history.listen(move |location| sink.borrow_mut().push((location.action, location.path())));
//!
//! history.listen_before(BeforeHook::sync(|location| {
//!     if location.pathname == "/forbidden" {
//!         HookOutcome::veto()
//!     } else {
//!         HookOutcome::Proceed
//!     }
//! }));
//!
//! history.push("/home");
//! history.push("/forbidden");
//! history.go_back().unwrap();
//!
//! assert_eq!(
//!     *seen.borrow(),
//!     vec![(Action::Push, "/home".to_string()), (Action::Pop, "/".to_string())]
//! );
//! ```

use crate::action::Action;
use crate::error::HistoryError;
use crate::hooks::{BeforeHook, Callback};
use crate::listeners::{Listener, ListenerRegistry, Unlisten};
use crate::location::{create_key, Location, LocationInput, DEFAULT_KEY_LENGTH};
use crate::path::create_path;
use crate::stack::{HistoryBackend, MemoryStack};
use crate::storage::{MemoryStateStore, StateStore};
use crate::transition::{self, Coordinator};
use crate::{debug_log, trace_log, warn_log};
use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

/// Asks the user whether a transition may proceed.
///
/// Receives the message produced by a before-hook and must complete the
/// callback exactly once with `true` (proceed) or `false` (cancel), either
/// immediately or later.
pub type UserConfirmation = Rc<dyn Fn(&str, ConfirmCallback)>;

/// Completion handle given to the [`UserConfirmation`] function.
pub type ConfirmCallback = Callback<bool>;

fn always_confirm() -> UserConfirmation {
    Rc::new(|message: &str, callback: ConfirmCallback| {
        debug_log!("Confirming '{}' without asking", message);
        callback.complete(true);
    })
}

/// Options for [`create_memory_history`].
pub struct HistoryOptions {
    entries: Option<Vec<LocationInput>>,
    current: Option<usize>,
    user_confirmation: Option<UserConfirmation>,
    key_length: usize,
    state_store: Option<Box<dyn StateStore>>,
}

impl HistoryOptions {
    /// Default options: a single `/` entry, always-confirm, 6-character keys,
    /// in-memory state store.
    pub fn new() -> Self {
        Self {
            entries: None,
            current: None,
            user_confirmation: None,
            key_length: DEFAULT_KEY_LENGTH,
            state_store: None,
        }
    }

    /// Replace the initial entries.
    pub fn entries<I, T>(mut self, entries: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<LocationInput>,
    {
        self.entries = Some(entries.into_iter().map(Into::into).collect());
        self
    }

    /// Append one initial entry.
    pub fn entry(mut self, entry: impl Into<LocationInput>) -> Self {
        self.entries.get_or_insert_with(Vec::new).push(entry.into());
        self
    }

    /// Initial index into the entries. Defaults to the last entry.
    pub fn current(mut self, index: usize) -> Self {
        self.current = Some(index);
        self
    }

    /// Function asked to confirm transitions a hook deferred.
    pub fn user_confirmation<F>(mut self, f: F) -> Self
    where
        F: Fn(&str, ConfirmCallback) + 'static,
    {
        self.user_confirmation = Some(Rc::new(f));
        self
    }

    /// Length of generated entry keys.
    pub fn key_length(mut self, length: usize) -> Self {
        self.key_length = length;
        self
    }

    /// Where per-entry state is persisted.
    pub fn state_store(mut self, store: impl StateStore + 'static) -> Self {
        self.state_store = Some(Box::new(store));
        self
    }
}

impl Default for HistoryOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for HistoryOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HistoryOptions")
            .field("entries", &self.entries)
            .field("current", &self.current)
            .field("key_length", &self.key_length)
            .field("custom_confirmation", &self.user_confirmation.is_some())
            .field("custom_state_store", &self.state_store.is_some())
            .finish()
    }
}

pub(crate) struct Session {
    pub(crate) backend: Box<dyn HistoryBackend>,
    pub(crate) coordinator: Coordinator,
    pub(crate) before_hooks: ListenerRegistry<BeforeHook>,
    pub(crate) listeners: ListenerRegistry<Listener>,
    pub(crate) confirm: UserConfirmation,
    pub(crate) key_length: usize,
}

/// Handle to a history session.
///
/// Clones share the same session. Not thread-safe: a session lives on one
/// thread and is driven by callbacks on that thread.
#[derive(Clone)]
pub struct History {
    session: Rc<RefCell<Session>>,
}

/// Create a history backed by an in-memory stack.
pub fn create_memory_history(options: HistoryOptions) -> Result<History, HistoryError> {
    History::memory(options)
}

impl History {
    /// Create a history backed by an in-memory stack.
    ///
    /// Fails if `current` does not point into the entries.
    pub fn memory(options: HistoryOptions) -> Result<Self, HistoryError> {
        let key_length = options.key_length;
        let entries = options
            .entries
            .unwrap_or_else(|| vec![LocationInput::default()])
            .into_iter()
            .map(|input| {
                let key = input
                    .key()
                    .map_or_else(|| create_key(key_length), str::to_string);
                Location::from_input(input, Action::Pop, key)
            })
            .collect();
        let store: Box<dyn StateStore> = match options.state_store {
            Some(store) => store,
            None => Box::new(MemoryStateStore::new()),
        };

        let stack = MemoryStack::new(entries, options.current, store)?;
        Self::build(Box::new(stack), options.user_confirmation, key_length)
    }

    /// Create a history on top of a custom backend.
    ///
    /// The backend owns its own entries and state store, so only the
    /// confirmation function and the key length are taken from `options`.
    pub fn with_backend(
        backend: Box<dyn HistoryBackend>,
        options: HistoryOptions,
    ) -> Result<Self, HistoryError> {
        Self::build(backend, options.user_confirmation, options.key_length)
    }

    fn build(
        backend: Box<dyn HistoryBackend>,
        confirm: Option<UserConfirmation>,
        key_length: usize,
    ) -> Result<Self, HistoryError> {
        let initial = backend.current_location()?;
        let coordinator = Coordinator::new(initial, backend.keys());
        debug_log!(
            "History created with {} entries, current index {}",
            backend.len(),
            backend.current_index()
        );

        Ok(Self {
            session: Rc::new(RefCell::new(Session {
                backend,
                coordinator,
                before_hooks: ListenerRegistry::new(),
                listeners: ListenerRegistry::new(),
                confirm: confirm.unwrap_or_else(always_confirm),
                key_length,
            })),
        })
    }

    /// The location at the stack's current index, with its state read from
    /// the state store. Its action is always [`Action::Pop`].
    pub fn get_current_location(&self) -> Result<Location, HistoryError> {
        self.session.borrow().backend.current_location()
    }

    /// Register a hook run before every transition commits.
    pub fn listen_before(&self, hook: BeforeHook) -> Unlisten {
        let id = self.session.borrow_mut().before_hooks.add(Rc::new(hook));
        let weak = Rc::downgrade(&self.session);
        Unlisten::new(move || {
            if let Some(session) = weak.upgrade() {
                session.borrow_mut().before_hooks.remove(id);
            }
        })
    }

    /// Register a listener notified after every non-silent commit.
    ///
    /// The session owns its listeners, so a listener that captures a
    /// [`History`] clone keeps the session alive forever. Capture a
    /// [`WeakHistory`] from [`downgrade`](Self::downgrade) instead.
    pub fn listen<F>(&self, listener: F) -> Unlisten
    where
        F: Fn(&Location) + 'static,
    {
        let id = self.session.borrow_mut().listeners.add(Rc::new(listener));
        let weak = Rc::downgrade(&self.session);
        Unlisten::new(move || {
            if let Some(session) = weak.upgrade() {
                session.borrow_mut().listeners.remove(id);
            }
        })
    }

    /// A handle that does not keep the session alive, for hooks and
    /// listeners that navigate.
    pub fn downgrade(&self) -> WeakHistory {
        WeakHistory {
            session: Rc::downgrade(&self.session),
        }
    }

    /// Request a transition to `location`, labelled with its own action.
    ///
    /// A silent transition commits without notifying listeners.
    pub fn transition_to(&self, location: Location, silent: bool) {
        transition::transition_to(&self.session, location, silent);
    }

    /// Navigate to a new entry.
    pub fn push(&self, input: impl Into<LocationInput>) {
        self.push_location(input.into(), false);
    }

    /// Navigate to a new entry without notifying listeners.
    pub fn push_silent(&self, input: impl Into<LocationInput>) {
        self.push_location(input.into(), true);
    }

    /// Overwrite the current entry.
    pub fn replace(&self, input: impl Into<LocationInput>) {
        self.replace_location(input.into(), false);
    }

    /// Overwrite the current entry without notifying listeners.
    pub fn replace_silent(&self, input: impl Into<LocationInput>) {
        self.replace_location(input.into(), true);
    }

    fn push_location(&self, input: LocationInput, silent: bool) {
        let location = Location::from_input(input, Action::Push, self.create_key());
        self.transition_to(location, silent);
    }

    fn replace_location(&self, input: LocationInput, silent: bool) {
        let location = Location::from_input(input, Action::Replace, self.create_key());
        self.transition_to(location, silent);
    }

    /// Move `n` entries through the stack as a POP transition.
    ///
    /// Out-of-range moves are logged and ignored.
    pub fn go(&self, n: isize) -> Result<(), HistoryError> {
        go(&self.session, n)
    }

    /// Equivalent to `go(-1)`.
    pub fn go_back(&self) -> Result<(), HistoryError> {
        self.go(-1)
    }

    /// Equivalent to `go(1)`.
    pub fn go_forward(&self) -> Result<(), HistoryError> {
        self.go(1)
    }

    /// Whether `go(n)` would land on an existing entry.
    pub fn can_go(&self, n: isize) -> bool {
        self.session.borrow().backend.can_go(n)
    }

    /// Generate a fresh entry key.
    pub fn create_key(&self) -> String {
        create_key(self.session.borrow().key_length)
    }

    /// Join a location's address into a path. Path inputs are returned
    /// unchanged.
    pub fn create_path(&self, input: impl Into<LocationInput>) -> String {
        match input.into() {
            LocationInput::Path(path) => path,
            LocationInput::Fields(fields) => create_path(
                fields
                    .pathname
                    .as_deref()
                    .filter(|pathname| !pathname.is_empty())
                    .unwrap_or("/"),
                fields.search.as_deref().unwrap_or_default(),
                fields.hash.as_deref().unwrap_or_default(),
            ),
        }
    }

    /// The href for a location. In-memory histories have no base URL, so
    /// this equals [`create_path`](Self::create_path).
    pub fn create_href(&self, input: impl Into<LocationInput>) -> String {
        self.create_path(input)
    }

    /// Build a location using this session's key length.
    ///
    /// `action` defaults to [`Action::Pop`]; `key` to a fresh one, even when
    /// the input carries a key.
    pub fn create_location(
        &self,
        input: impl Into<LocationInput>,
        action: Option<Action>,
        key: Option<String>,
    ) -> Location {
        let key = key.unwrap_or_else(|| self.create_key());
        Location::from_input(input, action.unwrap_or_default(), key)
    }

    /// The last committed location.
    pub fn committed_location(&self) -> Location {
        self.session.borrow().coordinator.current().clone()
    }

    /// The location whose confirmation is in progress, if any.
    pub fn pending_location(&self) -> Option<Location> {
        self.session.borrow().coordinator.pending().cloned()
    }

    /// Offset of the current entry in the stack.
    pub fn current_index(&self) -> usize {
        self.session.borrow().backend.current_index()
    }

    /// Number of entries in the stack.
    pub fn len(&self) -> usize {
        self.session.borrow().backend.len()
    }

    /// Whether the stack is empty. Never true for a constructed history.
    pub fn is_empty(&self) -> bool {
        self.session.borrow().backend.is_empty()
    }

    /// Keys of the stack's entries, in order.
    pub fn entry_keys(&self) -> Vec<String> {
        self.session.borrow().backend.keys()
    }

    /// The coordinator's all-keys index.
    pub fn all_keys(&self) -> Vec<String> {
        self.session.borrow().coordinator.all_keys().to_vec()
    }
}

/// Non-owning handle to a history session, see [`History::downgrade`].
#[derive(Clone)]
pub struct WeakHistory {
    session: Weak<RefCell<Session>>,
}

impl WeakHistory {
    /// The session, if any [`History`] handle still holds it.
    pub fn upgrade(&self) -> Option<History> {
        self.session.upgrade().map(|session| History { session })
    }
}

impl fmt::Debug for WeakHistory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WeakHistory")
            .field("alive", &(self.session.strong_count() > 0))
            .finish()
    }
}

impl fmt::Debug for History {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let session = self.session.borrow();
        f.debug_struct("History")
            .field("current_index", &session.backend.current_index())
            .field("len", &session.backend.len())
            .field("state", session.coordinator.state())
            .field("before_hooks", &session.before_hooks.len())
            .field("listeners", &session.listeners.len())
            .finish()
    }
}

pub(crate) fn go(session: &Rc<RefCell<Session>>, n: isize) -> Result<(), HistoryError> {
    if let Some(target) = move_pointer(session, n)? {
        transition::transition_to(session, target, false);
    }
    Ok(())
}

/// Move the stack pointer back after a rejected POP.
///
/// Unlike [`go`], landing on the committed location is not a new request
/// and leaves any transition in flight alone.
pub(crate) fn restore(session: &Rc<RefCell<Session>>, n: isize) -> Result<(), HistoryError> {
    let Some(target) = move_pointer(session, n)? else {
        return Ok(());
    };
    if session.borrow().coordinator.current().is_equivalent(&target) {
        trace_log!("Stack pointer restored to '{}'", target.path());
        return Ok(());
    }
    transition::transition_to(session, target, false);
    Ok(())
}

fn move_pointer(
    session: &Rc<RefCell<Session>>,
    n: isize,
) -> Result<Option<Location>, HistoryError> {
    if n == 0 {
        return Ok(None);
    }

    let mut session = session.borrow_mut();
    if !session.backend.can_go(n) {
        warn_log!(
            "Cannot go({}) there is not enough history when current is {} and entries length is {}",
            n,
            session.backend.current_index(),
            session.backend.len()
        );
        return Ok(None);
    }
    session.backend.advance(n);
    Ok(Some(session.backend.current_location()?.with_action(Action::Pop)))
}
