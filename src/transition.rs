//! Transition coordination.
//!
//! Every navigation request goes through the same pipeline:
//!
//! 1. **Dedupe**: a request equivalent to the committed location, or to the
//!    transition already being confirmed, is dropped. The former also
//!    abandons any other transition in flight.
//! 2. **Confirm**: the before-hooks run in order
//!    ([`run_sequence`](crate::hooks::run_sequence)). A
//!    [`Defer`](crate::HookOutcome::Defer) outcome is handed to the user
//!    confirmation function.
//! 3. **Interruption check**: each request is tagged with a
//!    [`TransitionId`]. If a newer request started while this one was
//!    suspended in a hook, this one is abandoned.
//! 4. **Commit**: a PUSH to the address already current (same path, equal
//!    state) is relabelled REPLACE; the stack is mutated, the all-keys index
//!    updated and listeners notified unless the request was silent.
//! 5. **Rollback**: a rejected POP moves the stack pointer back to the
//!    committed entry.
//!
//! A rollback moves the pointer like `go(n)`. When it lands on the committed
//! entry nothing else happens; otherwise the entry it lands on goes through
//! the pipeline as a POP.

use crate::action::Action;
use crate::error::HistoryError;
use crate::history::{restore, Session};
use crate::hooks::{run_sequence, Callback, HookOutcome};
use crate::location::Location;
use crate::{debug_log, error_log, info_log, trace_log, warn_log};
use std::cell::RefCell;
use std::rc::Rc;

/// Tag of one transition request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TransitionId(u64);

/// Whether a transition is awaiting confirmation.
#[derive(Debug, Clone, PartialEq)]
pub enum TransitionState {
    /// Nothing in flight.
    Idle,
    /// Before-hooks are running for `location`.
    Confirming {
        /// Tag of the request being confirmed.
        id: TransitionId,
        /// Where the request is heading.
        location: Location,
    },
}

/// Bookkeeping of the committed location, the in-flight request and the
/// all-keys index.
#[derive(Debug)]
pub struct Coordinator {
    current: Location,
    state: TransitionState,
    last_id: u64,
    all_keys: Vec<String>,
}

impl Coordinator {
    /// Start from the committed location `current` and the stack's keys.
    pub fn new(current: Location, all_keys: Vec<String>) -> Self {
        Self {
            current,
            state: TransitionState::Idle,
            last_id: 0,
            all_keys,
        }
    }

    /// The last committed location.
    pub fn current(&self) -> &Location {
        &self.current
    }

    /// Current state of the machine.
    pub fn state(&self) -> &TransitionState {
        &self.state
    }

    /// The location awaiting confirmation, if any.
    pub fn pending(&self) -> Option<&Location> {
        match &self.state {
            TransitionState::Idle => None,
            TransitionState::Confirming { location, .. } => Some(location),
        }
    }

    /// Entry keys mirroring the stack order.
    pub fn all_keys(&self) -> &[String] {
        &self.all_keys
    }

    /// Register `next` as the transition being confirmed.
    ///
    /// Returns `None` when `next` is equivalent to the committed location or
    /// to the transition already in flight. Otherwise any earlier in-flight
    /// transition is superseded.
    ///
    /// A request for the committed location still supersedes a different
    /// transition in flight: that transition can no longer be committed.
    pub fn begin(&mut self, next: &Location) -> Option<TransitionId> {
        if self.current.is_equivalent(next) {
            if let TransitionState::Confirming { id: stale, .. } = &self.state {
                debug_log!(
                    "Transition {:?} superseded by a request for the current location",
                    stale
                );
                self.state = TransitionState::Idle;
            }
            return None;
        }
        if self.pending().is_some_and(|pending| pending.is_equivalent(next)) {
            return None;
        }

        self.last_id += 1;
        let id = TransitionId(self.last_id);
        if let TransitionState::Confirming { id: stale, .. } = &self.state {
            debug_log!("Transition {:?} superseded by {:?}", stale, id);
        }
        self.state = TransitionState::Confirming {
            id,
            location: next.clone(),
        };
        Some(id)
    }

    /// Finish confirmation of `id`.
    ///
    /// Returns `false` if `id` is no longer the transition in flight, in
    /// which case its result must be discarded.
    pub fn settle(&mut self, id: TransitionId) -> bool {
        match &self.state {
            TransitionState::Confirming { id: pending, .. } if *pending == id => {
                self.state = TransitionState::Idle;
                true
            }
            _ => false,
        }
    }

    /// Relabel a PUSH to the current address as REPLACE.
    pub fn canonicalize(&self, next: &mut Location) {
        if next.action == Action::Push && next.same_address(&self.current) {
            trace_log!("Push to current address '{}' treated as replace", next.path());
            next.action = Action::Replace;
        }
    }

    /// Record `location` as committed at stack offset `index`.
    pub fn record_commit(&mut self, location: Location, index: usize) {
        match location.action {
            Action::Push => {
                self.all_keys.truncate(index);
                self.all_keys.push(location.key.clone());
            }
            Action::Replace => {
                if let Some(key) = self.all_keys.get_mut(index) {
                    key.clone_from(&location.key);
                } else {
                    self.all_keys.push(location.key.clone());
                }
            }
            Action::Pop => {}
        }
        self.current = location;
    }

    /// Offset that returns the stack pointer from `rejected` to the
    /// committed entry, for a rejected POP.
    pub fn rollback_delta(&self, rejected: &Location) -> Option<isize> {
        if rejected.action != Action::Pop {
            return None;
        }
        let position = |key: &str| {
            self.all_keys
                .iter()
                .position(|k| k == key)
                .and_then(|index| isize::try_from(index).ok())
        };
        Some(position(&self.current.key)? - position(&rejected.key)?)
    }
}

/// Request a transition to `next`.
///
/// Completes synchronously when every hook (and the confirmation, if any)
/// answers synchronously; otherwise it resumes when the last callback is
/// completed.
pub(crate) fn transition_to(session: &Rc<RefCell<Session>>, next: Location, silent: bool) {
    let (id, hooks) = {
        let mut session = session.borrow_mut();
        let Some(id) = session.coordinator.begin(&next) else {
            trace_log!("Ignoring transition to '{}': nothing to do", next.path());
            return;
        };
        (id, session.before_hooks.snapshot())
    };

    debug_log!(
        "Transition {:?} {} '{}' confirming with {} hook(s)",
        id,
        next.action,
        next.path(),
        hooks.len()
    );

    let weak = Rc::downgrade(session);
    let target = Rc::new(next.clone());
    run_sequence(
        hooks.into(),
        target,
        Box::new(move |outcome: HookOutcome| {
            if let Some(session) = weak.upgrade() {
                resolve(&session, id, next, outcome, silent);
            }
        }),
    );
}

fn resolve(
    session: &Rc<RefCell<Session>>,
    id: TransitionId,
    next: Location,
    outcome: HookOutcome,
    silent: bool,
) {
    let confirm = {
        let mut session = session.borrow_mut();
        if !session.coordinator.settle(id) {
            debug_log!(
                "Transition {:?} to '{}' was interrupted during confirmation",
                id,
                next.path()
            );
            return;
        }
        Rc::clone(&session.confirm)
    };

    match outcome {
        HookOutcome::Proceed => finish(session, next, silent, true),
        HookOutcome::Veto(reason) => {
            debug_log!(
                "Transition to '{}' vetoed: {}",
                next.path(),
                reason.as_deref().unwrap_or("no reason given")
            );
            finish(session, next, silent, false);
        }
        HookOutcome::Defer(message) => {
            let weak = Rc::downgrade(session);
            confirm(
                &message,
                Callback::new("confirmation callback", move |ok: bool| {
                    if let Some(session) = weak.upgrade() {
                        if !ok {
                            debug_log!("User declined transition to '{}'", next.path());
                        }
                        finish(&session, next, silent, ok);
                    }
                }),
            );
        }
    }
}

fn finish(session: &Rc<RefCell<Session>>, next: Location, silent: bool, ok: bool) {
    if !ok {
        let delta = session.borrow().coordinator.rollback_delta(&next);
        if let Some(delta) = delta {
            debug_log!("Restoring stack pointer after rejected POP (go({}))", delta);
            if let Err(err) = restore(session, delta) {
                error_log!("Failed to restore history after rejected POP: {}", err);
            }
        }
        return;
    }

    let (committed, listeners) = {
        let mut session = session.borrow_mut();
        let committed = match commit(&mut session, next) {
            Ok(Some(location)) => location,
            Ok(None) => return,
            Err(err) => {
                error_log!("History stack rejected transition: {}", err);
                return;
            }
        };
        let listeners = if silent {
            Vec::new()
        } else {
            session.listeners.snapshot()
        };
        (committed, listeners)
    };

    for listener in listeners {
        listener(&committed);
    }
}

fn commit(session: &mut Session, mut next: Location) -> Result<Option<Location>, HistoryError> {
    session.coordinator.canonicalize(&mut next);

    let applied = match next.action {
        Action::Pop => true,
        Action::Push => session.backend.push_location(&next)?,
        Action::Replace => session.backend.replace_location(&next)?,
    };
    if !applied {
        warn_log!(
            "History backend refused {} of '{}'",
            next.action,
            next.path()
        );
        return Ok(None);
    }

    info_log!("Committed {} '{}' (key {})", next.action, next.path(), next.key);
    let index = session.backend.current_index();
    session.coordinator.record_commit(next.clone(), index);
    debug_assert_eq!(session.coordinator.all_keys().len(), session.backend.len());
    Ok(Some(next))
}
