//! Before-transition hooks and the sequential chain that runs them.
//!
//! A [`BeforeHook`] inspects the location a transition is heading to and
//! answers with a [`HookOutcome`]. Hooks come in two shapes, chosen when the
//! hook is constructed:
//!
//! - [`BeforeHook::sync`] returns its outcome directly.
//! - [`BeforeHook::deferred`] receives a [`Callback`] and may complete it
//!   later, for instance after an asynchronous check.
//!
//! [`run_sequence`] invokes hooks strictly in order, waiting for each one to
//! complete before starting the next, and stops at the first outcome that
//! is not [`HookOutcome::Proceed`].
//!
//! # Example
//!
//! ```
//! use navigation_history::{BeforeHook, HookOutcome};
//!
//! let block_admin = BeforeHook::sync(|location| {
//!     if location.pathname.starts_with("/admin") {
//!         HookOutcome::veto_with("admin area is closed")
//!     } else {
//!         HookOutcome::Proceed
//!     }
//! });
//!
//! let ask_first = BeforeHook::deferred(|_location, done| {
//!     done.complete(HookOutcome::defer("Discard unsaved changes?"));
//! });
//! # let _ = (block_admin, ask_first);
//! ```

use crate::location::Location;
use crate::{trace_log, warn_log};
use std::fmt;
use std::rc::Rc;

/// Answer of a before-hook.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HookOutcome {
    /// Let the transition continue to the next hook.
    Proceed,
    /// Cancel the transition without asking the user.
    Veto(Option<String>),
    /// Ask the user to confirm the transition, showing this message.
    Defer(String),
}

impl HookOutcome {
    /// Cancel without a reason.
    pub fn veto() -> Self {
        Self::Veto(None)
    }

    /// Cancel with a human-readable reason (used for diagnostics only).
    pub fn veto_with(reason: impl Into<String>) -> Self {
        Self::Veto(Some(reason.into()))
    }

    /// Hand the decision to the user confirmation function.
    pub fn defer(message: impl Into<String>) -> Self {
        Self::Defer(message.into())
    }

    /// Whether this outcome lets the chain continue.
    pub fn is_proceed(&self) -> bool {
        matches!(self, Self::Proceed)
    }
}

/// A one-shot completion handle.
///
/// Invoking it consumes it, so it can be completed at most once. Dropping
/// it without invoking leaves whatever was waiting on it stalled; that is
/// reported as a warning.
pub struct Callback<T> {
    f: Option<Box<dyn FnOnce(T)>>,
    label: &'static str,
}

impl<T> Callback<T> {
    /// Wrap `f`. `label` names the callback in diagnostics.
    pub fn new(label: &'static str, f: impl FnOnce(T) + 'static) -> Self {
        Self {
            f: Some(Box::new(f)),
            label,
        }
    }

    /// Complete with `value`.
    pub fn complete(mut self, value: T) {
        if let Some(f) = self.f.take() {
            f(value);
        }
    }
}

impl Callback<HookOutcome> {
    /// Complete with [`HookOutcome::Proceed`].
    pub fn proceed(self) {
        self.complete(HookOutcome::Proceed);
    }

    /// Complete with a veto.
    pub fn veto(self) {
        self.complete(HookOutcome::veto());
    }
}

impl<T> Drop for Callback<T> {
    fn drop(&mut self) {
        if self.f.is_some() {
            warn_log!(
                "{} dropped without being completed; the pending transition will never resolve",
                self.label
            );
        }
    }
}

impl<T> fmt::Debug for Callback<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Callback")
            .field("label", &self.label)
            .field("completed", &self.f.is_none())
            .finish()
    }
}

/// Completion handle given to deferred hooks.
pub type HookCallback = Callback<HookOutcome>;

type SyncHookFn = dyn Fn(&Location) -> HookOutcome;
type DeferredHookFn = dyn Fn(&Location, HookCallback);

/// A hook run before a transition commits.
pub enum BeforeHook {
    /// Returns its outcome immediately.
    Sync(Box<SyncHookFn>),
    /// Completes the supplied callback, now or later. Must complete it
    /// exactly once; a hook that never does stalls its transition.
    Deferred(Box<DeferredHookFn>),
}

impl BeforeHook {
    /// Create a synchronous hook.
    pub fn sync<F>(f: F) -> Self
    where
        F: Fn(&Location) -> HookOutcome + 'static,
    {
        Self::Sync(Box::new(f))
    }

    /// Create a hook that signals completion through a callback.
    pub fn deferred<F>(f: F) -> Self
    where
        F: Fn(&Location, HookCallback) + 'static,
    {
        Self::Deferred(Box::new(f))
    }
}

impl fmt::Debug for BeforeHook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sync(_) => f.write_str("BeforeHook::Sync"),
            Self::Deferred(_) => f.write_str("BeforeHook::Deferred"),
        }
    }
}

/// Run `hooks` in order against `location`, then call `on_done`.
///
/// `on_done` receives the first outcome that is not
/// [`HookOutcome::Proceed`], or `Proceed` when every hook let the
/// transition through. Exactly one hook is in flight at any time; a
/// deferred hook suspends the chain until its callback is completed.
pub fn run_sequence(
    hooks: Rc<[Rc<BeforeHook>]>,
    location: Rc<Location>,
    on_done: Box<dyn FnOnce(HookOutcome)>,
) {
    step(hooks, 0, location, on_done);
}

fn step(
    hooks: Rc<[Rc<BeforeHook>]>,
    mut index: usize,
    location: Rc<Location>,
    on_done: Box<dyn FnOnce(HookOutcome)>,
) {
    loop {
        let Some(hook) = hooks.get(index).cloned() else {
            on_done(HookOutcome::Proceed);
            return;
        };

        match &*hook {
            BeforeHook::Sync(f) => {
                let outcome = f(&location);
                trace_log!("Before-hook {} returned {:?}", index, outcome);
                if !outcome.is_proceed() {
                    on_done(outcome);
                    return;
                }
                index += 1;
            }
            BeforeHook::Deferred(f) => {
                let rest = Rc::clone(&hooks);
                let target = Rc::clone(&location);
                let callback = Callback::new("before-hook callback", move |outcome: HookOutcome| {
                    trace_log!("Before-hook {} completed with {:?}", index, outcome);
                    if outcome.is_proceed() {
                        step(rest, index + 1, target, on_done);
                    } else {
                        on_done(outcome);
                    }
                });
                f(&location, callback);
                return;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::location::create_location;
    use std::cell::RefCell;

    fn chain(hooks: Vec<BeforeHook>) -> Rc<[Rc<BeforeHook>]> {
        hooks.into_iter().map(Rc::new).collect()
    }

    fn run(hooks: Rc<[Rc<BeforeHook>]>) -> Rc<RefCell<Option<HookOutcome>>> {
        let result = Rc::new(RefCell::new(None));
        let sink = Rc::clone(&result);
        run_sequence(
            hooks,
            Rc::new(create_location("/next", None, None)),
            Box::new(move |outcome: HookOutcome| *sink.borrow_mut() = Some(outcome)),
        );
        result
    }

    #[test]
    fn test_empty_chain_proceeds() {
        let result = run(chain(vec![]));
        assert_eq!(*result.borrow(), Some(HookOutcome::Proceed));
    }

    #[test]
    fn test_first_non_proceed_short_circuits() {
        let calls = Rc::new(RefCell::new(Vec::new()));
        let (a, b, c) = (Rc::clone(&calls), Rc::clone(&calls), Rc::clone(&calls));

        let result = run(chain(vec![
            BeforeHook::sync(move |_| {
                a.borrow_mut().push("a");
                HookOutcome::Proceed
            }),
            BeforeHook::sync(move |_| {
                b.borrow_mut().push("b");
                HookOutcome::defer("sure?")
            }),
            BeforeHook::sync(move |_| {
                c.borrow_mut().push("c");
                HookOutcome::veto()
            }),
        ]));

        assert_eq!(*result.borrow(), Some(HookOutcome::defer("sure?")));
        assert_eq!(*calls.borrow(), vec!["a", "b"]);
    }

    #[test]
    fn test_deferred_hook_suspends_chain() {
        let parked: Rc<RefCell<Option<HookCallback>>> = Rc::new(RefCell::new(None));
        let calls = Rc::new(RefCell::new(Vec::new()));
        let park = Rc::clone(&parked);
        let (first, second) = (Rc::clone(&calls), Rc::clone(&calls));

        let result = run(chain(vec![
            BeforeHook::deferred(move |location, done| {
                first.borrow_mut().push(format!("deferred:{}", location.pathname));
                *park.borrow_mut() = Some(done);
            }),
            BeforeHook::sync(move |_| {
                second.borrow_mut().push("sync".to_string());
                HookOutcome::Proceed
            }),
        ]));

        assert_eq!(*result.borrow(), None);
        assert_eq!(*calls.borrow(), vec!["deferred:/next"]);

        let done = parked.borrow_mut().take().unwrap();
        done.proceed();

        assert_eq!(*result.borrow(), Some(HookOutcome::Proceed));
        assert_eq!(*calls.borrow(), vec!["deferred:/next", "sync"]);
    }

    #[test]
    fn test_deferred_veto_stops_chain() {
        let later_ran = Rc::new(RefCell::new(false));
        let flag = Rc::clone(&later_ran);

        let result = run(chain(vec![
            BeforeHook::deferred(|_, done| done.veto()),
            BeforeHook::sync(move |_| {
                *flag.borrow_mut() = true;
                HookOutcome::Proceed
            }),
        ]));

        assert_eq!(*result.borrow(), Some(HookOutcome::Veto(None)));
        assert!(!*later_ran.borrow());
    }

    #[test]
    fn test_callback_completes_once() {
        let count = Rc::new(RefCell::new(0));
        let counter = Rc::clone(&count);
        let callback = Callback::new("test", move |n: i32| *counter.borrow_mut() += n);
        callback.complete(3);
        assert_eq!(*count.borrow(), 3);
    }

    #[test]
    fn test_outcome_helpers() {
        assert!(HookOutcome::Proceed.is_proceed());
        assert_eq!(
            HookOutcome::veto_with("nope"),
            HookOutcome::Veto(Some("nope".to_string()))
        );
        assert!(!HookOutcome::defer("msg").is_proceed());
    }
}
