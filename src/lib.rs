//! Navigation history for single-page applications.
//!
//! The crate decides which [`Location`] is current and when, and why, it
//! changes:
//!
//! - [`Location`] values are built by [`create_location`] from a path string
//!   or a [`PartialLocation`].
//! - A [`History`] session accepts `push`, `replace` and `go` requests. Each
//!   request runs through the registered [`BeforeHook`]s, which may let it
//!   through, veto it, or defer to a user confirmation function. A
//!   confirmed request is committed to the stack and announced to the
//!   listeners registered with [`History::listen`].
//! - The stack itself sits behind [`HistoryBackend`]; [`MemoryStack`] keeps
//!   entries in memory and persists per-entry state through a
//!   [`StateStore`](storage::StateStore).
//!
//! # Quick start
//!
//! ```
//! use navigation_history::{create_memory_history, BeforeHook, HistoryOptions, HookOutcome};
//!
//! let history = create_memory_history(
//!     HistoryOptions::new().user_confirmation(|_message, answer| answer.complete(false)),
//! )
//! .unwrap();
//!
//! history.listen_before(BeforeHook::sync(|_| HookOutcome::defer("Leave this page?")));
//! history.push("/home");
//!
//! // The user said no.
//! assert_eq!(history.get_current_location().unwrap().pathname, "/");
//! ```
//!
//! # Feature flags
//!
//! | Feature   | Default | Description |
//! |-----------|---------|-------------|
//! | `log`     | yes     | Diagnostics through the `log` crate |
//! | `tracing` | no      | Diagnostics through the `tracing` crate |

#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod action;
pub mod error;
pub mod history;
pub mod hooks;
pub mod listeners;
pub mod location;
pub mod logging;
pub mod path;
pub mod stack;
pub mod storage;
pub mod transition;

pub use action::Action;
pub use error::HistoryError;
pub use history::{
    create_memory_history, ConfirmCallback, History, HistoryOptions, UserConfirmation, WeakHistory,
};
pub use hooks::{BeforeHook, Callback, HookCallback, HookOutcome};
pub use listeners::{Listener, ListenerId, Unlisten};
pub use location::{create_key, create_location, Location, LocationInput, PartialLocation};
pub use stack::{HistoryBackend, MemoryStack};
pub use transition::{TransitionId, TransitionState};
