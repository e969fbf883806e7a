//! How a location was reached.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The kind of navigation that produced a [`Location`](crate::Location).
///
/// The action describes how the entry was reached, not the address itself:
/// the same entry is labelled `Push` when first created and `Pop` when it is
/// later revisited through [`go`](crate::History::go).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Action {
    /// A new entry was appended by [`push`](crate::History::push).
    Push,
    /// The current entry was overwritten by [`replace`](crate::History::replace).
    Replace,
    /// Navigation not caused by an explicit push/replace: the initial
    /// location, back/forward, or `go(n)`.
    #[default]
    Pop,
}

impl Action {
    /// The uppercase name of the action (`"PUSH"`, `"REPLACE"`, `"POP"`).
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Push => "PUSH",
            Self::Replace => "REPLACE",
            Self::Pop => "POP",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
