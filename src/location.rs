//! Location values and the factory that builds them.
//!
//! A [`Location`] is the canonical description of "where the app is": the
//! address split into pathname/search/hash, an opaque state payload, the
//! key of the history entry it belongs to, and the [`Action`] that led
//! there.
//!
//! Locations are produced from a [`LocationInput`], which is either a path
//! string or a [`PartialLocation`] with any subset of fields filled in.
//!
//! # Examples
//!
//! ```
//! use navigation_history::{create_location, Action, PartialLocation};
//! use serde_json::json;
//!
//! let from_path = create_location("/home?the=query", None, None);
//! assert_eq!(from_path.pathname, "/home");
//! assert_eq!(from_path.search, "?the=query");
//! assert_eq!(from_path.action, Action::Pop);
//! assert_eq!(from_path.key.len(), 6);
//!
//! let from_fields = create_location(
//!     PartialLocation::new().pathname("/home").state(json!({ "the": "state" })),
//!     Some(Action::Push),
//!     Some("abc123".to_string()),
//! );
//! assert_eq!(from_fields.key, "abc123");
//! assert_eq!(from_fields.state, Some(json!({ "the": "state" })));
//! ```

use crate::action::Action;
use crate::path::{create_path, parse_path};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Length of generated keys unless configured otherwise.
pub const DEFAULT_KEY_LENGTH: usize = 6;

/// Longest key that one random UUID can fill with base-36 digits.
pub const MAX_KEY_LENGTH: usize = 24;

/// A canonical, immutable-by-convention navigation location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    /// Path portion of the address, e.g. `/users/42`.
    pub pathname: String,
    /// Query string including the leading `?`, or empty.
    pub search: String,
    /// Fragment including the leading `#`, or empty.
    pub hash: String,
    /// Opaque, serializable payload attached to the entry. `None` means no
    /// state was supplied.
    pub state: Option<Value>,
    /// Identifier of the history entry, stable for the entry's lifetime.
    pub key: String,
    /// How this location was reached.
    pub action: Action,
}

impl Location {
    /// Build a location from an input, an action and an explicit key.
    ///
    /// Missing search/hash default to empty, a missing pathname to `/`.
    /// A key carried by a [`PartialLocation`] is ignored in favour of `key`.
    pub fn from_input(input: impl Into<LocationInput>, action: Action, key: String) -> Self {
        let fields = input.into().into_fields();
        Self {
            pathname: fields
                .pathname
                .filter(|pathname| !pathname.is_empty())
                .unwrap_or_else(|| "/".to_string()),
            search: fields.search.unwrap_or_default(),
            hash: fields.hash.unwrap_or_default(),
            state: fields.state,
            key,
            action,
        }
    }

    /// The joined `pathname + search + hash` of this location.
    pub fn path(&self) -> String {
        create_path(&self.pathname, &self.search, &self.hash)
    }

    /// Whether both locations address the same path with deep-equal state.
    ///
    /// Keys and actions are not compared.
    pub fn same_address(&self, other: &Self) -> bool {
        self.path() == other.path() && self.state == other.state
    }

    /// Whether both locations describe the same history entry: same address,
    /// same state and same key. The action is ignored.
    pub fn is_equivalent(&self, other: &Self) -> bool {
        self.pathname == other.pathname
            && self.search == other.search
            && self.hash == other.hash
            && self.key == other.key
            && self.state == other.state
    }

    /// Return a copy of this location relabelled with `action`.
    pub fn with_action(mut self, action: Action) -> Self {
        self.action = action;
        self
    }
}

/// A location with any subset of its fields specified.
///
/// Built with chained setters:
///
/// ```
/// use navigation_history::PartialLocation;
///
/// let partial = PartialLocation::new().pathname("/home").search("?the=query");
/// assert_eq!(partial.pathname.as_deref(), Some("/home"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PartialLocation {
    /// Path portion.
    pub pathname: Option<String>,
    /// Query string including `?`.
    pub search: Option<String>,
    /// Fragment including `#`.
    pub hash: Option<String>,
    /// State payload.
    pub state: Option<Value>,
    /// Pre-assigned entry key, used when restoring existing entries.
    pub key: Option<String>,
}

impl PartialLocation {
    /// Create an empty partial location.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the pathname.
    pub fn pathname(mut self, pathname: impl Into<String>) -> Self {
        self.pathname = Some(pathname.into());
        self
    }

    /// Set the search string.
    pub fn search(mut self, search: impl Into<String>) -> Self {
        self.search = Some(search.into());
        self
    }

    /// Set the hash.
    pub fn hash(mut self, hash: impl Into<String>) -> Self {
        self.hash = Some(hash.into());
        self
    }

    /// Set the state payload.
    pub fn state(mut self, state: Value) -> Self {
        self.state = Some(state);
        self
    }

    /// Set the entry key.
    pub fn key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }
}

/// Input accepted wherever a location is produced: either a path string or
/// a set of fields. Resolved once, at the boundary.
#[derive(Debug, Clone, PartialEq)]
pub enum LocationInput {
    /// A path such as `/home?the=query#top`, parsed with
    /// [`parse_path`](crate::path::parse_path).
    Path(String),
    /// Individually specified fields.
    Fields(PartialLocation),
}

impl LocationInput {
    /// The key carried by this input, if any.
    pub fn key(&self) -> Option<&str> {
        match self {
            Self::Path(_) => None,
            Self::Fields(fields) => fields.key.as_deref(),
        }
    }

    fn into_fields(self) -> PartialLocation {
        match self {
            Self::Path(path) => {
                let parts = parse_path(&path);
                PartialLocation {
                    pathname: Some(parts.pathname),
                    search: Some(parts.search),
                    hash: Some(parts.hash),
                    state: None,
                    key: None,
                }
            }
            Self::Fields(fields) => fields,
        }
    }
}

impl Default for LocationInput {
    fn default() -> Self {
        Self::Path("/".to_string())
    }
}

impl From<&str> for LocationInput {
    fn from(path: &str) -> Self {
        Self::Path(path.to_string())
    }
}

impl From<String> for LocationInput {
    fn from(path: String) -> Self {
        Self::Path(path)
    }
}

impl From<&String> for LocationInput {
    fn from(path: &String) -> Self {
        Self::Path(path.clone())
    }
}

impl From<PartialLocation> for LocationInput {
    fn from(fields: PartialLocation) -> Self {
        Self::Fields(fields)
    }
}

impl From<Location> for LocationInput {
    fn from(location: Location) -> Self {
        Self::Fields(PartialLocation {
            pathname: Some(location.pathname),
            search: Some(location.search),
            hash: Some(location.hash),
            state: location.state,
            key: Some(location.key),
        })
    }
}

impl From<&Location> for LocationInput {
    fn from(location: &Location) -> Self {
        Self::from(location.clone())
    }
}

/// Generate a random base-36 key of `length` characters.
///
/// `length` is clamped to `1..=MAX_KEY_LENGTH`.
pub fn create_key(length: usize) -> String {
    let length = length.clamp(1, MAX_KEY_LENGTH);
    let mut value = Uuid::new_v4().as_u128();
    let mut key = String::with_capacity(length);
    for _ in 0..length {
        #[allow(clippy::cast_possible_truncation)]
        let digit = (value % 36) as u32;
        key.push(char::from_digit(digit, 36).unwrap_or('0'));
        value /= 36;
    }
    key
}

/// Build a [`Location`].
///
/// `action` defaults to [`Action::Pop`]. `key` defaults to a freshly
/// generated one of [`DEFAULT_KEY_LENGTH`] characters; a key carried by the
/// input is not reused.
pub fn create_location(
    input: impl Into<LocationInput>,
    action: Option<Action>,
    key: Option<String>,
) -> Location {
    let key = key.unwrap_or_else(|| create_key(DEFAULT_KEY_LENGTH));
    Location::from_input(input, action.unwrap_or_default(), key)
}
