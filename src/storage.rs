//! Key-addressed persistence for per-entry state payloads.
//!
//! The history stack never keeps state inline: it saves each entry's payload
//! into a [`StateStore`] under the entry key and reads it back whenever the
//! current location is rebuilt. Two stores are provided:
//!
//! - [`MemoryStateStore`]: a plain map, the default.
//! - [`SessionStateStore`]: JSON-encodes payloads into a string
//!   [`StorageArea`] under the `@@History/` prefix, the way a browser
//!   session storage would hold them. Failures that only mean "storage is
//!   not usable here" are logged and ignored so navigation keeps working
//!   without state restoration; anything else is returned to the caller.
//!
//! # Examples
//!
//! ```
//! use navigation_history::storage::{MemoryStorageArea, SessionStateStore, StateStore};
//! use serde_json::json;
//!
//! let mut store = SessionStateStore::new(MemoryStorageArea::new());
//! store.save("abc123", Some(&json!({ "scroll": 120 }))).unwrap();
//! assert_eq!(store.read("abc123"), Some(json!({ "scroll": 120 })));
//! assert_eq!(store.area().unwrap().raw("@@History/abc123"), Some("{\"scroll\":120}"));
//! ```

use crate::warn_log;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use thiserror::Error;

/// Prefix prepended to every key written by [`SessionStateStore`].
pub const KEY_PREFIX: &str = "@@History/";

/// Failure reported by a [`StorageArea`] or [`StateStore`].
#[derive(Debug, Error)]
pub enum StorageError {
    /// The storage backend is not available at all.
    #[error("storage is not available")]
    Unavailable,

    /// Access was denied, e.g. because cookies and site data are blocked.
    #[error("storage access denied by security settings")]
    Security,

    /// The write would exceed the storage quota.
    #[error("storage quota exceeded")]
    QuotaExceeded,

    /// The payload could not be encoded.
    #[error("failed to serialize state: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Any other backend failure.
    #[error("storage failure: {0}")]
    Backend(String),
}

impl StorageError {
    /// Whether this error only means that storage cannot be used here, as
    /// opposed to a genuine failure.
    pub fn is_unavailable(&self) -> bool {
        matches!(self, Self::Unavailable | Self::Security)
    }
}

/// Persistence for state payloads, addressed by entry key.
pub trait StateStore {
    /// Store `state` under `key`. `None` clears any stored payload.
    fn save(&mut self, key: &str, state: Option<&Value>) -> Result<(), StorageError>;

    /// Read the payload stored under `key`, if any.
    fn read(&self, key: &str) -> Option<Value>;
}

impl<S: StateStore + ?Sized> StateStore for Box<S> {
    fn save(&mut self, key: &str, state: Option<&Value>) -> Result<(), StorageError> {
        (**self).save(key, state)
    }

    fn read(&self, key: &str) -> Option<Value> {
        (**self).read(key)
    }
}

/// In-memory [`StateStore`]. Never fails.
#[derive(Debug, Clone, Default)]
pub struct MemoryStateStore {
    states: HashMap<String, Value>,
}

impl MemoryStateStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored payloads.
    pub fn len(&self) -> usize {
        self.states.len()
    }

    /// Whether nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }
}

impl StateStore for MemoryStateStore {
    fn save(&mut self, key: &str, state: Option<&Value>) -> Result<(), StorageError> {
        match state {
            Some(state) => {
                self.states.insert(key.to_string(), state.clone());
            }
            None => {
                self.states.remove(key);
            }
        }
        Ok(())
    }

    fn read(&self, key: &str) -> Option<Value> {
        self.states.get(key).cloned()
    }
}

/// A string key/value storage area, such as a browser's session storage.
pub trait StorageArea {
    /// Read the raw item stored under `key`.
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Write `value` under `key`.
    fn set_item(&mut self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Delete the item stored under `key`.
    fn remove_item(&mut self, key: &str) -> Result<(), StorageError>;

    /// Number of stored items.
    fn len(&self) -> usize;

    /// Whether no items are stored.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// In-process [`StorageArea`] with an optional byte quota.
///
/// It can also be switched into a "blocked" mode in which every access
/// fails with [`StorageError::Security`], mimicking a browser with site data
/// disabled.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorageArea {
    items: BTreeMap<String, String>,
    quota: Option<usize>,
    blocked: bool,
}

impl MemoryStorageArea {
    /// Create an unbounded area.
    pub fn new() -> Self {
        Self::default()
    }

    /// Limit the total size of keys and values to `bytes`.
    pub fn with_quota(mut self, bytes: usize) -> Self {
        self.quota = Some(bytes);
        self
    }

    /// Make every access fail with [`StorageError::Security`].
    pub fn blocked(mut self) -> Self {
        self.blocked = true;
        self
    }

    /// Raw stored value, bypassing the blocked switch.
    pub fn raw(&self, key: &str) -> Option<&str> {
        self.items.get(key).map(String::as_str)
    }

    /// Store a raw value, bypassing quota and blocked checks.
    pub fn insert_raw(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.items.insert(key.into(), value.into());
    }

    fn used_bytes(&self) -> usize {
        self.items.iter().map(|(k, v)| k.len() + v.len()).sum()
    }
}

impl StorageArea for MemoryStorageArea {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        if self.blocked {
            return Err(StorageError::Security);
        }
        Ok(self.items.get(key).cloned())
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        if self.blocked {
            return Err(StorageError::Security);
        }
        if let Some(quota) = self.quota {
            let replaced = self.items.get(key).map_or(0, |old| key.len() + old.len());
            if self.used_bytes() - replaced + key.len() + value.len() > quota {
                return Err(StorageError::QuotaExceeded);
            }
        }
        self.items.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&mut self, key: &str) -> Result<(), StorageError> {
        if self.blocked {
            return Err(StorageError::Security);
        }
        self.items.remove(key);
        Ok(())
    }

    fn len(&self) -> usize {
        self.items.len()
    }
}

/// [`StateStore`] that keeps JSON-encoded payloads in a [`StorageArea`].
#[derive(Debug, Clone)]
pub struct SessionStateStore<A> {
    area: Option<A>,
}

impl<A: StorageArea> SessionStateStore<A> {
    /// Store payloads in `area`.
    pub fn new(area: A) -> Self {
        Self { area: Some(area) }
    }

    /// A store with no backing area: saves are skipped with a warning and
    /// reads return nothing.
    pub fn unavailable() -> Self {
        Self { area: None }
    }

    /// The backing area, if any.
    pub fn area(&self) -> Option<&A> {
        self.area.as_ref()
    }

    /// Mutable access to the backing area.
    pub fn area_mut(&mut self) -> Option<&mut A> {
        self.area.as_mut()
    }
}

impl<A: StorageArea> StateStore for SessionStateStore<A> {
    fn save(&mut self, key: &str, state: Option<&Value>) -> Result<(), StorageError> {
        let Some(area) = self.area.as_mut() else {
            warn_log!("[history] Unable to save state; session storage is not available");
            return Ok(());
        };

        let storage_key = format!("{KEY_PREFIX}{key}");
        let result = match state {
            None | Some(Value::Null) => area.remove_item(&storage_key),
            Some(state) => {
                let json = serde_json::to_string(state)?;
                area.set_item(&storage_key, &json)
            }
        };

        match result {
            Ok(()) => Ok(()),
            Err(err) if err.is_unavailable() => {
                warn_log!(
                    "[history] Unable to save state; session storage is not available ({})",
                    err
                );
                Ok(())
            }
            // An empty area that is already over quota has no quota at all
            // (private browsing modes).
            Err(StorageError::QuotaExceeded) if area.is_empty() => {
                warn_log!(
                    "[history] Unable to save state; session storage has no quota in this mode"
                );
                Ok(())
            }
            Err(err) => Err(err),
        }
    }

    fn read(&self, key: &str) -> Option<Value> {
        let area = self.area.as_ref()?;
        let json = match area.get_item(&format!("{KEY_PREFIX}{key}")) {
            Ok(json) => json?,
            Err(err) => {
                if err.is_unavailable() {
                    warn_log!(
                        "[history] Unable to read state; session storage is not available ({})",
                        err
                    );
                }
                return None;
            }
        };

        serde_json::from_str(&json).ok()
    }
}
