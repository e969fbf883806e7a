//! Errors raised by a history session.
//!
//! Only broken invariants and genuine persistence failures are errors.
//! Vetoed or declined transitions are normal outcomes and an out-of-range
//! `go(n)` is only logged.
//!
//! ```
//! use navigation_history::{create_memory_history, HistoryError, HistoryOptions};
//!
//! let err = create_memory_history(HistoryOptions::new().entries(["/", "/a"]).current(5))
//!     .unwrap_err();
//! assert!(matches!(err, HistoryError::CurrentOutOfBounds { current: 5, len: 2 }));
//! assert_eq!(err.to_string(), "Current index must be >= 0 and < 2, was 5");
//! ```

use crate::storage::StorageError;
use thiserror::Error;

/// Failure of a history operation.
#[derive(Debug, Error)]
pub enum HistoryError {
    /// The initial index does not point into the initial entries.
    #[error("Current index must be >= 0 and < {len}, was {current}")]
    CurrentOutOfBounds { current: usize, len: usize },

    /// No entry exists at the stack's current index.
    #[error("No history entry exists at index {index}")]
    MissingEntry { index: usize },

    /// Persisting a state payload failed for a reason other than storage
    /// being unavailable.
    #[error("Failed to persist location state: {0}")]
    Storage(#[from] StorageError),
}
