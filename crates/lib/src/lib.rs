//!
//! Guardlist: a cursor-based doubly linked list with advisory nesting guards.
//!
//! ## Core Concepts
//!
//! * **Chain (`chain::Chain`)**: The raw structure. A sentinel-delimited
//!   doubly linked sequence held in an arena, with a single movable cursor
//!   that stands before the first element, on an element, or behind the last.
//! * **Guards (`guard`)**: Named, uniquely numbered nesting tokens kept in
//!   two LIFO stacks per list: *transactions* (a sequence of operations that
//!   belongs together) and *closed actions* (a walk whose cursor movement is
//!   undone on close).
//! * **GuardedList (`list::GuardedList`)**: A chain plus the two guard
//!   stacks. Every navigating or mutating call presents guard ids, which are
//!   checked before delegation. Checks are advisory under the default
//!   [`Enforcement::LogOnly`] policy: violations are reported through a
//!   [`ReportSink`], but the operation executes anyway.
//! * **SortedList (`sorted::SortedList`)**: A guarded list ordered by
//!   per-node sort keys, with a linear-scan insertion-point search and a
//!   deliberately single-pass reorder sweep.
//!
//! Violations never surface as errors from the guarded entry points; the
//! [`Error`] type covers the raw chain API and persistence only.

pub mod chain;
pub mod guard;
pub mod list;
pub mod report;
pub mod sorted;

pub use chain::{Chain, NodeRef};
pub use guard::{GuardId, GuardKind};
pub use list::{Enforcement, GuardedList};
#[cfg(any(test, feature = "testing"))]
pub use report::RecordingSink;
pub use report::{ReportSink, Severity, TracingSink};
pub use sorted::SortedList;

/// Result type used throughout the guardlist library.
pub type Result<T> = std::result::Result<T, Error>;

/// Common error type for the guardlist library.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Structured chain errors from the chain module
    #[error(transparent)]
    Chain(chain::ChainError),

    /// Structured guard protocol errors from the guard module
    #[error(transparent)]
    Guard(guard::GuardError),
}

impl Error {
    /// Get the originating module for this error.
    pub fn module(&self) -> &'static str {
        match self {
            Error::Io(_) => "io",
            Error::Serialize(_) => "serialize",
            Error::Chain(_) => "chain",
            Error::Guard(_) => "guard",
        }
    }

    /// Check if this error is I/O related.
    pub fn is_io_error(&self) -> bool {
        matches!(self, Error::Io(_))
    }

    /// Check if this error is a serialization failure.
    pub fn is_serialization_error(&self) -> bool {
        matches!(self, Error::Serialize(_))
    }

    /// Check if this error was caused by a stale or foreign node handle.
    pub fn is_invalid_handle(&self) -> bool {
        match self {
            Error::Chain(chain_err) => chain_err.is_invalid_handle(),
            _ => false,
        }
    }

    /// Check if this error was caused by operating on a boundary cursor.
    pub fn is_boundary_error(&self) -> bool {
        match self {
            Error::Chain(chain_err) => chain_err.is_boundary(),
            _ => false,
        }
    }

    /// Check if this error is a guard protocol violation.
    pub fn is_guard_violation(&self) -> bool {
        matches!(self, Error::Guard(_))
    }
}
