//! Error types for raw chain operations.
//!
//! The chain itself is a plain data structure and reports misuse through
//! these errors; the guarded wrapper above it decides whether to surface,
//! log or absorb them.

use thiserror::Error;

/// Structured error type for chain operations.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum ChainError {
    /// A handle named a slot that holds no live element of this chain
    #[error("invalid node handle: slot {slot} does not refer to a live element")]
    InvalidHandle { slot: usize },

    /// The cursor stands before the first or behind the last element
    #[error("cursor is at a boundary during '{operation}'; there is no element to operate on")]
    CursorAtBoundary { operation: &'static str },

    /// A node cannot be relinked relative to itself
    #[error("cannot relink node (slot {slot}) relative to itself")]
    SelfRelink { slot: usize },
}

impl ChainError {
    /// Check if this error is caused by a stale or foreign handle
    pub fn is_invalid_handle(&self) -> bool {
        matches!(self, ChainError::InvalidHandle { .. })
    }

    /// Check if this error is caused by operating on a boundary cursor
    pub fn is_boundary(&self) -> bool {
        matches!(self, ChainError::CursorAtBoundary { .. })
    }

    /// Check if this error is caused by a degenerate relink request
    pub fn is_self_relink(&self) -> bool {
        matches!(self, ChainError::SelfRelink { .. })
    }
}

// Conversion from ChainError to the main Error type
impl From<ChainError> for crate::Error {
    fn from(err: ChainError) -> Self {
        crate::Error::Chain(err)
    }
}
