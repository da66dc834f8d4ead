//! Error types for the nesting guard protocol.
//!
//! Guard violations are never surfaced as `Err` from the guarded list's entry
//! points; the list builds these errors, hands their rendered message to the
//! report sink and carries on. The type exists so that messages are uniform
//! and violations can be classified.

use thiserror::Error;

use super::{GuardId, GuardKind};

/// Structured error type for guard protocol violations.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum GuardError {
    /// A guard stack was found absent and has been reinstalled empty
    #[error("the {kind} stack was absent and has been reinitialized; nesting state was lost")]
    AbsentState { kind: GuardKind },

    /// An operation presented an id that does not match the active guard
    #[error(
        "operation '{method}' presented {kind} id {given}, but '{current_name}' (id {current_id}) is active"
    )]
    Mismatch {
        kind: GuardKind,
        method: String,
        given: GuardId,
        current_id: GuardId,
        current_name: String,
    },

    /// An operation presented a guard id although no guard is active
    #[error("operation '{method}' presented {kind} id {given}, but no {kind} is active")]
    StaleId {
        kind: GuardKind,
        method: String,
        given: GuardId,
    },

    /// A new guard was started while a differently-identified one is open
    #[error("{kind} '{current_name}' (id {current_id}) not terminated; refusing to start '{new_name}'")]
    NotTerminated {
        kind: GuardKind,
        current_id: GuardId,
        current_name: String,
        new_name: String,
    },

    /// The wrong guard was asked to terminate
    #[error(
        "wrong {kind} to be terminated: active is '{current_name}' (id {current_id}), got id {given}"
    )]
    WrongFinish {
        kind: GuardKind,
        current_id: GuardId,
        current_name: String,
        given: GuardId,
    },

    /// A guard was asked to terminate although none is active
    #[error("no {kind} to terminate (got id {given})")]
    NoActive { kind: GuardKind, given: GuardId },
}

impl GuardError {
    /// The guard kind this violation concerns.
    pub fn kind(&self) -> GuardKind {
        match self {
            GuardError::AbsentState { kind }
            | GuardError::Mismatch { kind, .. }
            | GuardError::StaleId { kind, .. }
            | GuardError::NotTerminated { kind, .. }
            | GuardError::WrongFinish { kind, .. }
            | GuardError::NoActive { kind, .. } => *kind,
        }
    }

    /// Check if this error reports a wrong or stale id on an ordinary call
    pub fn is_mismatch(&self) -> bool {
        matches!(
            self,
            GuardError::Mismatch { .. }
                | GuardError::StaleId { .. }
                | GuardError::WrongFinish { .. }
                | GuardError::NoActive { .. }
        )
    }

    /// Check if this error reports starting a guard over an open one
    pub fn is_nesting_violation(&self) -> bool {
        matches!(self, GuardError::NotTerminated { .. })
    }

    /// Check if this error reports a recovered internal state
    pub fn is_absent_state(&self) -> bool {
        matches!(self, GuardError::AbsentState { .. })
    }
}

// Conversion from GuardError to the main Error type
impl From<GuardError> for crate::Error {
    fn from(err: GuardError) -> Self {
        crate::Error::Guard(err)
    }
}
