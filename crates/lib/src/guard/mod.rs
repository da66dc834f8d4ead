//! Named nesting guards.
//!
//! A guarded list carries two independent guard protocols, transactions and
//! closed actions. Both are the same mechanism: a LIFO of named, uniquely
//! numbered tokens whose top entry is the currently active guard. This module
//! provides that mechanism once; the list instantiates it twice, one stack
//! per [`GuardKind`].
//!
//! Ids are allocated from one process-wide counter per kind, so they are
//! unique and strictly increasing across every list in the program, never
//! reused. The value `-1` is reserved: it is the id callers present when they
//! are not inside any guard.

pub mod errors;

use std::fmt;
use std::sync::atomic::{AtomicI64, Ordering};

use serde::{Deserialize, Serialize};

pub use errors::GuardError;

use crate::chain::NodeRef;

/// Identifier of a guard token.
///
/// Real ids are non-negative and handed out by [`GuardStack::push`];
/// [`GuardId::NONE`] is the "no predecessor" sentinel denoting "not inside
/// any guard".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GuardId(i64);

impl GuardId {
    /// The sentinel presented when no guard is active.
    pub const NONE: GuardId = GuardId(-1);

    /// Whether this is the "no guard" sentinel.
    pub fn is_none(self) -> bool {
        self == Self::NONE
    }
}

impl fmt::Display for GuardId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Which of the two guard protocols a stack or token belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GuardKind {
    Transaction,
    ClosedAction,
}

impl GuardKind {
    fn counter(self) -> &'static AtomicI64 {
        static TRANSACTION_IDS: AtomicI64 = AtomicI64::new(0);
        static CLOSED_ACTION_IDS: AtomicI64 = AtomicI64::new(0);
        match self {
            GuardKind::Transaction => &TRANSACTION_IDS,
            GuardKind::ClosedAction => &CLOSED_ACTION_IDS,
        }
    }

    fn allocate_id(self) -> GuardId {
        GuardId(self.counter().fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for GuardKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GuardKind::Transaction => f.write_str("transaction"),
            GuardKind::ClosedAction => f.write_str("closed action"),
        }
    }
}

/// One entry of a guard stack: a unique id, a diagnostic name, and for closed
/// actions the cursor position that was current when the guard opened.
#[derive(Debug, Clone)]
pub struct GuardToken {
    id: GuardId,
    name: String,
    snapshot: Option<NodeRef>,
}

impl GuardToken {
    pub fn id(&self) -> GuardId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Cursor snapshot taken when the guard opened; `Some` exactly for closed
    /// action tokens.
    pub(crate) fn snapshot(&self) -> Option<NodeRef> {
        self.snapshot
    }
}

/// LIFO of guard tokens; insertion order is nesting order and the top entry
/// is the currently active guard.
#[derive(Debug, Clone)]
pub struct GuardStack {
    kind: GuardKind,
    entries: Vec<GuardToken>,
}

impl GuardStack {
    pub fn new(kind: GuardKind) -> Self {
        Self {
            kind,
            entries: Vec::new(),
        }
    }

    pub fn kind(&self) -> GuardKind {
        self.kind
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Current nesting depth.
    pub fn depth(&self) -> usize {
        self.entries.len()
    }

    /// Allocate the next id of this stack's kind, push a token carrying it
    /// and return the id.
    pub fn push(&mut self, name: impl Into<String>, snapshot: Option<NodeRef>) -> GuardId {
        let token = GuardToken {
            id: self.kind.allocate_id(),
            name: name.into(),
            snapshot,
        };
        let id = token.id;
        self.entries.push(token);
        id
    }

    /// Pop the active guard and return the id of the guard that becomes
    /// active, or `None` if the stack is now empty (or already was).
    pub fn pop(&mut self) -> Option<GuardId> {
        self.entries.pop();
        self.top_id()
    }

    /// The currently active guard token.
    pub fn top(&self) -> Option<&GuardToken> {
        self.entries.last()
    }

    pub fn top_id(&self) -> Option<GuardId> {
        self.top().map(GuardToken::id)
    }

    pub fn top_name(&self) -> Option<&str> {
        self.top().map(GuardToken::name)
    }
}
