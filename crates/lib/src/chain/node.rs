//! Arena node and handle types for the cursor chain.

use serde::{Deserialize, Serialize};

/// Stable handle to a node slot inside a [`Chain`](super::Chain) arena.
///
/// A handle stays valid while the node it names is linked into the chain.
/// Structural operations reject handles to slots that have been freed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodeRef(pub(crate) usize);

impl NodeRef {
    /// Raw slot index, for diagnostics only.
    pub(crate) fn slot(self) -> usize {
        self.0
    }
}

/// One doubly linked element of the chain.
///
/// The two sentinel slots and freed slots carry no value; every real element
/// does. The sort key is meaningful only when the chain is owned by a sorted
/// list, and defaults to `0.0` everywhere else.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct Node<T> {
    pub(crate) value: Option<T>,
    pub(crate) prev: Option<NodeRef>,
    pub(crate) next: Option<NodeRef>,
    pub(crate) sort_key: f64,
}

impl<T> Node<T> {
    pub(crate) fn new(value: T, prev: Option<NodeRef>, next: Option<NodeRef>) -> Self {
        Self {
            value: Some(value),
            prev,
            next,
            sort_key: 0.0,
        }
    }

    /// Sentinel and freed slots are not live.
    pub(crate) fn is_live(&self) -> bool {
        self.value.is_some()
    }
}
