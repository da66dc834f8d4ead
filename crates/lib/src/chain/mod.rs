//! Cursor-based doubly linked chain backed by an arena.
//!
//! The chain is the raw structure underneath the guarded list: a
//! sentinel-delimited doubly linked sequence with a single movable cursor.
//! Nodes live in a slot arena and are addressed through [`NodeRef`] handles,
//! which keeps ownership acyclic; the cursor is itself a handle and encodes
//! its three states by position:
//!
//! - on the head sentinel: before the first element,
//! - on a live node: at that element,
//! - on the tail sentinel: behind the last element.
//!
//! The chain performs no logging and no guard checking; misuse of the raw API
//! is reported through [`ChainError`] and the layers above decide what to do
//! with it.

pub mod errors;
mod node;

use std::fmt::Display;

use serde::{Deserialize, Serialize};

pub use errors::ChainError;
pub use node::NodeRef;
use node::Node;

/// Arena slot of the head sentinel (the "before first" position).
const HEAD: NodeRef = NodeRef(0);
/// Arena slot of the tail sentinel (the "behind last" position).
const TAIL: NodeRef = NodeRef(1);

/// Sentinel-delimited doubly linked chain with one movable cursor.
///
/// Invariants: `prev.next == self` and `next.prev == self` hold for every
/// linked node, sentinels included; the cursor always names either a sentinel
/// or a live linked node.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chain<T> {
    nodes: Vec<Node<T>>,
    free: Vec<usize>,
    cursor: NodeRef,
    len: usize,
}

impl<T> Chain<T> {
    /// Create an empty chain with the cursor before the first element.
    pub fn new() -> Self {
        let head = Node {
            value: None,
            prev: None,
            next: Some(TAIL),
            sort_key: 0.0,
        };
        let tail = Node {
            value: None,
            prev: Some(HEAD),
            next: None,
            sort_key: 0.0,
        };
        Self {
            nodes: vec![head, tail],
            free: Vec::new(),
            cursor: HEAD,
            len: 0,
        }
    }

    /// Number of live elements.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Whether the cursor stands before the first element.
    pub fn is_in_front_of(&self) -> bool {
        self.cursor == HEAD
    }

    /// Whether the cursor stands behind the last element.
    pub fn is_behind(&self) -> bool {
        self.cursor == TAIL
    }

    fn at_boundary(&self) -> bool {
        self.cursor == HEAD || self.cursor == TAIL
    }

    /// Move the cursor one element forward.
    ///
    /// Past the last element the cursor lands behind the chain; moving
    /// further is a no-op.
    pub fn next(&mut self) {
        if self.cursor != TAIL {
            self.cursor = self.after(self.cursor);
        }
    }

    /// Move the cursor one element backward.
    ///
    /// Past the first element the cursor lands in front of the chain; moving
    /// further is a no-op.
    pub fn previous(&mut self) {
        if self.cursor != HEAD {
            self.cursor = self.before(self.cursor);
        }
    }

    /// Jump to the first element, or in front of the chain if it is empty.
    pub fn to_first(&mut self) {
        self.cursor = if self.is_empty() {
            HEAD
        } else {
            self.after(HEAD)
        };
    }

    /// Jump to the last element, or behind the chain if it is empty.
    pub fn to_last(&mut self) {
        self.cursor = if self.is_empty() {
            TAIL
        } else {
            self.before(TAIL)
        };
    }

    /// Set the cursor onto a live node of this chain.
    ///
    /// It is the caller's responsibility that the handle was issued by this
    /// chain; liveness is checked, membership cannot be.
    pub fn go_to(&mut self, target: NodeRef) -> Result<(), ChainError> {
        let target = self.require_live(target)?;
        self.cursor = target;
        Ok(())
    }

    /// Value at the cursor, `None` at a boundary.
    pub fn get_item(&self) -> Option<&T> {
        self.nodes[self.cursor.0].value.as_ref()
    }

    /// Node at the cursor, `None` at a boundary.
    pub fn get_element(&self) -> Option<NodeRef> {
        (!self.at_boundary()).then_some(self.cursor)
    }

    /// Insert a new element in front of the cursor position and move the
    /// cursor onto it.
    ///
    /// At the front boundary the element becomes the first of the chain, at
    /// the back boundary the last.
    pub fn insert_in_front_of(&mut self, value: T) -> NodeRef {
        let (left, right) = if self.cursor == HEAD {
            (HEAD, self.after(HEAD))
        } else {
            (self.before(self.cursor), self.cursor)
        };
        let inserted = self.link_between(left, right, value);
        self.cursor = inserted;
        inserted
    }

    /// Insert a new element behind the cursor position and move the cursor
    /// onto it.
    ///
    /// At the back boundary the element becomes the last of the chain, at the
    /// front boundary the first.
    pub fn insert_behind(&mut self, value: T) -> NodeRef {
        let (left, right) = if self.cursor == TAIL {
            (self.before(TAIL), TAIL)
        } else {
            (self.cursor, self.after(self.cursor))
        };
        let inserted = self.link_between(left, right, value);
        self.cursor = inserted;
        inserted
    }

    /// Insert a new first element; the cursor does not move.
    pub fn insert_after_head(&mut self, value: T) -> NodeRef {
        let right = self.after(HEAD);
        self.link_between(HEAD, right, value)
    }

    /// Insert a new last element; the cursor does not move.
    pub fn insert_at_the_end(&mut self, value: T) -> NodeRef {
        let left = self.before(TAIL);
        self.link_between(left, TAIL, value)
    }

    /// Unlink the element at the cursor and return its value.
    ///
    /// Afterwards the cursor stands on the predecessor of the removed
    /// element, or in front of the chain if there is none.
    pub fn remove(&mut self) -> Result<T, ChainError> {
        if self.at_boundary() {
            return Err(ChainError::CursorAtBoundary {
                operation: "remove",
            });
        }
        let target = self.cursor;
        let left = self.before(target);
        let right = self.after(target);
        self.nodes[left.0].next = Some(right);
        self.nodes[right.0].prev = Some(left);
        let value = self.nodes[target.0].value.take();
        self.nodes[target.0].prev = None;
        self.nodes[target.0].next = None;
        self.nodes[target.0].sort_key = 0.0;
        self.free.push(target.0);
        self.len -= 1;
        self.cursor = left;
        value.ok_or(ChainError::InvalidHandle {
            slot: target.slot(),
        })
    }

    /// Overwrite the value at the cursor in place and return the old value.
    /// The cursor does not move.
    pub fn replace(&mut self, value: T) -> Result<T, ChainError> {
        if self.at_boundary() {
            return Err(ChainError::CursorAtBoundary {
                operation: "replace",
            });
        }
        self.nodes[self.cursor.0]
            .value
            .replace(value)
            .ok_or(ChainError::InvalidHandle {
                slot: self.cursor.slot(),
            })
    }

    /// Sort key of a node, `None` for freed slots.
    pub fn sort_key(&self, target: NodeRef) -> Option<f64> {
        self.nodes
            .get(target.0)
            .filter(|n| n.is_live())
            .map(|n| n.sort_key)
    }

    /// Stamp the sort key of a node.
    pub fn set_sort_key(&mut self, target: NodeRef, key: f64) -> Result<(), ChainError> {
        let target = self.require_live(target)?;
        self.nodes[target.0].sort_key = key;
        Ok(())
    }

    /// Sort key of the element at the cursor, `None` at a boundary.
    pub fn sort_key_at_cursor(&self) -> Option<f64> {
        self.get_element().and_then(|e| self.sort_key(e))
    }

    /// Stamp the sort key of the element at the cursor.
    pub fn set_sort_key_at_cursor(&mut self, key: f64) -> Result<(), ChainError> {
        match self.get_element() {
            Some(element) => self.set_sort_key(element, key),
            None => Err(ChainError::CursorAtBoundary {
                operation: "set_sort_key",
            }),
        }
    }

    /// Unlink `node` and relink it immediately in front of `anchor`.
    ///
    /// Both handles must name live elements; the node keeps its identity (all
    /// handles to it, the cursor included, stay valid). Used by the sorted
    /// reorder pass.
    pub fn move_before(&mut self, moved: NodeRef, anchor: NodeRef) -> Result<(), ChainError> {
        let moved = self.require_live(moved)?;
        let anchor = self.require_live(anchor)?;
        if moved == anchor {
            return Err(ChainError::SelfRelink { slot: moved.slot() });
        }
        let left = self.before(moved);
        let right = self.after(moved);
        self.nodes[left.0].next = Some(right);
        self.nodes[right.0].prev = Some(left);
        let ante = self.before(anchor);
        self.nodes[ante.0].next = Some(moved);
        self.nodes[moved.0].prev = Some(ante);
        self.nodes[moved.0].next = Some(anchor);
        self.nodes[anchor.0].prev = Some(moved);
        Ok(())
    }

    /// Iterate the values in chain order.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            chain: self,
            at: self.after(HEAD),
        }
    }

    /// Sort keys in chain order.
    pub fn sort_keys(&self) -> Vec<f64> {
        let mut keys = Vec::with_capacity(self.len);
        let mut at = self.after(HEAD);
        while at != TAIL {
            let node = &self.nodes[at.0];
            if node.is_live() {
                keys.push(node.sort_key);
            }
            at = node.next.unwrap_or(TAIL);
        }
        keys
    }

    /// Raw cursor position, sentinels included. Snapshots taken here can be
    /// handed back to [`Chain::restore_cursor`].
    pub(crate) fn cursor_ref(&self) -> NodeRef {
        self.cursor
    }

    /// Set the cursor from a raw snapshot, sentinels included.
    pub(crate) fn restore_cursor(&mut self, target: NodeRef) -> Result<(), ChainError> {
        let valid = target == HEAD
            || target == TAIL
            || self.nodes.get(target.0).is_some_and(Node::is_live);
        if !valid {
            return Err(ChainError::InvalidHandle {
                slot: target.slot(),
            });
        }
        self.cursor = target;
        Ok(())
    }

    fn after(&self, at: NodeRef) -> NodeRef {
        self.nodes[at.0].next.unwrap_or(TAIL)
    }

    fn before(&self, at: NodeRef) -> NodeRef {
        self.nodes[at.0].prev.unwrap_or(HEAD)
    }

    fn require_live(&self, target: NodeRef) -> Result<NodeRef, ChainError> {
        match self.nodes.get(target.0) {
            Some(node) if node.is_live() => Ok(target),
            _ => Err(ChainError::InvalidHandle {
                slot: target.slot(),
            }),
        }
    }

    fn link_between(&mut self, left: NodeRef, right: NodeRef, value: T) -> NodeRef {
        let inserted = self.alloc(Node::new(value, Some(left), Some(right)));
        self.nodes[left.0].next = Some(inserted);
        self.nodes[right.0].prev = Some(inserted);
        self.len += 1;
        inserted
    }

    fn alloc(&mut self, node: Node<T>) -> NodeRef {
        match self.free.pop() {
            Some(slot) => {
                self.nodes[slot] = node;
                NodeRef(slot)
            }
            None => {
                self.nodes.push(node);
                NodeRef(self.nodes.len() - 1)
            }
        }
    }
}

impl<T: PartialEq> Chain<T> {
    /// Scan forward from the current position for an element equal to
    /// `target`.
    ///
    /// On a match the cursor moves onto the matching element and the call
    /// succeeds; otherwise the cursor ends behind the last element and the
    /// call fails. From the front boundary the scan starts at the first
    /// element.
    pub fn find(&mut self, target: &T) -> bool {
        if self.cursor == HEAD {
            self.cursor = self.after(HEAD);
        }
        while self.cursor != TAIL {
            if self.nodes[self.cursor.0].value.as_ref() == Some(target) {
                return true;
            }
            self.cursor = self.after(self.cursor);
        }
        false
    }
}

impl<T: Clone> Chain<T> {
    /// Clone the values in chain order.
    pub fn to_vec(&self) -> Vec<T> {
        self.iter().cloned().collect()
    }

    /// Clone the portion of the chain behind the current element into a new
    /// chain, sort keys included. The new chain's cursor is in front.
    pub fn sub_list(&self) -> Chain<T> {
        let mut rest = Chain::new();
        let mut at = if self.cursor == TAIL {
            TAIL
        } else {
            self.after(self.cursor)
        };
        while at != TAIL {
            let node = &self.nodes[at.0];
            if let Some(value) = &node.value {
                let copied = rest.insert_at_the_end(value.clone());
                rest.nodes[copied.0].sort_key = node.sort_key;
            }
            at = node.next.unwrap_or(TAIL);
        }
        rest
    }
}

impl<T: Display> Chain<T> {
    /// Render the values in chain order.
    pub fn to_string_vec(&self) -> Vec<String> {
        self.iter().map(|v| v.to_string()).collect()
    }

    /// Render each element together with its sort key, one per line.
    pub fn index_dump(&self) -> String {
        let mut out = String::new();
        let mut at = self.after(HEAD);
        while at != TAIL {
            let node = &self.nodes[at.0];
            if let Some(value) = &node.value {
                if !out.is_empty() {
                    out.push('\n');
                }
                out.push_str(&format!("{value} @ {}", node.sort_key));
            }
            at = node.next.unwrap_or(TAIL);
        }
        out
    }
}

impl<T> Default for Chain<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Iterator over values in chain order.
pub struct Iter<'a, T> {
    chain: &'a Chain<T>,
    at: NodeRef,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        while self.at != TAIL {
            let node = &self.chain.nodes[self.at.0];
            self.at = node.next.unwrap_or(TAIL);
            if let Some(value) = node.value.as_ref() {
                return Some(value);
            }
        }
        None
    }
}
