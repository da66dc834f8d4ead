//! Sorted guarded list.
//!
//! A [`SortedList`] keeps its elements ordered by the per-node sort key. The
//! order direction is fixed while the list is populated: ascending by
//! default, switchable only while empty. Elements enter through
//! [`SortedList::insert_sorted`], which finds the insertion point with a
//! linear scan from the current cursor position inside an internal
//! transaction.
//!
//! [`SortedList::resort`] is deliberately not a convergent sort: it performs
//! exactly one left-to-right sweep that carries the running extreme of the
//! scanned prefix to the end of the list. Callers that mutate keys in bulk
//! and expect a fully ordered chain need to re-insert instead.

mod persistence;
mod tests;

use std::fmt::Display;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::chain::{Chain, NodeRef};
use crate::guard::GuardId;
use crate::list::{Enforcement, GuardedList};
use crate::report::{ReportSink, Severity};

/// Label prefix for guards the sorted list opens on its own behalf.
const INTERNAL_LABEL: &str = "internal: ";

/// Guarded list that maintains ascending or descending key order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SortedList<T> {
    ls: GuardedList<T>,
    ascending: bool,
}

impl<T> SortedList<T> {
    /// Create an empty, ascending sorted list reporting through tracing.
    pub fn new() -> Self {
        Self {
            ls: GuardedList::new(),
            ascending: true,
        }
    }

    /// Create an empty, ascending sorted list reporting through `sink`.
    pub fn with_sink(sink: Arc<dyn ReportSink>) -> Self {
        Self {
            ls: GuardedList::with_sink(sink),
            ascending: true,
        }
    }

    pub fn is_ascending(&self) -> bool {
        self.ascending
    }

    pub fn enforcement(&self) -> Enforcement {
        self.ls.enforcement()
    }

    pub fn set_enforcement(&mut self, enforcement: Enforcement) {
        self.ls.set_enforcement(enforcement);
    }

    /// Switch to ascending order. Refused with a warning if the list is not
    /// empty, since the existing elements may already be ordered differently.
    pub fn set_ascending(&mut self) {
        self.set_order(true);
    }

    /// Switch to descending order. Refused with a warning if the list is not
    /// empty.
    pub fn set_descending(&mut self) {
        self.set_order(false);
    }

    fn set_order(&mut self, ascending: bool) {
        if self.ls.is_empty() {
            self.ascending = ascending;
        } else {
            self.ls.sink().report(
                Severity::Warning,
                "refusing to change the sort order: the list is not empty and may already be ordered differently",
            );
        }
    }

    // State queries and navigation, delegated to the guarded list.

    pub fn is_empty(&self) -> bool {
        self.ls.is_empty()
    }

    pub fn is_in_front_of(&self) -> bool {
        self.ls.is_in_front_of()
    }

    pub fn is_behind(&self) -> bool {
        self.ls.is_behind()
    }

    pub fn len(&self) -> usize {
        self.ls.len()
    }

    pub fn next(&mut self, transaction: GuardId, closed_action: GuardId) {
        self.ls.next(transaction, closed_action);
    }

    pub fn previous(&mut self, transaction: GuardId, closed_action: GuardId) {
        self.ls.previous(transaction, closed_action);
    }

    pub fn to_first(&mut self, transaction: GuardId, closed_action: GuardId) {
        self.ls.to_first(transaction, closed_action);
    }

    pub fn to_last(&mut self, transaction: GuardId, closed_action: GuardId) {
        self.ls.to_last(transaction, closed_action);
    }

    pub fn go_to(&mut self, target: NodeRef, transaction: GuardId, closed_action: GuardId) {
        self.ls.go_to(target, transaction, closed_action);
    }

    pub fn get_item(&self) -> Option<&T> {
        self.ls.get_item()
    }

    pub fn get_element(&self) -> Option<NodeRef> {
        self.ls.get_element()
    }

    pub fn sort_key_at_cursor(&self) -> Option<f64> {
        self.ls.sort_key_at_cursor()
    }

    /// Sort keys in list order.
    pub fn sort_keys(&self) -> Vec<f64> {
        self.ls.chain().sort_keys()
    }

    pub fn iter(&self) -> crate::chain::Iter<'_, T> {
        self.ls.iter()
    }

    /// Remove the element at the cursor and return its value.
    pub fn remove(&mut self, transaction: GuardId) -> Option<T> {
        self.ls.remove(transaction)
    }

    // Guard lifecycle, delegated to the guarded list.

    pub fn start_transaction(&mut self, name: impl Into<String>, expected_parent: GuardId) -> GuardId {
        self.ls.start_transaction(name, expected_parent)
    }

    pub fn finish_transaction(&mut self, transaction: GuardId) -> GuardId {
        self.ls.finish_transaction(transaction)
    }

    pub fn start_closed_action(&mut self, name: impl Into<String>, expected_parent: GuardId) -> GuardId {
        self.ls.start_closed_action(name, expected_parent)
    }

    pub fn finish_closed_action(&mut self, closed_action: GuardId) -> GuardId {
        self.ls.finish_closed_action(closed_action)
    }

    pub fn reset_transactions(&mut self) {
        self.ls.reset_transactions();
    }

    pub fn reset_closed_actions(&mut self) {
        self.ls.reset_closed_actions();
    }

    // Sorting.

    /// Position the cursor at the spot where an element with `key` belongs.
    ///
    /// Linear scan from the current cursor position: forward while the keys
    /// under the cursor are below the target, or backward while they are
    /// above it followed by one compensating step forward. From a boundary
    /// the cursor first jumps to the corresponding end and the search is
    /// retried.
    pub fn find_sorted(&mut self, key: f64, transaction: GuardId, closed_action: GuardId) {
        if self.ls.is_empty() {
            return;
        }
        if self.ls.is_behind() {
            self.ls.to_last(transaction, closed_action);
            if self.ls.is_behind() {
                // Navigation was refused; the scan cannot make progress.
                return;
            }
            return self.find_sorted(key, transaction, closed_action);
        }
        if self.ls.is_in_front_of() {
            self.ls.to_first(transaction, closed_action);
            if self.ls.is_in_front_of() {
                return;
            }
            return self.find_sorted(key, transaction, closed_action);
        }
        if self.ls.sort_key_at_cursor().is_some_and(|k| k < key) {
            while !self.ls.is_behind() && self.ls.sort_key_at_cursor().is_some_and(|k| k < key) {
                let at = self.ls.get_element();
                self.ls.next(transaction, closed_action);
                if self.ls.get_element() == at {
                    return;
                }
            }
        } else {
            while !self.ls.is_in_front_of()
                && self.ls.sort_key_at_cursor().is_some_and(|k| k > key)
            {
                let at = self.ls.get_element();
                self.ls.previous(transaction, closed_action);
                if self.ls.get_element() == at {
                    return;
                }
            }
            // The backward scan stops one element early; step over it so the
            // result does not depend on the starting position.
            if !self.ls.is_in_front_of() {
                self.ls.next(transaction, closed_action);
            }
        }
    }

    /// Insert `value` at the position its `key` demands and stamp the key
    /// onto the new node.
    ///
    /// Runs inside an internal transaction started under `transaction` as the
    /// expected parent.
    pub fn insert_sorted(&mut self, value: T, key: f64, transaction: GuardId) {
        let internal = self
            .ls
            .start_transaction(format!("{INTERNAL_LABEL}insert sorted"), transaction);
        self.find_sorted(key, internal, GuardId::NONE);
        let inserted = if self.ascending {
            self.ls.insert_in_front_of(value, internal)
        } else {
            self.ls.insert_behind(value, internal)
        };
        // The insert left the cursor on the new node; stamp its key there.
        if inserted {
            self.ls.set_sort_key_at_cursor(key);
        }
        self.ls.finish_transaction(internal);
    }

    /// One left-to-right reorder sweep.
    ///
    /// Walks the list once, keeping a `maintained` node; whenever the
    /// maintained key compares against the current one on the wrong side of
    /// the sort order, the current node is relinked immediately in front of
    /// the maintained one. A single sweep carries the running extreme of the
    /// scanned prefix to the end of the list but does not fully order
    /// arbitrary permutations.
    pub fn resort(&mut self) {
        if self.ls.is_empty() {
            return;
        }
        let transaction = self.ls.start_transaction("resort the list", GuardId::NONE);
        self.ls.to_first(transaction, GuardId::NONE);
        let mut maintained = self.ls.get_element();
        self.ls.next(transaction, GuardId::NONE);
        while !self.ls.is_empty() && !self.ls.is_behind() {
            let current = self.ls.get_element();
            if let (Some(kept), Some(cursor)) = (maintained, current) {
                let keys = (self.ls.sort_key(kept), self.ls.sort_key(cursor));
                if let (Some(kept_key), Some(cursor_key)) = keys {
                    if (kept_key > cursor_key) == self.ascending {
                        // Right after a swap the walk revisits the maintained
                        // node itself; relinking it in front of itself is an
                        // identity and is skipped.
                        if cursor != kept
                            && let Err(err) = self.ls.chain_mut().move_before(cursor, kept)
                        {
                            self.ls
                                .sink()
                                .report(Severity::Warning, &format!("resort: {err}"));
                        }
                    } else {
                        maintained = Some(cursor);
                    }
                }
            }
            let at = self.ls.get_element();
            self.ls.next(transaction, GuardId::NONE);
            if self.ls.get_element() == at {
                // Navigation was refused; abandon the sweep instead of
                // spinning on the same element.
                break;
            }
        }
        self.ls.finish_transaction(transaction);
    }

    /// Overwrite the sort key of the element at the cursor.
    ///
    /// At a boundary there is no element; the call is refused with a warning.
    pub fn change_sort_key(&mut self, new_key: f64) {
        if self.ls.get_element().is_some() {
            self.ls.set_sort_key_at_cursor(new_key);
        } else {
            self.ls.sink().report(
                Severity::Warning,
                "the cursor is at a boundary; there is no element whose sort key could change",
            );
        }
    }
}

impl<T: PartialEq> SortedList<T> {
    /// Scan forward from the current position for an element equal to
    /// `target`; on a match the cursor moves onto it.
    pub fn find(&mut self, target: &T, transaction: GuardId) -> bool {
        self.ls.find(target, transaction)
    }
}

impl<T: Clone> SortedList<T> {
    /// Clone the values in list order.
    pub fn to_vec(&self) -> Vec<T> {
        self.ls.to_vec()
    }

    /// Clone the portion of the list behind the current element into a raw
    /// chain, sort keys included.
    pub fn sub_list(&self) -> Chain<T> {
        self.ls.sub_list()
    }
}

impl<T: Display> SortedList<T> {
    /// Render the values in list order.
    pub fn to_string_vec(&self) -> Vec<String> {
        self.ls.to_string_vec()
    }

    /// Render each element together with its sort key, one per line.
    pub fn index_dump(&self) -> String {
        self.ls.index_dump()
    }
}

impl<T> Default for SortedList<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(any(test, feature = "testing"))]
impl SortedList<String> {
    /// Append `amount` elements with random single-digit keys, bypassing the
    /// sorted insert. Useful for exercising the reorder pass.
    pub fn fill_random(&mut self, amount: usize) {
        use rand::Rng;

        let mut rng = rand::thread_rng();
        for _ in 0..amount {
            let digit: u32 = rng.gen_range(0..10);
            self.ls.insert_behind(digit.to_string(), GuardId::NONE);
            self.ls.set_sort_key_at_cursor(f64::from(digit));
        }
    }
}
