//! Guarded list: the transaction and closed-action protocol over the chain.
//!
//! A [`GuardedList`] wraps a [`Chain`] and two independent guard stacks and
//! checks every navigating or mutating call against them.
//!
//! # Closed actions
//!
//! If the current element is to be maintained across an action that walks the
//! list, the caller opens a closed action before the action and finishes it
//! afterwards. While it is open only navigation is permitted; finishing it
//! restores the cursor to the position that was current when it opened, so
//! any walking done inside is invisible to the caller.
//!
//! # Transactions
//!
//! If no operation except children of the current transaction shall change
//! the list's state, the caller opens a transaction before the action and
//! finishes it afterwards. Transactions nest; starting a new one requires
//! presenting the id of the currently active one.
//!
//! # Fail-open checks
//!
//! Both protocols are advisory under the default [`Enforcement::LogOnly`]
//! policy: a failed check is reported through the [`ReportSink`] and the
//! operation executes anyway. Callers that want violations to actually block
//! execution opt into [`Enforcement::FailClosed`]. Return values still expose
//! rejections either way ([`GuardId::NONE`] from `start_*`, the still-active
//! id from `finish_*`).


use std::fmt::Display;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::chain::{Chain, ChainError, NodeRef};
use crate::guard::{GuardError, GuardId, GuardKind, GuardStack};
use crate::report::{ReportSink, Severity, TracingSink};

/// Whether failed guard checks merely report or actually block the call.
///
/// The historical behavior is log-only and callers rely on it; do not make
/// checks enforcing by default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Enforcement {
    /// Report the violation, then execute the operation anyway.
    #[default]
    LogOnly,
    /// Report the violation and skip the operation.
    FailClosed,
}

fn fresh_transactions() -> Option<GuardStack> {
    Some(GuardStack::new(GuardKind::Transaction))
}

fn fresh_closed_actions() -> Option<GuardStack> {
    Some(GuardStack::new(GuardKind::ClosedAction))
}

fn default_sink() -> Arc<dyn ReportSink> {
    Arc::new(TracingSink)
}

/// Cursor list whose navigation and mutation are checked against nested
/// transactions and closed actions.
///
/// Only the chain is part of the serialized object graph; guard stacks are
/// runtime nesting state and come back empty after a load.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GuardedList<T> {
    chain: Chain<T>,
    #[serde(skip, default = "fresh_transactions")]
    transactions: Option<GuardStack>,
    #[serde(skip, default = "fresh_closed_actions")]
    closed_actions: Option<GuardStack>,
    #[serde(skip)]
    enforcement: Enforcement,
    #[serde(skip, default = "default_sink")]
    sink: Arc<dyn ReportSink>,
}

impl<T> GuardedList<T> {
    /// Create an empty guarded list reporting through [`TracingSink`].
    pub fn new() -> Self {
        Self::with_sink(default_sink())
    }

    /// Create an empty guarded list reporting through the given sink.
    pub fn with_sink(sink: Arc<dyn ReportSink>) -> Self {
        Self {
            chain: Chain::new(),
            transactions: fresh_transactions(),
            closed_actions: fresh_closed_actions(),
            enforcement: Enforcement::default(),
            sink,
        }
    }

    pub fn enforcement(&self) -> Enforcement {
        self.enforcement
    }

    pub fn set_enforcement(&mut self, enforcement: Enforcement) {
        self.enforcement = enforcement;
    }

    // State queries. They cannot corrupt ordering, so they bypass the guard.

    pub fn is_empty(&self) -> bool {
        self.chain.is_empty()
    }

    pub fn is_in_front_of(&self) -> bool {
        self.chain.is_in_front_of()
    }

    pub fn is_behind(&self) -> bool {
        self.chain.is_behind()
    }

    pub fn len(&self) -> usize {
        self.chain.len()
    }

    /// Value at the cursor, `None` at a boundary.
    pub fn get_item(&self) -> Option<&T> {
        self.chain.get_item()
    }

    /// Node at the cursor, `None` at a boundary.
    pub fn get_element(&self) -> Option<NodeRef> {
        self.chain.get_element()
    }

    /// Sort key of a node.
    pub fn sort_key(&self, target: NodeRef) -> Option<f64> {
        self.chain.sort_key(target)
    }

    /// Sort key of the element at the cursor, `None` at a boundary.
    pub fn sort_key_at_cursor(&self) -> Option<f64> {
        self.chain.sort_key_at_cursor()
    }

    /// Stamp the sort key of the element at the cursor; false at a boundary.
    pub fn set_sort_key_at_cursor(&mut self, key: f64) -> bool {
        self.chain.set_sort_key_at_cursor(key).is_ok()
    }

    /// Iterate the values in list order.
    pub fn iter(&self) -> crate::chain::Iter<'_, T> {
        self.chain.iter()
    }

    // Navigation. These move the cursor, so only the currently active
    // transaction and closed action may perform them.

    /// Proceed one step in the list.
    pub fn next(&mut self, transaction: GuardId, closed_action: GuardId) {
        if self.admit("next", transaction, closed_action) {
            self.chain.next();
        }
    }

    /// Step back in the list.
    pub fn previous(&mut self, transaction: GuardId, closed_action: GuardId) {
        if self.admit("previous", transaction, closed_action) {
            self.chain.previous();
        }
    }

    /// Go to the beginning of the list.
    pub fn to_first(&mut self, transaction: GuardId, closed_action: GuardId) {
        if self.admit("to_first", transaction, closed_action) {
            self.chain.to_first();
        }
    }

    /// Go to the end of the list.
    pub fn to_last(&mut self, transaction: GuardId, closed_action: GuardId) {
        if self.admit("to_last", transaction, closed_action) {
            self.chain.to_last();
        }
    }

    /// Go to a specific element, which has to belong to this list.
    pub fn go_to(&mut self, target: NodeRef, transaction: GuardId, closed_action: GuardId) {
        if self.admit("go_to", transaction, closed_action)
            && let Err(err) = self.chain.go_to(target)
        {
            self.warn_chain("go_to", &err);
        }
    }

    // Structural mutation. Forbidden inside closed actions, which is why
    // these present the "no closed action" sentinel to the check.

    /// Replace the value at the cursor, returning the old one.
    pub fn replace(&mut self, value: T, transaction: GuardId) -> Option<T> {
        if !self.admit("replace", transaction, GuardId::NONE) {
            return None;
        }
        match self.chain.replace(value) {
            Ok(old) => Some(old),
            Err(err) => {
                self.warn_chain("replace", &err);
                None
            }
        }
    }

    /// Insert an element behind the cursor position.
    ///
    /// Returns whether the insert was performed; it only is not under
    /// [`Enforcement::FailClosed`] with a failed check.
    pub fn insert_behind(&mut self, value: T, transaction: GuardId) -> bool {
        if self.admit("insert_behind", transaction, GuardId::NONE) {
            self.chain.insert_behind(value);
            true
        } else {
            false
        }
    }

    /// Insert an element in front of the cursor position.
    ///
    /// Returns whether the insert was performed.
    pub fn insert_in_front_of(&mut self, value: T, transaction: GuardId) -> bool {
        if self.admit("insert_in_front_of", transaction, GuardId::NONE) {
            self.chain.insert_in_front_of(value);
            true
        } else {
            false
        }
    }

    /// Insert an element at the beginning of the list; the cursor stays.
    ///
    /// Returns whether the insert was performed.
    pub fn insert_after_head(&mut self, value: T, transaction: GuardId) -> bool {
        if self.admit("insert_after_head", transaction, GuardId::NONE) {
            self.chain.insert_after_head(value);
            true
        } else {
            false
        }
    }

    /// Insert an element at the end of the list; the cursor stays.
    ///
    /// Returns whether the insert was performed.
    pub fn insert_at_the_end(&mut self, value: T, transaction: GuardId) -> bool {
        if self.admit("insert_at_the_end", transaction, GuardId::NONE) {
            self.chain.insert_at_the_end(value);
            true
        } else {
            false
        }
    }

    /// Remove the element at the cursor and return its value. Afterwards the
    /// cursor stands on the predecessor of the removed element.
    pub fn remove(&mut self, transaction: GuardId) -> Option<T> {
        if !self.admit("remove", transaction, GuardId::NONE) {
            return None;
        }
        match self.chain.remove() {
            Ok(value) => Some(value),
            Err(err) => {
                self.warn_chain("remove", &err);
                None
            }
        }
    }

    // Guard lifecycle.

    /// Start a transaction under the given name and return its id.
    ///
    /// `expected_parent` is the id of the transaction the caller believes to
    /// be active ([`GuardId::NONE`] for "none"). If a differently-identified
    /// transaction is open, the start is refused: a report is emitted,
    /// nothing is pushed and [`GuardId::NONE`] is returned.
    pub fn start_transaction(&mut self, name: impl Into<String>, expected_parent: GuardId) -> GuardId {
        self.start_guard(GuardKind::Transaction, name.into(), expected_parent, None)
    }

    /// Finish the transaction with the given id.
    ///
    /// Returns the id of the transaction that becomes active, or
    /// [`GuardId::NONE`] if none is left. If `transaction` does not name the
    /// active transaction, the stack is left untouched and the still-active
    /// id is returned.
    pub fn finish_transaction(&mut self, transaction: GuardId) -> GuardId {
        if self.heal_if_absent(GuardKind::Transaction) {
            return GuardId::NONE;
        }
        let active = self
            .stack(GuardKind::Transaction)
            .and_then(GuardStack::top)
            .map(|top| (top.id(), top.name().to_string()));
        match active {
            None => {
                self.report_severe(&GuardError::NoActive {
                    kind: GuardKind::Transaction,
                    given: transaction,
                });
                GuardId::NONE
            }
            Some((current_id, current_name)) if current_id != transaction => {
                self.report_severe(&GuardError::WrongFinish {
                    kind: GuardKind::Transaction,
                    current_id,
                    current_name,
                    given: transaction,
                });
                current_id
            }
            Some(_) => self
                .stack_mut(GuardKind::Transaction)
                .pop()
                .unwrap_or(GuardId::NONE),
        }
    }

    /// Start a closed action under the given name and return its id.
    ///
    /// The cursor position current at this moment is snapshotted and will be
    /// restored by the matching [`GuardedList::finish_closed_action`].
    pub fn start_closed_action(&mut self, name: impl Into<String>, expected_parent: GuardId) -> GuardId {
        let snapshot = Some(self.chain.cursor_ref());
        self.start_guard(GuardKind::ClosedAction, name.into(), expected_parent, snapshot)
    }

    /// Finish the closed action with the given id.
    ///
    /// On success the cursor is restored to the snapshot taken at the
    /// matching start, then the action is popped; the id of the action that
    /// becomes active is returned ([`GuardId::NONE`] if none). A wrong id
    /// leaves stack and cursor untouched and returns the still-active id.
    pub fn finish_closed_action(&mut self, closed_action: GuardId) -> GuardId {
        if self.heal_if_absent(GuardKind::ClosedAction) {
            return GuardId::NONE;
        }
        let active = self
            .stack(GuardKind::ClosedAction)
            .and_then(GuardStack::top)
            .map(|top| (top.id(), top.name().to_string(), top.snapshot()));
        let snapshot = match active {
            None => {
                self.report_severe(&GuardError::NoActive {
                    kind: GuardKind::ClosedAction,
                    given: closed_action,
                });
                return GuardId::NONE;
            }
            Some((current_id, current_name, _)) if current_id != closed_action => {
                self.report_severe(&GuardError::WrongFinish {
                    kind: GuardKind::ClosedAction,
                    current_id,
                    current_name,
                    given: closed_action,
                });
                return current_id;
            }
            Some((_, _, snapshot)) => snapshot,
        };
        if let Some(snapshot) = snapshot
            && let Err(err) = self.chain.restore_cursor(snapshot)
        {
            self.warn_chain("finish_closed_action", &err);
        }
        self.stack_mut(GuardKind::ClosedAction)
            .pop()
            .unwrap_or(GuardId::NONE)
    }

    /// Throw away all transaction nesting state. Administrative escape hatch,
    /// not part of normal termination.
    pub fn reset_transactions(&mut self) {
        self.transactions = fresh_transactions();
    }

    /// Throw away all closed-action nesting state. Administrative escape
    /// hatch, not part of normal termination.
    pub fn reset_closed_actions(&mut self) {
        self.closed_actions = fresh_closed_actions();
    }

    // Check machinery.

    /// Run both guard checks for `method` and decide whether to execute.
    ///
    /// The checks only gate execution under [`Enforcement::FailClosed`];
    /// under the default policy their outcome merely decides what gets
    /// reported.
    fn admit(&mut self, method: &'static str, transaction: GuardId, closed_action: GuardId) -> bool {
        let allowed = self.check_guard(GuardKind::Transaction, transaction, method)
            && self.check_guard(GuardKind::ClosedAction, closed_action, method);
        allowed || self.enforcement == Enforcement::LogOnly
    }

    fn check_guard(&mut self, kind: GuardKind, given: GuardId, method: &str) -> bool {
        if self.heal_if_absent(kind) {
            // A freshly reinstalled stack has no active guard the id could
            // conflict with.
            return true;
        }
        let verdict = match self.stack(kind).and_then(GuardStack::top) {
            Some(top) if top.id() == given => None,
            Some(top) => Some(GuardError::Mismatch {
                kind,
                method: method.to_string(),
                given,
                current_id: top.id(),
                current_name: top.name().to_string(),
            }),
            None if given.is_none() => None,
            None => Some(GuardError::StaleId {
                kind,
                method: method.to_string(),
                given,
            }),
        };
        match verdict {
            None => true,
            Some(violation) => {
                self.report_severe(&violation);
                false
            }
        }
    }

    fn start_guard(
        &mut self,
        kind: GuardKind,
        name: String,
        expected_parent: GuardId,
        snapshot: Option<NodeRef>,
    ) -> GuardId {
        if self.heal_if_absent(kind) {
            return GuardId::NONE;
        }
        if let Some(top) = self.stack(kind).and_then(GuardStack::top)
            && top.id() != expected_parent
        {
            let violation = GuardError::NotTerminated {
                kind,
                current_id: top.id(),
                current_name: top.name().to_string(),
                new_name: name,
            };
            self.report_severe(&violation);
            return GuardId::NONE;
        }
        self.stack_mut(kind).push(name, snapshot)
    }

    /// Reinstall an empty stack if the slot is absent. Reports the recovery
    /// and returns whether it happened.
    fn heal_if_absent(&mut self, kind: GuardKind) -> bool {
        let slot = match kind {
            GuardKind::Transaction => &mut self.transactions,
            GuardKind::ClosedAction => &mut self.closed_actions,
        };
        if slot.is_some() {
            return false;
        }
        *slot = Some(GuardStack::new(kind));
        self.sink
            .report(Severity::Severe, &GuardError::AbsentState { kind }.to_string());
        true
    }

    fn stack(&self, kind: GuardKind) -> Option<&GuardStack> {
        match kind {
            GuardKind::Transaction => self.transactions.as_ref(),
            GuardKind::ClosedAction => self.closed_actions.as_ref(),
        }
    }

    fn stack_mut(&mut self, kind: GuardKind) -> &mut GuardStack {
        let slot = match kind {
            GuardKind::Transaction => &mut self.transactions,
            GuardKind::ClosedAction => &mut self.closed_actions,
        };
        slot.get_or_insert_with(|| GuardStack::new(kind))
    }

    fn report_severe(&self, violation: &GuardError) {
        self.sink.report(Severity::Severe, &violation.to_string());
    }

    fn warn_chain(&self, method: &str, err: &ChainError) {
        self.sink
            .report(Severity::Warning, &format!("{method}: {err}"));
    }

    pub(crate) fn chain(&self) -> &Chain<T> {
        &self.chain
    }

    pub(crate) fn chain_mut(&mut self) -> &mut Chain<T> {
        &mut self.chain
    }

    pub(crate) fn sink(&self) -> &Arc<dyn ReportSink> {
        &self.sink
    }
}

impl<T: PartialEq> GuardedList<T> {
    /// Scan forward from the current position for an element equal to
    /// `target`; on a match the cursor moves onto it. See [`Chain::find`].
    pub fn find(&mut self, target: &T, transaction: GuardId) -> bool {
        if self.admit("find", transaction, GuardId::NONE) {
            self.chain.find(target)
        } else {
            false
        }
    }
}

impl<T: Clone> GuardedList<T> {
    /// Clone the values in list order.
    pub fn to_vec(&self) -> Vec<T> {
        self.chain.to_vec()
    }

    /// Clone the portion of the list behind the current element into a raw
    /// chain, sort keys included.
    pub fn sub_list(&self) -> Chain<T> {
        self.chain.sub_list()
    }
}

impl<T: Display> GuardedList<T> {
    /// Render the values in list order.
    pub fn to_string_vec(&self) -> Vec<String> {
        self.chain.to_string_vec()
    }

    /// Render each element together with its sort key, one per line.
    pub fn index_dump(&self) -> String {
        self.chain.index_dump()
    }
}

impl<T> Default for GuardedList<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(any(test, feature = "testing"))]
impl<T> GuardedList<T> {
    /// Drop the transaction stack entirely, as if the internal state had been
    /// lost. The next guard touch heals and reports.
    pub fn corrupt_transaction_stack(&mut self) {
        self.transactions = None;
    }

    /// Drop the closed-action stack entirely, as if the internal state had
    /// been lost. The next guard touch heals and reports.
    pub fn corrupt_closed_action_stack(&mut self) {
        self.closed_actions = None;
    }

    /// Current transaction nesting depth.
    pub fn transaction_depth(&self) -> usize {
        self.transactions.as_ref().map_or(0, GuardStack::depth)
    }

    /// Current closed-action nesting depth.
    pub fn closed_action_depth(&self) -> usize {
        self.closed_actions.as_ref().map_or(0, GuardStack::depth)
    }
}
