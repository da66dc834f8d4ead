//! Guard protocol scenarios through the public API.
//!
//! These tests observe the protocol the way a caller can: through return
//! values and list state. Message-level assertions live in the unit tests
//! next to the implementation.

use guardlist::{Enforcement, GuardId, GuardedList};

#[test]
fn a_view_like_caller_walks_and_edits_under_guards() {
    let mut list: GuardedList<&str> = GuardedList::new();

    let tx = list.start_transaction("populate", GuardId::NONE);
    for name in ["alpha", "beta", "gamma"] {
        list.insert_at_the_end(name, tx);
    }
    list.to_first(tx, GuardId::NONE);
    assert_eq!(list.finish_transaction(tx), GuardId::NONE);

    // An inspection pass over the whole list, bracketed by a closed action so
    // the caller's position survives it.
    let ca = list.start_closed_action("inspect", GuardId::NONE);
    let mut seen = Vec::new();
    while !list.is_behind() {
        if let Some(item) = list.get_item() {
            seen.push(*item);
        }
        list.next(GuardId::NONE, ca);
    }
    assert_eq!(seen, vec!["alpha", "beta", "gamma"]);
    list.finish_closed_action(ca);

    // Still standing on the first element.
    assert_eq!(list.get_item(), Some(&"alpha"));
}

#[test]
fn nested_transactions_unwind_in_order() {
    let mut list: GuardedList<i32> = GuardedList::new();
    let outer = list.start_transaction("outer", GuardId::NONE);
    let inner = list.start_transaction("inner", outer);
    list.insert_behind(1, inner);

    // Unwinding out of order echoes the still-active id instead of popping.
    assert_eq!(list.finish_transaction(outer), inner);
    assert_eq!(list.finish_transaction(inner), outer);
    assert_eq!(list.finish_transaction(outer), GuardId::NONE);
    assert_eq!(list.to_vec(), vec![1]);
}

#[test]
fn rejected_start_is_detectable_from_the_return_value() {
    let mut list: GuardedList<i32> = GuardedList::new();
    let open = list.start_transaction("open", GuardId::NONE);
    let refused = list.start_transaction("conflicting", GuardId::NONE);
    assert!(refused.is_none());
    list.finish_transaction(open);
}

#[test]
fn log_only_lists_execute_foreign_calls_fail_closed_lists_do_not() {
    let mut advisory: GuardedList<i32> = GuardedList::new();
    let tx = advisory.start_transaction("held", GuardId::NONE);
    advisory.insert_behind(1, GuardId::NONE);
    assert_eq!(advisory.to_vec(), vec![1]);
    advisory.finish_transaction(tx);

    let mut enforcing: GuardedList<i32> = GuardedList::new();
    enforcing.set_enforcement(Enforcement::FailClosed);
    let tx = enforcing.start_transaction("held", GuardId::NONE);
    enforcing.insert_behind(1, GuardId::NONE);
    assert!(enforcing.is_empty());
    enforcing.insert_behind(1, tx);
    assert_eq!(enforcing.to_vec(), vec![1]);
    enforcing.finish_transaction(tx);
}

#[test]
fn closed_action_snapshot_survives_interleaved_navigation() {
    let mut list: GuardedList<i32> = GuardedList::new();
    for v in 1..=5 {
        list.insert_at_the_end(v, GuardId::NONE);
    }
    list.to_first(GuardId::NONE, GuardId::NONE);
    list.next(GuardId::NONE, GuardId::NONE);
    list.next(GuardId::NONE, GuardId::NONE);
    assert_eq!(list.get_item(), Some(&3));

    let ca = list.start_closed_action("detour", GuardId::NONE);
    list.to_first(GuardId::NONE, ca);
    list.to_last(GuardId::NONE, ca);
    for _ in 0..10 {
        list.previous(GuardId::NONE, ca);
    }
    assert!(list.is_in_front_of());
    list.finish_closed_action(ca);

    assert_eq!(list.get_item(), Some(&3));
}

#[test]
fn find_positions_the_cursor_for_replacement() {
    let mut list: GuardedList<String> = GuardedList::new();
    for name in ["one", "two", "three"] {
        list.insert_at_the_end(name.to_string(), GuardId::NONE);
    }
    list.to_first(GuardId::NONE, GuardId::NONE);

    assert!(list.find(&"two".to_string(), GuardId::NONE));
    let old = list.replace("TWO".to_string(), GuardId::NONE);
    assert_eq!(old.as_deref(), Some("two"));
    assert_eq!(list.to_string_vec(), vec!["one", "TWO", "three"]);

    list.to_first(GuardId::NONE, GuardId::NONE);
    assert!(!list.find(&"missing".to_string(), GuardId::NONE));
    assert!(list.is_behind());
}
