//! Sorted list scenarios through the public API.

use guardlist::{GuardId, SortedList};

fn keyed_list(keys: &[f64]) -> SortedList<i64> {
    let mut list = SortedList::new();
    for i in 0..keys.len() {
        list.insert_sorted(i as i64, i as f64, GuardId::NONE);
    }
    list.to_first(GuardId::NONE, GuardId::NONE);
    for key in keys {
        list.change_sort_key(*key);
        list.next(GuardId::NONE, GuardId::NONE);
    }
    list
}

#[test]
fn ascending_inserts_interleave_into_key_order() {
    let mut list: SortedList<String> = SortedList::new();
    let entries = [("e", 5.0), ("a", 1.0), ("c", 3.0), ("d", 4.0), ("b", 2.0)];
    for (value, key) in entries {
        let tx = list.start_transaction("insert one", GuardId::NONE);
        list.insert_sorted(value.to_string(), key, tx);
        list.finish_transaction(tx);
    }
    assert_eq!(list.to_string_vec(), vec!["a", "b", "c", "d", "e"]);
    assert_eq!(list.sort_keys(), vec![1.0, 2.0, 3.0, 4.0, 5.0]);
}

#[test]
fn one_resort_sweep_is_not_a_full_sort() {
    let mut list = keyed_list(&[4.0, 1.0, 3.0, 2.0]);
    list.resort();
    assert_eq!(list.sort_keys(), vec![1.0, 3.0, 2.0, 4.0]);
}

#[test]
fn repeated_sweeps_converge_for_this_permutation() {
    let mut list = keyed_list(&[4.0, 1.0, 3.0, 2.0]);
    list.resort();
    list.resort();
    assert_eq!(list.sort_keys(), vec![1.0, 2.0, 3.0, 4.0]);
}

#[test]
fn sub_list_and_dump_reflect_the_sorted_state() {
    let mut list: SortedList<i64> = SortedList::new();
    for (value, key) in [(30, 3.0), (10, 1.0), (20, 2.0)] {
        list.insert_sorted(value, key, GuardId::NONE);
    }
    list.to_first(GuardId::NONE, GuardId::NONE);
    assert_eq!(list.sub_list().to_vec(), vec![20, 30]);
    assert_eq!(list.index_dump(), "10 @ 1\n20 @ 2\n30 @ 3");
}

#[test]
fn removal_keeps_the_remaining_order() {
    let mut list: SortedList<i64> = SortedList::new();
    for key in [1.0, 2.0, 3.0] {
        list.insert_sorted(key as i64, key, GuardId::NONE);
    }
    list.to_first(GuardId::NONE, GuardId::NONE);
    list.next(GuardId::NONE, GuardId::NONE);
    assert_eq!(list.remove(GuardId::NONE), Some(2));
    assert_eq!(list.to_vec(), vec![1, 3]);
    // The cursor stands on the predecessor; a new insert lands correctly.
    list.insert_sorted(2, 2.0, GuardId::NONE);
    assert_eq!(list.to_vec(), vec![1, 2, 3]);
}

#[test]
fn snapshots_round_trip_through_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("sorted.json");

    let mut list: SortedList<String> = SortedList::new();
    for (value, key) in [("late", 9.0), ("early", 1.0)] {
        list.insert_sorted(value.to_string(), key, GuardId::NONE);
    }
    list.to_first(GuardId::NONE, GuardId::NONE);
    list.save_to_file(&path).unwrap();

    let mut restored: SortedList<String> = SortedList::load_from_file(&path).unwrap();
    assert_eq!(restored.to_string_vec(), vec!["early", "late"]);
    assert_eq!(restored.get_item().map(String::as_str), Some("early"));

    // The restored list accepts further sorted inserts seamlessly.
    restored.insert_sorted("middle".to_string(), 5.0, GuardId::NONE);
    assert_eq!(restored.to_string_vec(), vec!["early", "middle", "late"]);
}

#[test]
fn guard_protocol_carries_through_the_sorted_wrapper() {
    let mut list: SortedList<i64> = SortedList::new();
    let tx = list.start_transaction("bulk", GuardId::NONE);
    list.insert_sorted(2, 2.0, tx);
    list.insert_sorted(1, 1.0, tx);

    let ca = list.start_closed_action("peek", GuardId::NONE);
    list.to_last(tx, ca);
    assert_eq!(list.get_item(), Some(&2));
    list.finish_closed_action(ca);

    assert_eq!(list.finish_transaction(tx), GuardId::NONE);
    assert_eq!(list.to_vec(), vec![1, 2]);
}
