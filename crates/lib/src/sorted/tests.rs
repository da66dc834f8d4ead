#[cfg(test)]
mod test_sorted {
    use std::sync::Arc;

    use crate::guard::GuardId;
    use crate::report::RecordingSink;
    use crate::sorted::SortedList;

    fn recorded_list() -> (SortedList<i32>, Arc<RecordingSink>) {
        let sink = Arc::new(RecordingSink::new());
        (SortedList::with_sink(sink.clone()), sink)
    }

    /// Build a list whose key sequence is exactly `keys`, attaching the
    /// element's position in `keys` as its value.
    fn keyed_list(keys: &[f64]) -> SortedList<i32> {
        let mut list = SortedList::new();
        for i in 0..keys.len() {
            list.insert_sorted(i as i32, i as f64, GuardId::NONE);
        }
        list.to_first(GuardId::NONE, GuardId::NONE);
        for key in keys {
            list.change_sort_key(*key);
            list.next(GuardId::NONE, GuardId::NONE);
        }
        list
    }

    #[test]
    fn insert_sorted_ascending_orders_the_list() {
        let (mut list, sink) = recorded_list();
        for key in [5.0, 1.0, 3.0] {
            list.insert_sorted(key as i32, key, GuardId::NONE);
        }
        assert_eq!(list.to_vec(), vec![1, 3, 5]);
        assert_eq!(list.sort_keys(), vec![1.0, 3.0, 5.0]);
        assert!(sink.is_empty());
    }

    #[test]
    fn insert_sorted_with_equal_keys_appends_behind_the_peer() {
        let (mut list, _sink) = recorded_list();
        list.insert_sorted(1, 1.0, GuardId::NONE);
        list.insert_sorted(2, 1.0, GuardId::NONE);
        list.insert_sorted(3, 0.0, GuardId::NONE);
        assert_eq!(list.to_vec(), vec![3, 1, 2]);
        assert_eq!(list.sort_keys(), vec![0.0, 1.0, 1.0]);
    }

    #[test]
    fn insert_sorted_nests_under_the_callers_transaction() {
        let (mut list, sink) = recorded_list();
        let tx = list.start_transaction("bulk load", GuardId::NONE);
        list.insert_sorted(2, 2.0, tx);
        list.insert_sorted(1, 1.0, tx);
        assert_eq!(list.finish_transaction(tx), GuardId::NONE);
        assert_eq!(list.to_vec(), vec![1, 2]);
        assert!(sink.is_empty());
    }

    #[test]
    fn find_sorted_lands_before_the_first_greater_or_equal_key() {
        let mut list = keyed_list(&[1.0, 3.0, 5.0]);
        list.to_first(GuardId::NONE, GuardId::NONE);
        list.previous(GuardId::NONE, GuardId::NONE);
        assert!(list.is_in_front_of());
        list.find_sorted(4.0, GuardId::NONE, GuardId::NONE);
        assert_eq!(list.sort_key_at_cursor(), Some(5.0));
    }

    #[test]
    fn find_sorted_retries_from_the_ends_at_boundaries() {
        let mut list = keyed_list(&[1.0, 3.0, 5.0]);
        // Behind the list, searching for a small key walks back to the front.
        list.to_last(GuardId::NONE, GuardId::NONE);
        list.next(GuardId::NONE, GuardId::NONE);
        assert!(list.is_behind());
        list.find_sorted(0.0, GuardId::NONE, GuardId::NONE);
        assert!(list.is_in_front_of());

        // Searching past the largest key walks behind the list.
        list.find_sorted(9.0, GuardId::NONE, GuardId::NONE);
        assert!(list.is_behind());
    }

    #[test]
    fn resort_performs_exactly_one_sweep() {
        let mut list = keyed_list(&[4.0, 1.0, 3.0, 2.0]);
        list.resort();
        // One sweep only carries the maximum to the end; 3 and 2 stay out of
        // order.
        assert_eq!(list.sort_keys(), vec![1.0, 3.0, 2.0, 4.0]);
        assert_eq!(list.to_vec(), vec![1, 2, 3, 0]);

        // A second sweep finishes the job for this permutation.
        list.resort();
        assert_eq!(list.sort_keys(), vec![1.0, 2.0, 3.0, 4.0]);
    }

    #[test]
    fn resort_keeps_an_ordered_list_unchanged() {
        let (mut list, sink) = recorded_list();
        for key in [1.0, 2.0, 3.0] {
            list.insert_sorted(key as i32, key, GuardId::NONE);
        }
        list.resort();
        assert_eq!(list.sort_keys(), vec![1.0, 2.0, 3.0]);
        assert!(sink.is_empty());
    }

    #[test]
    fn resort_with_equal_keys_does_not_swap_ascending() {
        let mut list = keyed_list(&[2.0, 2.0, 1.0]);
        list.resort();
        // The strict comparison leaves the equal pair alone and carries the
        // running maximum (the second 2) past the 1.
        assert_eq!(list.sort_keys(), vec![2.0, 1.0, 2.0]);
        assert_eq!(list.to_vec(), vec![0, 2, 1]);
    }

    #[test]
    fn resort_descending_carries_the_minimum_to_the_end() {
        let mut list: SortedList<i32> = SortedList::new();
        list.set_descending();
        for i in 0..4 {
            list.insert_sorted(i, f64::from(i), GuardId::NONE);
        }
        list.to_first(GuardId::NONE, GuardId::NONE);
        for key in [1.0, 3.0, 2.0, 4.0] {
            list.change_sort_key(key);
            list.next(GuardId::NONE, GuardId::NONE);
        }
        list.resort();
        assert_eq!(list.sort_keys(), vec![3.0, 2.0, 4.0, 1.0]);
    }

    #[test]
    fn resort_on_empty_list_is_a_no_op() {
        let (mut list, sink) = recorded_list();
        list.resort();
        assert!(list.is_empty());
        assert!(sink.is_empty());
    }

    #[test]
    fn sort_order_is_only_settable_while_empty() {
        let (mut list, sink) = recorded_list();
        list.set_descending();
        assert!(!list.is_ascending());
        list.set_ascending();
        assert!(list.is_ascending());
        assert!(sink.is_empty());

        list.insert_sorted(1, 1.0, GuardId::NONE);
        list.set_descending();
        assert!(list.is_ascending());
        assert!(sink.contains("refusing to change the sort order"));
    }

    #[test]
    fn change_sort_key_at_boundary_is_refused_with_a_warning() {
        let (mut list, sink) = recorded_list();
        list.insert_sorted(1, 1.0, GuardId::NONE);
        list.to_last(GuardId::NONE, GuardId::NONE);
        list.next(GuardId::NONE, GuardId::NONE);
        assert!(list.is_behind());
        list.change_sort_key(7.0);
        assert_eq!(list.sort_keys(), vec![1.0]);
        assert!(sink.contains("sort key"));
    }

    #[test]
    fn fail_closed_insert_sorted_neither_hangs_nor_mutates() {
        use crate::list::Enforcement;

        let (mut list, sink) = recorded_list();
        for key in [1.0, 2.0, 3.0] {
            list.insert_sorted(key as i32, key, GuardId::NONE);
        }
        list.set_enforcement(Enforcement::FailClosed);

        // A foreign transaction holds the list; the internal transaction of
        // insert_sorted cannot start and every inner call is refused.
        let held = list.start_transaction("held", GuardId::NONE);
        list.insert_sorted(9, 1.5, GuardId::NONE);
        assert_eq!(list.to_vec(), vec![1, 2, 3]);
        assert_eq!(list.sort_keys(), vec![1.0, 2.0, 3.0]);
        assert!(!sink.is_empty());
        list.finish_transaction(held);
    }

    #[test]
    fn descending_insert_mirrors_the_scan() {
        let (mut list, _sink) = recorded_list();
        list.set_descending();
        list.insert_sorted(10, 10.0, GuardId::NONE);
        list.insert_sorted(5, 5.0, GuardId::NONE);
        // The backward scan walks in front of the 10 and the element lands at
        // the first position.
        assert_eq!(list.to_vec(), vec![5, 10]);
    }

    #[test]
    fn closed_action_walk_over_a_sorted_list_restores_the_cursor() {
        let mut list = keyed_list(&[1.0, 2.0, 3.0]);
        list.to_first(GuardId::NONE, GuardId::NONE);
        let ca = list.start_closed_action("inspect", GuardId::NONE);
        list.find_sorted(3.0, GuardId::NONE, ca);
        assert_eq!(list.sort_key_at_cursor(), Some(3.0));
        list.finish_closed_action(ca);
        assert_eq!(list.sort_key_at_cursor(), Some(1.0));
    }

    #[test]
    fn fill_random_supplies_single_digit_keys() {
        let mut list: SortedList<String> = SortedList::new();
        list.fill_random(20);
        assert_eq!(list.len(), 20);
        let keys = list.sort_keys();
        assert!(keys.iter().all(|k| (0.0..10.0).contains(k)));

        // One ascending sweep moves the running maximum to the end.
        list.resort();
        let resorted = list.sort_keys();
        let max = resorted.iter().cloned().fold(f64::MIN, f64::max);
        assert_eq!(resorted.last().copied(), Some(max));
    }

    #[test]
    fn save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("list.json");

        let mut list = keyed_list(&[2.0, 1.0]);
        list.to_first(GuardId::NONE, GuardId::NONE);
        list.save_to_file(&path).unwrap();

        let restored: SortedList<i32> = SortedList::load_from_file(&path).unwrap();
        assert_eq!(restored.to_vec(), list.to_vec());
        assert_eq!(restored.sort_keys(), vec![2.0, 1.0]);
        assert!(restored.is_ascending());
        assert_eq!(restored.get_item(), list.get_item());
    }

    #[test]
    fn load_of_a_missing_file_yields_an_empty_list() {
        let dir = tempfile::tempdir().unwrap();
        let list: SortedList<i32> =
            SortedList::load_from_file(dir.path().join("absent.json")).unwrap();
        assert!(list.is_empty());
        assert!(list.is_ascending());
    }

    #[test]
    fn load_rejects_an_unknown_snapshot_version() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("future.json");

        let mut list = keyed_list(&[1.0]);
        list.save_to_file(&path).unwrap();
        let tampered = std::fs::read_to_string(&path)
            .unwrap()
            .replacen("\"_v\": 1", "\"_v\": 99", 1);
        std::fs::write(&path, tampered).unwrap();

        let err = SortedList::<i32>::load_from_file(&path).unwrap_err();
        assert!(err.is_serialization_error());
        assert!(err.to_string().contains("version"));
    }

    #[test]
    fn descending_flag_survives_the_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("desc.json");

        let mut list: SortedList<i32> = SortedList::new();
        list.set_descending();
        list.insert_sorted(1, 1.0, GuardId::NONE);
        list.save_to_file(&path).unwrap();

        let restored: SortedList<i32> = SortedList::load_from_file(&path).unwrap();
        assert!(!restored.is_ascending());
        assert_eq!(restored.to_vec(), vec![1]);
    }
}
