//! Property-based tests for server-side task ordering.
//!
//! Uses proptest to verify:
//! 1. `sort_tasks` yields a non-decreasing sequence for either key.
//! 2. The sort is stable: tasks with equal keys keep their input order.
//! 3. The sort is a permutation: no task is lost or duplicated.
//! 4. `SortKey::from_query` never panics and only recognizes known values.

use chrono::{DateTime, TimeZone, Utc};
use proptest::prelude::*;
use tasklist_proto::api::{SortKey, sort_tasks};
use tasklist_proto::task::{Task, TaskId};
use uuid::Uuid;

// --- Strategies ---

/// A small range of timestamps so equal keys are common.
fn arb_datetime() -> impl Strategy<Value = DateTime<Utc>> {
    (0i64..16).prop_map(|day| {
        Utc.timestamp_opt(1_750_000_000 + day * 86_400, 0)
            .single()
            .unwrap_or_default()
    })
}

fn arb_task() -> impl Strategy<Value = Task> {
    (
        any::<u128>(),
        "[a-z]{1,12}",
        arb_datetime(),
        arb_datetime(),
        any::<bool>(),
    )
        .prop_map(|(id, title, due_date, created_on, completed)| Task {
            id: TaskId::from_uuid(Uuid::from_u128(id)),
            description: format!("{title} description"),
            title,
            due_date,
            created_on,
            completed,
        })
}

fn arb_sort_key() -> impl Strategy<Value = SortKey> {
    prop_oneof![Just(SortKey::DueDate), Just(SortKey::CreatedOn)]
}

fn key_of(task: &Task, key: SortKey) -> DateTime<Utc> {
    match key {
        SortKey::DueDate => task.due_date,
        SortKey::CreatedOn => task.created_on,
    }
}

proptest! {
    #[test]
    fn sorted_output_is_non_decreasing(
        tasks in prop::collection::vec(arb_task(), 0..32),
        key in arb_sort_key(),
    ) {
        let mut sorted = tasks;
        sort_tasks(&mut sorted, key);
        for pair in sorted.windows(2) {
            prop_assert!(key_of(&pair[0], key) <= key_of(&pair[1], key));
        }
    }

    #[test]
    fn equal_keys_keep_input_order(
        tasks in prop::collection::vec(arb_task(), 0..32),
        key in arb_sort_key(),
    ) {
        let positions: Vec<TaskId> = tasks.iter().map(|t| t.id).collect();
        let index_of = |id: TaskId| positions.iter().position(|p| *p == id);

        let mut sorted = tasks.clone();
        sort_tasks(&mut sorted, key);
        for pair in sorted.windows(2) {
            if key_of(&pair[0], key) == key_of(&pair[1], key) {
                prop_assert!(index_of(pair[0].id) < index_of(pair[1].id));
            }
        }
    }

    #[test]
    fn sort_is_a_permutation(
        tasks in prop::collection::vec(arb_task(), 0..32),
        key in arb_sort_key(),
    ) {
        let mut sorted = tasks.clone();
        sort_tasks(&mut sorted, key);
        prop_assert_eq!(sorted.len(), tasks.len());
        for task in &tasks {
            let expected = tasks.iter().filter(|t| *t == task).count();
            let actual = sorted.iter().filter(|t| *t == task).count();
            prop_assert_eq!(expected, actual);
        }
    }

    #[test]
    fn unknown_sort_values_mean_natural_order(value in "\\PC{0,24}") {
        let parsed = SortKey::from_query(&value);
        let known = matches!(value.as_str(), "dueDate" | "dateCreated" | "createdOn");
        prop_assert_eq!(parsed.is_some(), known);
    }
}

#[test]
fn query_values_round_trip() {
    for key in [SortKey::DueDate, SortKey::CreatedOn] {
        assert_eq!(SortKey::from_query(key.as_query()), Some(key));
    }
}
