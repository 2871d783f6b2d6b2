use std::sync::{Arc, Mutex};

use sleuth::casebook::{KEY_CODE, KEY_TARGET_CASE};
use sleuth::gateway::{QueryResult, Value};
use sleuth::progression::{CaseOutcome, Progression, SharedSlots};
use sleuth::storage::MemorySlots;

fn shared() -> SharedSlots {
    Arc::new(Mutex::new(MemorySlots::new()))
}

fn grid(columns: &[&str], rows: Vec<Vec<Value>>) -> QueryResult {
    QueryResult {
        columns: columns.iter().map(|column| column.to_string()).collect(),
        rows,
    }
}

fn text(value: &str) -> Value {
    Value::Text(value.to_string())
}

fn receipt_result() -> QueryResult {
    grid(
        &["case_id", "case_title", "location", "summary"],
        vec![vec![
            Value::Integer(1),
            text("The Phantom Receipt"),
            text("Beika"),
            text("On its back, in pencil: locker code B7."),
        ]],
    )
}

#[test]
fn empty_result_is_rejected_without_state_change() {
    let mut progression = Progression::load(shared());
    let empty = grid(&["case_id"], Vec::new());
    assert_eq!(
        progression.validate_case_query(1, &empty),
        CaseOutcome::NoResults
    );
    let no_columns = grid(&[], vec![vec![Value::Integer(1)]]);
    assert_eq!(
        progression.validate_case_query(1, &no_columns),
        CaseOutcome::NoResults
    );
    assert_eq!(progression.cursor(), 0);
    assert!(progression.carried().is_empty());
}

#[test]
fn unknown_case_is_rejected() {
    let mut progression = Progression::load(shared());
    let outcome = progression.validate_case_query(42, &receipt_result());
    assert_eq!(outcome, CaseOutcome::UnknownCase { case_id: 42 });
}

#[test]
fn code_is_extracted_from_the_first_case() {
    let mut progression = Progression::load(shared());
    let outcome = progression.validate_case_query(1, &receipt_result());
    assert!(outcome.is_solved(), "unexpected outcome: {outcome}");
    let code = progression
        .carried()
        .get(KEY_CODE)
        .and_then(|value| value.as_str());
    assert_eq!(code, Some("B7"));
    // Validation judges; it does not close the case or move the cursor.
    assert_eq!(progression.cursor(), 0);
    assert!(!progression.is_complete(1));
}

#[test]
fn second_case_rejected_before_the_first_ever_succeeded() {
    let mut progression = Progression::load(shared());
    let result = grid(
        &["case_id", "case_title", "summary"],
        vec![vec![
            Value::Integer(2),
            text("The Locker Room"),
            text("Locker B7 stood open at dawn."),
        ]],
    );
    assert_eq!(
        progression.validate_case_query(2, &result),
        CaseOutcome::Mismatch
    );
    assert_eq!(progression.cursor(), 0);
    assert!(progression.carried().is_empty());
}

#[test]
fn second_case_consumes_the_carried_code() {
    let mut progression = Progression::load(shared());
    assert!(
        progression
            .validate_case_query(1, &receipt_result())
            .is_solved()
    );
    let result = grid(
        &["case_id", "case_title", "summary"],
        vec![
            vec![
                Value::Integer(1),
                text("The Phantom Receipt"),
                text("locker code B7"),
            ],
            vec![
                Value::Integer(2),
                text("The Locker Room"),
                text("Locker B7 stood open at dawn."),
            ],
        ],
    );
    assert!(progression.validate_case_query(2, &result).is_solved());
    let target = progression
        .carried()
        .get(KEY_TARGET_CASE)
        .and_then(|value| value.as_i64());
    assert_eq!(target, Some(2));
}

#[test]
fn already_closed_case_is_rejected() {
    let mut progression = Progression::load(shared());
    progression.complete_case(1).expect("complete");
    assert_eq!(
        progression.validate_case_query(1, &receipt_result()),
        CaseOutcome::AlreadySolved { case_id: 1 }
    );
}

#[test]
fn row_minimum_is_reported_with_counts() {
    let mut progression = Progression::load(shared());
    let result = grid(
        &["item", "note"],
        vec![vec![text("claim ticket"), text("no time here")]],
    );
    assert_eq!(
        progression.validate_case_query(3, &result),
        CaseOutcome::NotEnoughRows {
            required: 2,
            actual: 1
        }
    );
}

#[test]
fn missing_required_columns_are_a_mismatch() {
    let mut progression = Progression::load(shared());
    let result = grid(&["case_id"], vec![vec![Value::Integer(1)]]);
    assert_eq!(
        progression.validate_case_query(1, &result),
        CaseOutcome::Mismatch
    );
}

#[test]
fn failed_predicate_leaves_carried_values_untouched() {
    let mut progression = Progression::load(shared());
    let result = grid(
        &["case_title", "summary"],
        vec![vec![text("The Phantom Receipt"), text("no code anywhere")]],
    );
    assert_eq!(
        progression.validate_case_query(1, &result),
        CaseOutcome::Mismatch
    );
    assert!(progression.carried().is_empty());
}

#[test]
fn ordering_case_compares_the_first_two_rows() {
    let mut progression = Progression::load(shared());
    let descending = grid(
        &["case_title", "severity"],
        vec![
            vec![text("The Midnight Cargo"), Value::Integer(5)],
            vec![text("The Locker Room"), Value::Integer(4)],
        ],
    );
    assert!(progression.validate_case_query(4, &descending).is_solved());

    let mut fresh = Progression::load(shared());
    let ascending = grid(
        &["case_title", "severity"],
        vec![
            vec![text("The Borrowed Key"), Value::Integer(1)],
            vec![text("The Locker Room"), Value::Integer(4)],
        ],
    );
    assert_eq!(
        fresh.validate_case_query(4, &ascending),
        CaseOutcome::Mismatch
    );
}
