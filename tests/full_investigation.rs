use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use sleuth::casebook::{KEY_CODE, KEY_SUSPECT, KEY_TARGET_CASE, KEY_TIMESTAMP, KEY_WITNESS};
use sleuth::history::HISTORY_SLOT;
use sleuth::onboarding::{ONBOARDING_SLOT, StepTrigger};
use sleuth::progression::{PROGRESS_SLOT, SharedSlots};
use sleuth::session::{Session, StateListener};
use sleuth::storage::{MemorySlots, SlotStore};

/// One handwritten solution per case, in case order.
const CASE_QUERIES: [&str; 10] = [
    "select * from case_files where case_id = 1",
    "select case_id, case_title, summary from case_files where summary like '%B7%'",
    "select item, note from evidence where case_id = 2 and is_key = 1",
    "select case_title, severity from case_files order by severity desc",
    "select name, suspicion from suspects where case_id = 2 order by suspicion desc",
    "select name, alibi from suspects where name = 'Goro Tanuma'",
    "select witness, reliability, statement from witness_statements \
     where case_id = 2 and reliability >= 4 order by reliability desc",
    "select witness, statement from witness_statements where witness = 'Aya Kline'",
    "select item, note from evidence where note like '%B7%'",
    "select name, suspicion from suspects where name = 'Goro Tanuma' order by suspicion desc",
];

fn shared() -> SharedSlots {
    Arc::new(Mutex::new(MemorySlots::new()))
}

#[derive(Default)]
struct Counters {
    solved: AtomicUsize,
    unlocked: AtomicUsize,
    recorded: AtomicUsize,
    resets: AtomicUsize,
}

struct CountingListener {
    counters: Arc<Counters>,
}

impl StateListener for CountingListener {
    fn case_solved(&self, _case: &sleuth::casebook::Case, _message: &str) {
        self.counters.solved.fetch_add(1, Ordering::SeqCst);
    }
    fn tables_unlocked(&self, _tables: &[&'static str]) {
        self.counters.unlocked.fetch_add(1, Ordering::SeqCst);
    }
    fn query_recorded(&self, _entry: &sleuth::history::HistoryEntry) {
        self.counters.recorded.fetch_add(1, Ordering::SeqCst);
    }
    fn state_reset(&self) {
        self.counters.resets.fetch_add(1, Ordering::SeqCst);
    }
}

#[test]
fn the_whole_investigation_can_be_solved() {
    let mut session = Session::with_storage(shared()).expect("session");
    for (index, query) in CASE_QUERIES.iter().enumerate() {
        let case = session.active_case().expect("an open case");
        assert_eq!(case.id as usize, index + 1, "cursor out of step");
        let report = session.run_query(query).expect("query ok");
        let outcome = report.outcome.expect("a verdict");
        assert!(
            outcome.is_solved(),
            "case {} rejected its solution: {}",
            case.id,
            outcome
        );
    }
    assert!(session.finished());
    assert!(session.active_case().is_none());
    assert_eq!(session.completed_cases(), (1..=10).collect::<Vec<u32>>());

    let carried = session.carried();
    let text = |key: &str| carried.get(key).and_then(|value| value.as_str());
    assert_eq!(text(KEY_CODE), Some("B7"));
    assert_eq!(text(KEY_TIMESTAMP), Some("21:45"));
    assert_eq!(text(KEY_SUSPECT), Some("Goro Tanuma"));
    assert_eq!(text(KEY_WITNESS), Some("Aya Kline"));
    assert_eq!(
        carried.get(KEY_TARGET_CASE).and_then(|value| value.as_i64()),
        Some(2)
    );

    assert_eq!(session.history_entries().len(), 10);
}

#[test]
fn tables_unlock_at_the_documented_milestones() {
    let mut session = Session::with_storage(shared()).expect("session");
    assert_eq!(session.unlocked_tables(), vec!["case_files"]);
    for (index, query) in CASE_QUERIES.iter().enumerate() {
        session.run_query(query).expect("query ok");
        let tables = session.unlocked_tables();
        let solved = index + 1;
        assert_eq!(tables.contains(&"evidence"), solved >= 2);
        assert_eq!(tables.contains(&"suspects"), solved >= 4);
        assert_eq!(tables.contains(&"witness_statements"), solved >= 6);
    }
}

#[test]
fn listeners_hear_about_every_change() {
    let counters = Arc::new(Counters::default());
    let mut session = Session::with_storage(shared()).expect("session");
    session.register_listener(Box::new(CountingListener {
        counters: Arc::clone(&counters),
    }));
    for query in &CASE_QUERIES[..4] {
        session.run_query(query).expect("query ok");
    }
    assert_eq!(counters.solved.load(Ordering::SeqCst), 4);
    // Cases 2 and 4 carry unlock lists.
    assert_eq!(counters.unlocked.load(Ordering::SeqCst), 2);
    assert_eq!(counters.recorded.load(Ordering::SeqCst), 4);
    session.hard_reset().expect("reset");
    assert_eq!(counters.resets.load(Ordering::SeqCst), 1);
}

#[test]
fn progress_resumes_in_a_new_session() {
    let storage = shared();
    {
        let mut session = Session::with_storage(Arc::clone(&storage)).expect("session");
        for query in &CASE_QUERIES[..3] {
            session.run_query(query).expect("query ok");
        }
    }
    let session = Session::with_storage(storage).expect("session");
    assert_eq!(session.active_case().map(|case| case.id), Some(4));
    assert_eq!(session.completed_cases(), vec![1, 2, 3]);
    assert_eq!(session.history_entries().len(), 3);
}

#[test]
fn solving_the_first_case_dismisses_the_tutorial() {
    let mut session = Session::with_storage(shared()).expect("session");
    assert_eq!(
        session.onboarding_step().map(|step| step.ordinal),
        Some(1)
    );
    assert!(session.report_onboarding(StepTrigger::OpenEditor).expect("report"));
    session.run_query(CASE_QUERIES[0]).expect("query ok");
    assert!(session.onboarding_step().is_none());
    assert!(!session.report_onboarding(StepTrigger::OpenSchema).expect("report"));
}

#[test]
fn hard_reset_wipes_all_three_subsystems() {
    let storage = shared();
    let mut session = Session::with_storage(Arc::clone(&storage)).expect("session");
    session.report_onboarding(StepTrigger::OpenEditor).expect("report");
    session.run_query(CASE_QUERIES[0]).expect("query ok");
    session.run_query(CASE_QUERIES[1]).expect("query ok");
    {
        let slots = storage.lock().unwrap();
        assert!(slots.read(PROGRESS_SLOT).is_some());
        assert!(slots.read(HISTORY_SLOT).is_some());
        assert!(slots.read(ONBOARDING_SLOT).is_some());
    }

    session.hard_reset().expect("reset");

    {
        let slots = storage.lock().unwrap();
        assert!(slots.read(PROGRESS_SLOT).is_none());
        assert!(slots.read(HISTORY_SLOT).is_none());
        assert!(slots.read(ONBOARDING_SLOT).is_none());
    }
    assert_eq!(session.active_case().map(|case| case.id), Some(1));
    assert!(session.completed_cases().is_empty());
    assert!(session.carried().is_empty());
    assert!(session.history_entries().is_empty());
    assert_eq!(session.onboarding_step().map(|step| step.ordinal), Some(1));
}

#[test]
fn a_failed_attempt_does_not_move_the_investigation() {
    let mut session = Session::with_storage(shared()).expect("session");
    let report = session
        .run_query("select case_id, case_title, location from case_files where case_id = 3")
        .expect("query ok");
    let outcome = report.outcome.expect("a verdict");
    assert!(!outcome.is_solved());
    assert_eq!(session.active_case().map(|case| case.id), Some(1));
    assert!(session.completed_cases().is_empty());
    // The attempt still lands on the evidence board.
    assert_eq!(session.history_entries().len(), 1);
}
