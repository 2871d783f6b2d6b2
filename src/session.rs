//! Construction root wiring the services together.
//!
//! A [`Session`] owns the gateway, the progression machine, the evidence
//! board and the onboarding sequencer, all sharing one slot store. The UI
//! layer calls plain methods here after user actions; the session calls back
//! through registered [`StateListener`]s when state changes. Zero listeners
//! is a perfectly fine number of listeners.
//!
//! Ordering inside [`Session::run_query`] is the observable contract:
//! execute, validate, persist the completion, then notify, so a listener
//! that re-reads state always sees the persisted version.

use std::sync::{Arc, Mutex};

use crate::casebook::{self, Case};
use crate::error::Result;
use crate::gateway::{Gateway, QueryResult};
use crate::history::{History, HistoryEntry};
use crate::onboarding::{Onboarding, OnboardingStep, StepTrigger};
use crate::progression::{CaseOutcome, CarriedForward, Progression, SharedSlots};
use crate::storage::SlotStore;

/// Observer interface for UI refresh hooks.
pub trait StateListener {
    fn case_solved(&self, _case: &Case, _message: &str) {}
    fn tables_unlocked(&self, _tables: &[&'static str]) {}
    fn query_recorded(&self, _entry: &HistoryEntry) {}
    fn state_reset(&self) {}
}

/// Everything one query run produced: the engine's answer plus, while the
/// investigation is still open, the verdict on the active case.
pub struct RunReport {
    pub result: QueryResult,
    pub outcome: Option<CaseOutcome>,
}

pub struct Session {
    gateway: Gateway,
    progression: Progression,
    history: History,
    onboarding: Onboarding,
    listeners: Vec<Box<dyn StateListener>>,
}

impl Session {
    /// Open a session over a freshly seeded engine, restoring whatever the
    /// given store remembers.
    pub fn open<S: SlotStore + Send + 'static>(store: S) -> Result<Self> {
        Self::with_storage(Arc::new(Mutex::new(store)))
    }

    /// Open over a shared store handle, e.g. one a test keeps for itself.
    pub fn with_storage(storage: SharedSlots) -> Result<Self> {
        let gateway = Gateway::open()?;
        let progression = Progression::load(Arc::clone(&storage));
        let history = History::load(Arc::clone(&storage));
        let onboarding = Onboarding::load(storage);
        Ok(Self {
            gateway,
            progression,
            history,
            onboarding,
            listeners: Vec::new(),
        })
    }

    pub fn register_listener(&mut self, listener: Box<dyn StateListener>) {
        self.listeners.push(listener);
    }

    /// The whole control flow of the game: run the text, judge the result
    /// against the active case, commit on success, record the query on the
    /// evidence board. Engine errors surface as errors; everything else is
    /// an outcome.
    pub fn run_query(&mut self, sql: &str) -> Result<RunReport> {
        let result = self.gateway.execute(sql)?;
        let active = self.progression.active_case();
        let mut outcome = None;
        if let Some(case) = active {
            let verdict = self.progression.validate_case_query(case.id, &result);
            if verdict.is_solved() {
                self.complete_case(case.id)?;
            }
            outcome = Some(verdict);
        }
        let (case_id, task) = match active {
            Some(case) => (Some(case.id), case.task),
            None => (None, ""),
        };
        if self.history.record(sql, &result, case_id, task)? {
            if let Some(entry) = self.history.entries().last() {
                for listener in &self.listeners {
                    listener.query_recorded(entry);
                }
            }
        }
        Ok(RunReport { result, outcome })
    }

    /// Commit a solved case: mark it, advance the cursor, persist, then let
    /// the listeners redraw. Solving the first case also dismisses the
    /// tutorial.
    pub fn complete_case(&mut self, case_id: u32) -> Result<bool> {
        let newly = self.progression.complete_case(case_id)?;
        if !newly {
            return Ok(false);
        }
        if casebook::case_index(case_id) == Some(0) {
            self.onboarding.dismiss()?;
        }
        if let Some(case) = casebook::case_by_id(case_id) {
            for listener in &self.listeners {
                listener.case_solved(case, case.completion);
            }
            if !case.unlocks.is_empty() {
                let tables = self.progression.unlocked_tables();
                for listener in &self.listeners {
                    listener.tables_unlocked(&tables);
                }
            }
        }
        Ok(true)
    }

    /// Speculative validation without committing anything.
    pub fn validate_case_query(&mut self, case_id: u32, result: &QueryResult) -> CaseOutcome {
        self.progression.validate_case_query(case_id, result)
    }

    pub fn active_case(&self) -> Option<&'static Case> {
        self.progression.active_case()
    }

    pub fn unlocked_tables(&self) -> Vec<&'static str> {
        self.progression.unlocked_tables()
    }

    pub fn carried(&self) -> &CarriedForward {
        self.progression.carried()
    }

    pub fn completed_cases(&self) -> Vec<u32> {
        self.progression.completed_cases()
    }

    pub fn finished(&self) -> bool {
        self.progression.finished()
    }

    pub fn history_entries(&self) -> &[HistoryEntry] {
        self.history.entries()
    }

    pub fn clear_history(&mut self) -> Result<()> {
        self.history.clear()
    }

    /// The tutorial step currently awaiting the player, if the first case
    /// is still open.
    pub fn onboarding_step(&self) -> Option<&'static OnboardingStep> {
        let gate_open = !self.progression.is_complete(casebook::CASEBOOK[0].id);
        self.onboarding.current_step(gate_open)
    }

    /// Forward an observed user action to the tutorial.
    pub fn report_onboarding(&mut self, trigger: StepTrigger) -> Result<bool> {
        let gate_open = !self.progression.is_complete(casebook::CASEBOOK[0].id);
        self.onboarding.report(trigger, gate_open)
    }

    /// Soft reset: progression only.
    pub fn soft_reset(&mut self) -> Result<()> {
        self.progression.reset()?;
        for listener in &self.listeners {
            listener.state_reset();
        }
        Ok(())
    }

    /// Full account wipe: progression, evidence board and tutorial flags,
    /// persisted slots included. Afterwards the session is indistinguishable
    /// from a first-ever run.
    pub fn hard_reset(&mut self) -> Result<()> {
        self.progression.reset()?;
        self.history.clear()?;
        self.onboarding.reset()?;
        for listener in &self.listeners {
            listener.state_reset();
        }
        Ok(())
    }
}
