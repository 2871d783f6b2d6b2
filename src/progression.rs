//! Case progression state machine.
//!
//! Ten ordered cases, a cursor walking through them, a set of closed case
//! ids, and a map of values one case extracts for a later one to consume.
//! Validation is speculative: [`Progression::validate_case_query`] judges a
//! query result against the case's descriptor without closing anything, and
//! [`Progression::complete_case`] commits the transition in a separate call.
//! The state is persisted to its slot after every mutation and restored (or
//! defaulted, never failed) at startup.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::hash::BuildHasherDefault;
use std::sync::{Arc, Mutex};

use seahash::SeaHasher;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::casebook::{self, Case};
use crate::dataset;
use crate::error::{Result, SleuthError};
use crate::gateway::QueryResult;
use crate::storage::SlotStore;

pub type OtherHasher = BuildHasherDefault<SeaHasher>;

/// Values extracted by one case's validator for a later case to read.
/// String keys, string-or-number values.
pub type CarriedForward = HashMap<String, Carried, OtherHasher>;

/// Shared handle to whichever slot store the session opened.
pub type SharedSlots = Arc<Mutex<dyn SlotStore + Send>>;

pub const PROGRESS_SLOT: &str = "sleuth.progress";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Carried {
    Num(i64),
    Text(String),
}

impl Carried {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Carried::Text(t) => Some(t),
            Carried::Num(_) => None,
        }
    }
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Carried::Num(n) => Some(*n),
            Carried::Text(_) => None,
        }
    }
}

impl fmt::Display for Carried {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Carried::Num(n) => write!(f, "{}", n),
            Carried::Text(t) => write!(f, "{}", t),
        }
    }
}

/// What `validate_case_query` decided about a result.
#[derive(Debug, Clone, PartialEq)]
pub enum CaseOutcome {
    Solved { message: String },
    NoResults,
    UnknownCase { case_id: u32 },
    AlreadySolved { case_id: u32 },
    NotEnoughRows { required: usize, actual: usize },
    Mismatch,
}

impl CaseOutcome {
    pub fn is_solved(&self) -> bool {
        matches!(self, CaseOutcome::Solved { .. })
    }
}

impl fmt::Display for CaseOutcome {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            CaseOutcome::Solved { message } => write!(f, "{}", message),
            CaseOutcome::NoResults => {
                write!(f, "The query returned no results. Adjust it and run again.")
            }
            CaseOutcome::UnknownCase { case_id } => {
                write!(f, "Case {} is not on the board.", case_id)
            }
            CaseOutcome::AlreadySolved { case_id } => {
                write!(f, "Case {} is already closed.", case_id)
            }
            CaseOutcome::NotEnoughRows { required, actual } => write!(
                f,
                "Expected at least {} rows, but the query returned {}.",
                required, actual
            ),
            CaseOutcome::Mismatch => {
                write!(f, "The results do not match the requirements of this case.")
            }
        }
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct SavedProgress {
    cursor: usize,
    completed: Vec<u32>,
    carried: CarriedForward,
}

pub struct Progression {
    storage: SharedSlots,
    cursor: usize,
    completed: HashSet<u32, OtherHasher>,
    carried: CarriedForward,
}

impl Progression {
    /// Restore from the slot, or start fresh when the slot is absent or
    /// unreadable. Never fails.
    pub fn load(storage: SharedSlots) -> Self {
        let mut progression = Self {
            storage,
            cursor: 0,
            completed: HashSet::default(),
            carried: CarriedForward::default(),
        };
        progression.restore();
        progression
    }

    fn restore(&mut self) {
        let blob = match self.storage.lock() {
            Ok(slots) => slots.read(PROGRESS_SLOT),
            Err(_) => None,
        };
        if let Some(text) = blob {
            match serde_json::from_str::<SavedProgress>(&text) {
                Ok(saved) => {
                    self.cursor = saved.cursor.min(casebook::CASEBOOK.len());
                    self.completed = saved.completed.into_iter().collect();
                    self.carried = saved.carried;
                }
                Err(error) => {
                    warn!(%error, "saved progress unreadable, starting over");
                }
            }
        }
        self.repair();
    }

    /// A crash between marking a case complete and persisting the advanced
    /// cursor leaves the cursor pointing at an already-closed case. Move it
    /// past the highest completed case and persist the correction.
    fn repair(&mut self) {
        let highest = self
            .completed
            .iter()
            .filter_map(|id| casebook::case_index(*id))
            .max();
        if let Some(index) = highest {
            if index >= self.cursor {
                self.cursor = index + 1;
                if let Err(error) = self.save() {
                    warn!(%error, "repaired progress not saved");
                }
            }
        }
    }

    fn save(&self) -> Result<()> {
        let mut completed: Vec<u32> = self.completed.iter().copied().collect();
        completed.sort_unstable();
        let saved = SavedProgress {
            cursor: self.cursor,
            completed,
            carried: self.carried.clone(),
        };
        let blob =
            serde_json::to_string(&saved).map_err(|e| SleuthError::Storage(e.to_string()))?;
        self.storage
            .lock()
            .map_err(|e| SleuthError::Lock(e.to_string()))?
            .write(PROGRESS_SLOT, &blob)
    }

    /// Judge a query result against a case. Checks run in a fixed order:
    /// empty result, unknown case, already closed, row minimum, required
    /// columns, predicate. The predicate works on a scratch copy of the
    /// carried-forward map; only a fully successful validation commits it,
    /// so failed attempts leave no trace and can be retried freely.
    pub fn validate_case_query(&mut self, case_id: u32, result: &QueryResult) -> CaseOutcome {
        if result.is_empty() {
            return CaseOutcome::NoResults;
        }
        let case = match casebook::case_by_id(case_id) {
            Some(case) => case,
            None => return CaseOutcome::UnknownCase { case_id },
        };
        if self.completed.contains(&case_id) {
            return CaseOutcome::AlreadySolved { case_id };
        }
        if result.row_count() < case.validation.min_rows {
            return CaseOutcome::NotEnoughRows {
                required: case.validation.min_rows,
                actual: result.row_count(),
            };
        }
        for column in case.validation.required_columns {
            if result.column_index(column).is_none() {
                return CaseOutcome::Mismatch;
            }
        }
        let mut scratch = self.carried.clone();
        if (case.validation.predicate)(result, &mut scratch) {
            self.carried = scratch;
            if let Err(error) = self.save() {
                warn!(%error, "progress not saved");
            }
            CaseOutcome::Solved {
                message: case.completion.to_string(),
            }
        } else {
            CaseOutcome::Mismatch
        }
    }

    /// Close a case. Idempotent: returns false when the case was already
    /// closed (or does not exist) and nothing changed. Advances the cursor
    /// only when the closed case is the one the cursor points at.
    pub fn complete_case(&mut self, case_id: u32) -> Result<bool> {
        let index = match casebook::case_index(case_id) {
            Some(index) => index,
            None => return Ok(false),
        };
        if !self.completed.insert(case_id) {
            return Ok(false);
        }
        if index == self.cursor {
            self.cursor = (self.cursor + 1).min(casebook::CASEBOOK.len());
        }
        info!(case_id, cursor = self.cursor, "case closed");
        self.save()?;
        Ok(true)
    }

    /// Tables the query builder may offer, as a pure function of the cursor:
    /// the base table plus the unlock lists of every case behind the cursor.
    /// Monotonically non-decreasing as the cursor advances.
    pub fn unlocked_tables(&self) -> Vec<&'static str> {
        let mut tables = vec![dataset::BASE_TABLE];
        let reached = self.cursor.min(casebook::CASEBOOK.len());
        for case in &casebook::CASEBOOK[..reached] {
            for table in case.unlocks {
                if !tables.contains(table) {
                    tables.push(table);
                }
            }
        }
        tables
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// The case the player is on, or `None` once every case is closed.
    pub fn active_case(&self) -> Option<&'static Case> {
        casebook::CASEBOOK.get(self.cursor)
    }

    pub fn is_complete(&self, case_id: u32) -> bool {
        self.completed.contains(&case_id)
    }

    pub fn completed_cases(&self) -> Vec<u32> {
        let mut ids: Vec<u32> = self.completed.iter().copied().collect();
        ids.sort_unstable();
        ids
    }

    pub fn carried(&self) -> &CarriedForward {
        &self.carried
    }

    /// All ten cases closed.
    pub fn finished(&self) -> bool {
        self.cursor >= casebook::CASEBOOK.len()
    }

    /// Soft reset: back to a first run for this subsystem only.
    pub fn reset(&mut self) -> Result<()> {
        self.cursor = 0;
        self.completed.clear();
        self.carried.clear();
        self.storage
            .lock()
            .map_err(|e| SleuthError::Lock(e.to_string()))?
            .remove(PROGRESS_SLOT)
    }
}
