//! Scripted first-case tutorial sequencer.
//!
//! Ten fixed steps walk a new player from reading the console to the
//! evidence board. Observing the player (clicks, typing) belongs to the UI
//! collaborator; the core only receives the resulting [`StepTrigger`] via
//! [`Onboarding::report`] and advances when it matches the current step.
//! The tutorial is gated to the first case: the caller passes whether the
//! gate is still open, and solving case one dismisses the tutorial for good.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{Result, SleuthError};
use crate::progression::SharedSlots;
use crate::storage::SlotStore;

pub const ONBOARDING_SLOT: &str = "sleuth.onboarding";

/// User actions the UI layer can observe and report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepTrigger {
    OpenEditor,
    OpenSchema,
    TypeQuery,
    RunQuery,
    ReadResults,
    OpenBuilder,
    PickColumn,
    AddCondition,
    RunBuilderQuery,
    OpenHistory,
}

pub struct OnboardingStep {
    pub ordinal: usize,
    pub title: &'static str,
    pub prompt: &'static str,
    pub trigger: StepTrigger,
}

pub static STEPS: [OnboardingStep; 10] = [
    OnboardingStep {
        ordinal: 1,
        title: "The console",
        prompt: "This is where queries are written. Click into the editor to begin.",
        trigger: StepTrigger::OpenEditor,
    },
    OnboardingStep {
        ordinal: 2,
        title: "Know your tables",
        prompt: "Open the schema panel to see which tables the archive has released.",
        trigger: StepTrigger::OpenSchema,
    },
    OnboardingStep {
        ordinal: 3,
        title: "Ask in SQL",
        prompt: "Type a SELECT statement against case_files.",
        trigger: StepTrigger::TypeQuery,
    },
    OnboardingStep {
        ordinal: 4,
        title: "Run it",
        prompt: "Execute the query and let the engine answer.",
        trigger: StepTrigger::RunQuery,
    },
    OnboardingStep {
        ordinal: 5,
        title: "Read the results",
        prompt: "Scan the rows that came back. The details matter in this line of work.",
        trigger: StepTrigger::ReadResults,
    },
    OnboardingStep {
        ordinal: 6,
        title: "The builder",
        prompt: "Prefer not to type? Open the visual query builder.",
        trigger: StepTrigger::OpenBuilder,
    },
    OnboardingStep {
        ordinal: 7,
        title: "Pick columns",
        prompt: "Drag a column onto the canvas to select it.",
        trigger: StepTrigger::PickColumn,
    },
    OnboardingStep {
        ordinal: 8,
        title: "Narrow it down",
        prompt: "Add a condition to filter the rows.",
        trigger: StepTrigger::AddCondition,
    },
    OnboardingStep {
        ordinal: 9,
        title: "Run the built query",
        prompt: "Execute what the builder assembled for you.",
        trigger: StepTrigger::RunBuilderQuery,
    },
    OnboardingStep {
        ordinal: 10,
        title: "The evidence board",
        prompt: "Open the board to see every query you have proven so far.",
        trigger: StepTrigger::OpenHistory,
    },
];

#[derive(Debug, Default, Serialize, Deserialize)]
struct SavedOnboarding {
    finished: bool,
    step: usize,
}

pub struct Onboarding {
    storage: SharedSlots,
    finished: bool,
    step: usize,
}

impl Onboarding {
    /// Restore the flags from their slot, or start at the first step.
    pub fn load(storage: SharedSlots) -> Self {
        let blob = match storage.lock() {
            Ok(slots) => slots.read(ONBOARDING_SLOT),
            Err(_) => None,
        };
        let saved = match blob {
            Some(text) => match serde_json::from_str::<SavedOnboarding>(&text) {
                Ok(saved) => saved,
                Err(error) => {
                    warn!(%error, "saved onboarding flags unreadable, restarting tutorial");
                    SavedOnboarding::default()
                }
            },
            None => SavedOnboarding::default(),
        };
        Self {
            storage,
            finished: saved.finished,
            step: saved.step.min(STEPS.len()),
        }
    }

    /// The step awaiting the player, or `None` when the tutorial is done or
    /// the first-case gate has closed.
    pub fn current_step(&self, gate_open: bool) -> Option<&'static OnboardingStep> {
        if self.finished || !gate_open {
            return None;
        }
        STEPS.get(self.step)
    }

    /// Feed an observed action in. Advances (and persists) only when the
    /// action matches the current step; anything else is ignored.
    pub fn report(&mut self, trigger: StepTrigger, gate_open: bool) -> Result<bool> {
        let step = match self.current_step(gate_open) {
            Some(step) => step,
            None => return Ok(false),
        };
        if step.trigger != trigger {
            return Ok(false);
        }
        self.step += 1;
        if self.step >= STEPS.len() {
            self.finished = true;
        }
        self.save()?;
        Ok(true)
    }

    /// Close the tutorial permanently, whatever step it was on.
    pub fn dismiss(&mut self) -> Result<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;
        self.save()
    }

    pub fn finished(&self) -> bool {
        self.finished
    }

    pub fn reset(&mut self) -> Result<()> {
        self.finished = false;
        self.step = 0;
        self.storage
            .lock()
            .map_err(|e| SleuthError::Lock(e.to_string()))?
            .remove(ONBOARDING_SLOT)
    }

    fn save(&self) -> Result<()> {
        let saved = SavedOnboarding {
            finished: self.finished,
            step: self.step,
        };
        let blob =
            serde_json::to_string(&saved).map_err(|e| SleuthError::Storage(e.to_string()))?;
        self.storage
            .lock()
            .map_err(|e| SleuthError::Lock(e.to_string()))?
            .write(ONBOARDING_SLOT, &blob)
    }
}
