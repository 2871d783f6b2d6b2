//! The evidence board: an append-only ledger of executed queries.
//!
//! Every successfully executed query lands here once, keyed by the pair of
//! query text and case context, with its full result payload, so the board
//! can replay what the player proved and when. The whole ledger is one JSON
//! blob in its own slot, rewritten after every append and removed on clear.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{Result, SleuthError};
use crate::gateway::QueryResult;
use crate::progression::{OtherHasher, SharedSlots};
use crate::storage::SlotStore;

pub const HISTORY_SLOT: &str = "sleuth.history";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// Time-based id, bumped past the previous entry on collision.
    pub id: i64,
    pub query: String,
    pub result: QueryResult,
    pub case_id: Option<u32>,
    pub task: String,
    pub recorded_at: DateTime<Utc>,
    pub row_count: usize,
}

pub struct History {
    storage: SharedSlots,
    entries: Vec<HistoryEntry>,
    seen: HashSet<(String, Option<u32>), OtherHasher>,
}

impl History {
    /// Restore the ledger from its slot, or start empty. Never fails.
    pub fn load(storage: SharedSlots) -> Self {
        let blob = match storage.lock() {
            Ok(slots) => slots.read(HISTORY_SLOT),
            Err(_) => None,
        };
        let entries: Vec<HistoryEntry> = match blob {
            Some(text) => match serde_json::from_str(&text) {
                Ok(entries) => entries,
                Err(error) => {
                    warn!(%error, "saved history unreadable, starting empty");
                    Vec::new()
                }
            },
            None => Vec::new(),
        };
        let seen = entries
            .iter()
            .map(|entry| (entry.query.clone(), entry.case_id))
            .collect();
        Self {
            storage,
            entries,
            seen,
        }
    }

    /// Append a query to the board. Returns false (and records nothing)
    /// when the same query was already recorded for the same case.
    pub fn record(
        &mut self,
        query: &str,
        result: &QueryResult,
        case_id: Option<u32>,
        task: &str,
    ) -> Result<bool> {
        if !self.seen.insert((query.to_string(), case_id)) {
            return Ok(false);
        }
        let now = Utc::now();
        let stamp = now.timestamp_millis();
        let id = match self.entries.last() {
            Some(previous) if previous.id >= stamp => previous.id + 1,
            _ => stamp,
        };
        self.entries.push(HistoryEntry {
            id,
            query: query.to_string(),
            result: result.clone(),
            case_id,
            task: task.to_string(),
            recorded_at: now,
            row_count: result.row_count(),
        });
        self.save()?;
        Ok(true)
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn clear(&mut self) -> Result<()> {
        self.entries.clear();
        self.seen.clear();
        self.storage
            .lock()
            .map_err(|e| SleuthError::Lock(e.to_string()))?
            .remove(HISTORY_SLOT)
    }

    fn save(&self) -> Result<()> {
        let blob = serde_json::to_string(&self.entries)
            .map_err(|e| SleuthError::Storage(e.to_string()))?;
        self.storage
            .lock()
            .map_err(|e| SleuthError::Lock(e.to_string()))?
            .write(HISTORY_SLOT, &blob)
    }
}
