//! Slot persistence, the local-storage analog.
//!
//! Three subsystems (progression, evidence board, onboarding) each own one
//! named slot holding a whole JSON document. A missing or unreadable slot is
//! treated as "empty": reads never fail, they fall back to `None` with a
//! warning, and the owning subsystem starts from its defaults.

use std::collections::HashMap;

use rusqlite::{Connection, Error, params};
use tracing::warn;

use crate::error::{Result, SleuthError};

pub trait SlotStore {
    /// Whole-blob read. Absence and corruption both come back as `None`.
    fn read(&self, slot: &str) -> Option<String>;
    fn write(&mut self, slot: &str, blob: &str) -> Result<()>;
    /// Removing a slot that does not exist is a no-op.
    fn remove(&mut self, slot: &str) -> Result<()>;
}

/// In-memory slots for first runs and tests.
#[derive(Debug, Default)]
pub struct MemorySlots {
    slots: HashMap<String, String>,
}

impl MemorySlots {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SlotStore for MemorySlots {
    fn read(&self, slot: &str) -> Option<String> {
        self.slots.get(slot).cloned()
    }
    fn write(&mut self, slot: &str, blob: &str) -> Result<()> {
        self.slots.insert(slot.to_string(), blob.to_string());
        Ok(())
    }
    fn remove(&mut self, slot: &str) -> Result<()> {
        self.slots.remove(slot);
        Ok(())
    }
}

/// File-backed slots in a single SQLite table.
pub struct SqliteSlots {
    db: Connection,
}

impl SqliteSlots {
    pub fn open(path: &str) -> Result<Self> {
        Self::prepare(Connection::open(path).map_err(|e| SleuthError::Storage(e.to_string()))?)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::prepare(
            Connection::open_in_memory().map_err(|e| SleuthError::Storage(e.to_string()))?,
        )
    }

    fn prepare(connection: Connection) -> Result<Self> {
        connection
            .execute_batch(
                "
            create table if not exists Slot (
                Slot_Name text not null,
                Slot_Value text not null,
                constraint unique_Slot_Name primary key (
                    Slot_Name
                )
            );
            ",
            )
            .map_err(|e| SleuthError::Storage(e.to_string()))?;
        Ok(Self { db: connection })
    }
}

impl SlotStore for SqliteSlots {
    fn read(&self, slot: &str) -> Option<String> {
        match self.db.query_row(
            "
            select Slot_Value
                from Slot
                where Slot_Name = ?
            ",
            params![slot],
            |row| row.get::<usize, String>(0),
        ) {
            Ok(blob) => Some(blob),
            Err(Error::QueryReturnedNoRows) => None,
            Err(error) => {
                warn!(%slot, %error, "slot unreadable, treating as empty");
                None
            }
        }
    }

    fn write(&mut self, slot: &str, blob: &str) -> Result<()> {
        self.db
            .execute(
                "
            insert into Slot (
                Slot_Name,
                Slot_Value
            ) values (?, ?)
            on conflict (Slot_Name) do update set Slot_Value = excluded.Slot_Value
            ",
                params![slot, blob],
            )
            .map_err(|e| SleuthError::Storage(e.to_string()))?;
        Ok(())
    }

    fn remove(&mut self, slot: &str) -> Result<()> {
        self.db
            .execute(
                "
            delete from Slot
                where Slot_Name = ?
            ",
                params![slot],
            )
            .map_err(|e| SleuthError::Storage(e.to_string()))?;
        Ok(())
    }
}
