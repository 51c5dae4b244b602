//! SQLite-backed implementation of the core `Persistence` trait.
//!
//! The ledger saves full snapshots; each save replaces everything inside
//! one transaction. After committing, the database size is checked against
//! the ledger's ceiling and reported as `OverCapacity` so the caller can
//! prune and save again smaller.

use std::path::Path;

use rusqlite::{Connection, OptionalExtension, params};

use rift_core::constants::STATE_SIZE_LIMIT_BYTES;
use rift_core::ledger::{AttentionRecord, LedgerState, PatternCounts};
use rift_core::ports::{PersistError, Persistence};

use crate::error::{Result, StoreError};
use crate::schema;

pub struct Store {
    conn: Connection,
}

impl Store {
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;
        schema::initialize(&conn)?;
        Ok(Self { conn })
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        schema::initialize(&conn)?;
        Ok(Self { conn })
    }

    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    // --- Metadata ---

    pub fn get_metadata(&self, key: &str) -> Result<Option<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT value FROM metadata WHERE key = ?1")?;
        let result = stmt.query_row([key], |row| row.get(0)).optional()?;
        Ok(result)
    }

    fn get_metadata_u64(&self, key: &str) -> Result<u64> {
        match self.get_metadata(key)? {
            Some(value) => value
                .parse()
                .map_err(|_| StoreError::InvalidData(format!("metadata {key}: {value}"))),
            None => Ok(0),
        }
    }

    fn set_metadata_on(&self, conn: &Connection, key: &str, value: &str) -> Result<()> {
        conn.execute(
            "INSERT OR REPLACE INTO metadata (key, value) VALUES (?1, ?2)",
            params![key, value],
        )?;
        Ok(())
    }

    // --- Save ---

    pub fn save_state(&self, state: &LedgerState) -> Result<()> {
        let tx = self.conn.unchecked_transaction()?;

        tx.execute_batch("DELETE FROM visits; DELETE FROM attention_records;")?;

        self.set_metadata_on(&tx, "ledger_version", &state.version.to_string())?;
        self.set_metadata_on(&tx, "visit_count", &state.visits.count.to_string())?;
        self.set_metadata_on(&tx, "first_visit_ms", &state.visits.first_ms.to_string())?;
        self.set_metadata_on(&tx, "last_visit_ms", &state.visits.last_ms.to_string())?;
        self.set_metadata_on(&tx, "total_gaze_ms", &state.total_gaze_ms.to_string())?;
        self.set_metadata_on(&tx, "total_dwell_ms", &state.total_dwell_ms.to_string())?;
        self.set_metadata_on(&tx, "patterns_scanning", &state.patterns.scanning.to_string())?;
        self.set_metadata_on(&tx, "patterns_dwelling", &state.patterns.dwelling.to_string())?;
        self.set_metadata_on(
            &tx,
            "patterns_returning",
            &state.patterns.returning.to_string(),
        )?;

        for timestamp in &state.visits.timestamps {
            tx.execute(
                "INSERT INTO visits (visited_at_ms) VALUES (?1)",
                [*timestamp as i64],
            )?;
        }

        for (item_id, record) in &state.items {
            tx.execute(
                "INSERT INTO attention_records
                    (item_id, view_count, total_dwell_ms, first_viewed_ms, last_viewed_ms)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    item_id,
                    record.view_count,
                    record.total_dwell_ms as i64,
                    record.first_viewed_ms as i64,
                    record.last_viewed_ms as i64,
                ],
            )?;
        }

        tx.commit()?;

        let bytes = self.db_size()?;
        if bytes as usize > STATE_SIZE_LIMIT_BYTES {
            tracing::warn!(bytes, "attention database over size ceiling");
            return Err(StoreError::OverCapacity { bytes });
        }
        Ok(())
    }

    // --- Load ---

    /// Load the saved ledger, or `None` for a never-written database.
    pub fn load_state(&self) -> Result<Option<LedgerState>> {
        let Some(version) = self.get_metadata("ledger_version")? else {
            return Ok(None);
        };
        let version = version
            .parse()
            .map_err(|_| StoreError::InvalidData(format!("ledger_version: {version}")))?;

        let mut stmt = self
            .conn
            .prepare("SELECT visited_at_ms FROM visits ORDER BY id")?;
        let timestamps: Vec<u64> = stmt
            .query_map([], |row| row.get::<_, i64>(0).map(|v| v as u64))?
            .collect::<std::result::Result<_, _>>()?;

        let mut stmt = self.conn.prepare(
            "SELECT item_id, view_count, total_dwell_ms, first_viewed_ms, last_viewed_ms
             FROM attention_records",
        )?;
        let items = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    AttentionRecord {
                        view_count: row.get(1)?,
                        total_dwell_ms: row.get::<_, i64>(2)? as u64,
                        first_viewed_ms: row.get::<_, i64>(3)? as u64,
                        last_viewed_ms: row.get::<_, i64>(4)? as u64,
                    },
                ))
            })?
            .collect::<std::result::Result<_, _>>()?;

        let state = LedgerState {
            version,
            visits: rift_core::ledger::VisitStats {
                count: self.get_metadata_u64("visit_count")? as u32,
                first_ms: self.get_metadata_u64("first_visit_ms")?,
                last_ms: self.get_metadata_u64("last_visit_ms")?,
                timestamps,
            },
            total_gaze_ms: self.get_metadata_u64("total_gaze_ms")?,
            total_dwell_ms: self.get_metadata_u64("total_dwell_ms")?,
            items,
            patterns: PatternCounts {
                scanning: self.get_metadata_u64("patterns_scanning")? as u32,
                dwelling: self.get_metadata_u64("patterns_dwelling")? as u32,
                returning: self.get_metadata_u64("patterns_returning")? as u32,
            },
        };
        Ok(Some(state))
    }

    /// Current database footprint in bytes.
    pub fn db_size(&self) -> Result<u64> {
        let page_count: i64 = self
            .conn
            .query_row("PRAGMA page_count", [], |row| row.get(0))?;
        let page_size: i64 = self
            .conn
            .query_row("PRAGMA page_size", [], |row| row.get(0))?;
        Ok((page_count * page_size) as u64)
    }
}

impl Persistence for Store {
    fn load(&mut self) -> std::result::Result<Option<LedgerState>, PersistError> {
        self.load_state().map_err(|e| PersistError(e.to_string()))
    }

    fn save(&mut self, state: &LedgerState) -> std::result::Result<(), PersistError> {
        self.save_state(state)
            .map_err(|e| PersistError(e.to_string()))
    }
}
