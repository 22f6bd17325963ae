//! SQLite frontier implementation
//!
//! One table, one row per URL ever queued. The unique index on the URL makes
//! `add` idempotent, and WAL mode keeps readers cheap while workers funnel
//! writes through the session mutex.

use crate::frontier::{EntryState, Frontier, FrontierCounts, FrontierError, FrontierResult};
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use url::Url;

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS frontier (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    url         TEXT NOT NULL UNIQUE,
    state       TEXT NOT NULL DEFAULT 'pending',
    added_at    TEXT NOT NULL,
    updated_at  TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_frontier_state ON frontier(state);
";

/// SQLite-backed frontier
pub struct SqliteFrontier {
    conn: Connection,
}

impl SqliteFrontier {
    /// Opens (or creates) a frontier database at the given path
    ///
    /// Entries left InProgress by a previous run are returned to Pending so
    /// interrupted work is retried rather than stranded.
    pub fn open(path: &Path) -> FrontierResult<Self> {
        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA temp_store = MEMORY;
        ",
        )?;

        let mut frontier = Self { conn };
        frontier.initialize()?;
        Ok(frontier)
    }

    /// Creates an in-memory frontier (for testing)
    pub fn open_in_memory() -> FrontierResult<Self> {
        let conn = Connection::open_in_memory()?;
        let mut frontier = Self { conn };
        frontier.initialize()?;
        Ok(frontier)
    }

    /// Deletes every entry, giving a fresh crawl a clean queue
    pub fn clear(&mut self) -> FrontierResult<()> {
        self.conn.execute("DELETE FROM frontier", [])?;
        Ok(())
    }

    fn initialize(&mut self) -> FrontierResult<()> {
        self.conn.execute_batch(SCHEMA)?;
        self.reset_interrupted()?;
        Ok(())
    }

    /// Returns interrupted (in-progress) entries to pending
    fn reset_interrupted(&mut self) -> FrontierResult<()> {
        let reset = self.conn.execute(
            "UPDATE frontier SET state = 'pending', updated_at = ?1 WHERE state = 'in_progress'",
            params![Utc::now().to_rfc3339()],
        )?;
        if reset > 0 {
            tracing::info!("Returned {} interrupted entries to pending", reset);
        }
        Ok(())
    }

    fn set_state(&mut self, url: &Url, from: EntryState, to: EntryState) -> FrontierResult<()> {
        self.conn.execute(
            "UPDATE frontier SET state = ?1, updated_at = ?2 WHERE url = ?3 AND state = ?4",
            params![
                to.to_db_string(),
                Utc::now().to_rfc3339(),
                url.as_str(),
                from.to_db_string()
            ],
        )?;
        Ok(())
    }

    fn count_state(&self, state: EntryState) -> FrontierResult<u64> {
        let count: u64 = self.conn.query_row(
            "SELECT COUNT(*) FROM frontier WHERE state = ?1",
            params![state.to_db_string()],
            |row| row.get(0),
        )?;
        Ok(count)
    }
}

impl Frontier for SqliteFrontier {
    fn get_next(&mut self) -> FrontierResult<Option<Url>> {
        let row: Option<(i64, String)> = self
            .conn
            .query_row(
                "SELECT id, url FROM frontier WHERE state = 'pending' ORDER BY id LIMIT 1",
                [],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;

        let (id, url_str) = match row {
            Some(r) => r,
            None => return Ok(None),
        };

        self.conn.execute(
            "UPDATE frontier SET state = 'in_progress', updated_at = ?1 WHERE id = ?2",
            params![Utc::now().to_rfc3339(), id],
        )?;

        let url = Url::parse(&url_str).map_err(|e| {
            FrontierError::CorruptEntry(format!("stored URL '{}' unparsable: {}", url_str, e))
        })?;

        Ok(Some(url))
    }

    fn add(&mut self, url: &Url) -> FrontierResult<()> {
        let now = Utc::now().to_rfc3339();
        self.conn.execute(
            "INSERT OR IGNORE INTO frontier (url, state, added_at, updated_at)
             VALUES (?1, 'pending', ?2, ?2)",
            params![url.as_str(), now],
        )?;
        Ok(())
    }

    fn mark_done(&mut self, url: &Url) -> FrontierResult<()> {
        self.set_state(url, EntryState::InProgress, EntryState::Done)
    }

    fn mark_failed(&mut self, url: &Url) -> FrontierResult<()> {
        self.set_state(url, EntryState::InProgress, EntryState::Failed)
    }

    fn requeue(&mut self, url: &Url) -> FrontierResult<()> {
        self.set_state(url, EntryState::InProgress, EntryState::Pending)
    }

    fn counts(&self) -> FrontierResult<FrontierCounts> {
        Ok(FrontierCounts {
            pending: self.count_state(EntryState::Pending)?,
            in_progress: self.count_state(EntryState::InProgress)?,
            done: self.count_state(EntryState::Done)?,
            failed: self.count_state(EntryState::Failed)?,
        })
    }
}
