use rusqlite::Connection;

use crate::error::Result;

pub const SCHEMA_VERSION: i64 = 1;

pub fn initialize(conn: &Connection) -> Result<()> {
    conn.execute_batch("PRAGMA journal_mode = WAL;")?;
    conn.pragma_update(None, "busy_timeout", 5000)?;

    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS metadata (
            key   TEXT PRIMARY KEY,
            value TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS visits (
            id            INTEGER PRIMARY KEY AUTOINCREMENT,
            visited_at_ms INTEGER NOT NULL
        );

        CREATE TABLE IF NOT EXISTS attention_records (
            item_id         TEXT PRIMARY KEY,
            view_count      INTEGER NOT NULL,
            total_dwell_ms  INTEGER NOT NULL,
            first_viewed_ms INTEGER NOT NULL,
            last_viewed_ms  INTEGER NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_attention_last_viewed
            ON attention_records(last_viewed_ms);
        ",
    )?;

    conn.execute(
        "INSERT OR REPLACE INTO metadata (key, value) VALUES ('schema_version', ?1)",
        [SCHEMA_VERSION.to_string()],
    )?;

    Ok(())
}
