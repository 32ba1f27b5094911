use anyhow::{Context, Result};
use chrono::Utc;
use rusqlite::{OptionalExtension, params};

use crate::db::Database;
use crate::models::Episode;

/// How long a cached catalog stays usable: 24 hours, in milliseconds.
pub const FRESH_FOR_MS: i64 = 24 * 60 * 60 * 1000;

/// Time-bounded cache over the `cache` table. Each key holds at most
/// one row: a JSON-serialized episode collection plus the millisecond
/// timestamp of the write. Reads only honor rows younger than
/// [`FRESH_FOR_MS`]; stale rows are ignored in place and replaced by
/// the next write, never deleted.
pub struct CatalogCache<'a> {
    db: &'a Database,
}

impl<'a> CatalogCache<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// Returns the cached collection for `key`, or `None` when the key
    /// was never written or its entry has gone stale. A row that is
    /// fresh but fails to decode is an error, not a miss.
    pub fn read(&self, key: &str) -> Result<Option<Vec<Episode>>> {
        let row: Option<(String, i64)> = self
            .db
            .conn()
            .query_row(
                "SELECT data, timestamp FROM cache WHERE id = ?1",
                params![key],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;

        let Some((data, written_at)) = row else {
            return Ok(None);
        };
        if Utc::now().timestamp_millis() - written_at >= FRESH_FOR_MS {
            return Ok(None);
        }

        let episodes = serde_json::from_str(&data)
            .with_context(|| format!("corrupt cache payload under key '{key}'"))?;
        Ok(Some(episodes))
    }

    /// Serializes `episodes` and stores it under `key` with the current
    /// timestamp, replacing any prior entry for that key.
    pub fn write(&self, key: &str, episodes: &[Episode]) -> Result<()> {
        let data = serde_json::to_string(episodes).context("failed to serialize episodes")?;
        let written_at = Utc::now().timestamp_millis();
        self.db.conn().execute(
            "INSERT OR REPLACE INTO cache (id, data, timestamp) VALUES (?1, ?2, ?3)",
            params![key, data, written_at],
        )?;
        Ok(())
    }
}
