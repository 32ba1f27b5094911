use std::path::Path;

use anyhow::{Context, Result};
use rusqlite::{Connection, params};

/// Owns the single SQLite connection for a run. Both the catalog cache
/// and the watched set live in this database; the connection is opened
/// once and released when the `Database` drops, on every exit path.
pub struct Database {
    conn: Connection,
}

impl Database {
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("failed to create database directory {}", parent.display())
            })?;
        }
        let conn = Connection::open(path)
            .with_context(|| format!("failed to open database at {}", path.display()))?;
        Ok(Self { conn })
    }

    #[cfg(test)]
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().context("failed to open in-memory database")?;
        Ok(Self { conn })
    }

    pub fn migrate(&self) -> Result<()> {
        self.conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS cache (
                id TEXT PRIMARY KEY,
                data TEXT NOT NULL,
                timestamp INTEGER NOT NULL
            );
            CREATE TABLE IF NOT EXISTS watched_episodes (
                id INTEGER PRIMARY KEY
            );
            "#,
        )?;
        Ok(())
    }

    pub(crate) fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Records an episode id as already suggested. Marking the same id
    /// twice is tolerated and leaves the set unchanged.
    pub fn mark_watched(&self, episode_id: i64) -> Result<()> {
        self.conn.execute(
            "INSERT OR IGNORE INTO watched_episodes (id) VALUES (?1)",
            params![episode_id],
        )?;
        Ok(())
    }

    pub fn watched_ids(&self) -> Result<Vec<i64>> {
        let mut stmt = self.conn.prepare("SELECT id FROM watched_episodes")?;
        let rows = stmt.query_map([], |row| row.get::<_, i64>(0))?;

        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }

    /// Clears the watched set, returning how many ids were forgotten.
    pub fn reset_watched(&self) -> Result<usize> {
        let cleared = self.conn.execute("DELETE FROM watched_episodes", [])?;
        Ok(cleared)
    }
}
