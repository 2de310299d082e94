use std::fs;
use std::path::Path;

use directories::ProjectDirs;
use rusqlite::{params, Connection, OptionalExtension};

use super::{Store, StoreError};

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS kv (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
);
";

/// Durable backend: a single kv table in an embedded SQLite database.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        conn.execute_batch(SCHEMA)?;
        Ok(SqliteStore { conn })
    }

    /// Opens the database at the platform data directory, creating it on
    /// first use.
    pub fn open_default() -> Result<Self, StoreError> {
        let dirs = ProjectDirs::from("", "", "jotter").ok_or(StoreError::NoDataDir)?;
        let dir = dirs.data_dir();
        fs::create_dir_all(dir)?;
        Self::open(dir.join("jotter.db"))
    }

    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(SCHEMA)?;
        Ok(SqliteStore { conn })
    }
}

impl Store for SqliteStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let value = self
            .conn
            .query_row("SELECT value FROM kv WHERE key = ?1", params![key], |row| {
                row.get(0)
            })
            .optional()?;
        Ok(value)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.conn.execute(
            "INSERT INTO kv (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            params![key, value],
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_before_set_is_absent() {
        let store = SqliteStore::open_in_memory().unwrap();
        assert!(store.get("notes").unwrap().is_none());
    }

    #[test]
    fn set_overwrites_prior_value() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        store.set("darkMode", "true").unwrap();
        store.set("darkMode", "false").unwrap();
        assert_eq!(store.get("darkMode").unwrap().as_deref(), Some("false"));
    }

    #[test]
    fn values_survive_reopening_the_same_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("kv.db");

        {
            let mut store = SqliteStore::open(&path).unwrap();
            store.set("notes", "[]").unwrap();
        }

        let store = SqliteStore::open(&path).unwrap();
        assert_eq!(store.get("notes").unwrap().as_deref(), Some("[]"));
    }
}
