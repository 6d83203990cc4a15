//! SQLite-backed key-value storage for client state.
//!
//! Two tables with the same shape:
//! - `kv`: persistent entries (medications, events, notifications, ...)
//! - `session_kv`: entries that only live until logout or `end_session`

use std::path::Path;

use rusqlite::{params, Connection, OptionalExtension};

use super::data_dir;
use crate::error::StorageError;

/// Lifetime of a stored entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    Persistent,
    Session,
}

impl Scope {
    fn table(self) -> &'static str {
        match self {
            Scope::Persistent => "kv",
            Scope::Session => "session_kv",
        }
    }
}

/// SQLite database for client state.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Get a reference to the underlying SQLite connection.
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Open the database at `<data_dir>/eldercare.db`.
    ///
    /// Creates the database file and schema if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open() -> Result<Self, StorageError> {
        Self::open_at(&data_dir()?.join("eldercare.db"))
    }

    /// Open (or create) the database at an explicit path.
    pub fn open_at(path: &Path) -> Result<Self, StorageError> {
        let conn = Connection::open(path).map_err(|source| StorageError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    /// Open an in-memory database.
    pub fn open_memory() -> Result<Self, StorageError> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    fn migrate(&self) -> Result<(), rusqlite::Error> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS kv (
                key   TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS session_kv (
                key   TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );",
        )?;
        Ok(())
    }

    /// Get a value from the given scope.
    pub fn get(&self, scope: Scope, key: &str) -> Result<Option<String>, StorageError> {
        let sql = format!("SELECT value FROM {} WHERE key = ?1", scope.table());
        let value = self
            .conn
            .query_row(&sql, params![key], |row| row.get::<_, String>(0))
            .optional()?;
        Ok(value)
    }

    /// Set a value in the given scope.
    pub fn set(&self, scope: Scope, key: &str, value: &str) -> Result<(), StorageError> {
        let sql = format!(
            "INSERT OR REPLACE INTO {} (key, value) VALUES (?1, ?2)",
            scope.table()
        );
        self.conn.execute(&sql, params![key, value])?;
        Ok(())
    }

    /// Remove a value from the given scope. Missing keys are not an error.
    pub fn remove(&self, scope: Scope, key: &str) -> Result<(), StorageError> {
        let sql = format!("DELETE FROM {} WHERE key = ?1", scope.table());
        self.conn.execute(&sql, params![key])?;
        Ok(())
    }

    /// Get a value from the persistent scope.
    pub fn kv_get(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.get(Scope::Persistent, key)
    }

    /// Set a value in the persistent scope.
    pub fn kv_set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.set(Scope::Persistent, key, value)
    }

    /// Drop every session-scoped entry.
    pub fn end_session(&self) -> Result<(), StorageError> {
        self.conn.execute("DELETE FROM session_kv", [])?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kv_store() {
        let db = Database::open_memory().unwrap();
        assert!(db.kv_get("test").unwrap().is_none());
        db.kv_set("test", "hello").unwrap();
        assert_eq!(db.kv_get("test").unwrap().unwrap(), "hello");
        db.kv_set("test", "again").unwrap();
        assert_eq!(db.kv_get("test").unwrap().unwrap(), "again");
    }

    #[test]
    fn scopes_are_independent() {
        let db = Database::open_memory().unwrap();
        db.set(Scope::Session, "token", "s").unwrap();
        assert!(db.get(Scope::Persistent, "token").unwrap().is_none());
        db.set(Scope::Persistent, "token", "p").unwrap();
        assert_eq!(db.get(Scope::Session, "token").unwrap().as_deref(), Some("s"));
    }

    #[test]
    fn end_session_keeps_persistent_entries() {
        let db = Database::open_memory().unwrap();
        db.set(Scope::Session, "token", "s").unwrap();
        db.set(Scope::Persistent, "medications", "[]").unwrap();
        db.end_session().unwrap();
        assert!(db.get(Scope::Session, "token").unwrap().is_none());
        assert!(db.kv_get("medications").unwrap().is_some());
    }

    #[test]
    fn remove_missing_key_is_ok() {
        let db = Database::open_memory().unwrap();
        db.remove(Scope::Persistent, "nothing").unwrap();
    }

    #[test]
    fn open_at_persists_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("eldercare.db");
        {
            let db = Database::open_at(&path).unwrap();
            db.kv_set("events", "[]").unwrap();
        }
        let db = Database::open_at(&path).unwrap();
        assert_eq!(db.kv_get("events").unwrap().as_deref(), Some("[]"));
    }
}
