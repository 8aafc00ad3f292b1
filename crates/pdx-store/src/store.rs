//! Connection handling and schema migration.

use crate::StoreError;
use parking_lot::Mutex;
use rusqlite::Connection;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Schema, indexes, and the three aggregate-maintenance triggers.
///
/// The UPDATE trigger recomputes `alive_count` with a correlated COUNT;
/// linear in the profile size, which is fine for the hundreds-to-thousands
/// of configs a profile actually holds.
const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS profiles (
    id              INTEGER PRIMARY KEY AUTOINCREMENT,
    name            TEXT    NOT NULL,
    source          TEXT    NOT NULL UNIQUE,
    type            TEXT    NOT NULL DEFAULT 'mixed',
    config_count    INTEGER NOT NULL DEFAULT 0,
    alive_count     INTEGER NOT NULL DEFAULT 0,
    last_synced_at  DATETIME,
    created_at      DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP,
    updated_at      DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP
);

CREATE TABLE IF NOT EXISTS configs (
    id         INTEGER PRIMARY KEY AUTOINCREMENT,
    profile_id INTEGER NOT NULL,
    name       TEXT    NOT NULL DEFAULT '',
    protocol   TEXT    NOT NULL,
    server     TEXT    NOT NULL,
    port       INTEGER NOT NULL,
    uuid       TEXT    NOT NULL DEFAULT '',
    password   TEXT    NOT NULL DEFAULT '',
    method     TEXT    NOT NULL DEFAULT '',
    transport  TEXT    NOT NULL DEFAULT 'tcp',
    security   TEXT    NOT NULL DEFAULT 'none',
    extra      TEXT    NOT NULL DEFAULT '{}',
    source     TEXT    NOT NULL DEFAULT 'manual',
    last_ping  INTEGER NOT NULL DEFAULT -1,
    is_alive   INTEGER NOT NULL DEFAULT 0,
    created_at DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP,
    updated_at DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP,
    FOREIGN KEY (profile_id) REFERENCES profiles(id) ON DELETE CASCADE
);

CREATE UNIQUE INDEX IF NOT EXISTS idx_configs_dedup
    ON configs (protocol, server, port, uuid, password);

CREATE INDEX IF NOT EXISTS idx_configs_profile   ON configs (profile_id);
CREATE INDEX IF NOT EXISTS idx_configs_protocol  ON configs (protocol);
CREATE INDEX IF NOT EXISTS idx_configs_alive     ON configs (is_alive);

CREATE INDEX IF NOT EXISTS idx_profiles_source ON profiles (source);

CREATE TABLE IF NOT EXISTS subscriptions (
    url TEXT PRIMARY KEY
);

CREATE TRIGGER IF NOT EXISTS update_profile_counts_insert
AFTER INSERT ON configs
BEGIN
    UPDATE profiles
    SET config_count = config_count + 1,
        alive_count = alive_count + NEW.is_alive,
        updated_at = CURRENT_TIMESTAMP
    WHERE id = NEW.profile_id;
END;

CREATE TRIGGER IF NOT EXISTS update_profile_counts_update
AFTER UPDATE ON configs
BEGIN
    UPDATE profiles
    SET alive_count = (
        SELECT COUNT(*) FROM configs
        WHERE profile_id = NEW.profile_id AND is_alive = 1
    ),
    updated_at = CURRENT_TIMESTAMP
    WHERE id = NEW.profile_id;
END;

CREATE TRIGGER IF NOT EXISTS update_profile_counts_delete
AFTER DELETE ON configs
BEGIN
    UPDATE profiles
    SET config_count = config_count - 1,
        alive_count = alive_count - OLD.is_alive,
        updated_at = CURRENT_TIMESTAMP
    WHERE id = OLD.profile_id;
END;
"#;

/// Single-writer handle to the database.
pub struct Store {
    conn: Mutex<Connection>,
    path: PathBuf,
}

impl Store {
    /// Open (creating if needed) and migrate the database at `path`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        let conn = Connection::open(&path).map_err(|source| StoreError::Open {
            path: path.display().to_string(),
            source,
        })?;
        Self::setup(conn, path)
    }

    /// In-memory database, mainly for tests.
    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory().map_err(|source| StoreError::Open {
            path: ":memory:".into(),
            source,
        })?;
        Self::setup(conn, PathBuf::from(":memory:"))
    }

    fn setup(conn: Connection, path: PathBuf) -> Result<Self, StoreError> {
        conn.pragma_update(None, "journal_mode", "WAL")
            .map_err(StoreError::Migrate)?;
        conn.pragma_update(None, "foreign_keys", "ON")
            .map_err(StoreError::Migrate)?;
        conn.execute_batch(SCHEMA).map_err(StoreError::Migrate)?;

        debug!(path = %path.display(), "store opened");
        Ok(Self {
            conn: Mutex::new(conn),
            path,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Run a read or single-statement write on the connection.
    pub(crate) fn with_conn<T>(
        &self,
        f: impl FnOnce(&Connection) -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        let conn = self.conn.lock();
        f(&conn)
    }

    /// Run `f` inside one transaction; rolls back on error.
    pub(crate) fn with_tx<T>(
        &self,
        f: impl FnOnce(&rusqlite::Transaction<'_>) -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        let mut conn = self.conn.lock();
        let tx = conn
            .transaction()
            .map_err(StoreError::query("begin transaction"))?;
        let out = f(&tx)?;
        tx.commit().map_err(StoreError::query("commit transaction"))?;
        Ok(out)
    }
}
