//! SQLite database handle.
//!
//! `Database` owns only the resolved path. Every session opens its own
//! connection and hands it to the caller's closure, so no connection or
//! session is ever global.

use std::path::{Path, PathBuf};
use std::time::Duration;

use rusqlite::Connection;
use tracing::{debug, info};

use crate::config::{expand_tilde, DaoConfig, DEFAULT_BUSY_TIMEOUT_MS};
use crate::errors::{DaoError, DaoResult};
use crate::store::schema;

pub struct Database {
    db_path: PathBuf,
    busy_timeout: Duration,
}

impl Database {
    /// Create a new `Database`.  The path is expanded and parent directories
    /// are created if they do not already exist.
    pub fn new(db_path: impl AsRef<Path>) -> DaoResult<Self> {
        let db_str = db_path.as_ref().to_string_lossy();
        let expanded = expand_tilde(&db_str);
        let resolved = if expanded.is_absolute() {
            expanded
        } else {
            std::env::current_dir().map_err(DaoError::Io)?.join(&expanded)
        };
        if let Some(parent) = resolved.parent() {
            std::fs::create_dir_all(parent).map_err(DaoError::Io)?;
        }
        Ok(Self {
            db_path: resolved,
            busy_timeout: Duration::from_millis(DEFAULT_BUSY_TIMEOUT_MS),
        })
    }

    pub fn from_config(config: &DaoConfig) -> DaoResult<Self> {
        let mut db = Self::new(config.resolved_db_path())?;
        db.busy_timeout = Duration::from_millis(config.busy_timeout_ms);
        Ok(db)
    }

    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    /// Open a new connection with foreign keys enabled and the configured
    /// busy timeout.
    pub fn connect(&self) -> DaoResult<Connection> {
        let conn = Connection::open(&self.db_path)?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        conn.busy_timeout(self.busy_timeout)?;
        Ok(conn)
    }

    /// Set WAL mode, then create all tables and indexes.
    pub fn init_schema(&self) -> DaoResult<()> {
        let conn = self.connect()?;
        // journal_mode returns a row, so it cannot go through execute_batch.
        let mode: String = conn.query_row("PRAGMA journal_mode = WAL;", [], |row| row.get(0))?;
        debug!(journal_mode = %mode, "journal mode set");
        schema::init_schema(&conn)?;
        info!(path = %self.db_path.display(), "database schema ready");
        Ok(())
    }

    /// Run `f` in one transaction: committed when `f` returns `Ok`, rolled
    /// back otherwise.
    pub fn session<T, F>(&self, f: F) -> DaoResult<T>
    where
        F: FnOnce(&Connection) -> DaoResult<T>,
    {
        let mut conn = self.connect()?;
        let tx = conn.transaction()?;
        let value = f(&tx)?;
        tx.commit()?;
        Ok(value)
    }
}
