//! SQLite connection shared by the tables

use parking_lot::Mutex;
use rusqlite::Connection;
use tracing::{debug, info};

use crate::config::SqliteConfig;
use crate::error::{Result, StoreError};
use crate::tables::Table;

/// A SQLite database handle
///
/// The connection sits behind a lock so the handle can be shared across
/// worker threads; statements on one handle run one at a time. Once closed,
/// every operation fails with `StoreError::Closed`.
pub struct SqliteDatabase {
    dsn: String,
    conn: Mutex<Option<Connection>>,
}

impl SqliteDatabase {
    /// Open (or create) the database described by `config`
    pub fn open(config: &SqliteConfig) -> Result<Self> {
        let conn = Connection::open(&config.dsn)?;
        Self::configure_pragmas(&conn, config)?;

        info!("Opened SQLite database {}", config.dsn);

        Ok(Self {
            dsn: config.dsn.clone(),
            conn: Mutex::new(Some(conn)),
        })
    }

    /// Open a private in-memory database
    pub fn in_memory() -> Result<Self> {
        Self::open(&SqliteConfig::in_memory())
    }

    pub fn dsn(&self) -> &str {
        &self.dsn
    }

    /// Run `f` against the live connection
    pub fn with_connection<T>(&self, f: impl FnOnce(&Connection) -> Result<T>) -> Result<T> {
        let guard = self.conn.lock();
        let conn = guard.as_ref().ok_or(StoreError::Closed)?;
        f(conn)
    }

    /// Create a table if it does not exist yet
    pub fn create_table(&self, table: &dyn Table) -> Result<()> {
        self.with_connection(|conn| table.init(conn))?;
        debug!("Initialized table {} in {}", table.name(), self.dsn);
        Ok(())
    }

    /// Whether a table (or virtual table) with this name exists
    pub fn has_table(&self, name: &str) -> Result<bool> {
        self.with_connection(|conn| {
            let count: i64 = conn.query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?1",
                [name],
                |row| row.get(0),
            )?;
            Ok(count > 0)
        })
    }

    /// Close the connection. Closing twice is a no-op.
    pub fn close(&self) -> Result<()> {
        let conn = self.conn.lock().take();

        if let Some(conn) = conn {
            conn.close().map_err(|(_, e)| StoreError::Sqlite(e))?;
            info!("Closed SQLite database {}", self.dsn);
        }

        Ok(())
    }

    pub fn is_closed(&self) -> bool {
        self.conn.lock().is_none()
    }

    fn configure_pragmas(conn: &Connection, config: &SqliteConfig) -> Result<()> {
        conn.execute_batch(
            "PRAGMA synchronous = NORMAL;
             PRAGMA temp_store = MEMORY;
             PRAGMA busy_timeout = 5000;",
        )?;

        if config.wal && !config.is_memory() {
            conn.execute_batch("PRAGMA journal_mode = WAL;")?;
        }

        Ok(())
    }
}

impl std::fmt::Debug for SqliteDatabase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteDatabase")
            .field("dsn", &self.dsn)
            .field("closed", &self.is_closed())
            .finish()
    }
}
