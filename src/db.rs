mod schema;

use std::path::Path;
use std::time::Duration;

use rusqlite::{Connection, Result};

use schema::INITIAL_SCHEMA;

/// Database wrapper providing connection management and schema initialization.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Opens an in-memory SQLite database.
    ///
    /// Automatically initializes the schema on connection open.
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.initialize_schema()?;
        Ok(db)
    }

    /// Opens a file-based SQLite database at the given path.
    ///
    /// Creates the database file if it does not exist.
    /// Automatically initializes the schema on connection open.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let conn = Connection::open(path)?;
        // another process (e.g. `askd history`) may hold the file briefly
        conn.busy_timeout(Duration::from_secs(5))?;
        let db = Self { conn };
        db.initialize_schema()?;
        Ok(db)
    }

    /// Initializes the database schema.
    ///
    /// Uses IF NOT EXISTS for idempotent execution.
    fn initialize_schema(&self) -> Result<()> {
        self.conn.execute_batch(INITIAL_SCHEMA)
    }

    /// Returns a reference to the underlying connection.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}
