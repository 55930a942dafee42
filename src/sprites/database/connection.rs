// src/sprites/database/connection.rs

use super::error::DbResult;
use rusqlite::Connection;
use std::path::Path;
use tracing::{debug, error, info, warn};

pub struct DbConnection;

impl DbConnection {
    /// Creates a new database with WAL mode enabled
    pub fn create_new(path: &Path) -> DbResult<Connection> {
        let conn = Connection::open(path)?;

        // Set WAL mode and verify it was set
        let journal_mode: String =
            conn.query_row("PRAGMA journal_mode=WAL", [], |row| row.get(0))?;

        if journal_mode.to_uppercase() != "WAL" {
            error!(
                "Failed to set WAL mode on new database {:?}. Current mode: {}",
                path.file_name(),
                journal_mode
            );
        } else {
            info!("WAL mode activated for new database {:?}", path.file_name());
        }

        // Set other pragmas
        conn.execute_batch(
            "PRAGMA synchronous=NORMAL;
             PRAGMA foreign_keys=ON;
             PRAGMA temp_store=MEMORY;",
        )?;

        super::schema::ensure_schema(&conn)?;

        Ok(conn)
    }

    /// Opens an existing database and ensures WAL mode is enabled
    /// CRITICAL: Always use this instead of Connection::open() to ensure journaling works!
    pub fn open_existing(path: &Path) -> DbResult<Connection> {
        let conn = Connection::open(path)?;

        // MUST configure WAL mode every time we open a connection
        // SQLite PRAGMA settings are connection-specific, not database-specific
        // Note: PRAGMA journal_mode=WAL returns the mode that was set
        let journal_mode: String =
            conn.query_row("PRAGMA journal_mode=WAL", [], |row| row.get(0))?;

        // Verify WAL mode was actually set
        if journal_mode.to_uppercase() != "WAL" {
            warn!(
                "Failed to set WAL mode on database {:?}. Current mode: {}. This may indicate the database is in use by another connection.",
                path.file_name(),
                journal_mode
            );
        } else {
            debug!("WAL mode activated for database {:?}", path.file_name());
        }

        // Set other pragmas
        conn.execute_batch(
            "PRAGMA synchronous=NORMAL;
             PRAGMA foreign_keys=ON;
             PRAGMA busy_timeout=5000;",
        )?;

        // Schema setup and migrations are idempotent, run them on every open
        super::schema::ensure_schema(&conn)?;

        Ok(conn)
    }
}
