// src/sprites/database/schema.rs
// Table creation and numbered schema migrations

use super::error::{DbError, DbResult};
use rusqlite::{params, Connection};
use tracing::info;

/// Creates base tables, the migration tracking table, and applies any
/// pending migrations. Safe to run on every open.
pub fn ensure_schema(conn: &Connection) -> DbResult<()> {
    create_base_tables(conn)?;
    ensure_migration_tracking(conn)?;
    apply_migrations(conn)?;
    Ok(())
}

fn create_base_tables(conn: &Connection) -> DbResult<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS spritesheet (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            page_title TEXT NOT NULL UNIQUE,
            columns INTEGER NOT NULL DEFAULT 1,
            \"rows\" INTEGER NOT NULL DEFAULT 1,
            inset INTEGER NOT NULL DEFAULT 0
        )",
        [],
    )?;

    // The UNIQUE pair also serves as the index for per-sheet listings.
    conn.execute(
        "CREATE TABLE IF NOT EXISTS spritename (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            spritesheet_id INTEGER NOT NULL REFERENCES spritesheet(id) ON DELETE CASCADE,
            name TEXT NOT NULL,
            type TEXT NOT NULL,
            vals TEXT NOT NULL,
            UNIQUE (spritesheet_id, name)
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS sprite_log (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            log_action TEXT NOT NULL,
            page_title TEXT NOT NULL,
            sprite_name TEXT,
            actor TEXT NOT NULL,
            logged_at TEXT NOT NULL
        )",
        [],
    )?;

    Ok(())
}

#[cfg(test)]
pub fn table_exists(conn: &Connection, table_name: &str) -> DbResult<bool> {
    let count: i32 = conn.query_row(
        "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?1",
        params![table_name],
        |row| row.get(0),
    )?;
    Ok(count > 0)
}

/// Create migration tracking table
pub fn ensure_migration_tracking(conn: &Connection) -> DbResult<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS _SchemaVersions (
            version INTEGER PRIMARY KEY,
            applied_at TEXT DEFAULT CURRENT_TIMESTAMP,
            description TEXT
        )",
        [],
    )?;
    Ok(())
}

/// Check if a specific migration version has been applied
pub fn is_migration_applied(conn: &Connection, version: i32) -> DbResult<bool> {
    let count: i32 = conn.query_row(
        "SELECT COUNT(*) FROM _SchemaVersions WHERE version = ?",
        params![version],
        |row| row.get(0),
    )?;
    Ok(count > 0)
}

/// Mark a migration as applied
pub fn mark_migration_applied(conn: &Connection, version: i32, description: &str) -> DbResult<()> {
    conn.execute(
        "INSERT OR IGNORE INTO _SchemaVersions (version, description) VALUES (?, ?)",
        params![version, description],
    )?;
    Ok(())
}

fn apply_migrations(conn: &Connection) -> DbResult<()> {
    if !is_migration_applied(conn, 1)? {
        info!("Applying migration 1: updated_at columns");
        add_updated_at_columns(conn)
            .map_err(|e| DbError::MigrationFailed(format!("migration 1 (updated_at): {}", e)))?;
        mark_migration_applied(conn, 1, "add updated_at to spritesheet and spritename")?;
    }
    Ok(())
}

// SQLite cannot ALTER-add a column with a non-constant default, so the
// column is plain TEXT and writers stamp CURRENT_TIMESTAMP themselves.
fn add_updated_at_columns(conn: &Connection) -> DbResult<()> {
    add_column_if_missing(conn, "spritesheet", "updated_at", "TEXT")?;
    add_column_if_missing(conn, "spritename", "updated_at", "TEXT")?;
    Ok(())
}

fn add_column_if_missing(
    conn: &Connection,
    table_name: &str,
    column_name: &str,
    column_decl: &str,
) -> DbResult<()> {
    let present: bool = conn
        .prepare(&format!(
            "SELECT COUNT(*) FROM pragma_table_info('{}') WHERE name = '{}'",
            table_name, column_name
        ))?
        .query_row([], |row| {
            let count: i32 = row.get(0)?;
            Ok(count > 0)
        })?;

    if !present {
        conn.execute(
            &format!(
                "ALTER TABLE \"{}\" ADD COLUMN {} {}",
                table_name, column_name, column_decl
            ),
            [],
        )?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ensure_schema_creates_tables_and_is_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        ensure_schema(&conn).unwrap();
        ensure_schema(&conn).unwrap();

        assert!(table_exists(&conn, "spritesheet").unwrap());
        assert!(table_exists(&conn, "spritename").unwrap());
        assert!(table_exists(&conn, "sprite_log").unwrap());
        assert!(table_exists(&conn, "_SchemaVersions").unwrap());
        assert!(!table_exists(&conn, "nonexistent").unwrap());
    }

    #[test]
    fn migration_one_adds_updated_at() {
        let conn = Connection::open_in_memory().unwrap();
        ensure_schema(&conn).unwrap();

        assert!(is_migration_applied(&conn, 1).unwrap());
        assert!(!is_migration_applied(&conn, 2).unwrap());

        for table in ["spritesheet", "spritename"] {
            let count: i32 = conn
                .query_row(
                    &format!(
                        "SELECT COUNT(*) FROM pragma_table_info('{}') WHERE name = 'updated_at'",
                        table
                    ),
                    [],
                    |row| row.get(0),
                )
                .unwrap();
            assert_eq!(count, 1, "{} should carry updated_at", table);
        }
    }

    #[test]
    fn duplicate_region_names_are_rejected_per_sheet() {
        let conn = Connection::open_in_memory().unwrap();
        ensure_schema(&conn).unwrap();

        conn.execute(
            "INSERT INTO spritesheet (page_title, columns, \"rows\", inset) VALUES ('A.png', 2, 2, 0)",
            [],
        )
        .unwrap();
        conn.execute(
            "INSERT INTO spritename (spritesheet_id, name, type, vals) VALUES (1, 'coin', 'sprite', '{}')",
            [],
        )
        .unwrap();

        let dup = conn.execute(
            "INSERT INTO spritename (spritesheet_id, name, type, vals) VALUES (1, 'coin', 'sprite', '{}')",
            [],
        );
        assert!(dup.is_err());
    }
}
