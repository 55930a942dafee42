// src/sprites/database/writer.rs

use super::error::{DbError, DbResult};
use crate::sprites::definitions::{SpriteSheet, SpriteValues};

use rusqlite::{params, Connection};

pub struct DbWriter;

impl DbWriter {
    /// Inserts a new sheet or updates the geometry of an existing one.
    /// On insert the sheet's id is filled in from the database.
    pub fn save_sheet(conn: &Connection, sheet: &mut SpriteSheet) -> DbResult<()> {
        if sheet.exists() {
            let updated = conn.execute(
                "UPDATE spritesheet SET columns = ?1, \"rows\" = ?2, inset = ?3, \
                 updated_at = CURRENT_TIMESTAMP WHERE id = ?4",
                params![sheet.columns, sheet.rows, sheet.inset, sheet.id],
            )?;
            if updated == 0 {
                return Err(DbError::Other(format!(
                    "sprite sheet {} vanished during save",
                    sheet.id
                )));
            }
        } else {
            conn.execute(
                "INSERT INTO spritesheet (page_title, columns, \"rows\", inset, updated_at) \
                 VALUES (?1, ?2, ?3, ?4, CURRENT_TIMESTAMP)",
                params![sheet.page_title, sheet.columns, sheet.rows, sheet.inset],
            )?;
            sheet.id = conn.last_insert_rowid();
        }
        Ok(())
    }

    /// Upserts a region keyed on (spritesheet_id, name) and returns the
    /// row id. Saving an existing name replaces its kind and payload.
    pub fn save_sprite_name(
        conn: &Connection,
        spritesheet_id: i64,
        name: &str,
        values: &SpriteValues,
    ) -> DbResult<i64> {
        conn.execute(
            "INSERT INTO spritename (spritesheet_id, name, type, vals, updated_at) \
             VALUES (?1, ?2, ?3, ?4, CURRENT_TIMESTAMP) \
             ON CONFLICT(spritesheet_id, name) DO UPDATE SET \
             type = excluded.type, vals = excluded.vals, updated_at = CURRENT_TIMESTAMP",
            params![spritesheet_id, name, values.kind().as_str(), values.to_wire()],
        )?;

        let id: i64 = conn.query_row(
            "SELECT id FROM spritename WHERE spritesheet_id = ?1 AND name = ?2",
            params![spritesheet_id, name],
            |row| row.get(0),
        )?;
        Ok(id)
    }

    /// Appends one audit row.
    pub fn append_sprite_log(
        conn: &Connection,
        log_action: &str,
        page_title: &str,
        sprite_name: Option<&str>,
        actor: &str,
        logged_at: &str,
    ) -> DbResult<()> {
        conn.execute(
            "INSERT INTO sprite_log (log_action, page_title, sprite_name, actor, logged_at) \
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![log_action, page_title, sprite_name, actor, logged_at],
        )?;
        Ok(())
    }
}
