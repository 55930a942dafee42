// src/sprites/database/reader.rs

use super::error::{DbError, DbResult};
use crate::sprites::definitions::{SpriteKind, SpriteName, SpriteSheet, SpriteValues};

use rusqlite::{params, Connection, OptionalExtension, Row};
use tracing::warn;

pub struct DbReader;

/// One line of the sheet listing: geometry plus region count.
#[derive(Debug, Clone)]
pub struct SheetSummary {
    pub id: i64,
    pub page_title: String,
    pub columns: u32,
    pub rows: u32,
    pub inset: u32,
    pub region_count: i64,
}

/// A spritename row before its kind and payload have been decoded.
struct RawSpriteName {
    id: i64,
    spritesheet_id: i64,
    name: String,
    kind: String,
    vals: String,
}

impl DbReader {
    pub fn load_sheet_by_id(conn: &Connection, id: i64) -> DbResult<Option<SpriteSheet>> {
        let sheet = conn
            .query_row(
                "SELECT id, page_title, columns, \"rows\", inset FROM spritesheet WHERE id = ?1",
                params![id],
                Self::sheet_from_row,
            )
            .optional()?;
        Ok(sheet)
    }

    pub fn load_sheet_by_title(conn: &Connection, page_title: &str) -> DbResult<Option<SpriteSheet>> {
        let sheet = conn
            .query_row(
                "SELECT id, page_title, columns, \"rows\", inset FROM spritesheet WHERE page_title = ?1",
                params![page_title],
                Self::sheet_from_row,
            )
            .optional()?;
        Ok(sheet)
    }

    /// Fetches one region by its per-sheet unique name.
    #[cfg(test)]
    pub fn get_sprite_name(
        conn: &Connection,
        spritesheet_id: i64,
        name: &str,
    ) -> DbResult<Option<SpriteName>> {
        let raw = conn
            .query_row(
                "SELECT id, spritesheet_id, name, type, vals FROM spritename \
                 WHERE spritesheet_id = ?1 AND name = ?2",
                params![spritesheet_id, name],
                Self::raw_name_from_row,
            )
            .optional()?;

        match raw {
            Some(raw) => Ok(Some(Self::decode_name(raw)?)),
            None => Ok(None),
        }
    }

    /// All regions of a sheet ordered by name. Rows whose kind or payload
    /// no longer decodes are skipped with a warning so one bad row cannot
    /// take down the listing.
    pub fn list_sprite_names(conn: &Connection, spritesheet_id: i64) -> DbResult<Vec<SpriteName>> {
        let mut stmt = conn.prepare(
            "SELECT id, spritesheet_id, name, type, vals FROM spritename \
             WHERE spritesheet_id = ?1 ORDER BY name",
        )?;
        let rows = stmt.query_map(params![spritesheet_id], Self::raw_name_from_row)?;

        let mut names = Vec::new();
        for raw in rows {
            match Self::decode_name(raw?) {
                Ok(name) => names.push(name),
                Err(e) => warn!("Skipping unreadable spritename row: {}", e),
            }
        }
        Ok(names)
    }

    /// All sheets with their region counts, for the maintenance CLI.
    pub fn list_sheets(conn: &Connection) -> DbResult<Vec<SheetSummary>> {
        let mut stmt = conn.prepare(
            "SELECT s.id, s.page_title, s.columns, s.\"rows\", s.inset, COUNT(n.id)
             FROM spritesheet s
             LEFT JOIN spritename n ON n.spritesheet_id = s.id
             GROUP BY s.id
             ORDER BY s.page_title",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(SheetSummary {
                id: row.get(0)?,
                page_title: row.get(1)?,
                columns: row.get(2)?,
                rows: row.get(3)?,
                inset: row.get(4)?,
                region_count: row.get(5)?,
            })
        })?;

        let mut summaries = Vec::new();
        for summary in rows {
            summaries.push(summary?);
        }
        Ok(summaries)
    }

    fn sheet_from_row(row: &Row<'_>) -> rusqlite::Result<SpriteSheet> {
        Ok(SpriteSheet {
            id: row.get(0)?,
            page_title: row.get(1)?,
            columns: row.get(2)?,
            rows: row.get(3)?,
            inset: row.get(4)?,
        })
    }

    fn raw_name_from_row(row: &Row<'_>) -> rusqlite::Result<RawSpriteName> {
        Ok(RawSpriteName {
            id: row.get(0)?,
            spritesheet_id: row.get(1)?,
            name: row.get(2)?,
            kind: row.get(3)?,
            vals: row.get(4)?,
        })
    }

    fn decode_name(raw: RawSpriteName) -> DbResult<SpriteName> {
        let kind = SpriteKind::parse(&raw.kind).ok_or_else(|| {
            DbError::InvalidRecord(format!(
                "spritename {} ('{}') has unknown type '{}'",
                raw.id, raw.name, raw.kind
            ))
        })?;
        let values = SpriteValues::from_stored(kind, &raw.vals).ok_or_else(|| {
            DbError::InvalidRecord(format!(
                "spritename {} ('{}') has unparsable {} payload",
                raw.id, raw.name, raw.kind
            ))
        })?;

        Ok(SpriteName {
            id: raw.id,
            spritesheet_id: raw.spritesheet_id,
            name: raw.name,
            values,
        })
    }
}
