// src/sprites/database/integrity.rs
// Integrity checks over stored sheets and regions

use rusqlite::{params, Connection};
use tracing::{debug, info, warn};

use super::error::DbResult;
use super::reader::DbReader;
use crate::sprites::definitions::{SpriteKind, SpriteSheet, SpriteValues};
use crate::sprites::validation;

#[derive(Debug, Clone)]
pub struct SheetCheckResult {
    pub sheet_id: i64,
    pub page_title: String,
    pub total_names: i64,
    pub unknown_types: Vec<String>,
    pub unparsable_values: Vec<String>,
    pub out_of_bounds: Vec<String>,
    pub has_issues: bool,
}

impl SheetCheckResult {
    pub fn is_valid(&self) -> bool {
        !self.has_issues
    }

    pub fn summary(&self) -> String {
        if self.is_valid() {
            format!(
                "✓ '{}' (sheet {}): {} regions",
                self.page_title, self.sheet_id, self.total_names
            )
        } else {
            let mut issues = Vec::new();
            if !self.unknown_types.is_empty() {
                issues.push(format!("{} unknown types", self.unknown_types.len()));
            }
            if !self.unparsable_values.is_empty() {
                issues.push(format!("{} unparsable payloads", self.unparsable_values.len()));
            }
            if !self.out_of_bounds.is_empty() {
                issues.push(format!("{} out of bounds", self.out_of_bounds.len()));
            }
            format!(
                "⚠ '{}' (sheet {}): {} regions, issues: {}",
                self.page_title,
                self.sheet_id,
                self.total_names,
                issues.join(", ")
            )
        }
    }
}

/// A spritename row pointing at a sheet that no longer exists.
#[derive(Debug, Clone)]
pub struct OrphanedName {
    pub id: i64,
    pub spritesheet_id: i64,
    pub name: String,
}

/// Duplicate (sheet, name) pairs. The live schema forbids these, so any
/// hit comes from a database created before the unique constraint.
#[derive(Debug, Clone)]
pub struct DuplicateName {
    pub spritesheet_id: i64,
    pub name: String,
    pub count: i64,
    pub row_ids: Vec<i64>,
}

/// Scan one sheet's regions for records the service can no longer use.
pub fn check_sheet(conn: &Connection, sheet: &SpriteSheet) -> DbResult<SheetCheckResult> {
    let mut stmt = conn.prepare(
        "SELECT id, name, type, vals FROM spritename WHERE spritesheet_id = ?1 ORDER BY name",
    )?;
    let rows = stmt.query_map(params![sheet.id], |row| {
        Ok((
            row.get::<_, i64>(0)?,
            row.get::<_, String>(1)?,
            row.get::<_, String>(2)?,
            row.get::<_, String>(3)?,
        ))
    })?;

    let mut total_names = 0i64;
    let mut unknown_types = Vec::new();
    let mut unparsable_values = Vec::new();
    let mut out_of_bounds = Vec::new();

    for row in rows {
        let (_id, name, kind_str, vals) = row?;
        total_names += 1;

        let kind = match SpriteKind::parse(&kind_str) {
            Some(kind) => kind,
            None => {
                unknown_types.push(name);
                continue;
            }
        };
        let values = match SpriteValues::from_stored(kind, &vals) {
            Some(values) => values,
            None => {
                unparsable_values.push(name);
                continue;
            }
        };
        if !validation::values_in_bounds(sheet, &values) {
            out_of_bounds.push(name);
        }
    }

    let has_issues =
        !unknown_types.is_empty() || !unparsable_values.is_empty() || !out_of_bounds.is_empty();

    Ok(SheetCheckResult {
        sheet_id: sheet.id,
        page_title: sheet.page_title.clone(),
        total_names,
        unknown_types,
        unparsable_values,
        out_of_bounds,
        has_issues,
    })
}

/// Scan every sheet in the database.
pub fn check_all_sheets(conn: &Connection) -> DbResult<Vec<SheetCheckResult>> {
    let summaries = DbReader::list_sheets(conn)?;

    let mut results = Vec::new();
    for summary in summaries {
        let sheet = SpriteSheet {
            id: summary.id,
            page_title: summary.page_title,
            columns: summary.columns,
            rows: summary.rows,
            inset: summary.inset,
        };
        results.push(check_sheet(conn, &sheet)?);
    }
    Ok(results)
}

pub fn find_orphaned_names(conn: &Connection) -> DbResult<Vec<OrphanedName>> {
    let mut stmt = conn.prepare(
        "SELECT n.id, n.spritesheet_id, n.name
         FROM spritename n
         LEFT JOIN spritesheet s ON s.id = n.spritesheet_id
         WHERE s.id IS NULL
         ORDER BY n.id",
    )?;
    let rows = stmt.query_map([], |row| {
        Ok(OrphanedName {
            id: row.get(0)?,
            spritesheet_id: row.get(1)?,
            name: row.get(2)?,
        })
    })?;

    let mut orphans = Vec::new();
    for orphan in rows {
        orphans.push(orphan?);
    }
    Ok(orphans)
}

pub fn find_duplicate_names(conn: &Connection) -> DbResult<Vec<DuplicateName>> {
    let mut stmt = conn.prepare(
        "SELECT spritesheet_id, name, COUNT(*) as cnt, GROUP_CONCAT(id) as ids
         FROM spritename
         GROUP BY spritesheet_id, name
         HAVING cnt > 1
         ORDER BY cnt DESC
         LIMIT 100",
    )?;
    let rows = stmt.query_map([], |row| {
        let spritesheet_id: i64 = row.get(0)?;
        let name: String = row.get(1)?;
        let count: i64 = row.get(2)?;
        let ids_str: String = row.get(3)?;
        let row_ids: Vec<i64> = ids_str
            .split(',')
            .filter_map(|s| s.parse::<i64>().ok())
            .collect();
        Ok(DuplicateName {
            spritesheet_id,
            name,
            count,
            row_ids,
        })
    })?;

    let mut duplicates = Vec::new();
    for dup in rows {
        duplicates.push(dup?);
    }
    Ok(duplicates)
}

/// Print integrity report to log
pub fn log_integrity_report(
    results: &[SheetCheckResult],
    orphans: &[OrphanedName],
    duplicates: &[DuplicateName],
) {
    info!("========================================");
    info!("Sprite Sheet Integrity Report");
    info!("========================================");

    let mut sheets_with_issues = 0;
    for result in results {
        if result.is_valid() {
            debug!("{}", result.summary());
        } else {
            sheets_with_issues += 1;
            warn!("{}", result.summary());
            for name in result.unknown_types.iter().take(5) {
                warn!("  Unknown type: '{}'", name);
            }
            for name in result.unparsable_values.iter().take(5) {
                warn!("  Unparsable payload: '{}'", name);
            }
            for name in result.out_of_bounds.iter().take(5) {
                warn!("  Out of bounds: '{}'", name);
            }
        }
    }

    for orphan in orphans.iter().take(10) {
        warn!(
            "  Orphaned region {} ('{}') points at missing sheet {}",
            orphan.id, orphan.name, orphan.spritesheet_id
        );
    }
    for dup in duplicates.iter().take(10) {
        warn!(
            "  Duplicate name '{}' on sheet {} appears {} times (row IDs: {:?})",
            dup.name, dup.spritesheet_id, dup.count, dup.row_ids
        );
    }

    info!("========================================");
    info!("Summary:");
    info!("  Sheets checked: {}", results.len());
    info!("  Sheets with issues: {}", sheets_with_issues);
    info!("  Orphaned regions: {}", orphans.len());
    info!("  Duplicate names: {}", duplicates.len());
    info!("========================================");

    if sheets_with_issues == 0 && orphans.is_empty() && duplicates.is_empty() {
        info!("✓ All sheets are internally consistent!");
    } else {
        warn!("⚠ Integrity issues found, see warnings above");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sprites::database::schema::ensure_schema;

    fn test_conn() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        ensure_schema(&conn).unwrap();
        conn
    }

    #[test]
    fn clean_sheet_reports_no_issues() {
        let conn = test_conn();
        conn.execute(
            "INSERT INTO spritesheet (page_title, columns, \"rows\", inset) VALUES ('A.png', 4, 2, 0)",
            [],
        )
        .unwrap();
        conn.execute(
            "INSERT INTO spritename (spritesheet_id, name, type, vals) \
             VALUES (1, 'coin', 'sprite', '{\"xPos\":3,\"yPos\":1}')",
            [],
        )
        .unwrap();

        let results = check_all_sheets(&conn).unwrap();
        assert_eq!(results.len(), 1);
        assert!(results[0].is_valid());
        assert_eq!(results[0].total_names, 1);
        assert!(results[0].summary().starts_with('✓'));
    }

    #[test]
    fn corrupt_regions_are_classified() {
        let conn = test_conn();
        conn.execute(
            "INSERT INTO spritesheet (page_title, columns, \"rows\", inset) VALUES ('A.png', 2, 2, 0)",
            [],
        )
        .unwrap();
        conn.execute(
            "INSERT INTO spritename (spritesheet_id, name, type, vals) \
             VALUES (1, 'weird', 'polygon', '{}')",
            [],
        )
        .unwrap();
        conn.execute(
            "INSERT INTO spritename (spritesheet_id, name, type, vals) \
             VALUES (1, 'garbled', 'sprite', 'not json')",
            [],
        )
        .unwrap();
        conn.execute(
            "INSERT INTO spritename (spritesheet_id, name, type, vals) \
             VALUES (1, 'runaway', 'sprite', '{\"xPos\":9,\"yPos\":0}')",
            [],
        )
        .unwrap();

        let results = check_all_sheets(&conn).unwrap();
        let result = &results[0];
        assert!(result.has_issues);
        assert_eq!(result.unknown_types, vec!["weird".to_string()]);
        assert_eq!(result.unparsable_values, vec!["garbled".to_string()]);
        assert_eq!(result.out_of_bounds, vec!["runaway".to_string()]);
        assert!(result.summary().starts_with('⚠'));
    }

    #[test]
    fn orphans_surface_from_writes_made_with_fk_off() {
        // Foreign key enforcement is per connection; orphans come from
        // writers that ran with it off. The bundled SQLite enables it by
        // default, so switch it off before planting the orphan.
        let conn = test_conn();
        conn.execute_batch("PRAGMA foreign_keys = OFF;").unwrap();
        conn.execute(
            "INSERT INTO spritename (spritesheet_id, name, type, vals) \
             VALUES (77, 'lost', 'sprite', '{\"xPos\":0,\"yPos\":0}')",
            [],
        )
        .unwrap();

        let orphans = find_orphaned_names(&conn).unwrap();
        assert_eq!(orphans.len(), 1);
        assert_eq!(orphans[0].spritesheet_id, 77);
        assert_eq!(orphans[0].name, "lost");
    }

    #[test]
    fn duplicates_surface_from_pre_constraint_databases() {
        let conn = Connection::open_in_memory().unwrap();
        // Legacy table shape without the unique pair
        conn.execute(
            "CREATE TABLE spritename (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                spritesheet_id INTEGER NOT NULL,
                name TEXT NOT NULL,
                type TEXT NOT NULL,
                vals TEXT NOT NULL
            )",
            [],
        )
        .unwrap();
        for _ in 0..2 {
            conn.execute(
                "INSERT INTO spritename (spritesheet_id, name, type, vals) \
                 VALUES (1, 'coin', 'sprite', '{}')",
                [],
            )
            .unwrap();
        }

        let duplicates = find_duplicate_names(&conn).unwrap();
        assert_eq!(duplicates.len(), 1);
        assert_eq!(duplicates[0].name, "coin");
        assert_eq!(duplicates[0].count, 2);
        assert_eq!(duplicates[0].row_ids.len(), 2);
    }
}
