// src/cli/check.rs
// Integrity report over the stored catalog

use std::error::Error;
use std::path::PathBuf;

use crate::settings::ServiceSettings;
use crate::sprites::database::{integrity, DbConnection};

pub fn run(db: Option<PathBuf>) -> Result<(), Box<dyn Error>> {
    let settings = ServiceSettings::load_or_default();
    let db_path = super::resolve_db_path(db, &settings);

    if !db_path.exists() {
        return Err(format!("no database at {}", db_path.display()).into());
    }

    let conn = DbConnection::open_existing(&db_path)?;
    let results = integrity::check_all_sheets(&conn)?;
    let orphans = integrity::find_orphaned_names(&conn)?;
    let duplicates = integrity::find_duplicate_names(&conn)?;

    integrity::log_integrity_report(&results, &orphans, &duplicates);

    let clean =
        results.iter().all(|r| r.is_valid()) && orphans.is_empty() && duplicates.is_empty();
    if !clean {
        std::process::exit(2);
    }
    Ok(())
}
