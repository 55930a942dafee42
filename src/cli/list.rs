// src/cli/list.rs
// Prints the stored catalog: sheets first, then each sheet's regions

use std::error::Error;
use std::path::PathBuf;

use crate::settings::ServiceSettings;
use crate::sprites::database::{DbConnection, DbReader};

pub fn run(db: Option<PathBuf>) -> Result<(), Box<dyn Error>> {
    let settings = ServiceSettings::load_or_default();
    let db_path = super::resolve_db_path(db, &settings);

    if !db_path.exists() {
        println!("No database at {}", db_path.display());
        return Ok(());
    }

    println!("Opening: {}\n", db_path.display());
    let conn = DbConnection::open_existing(&db_path)?;
    let summaries = DbReader::list_sheets(&conn)?;

    if summaries.is_empty() {
        println!("No sprite sheets stored.");
        return Ok(());
    }

    println!(
        "{:<6} {:<40} {:>7} {:>5} {:>5} {:>8}",
        "Id", "Page Title", "Columns", "Rows", "Inset", "Regions"
    );
    println!("{}", "-".repeat(76));
    for sheet in &summaries {
        println!(
            "{:<6} {:<40} {:>7} {:>5} {:>5} {:>8}",
            sheet.id, sheet.page_title, sheet.columns, sheet.rows, sheet.inset, sheet.region_count
        );
    }

    for sheet in &summaries {
        if sheet.region_count == 0 {
            continue;
        }
        println!("\n=== {} ===", sheet.page_title);
        for region in DbReader::list_sprite_names(&conn, sheet.id)? {
            println!(
                "  {:<32} {:<7} {}",
                region.name,
                region.kind().as_str(),
                region.parser_tag(&sheet.page_title)
            );
        }
    }

    Ok(())
}
