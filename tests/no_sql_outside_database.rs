// tests/no_sql_outside_database.rs
// Fails if direct SQLite write calls appear outside the database layer.

use std::fs;
use std::path::{Path, PathBuf};

fn collect_rs_files(dir: &Path, files: &mut Vec<PathBuf>) {
    if let Ok(entries) = fs::read_dir(dir) {
        for e in entries.flatten() {
            let p = e.path();
            if p.is_dir() {
                collect_rs_files(&p, files);
            } else if p.extension().map(|s| s == "rs").unwrap_or(false) {
                files.push(p);
            }
        }
    }
}

fn is_whitelisted(path: &Path) -> bool {
    let p = path.to_string_lossy().replace('\\', "/");
    // The database layer owns all SQL writes
    p.contains("/sprites/database/writer.rs")
        || p.contains("/sprites/database/schema.rs")
        || p.contains("/sprites/database/connection.rs")
        // reader and integrity carry inline tests that fabricate corrupt rows
        || p.contains("/sprites/database/reader.rs")
        || p.contains("/sprites/database/integrity.rs")
}

#[test]
fn no_sql_writes_outside_database_layer() {
    let manifest_dir = env!("CARGO_MANIFEST_DIR");
    let src_dir = Path::new(manifest_dir).join("src");

    let mut files = Vec::new();
    collect_rs_files(&src_dir, &mut files);

    // Patterns indicating direct DB writes via rusqlite
    let bad_patterns = ["conn.execute(", ".execute_batch(", "stmt.execute("];

    let mut offenders: Vec<(String, String)> = Vec::new();

    for file in files {
        if is_whitelisted(&file) {
            continue;
        }
        let content = match fs::read_to_string(&file) {
            Ok(c) => c,
            Err(_) => continue,
        };

        for pat in &bad_patterns {
            if content.contains(pat) {
                offenders.push((file.to_string_lossy().to_string(), pat.to_string()));
            }
        }
    }

    if !offenders.is_empty() {
        let mut msg = String::from("Direct DB write calls found outside the database layer:\n");
        for (file, pat) in offenders {
            msg.push_str(&format!(
                "  {} contains pattern '{}': route through DbWriter instead\n",
                file, pat
            ));
        }
        panic!("{}", msg);
    }
}
