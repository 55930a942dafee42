// src/sprites/database/mod.rs

pub mod connection;
pub mod error;
pub mod integrity;
pub mod reader;
pub mod schema;
pub mod writer;

pub use connection::DbConnection;
pub use error::DbResult;
pub use reader::DbReader;
pub use writer::DbWriter;

use std::path::PathBuf;

/// File name of the catalog database inside the data directory.
pub const DB_FILE: &str = "spritesheets.db";

/// Database storage configuration
#[derive(Debug, Clone)]
pub struct DbConfig {
    pub data_path: PathBuf,
}

impl DbConfig {
    pub fn default_path() -> PathBuf {
        let documents = directories_next::UserDirs::new()
            .and_then(|dirs| dirs.document_dir().map(|p| p.to_path_buf()))
            .unwrap_or_else(|| PathBuf::from("."));
        documents.join("SpriteDB")
    }

    pub fn new() -> Self {
        Self {
            data_path: Self::default_path(),
        }
    }

    pub fn db_path(&self) -> PathBuf {
        self.data_path.join(DB_FILE)
    }
}

impl Default for DbConfig {
    fn default() -> Self {
        Self::new()
    }
}
