// src/settings/mod.rs

pub mod io;

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::warn;

use crate::host::{UserEntry, EDIT_SPRITES_RIGHT};

/// Persisted service configuration. Every field is optional in the file;
/// CLI flags and the SPRITEDB_* environment variables override it.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ServiceSettings {
    /// Database file override.
    #[serde(default)]
    pub database_path: Option<PathBuf>,
    /// Unix socket the server listens on and `call` connects to.
    #[serde(default)]
    pub socket_path: Option<PathBuf>,
    /// Loopback TCP address to use instead of the unix socket.
    #[serde(default)]
    pub listen_addr: Option<String>,
    /// Accounts the service will act for, in id order.
    #[serde(default = "default_users")]
    pub users: Vec<UserEntry>,
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self {
            database_path: None,
            socket_path: None,
            listen_addr: None,
            users: default_users(),
        }
    }
}

/// A fresh install knows one user: the account running the service,
/// holding the edit right.
fn default_users() -> Vec<UserEntry> {
    vec![UserEntry {
        name: whoami::username(),
        rights: vec![EDIT_SPRITES_RIGHT.to_string()],
    }]
}

impl ServiceSettings {
    /// Loads the settings file, falling back to defaults when it is
    /// missing or unreadable.
    pub fn load_or_default() -> Self {
        io::load_settings_from_file().unwrap_or_else(|e| {
            warn!("Falling back to default settings: {}", e);
            Self::default()
        })
    }

    /// Like `load_or_default`, but materializes the defaults on first
    /// run so there is a file to edit.
    pub fn load_or_create() -> Self {
        let missing = io::config_file_path().map(|p| !p.exists()).unwrap_or(false);
        let settings = Self::load_or_default();
        if missing {
            if let Err(e) = io::save_settings_to_file(&settings) {
                warn!("Could not write initial settings file: {}", e);
            }
        }
        settings
    }
}
