// src/cli/serve.rs
// Runs the API server in the foreground

use std::error::Error;
use std::fs;
use std::path::PathBuf;

use tracing::{info, warn};

use crate::api::{ApiServer, Endpoint, EnglishCatalog};
use crate::host::{DbAuditLog, DbKeyTitleResolver, SettingsIdentityProvider};
use crate::settings::ServiceSettings;
use crate::sprites::database::DbConnection;

pub fn run(
    db: Option<PathBuf>,
    socket: Option<PathBuf>,
    listen: Option<String>,
) -> Result<(), Box<dyn Error>> {
    let settings = ServiceSettings::load_or_create();
    let db_path = super::resolve_db_path(db, &settings);
    let endpoint = super::resolve_endpoint(socket, listen, &settings);

    if let Some(parent) = db_path.parent() {
        fs::create_dir_all(parent)?;
    }
    let conn = if db_path.exists() {
        DbConnection::open_existing(&db_path)?
    } else {
        DbConnection::create_new(&db_path)?
    };

    if let Endpoint::Unix(path) = &endpoint {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
    }

    if settings.users.is_empty() {
        warn!("No users configured; every request will be rejected as unregistered");
    }
    info!("Serving {} on {}", db_path.display(), endpoint);

    let identity = SettingsIdentityProvider::new(settings.users);
    let audit = DbAuditLog::new(&conn);
    let server = ApiServer::new(
        &conn,
        &identity,
        &DbKeyTitleResolver,
        &audit,
        &EnglishCatalog,
    );
    server.run(&endpoint)?;
    Ok(())
}
