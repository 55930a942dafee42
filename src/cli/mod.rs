// src/cli/mod.rs
// CLI subcommands: the server plus shell tools for operators

pub mod call;
pub mod check;
pub mod list;
pub mod serve;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::api::Endpoint;
use crate::settings::ServiceSettings;
use crate::sprites::database::DbConfig;

/// Environment overrides honored by every subcommand.
pub const ENV_DB: &str = "SPRITEDB_DB";
pub const ENV_SOCKET: &str = "SPRITEDB_SOCKET";

/// File name of the default unix socket inside the data directory.
#[cfg(unix)]
const SOCKET_FILE: &str = "spritedb.sock";
/// Default loopback address on platforms without unix sockets.
#[cfg(not(unix))]
const DEFAULT_TCP_ADDR: &str = "127.0.0.1:7807";

#[derive(Parser)]
#[command(name = "spritedb")]
#[command(about = "SpriteDB - sprite sheet catalog service with maintenance tools", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Serve the sprite sheet API on a unix socket or loopback TCP
    Serve {
        /// Database file (created on first run)
        #[arg(long)]
        db: Option<PathBuf>,

        /// Unix socket path to listen on
        #[arg(long)]
        socket: Option<PathBuf>,

        /// Loopback TCP address to listen on instead of a socket
        #[arg(long, conflicts_with = "socket")]
        listen: Option<String>,
    },

    /// Send one API request to a running server and print the response
    Call(call::CallArgs),

    /// List stored sheets with their geometry and regions
    List {
        /// Database file
        #[arg(long)]
        db: Option<PathBuf>,
    },

    /// Check stored records for consistency; exits nonzero on findings
    Check {
        /// Database file
        #[arg(long)]
        db: Option<PathBuf>,
    },
}

pub fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Serve { db, socket, listen } => serve::run(db, socket, listen),
        Commands::Call(args) => call::run(args),
        Commands::List { db } => list::run(db),
        Commands::Check { db } => check::run(db),
    }
}

/// Flag beats environment beats settings file beats built-in default.
pub(crate) fn resolve_db_path(flag: Option<PathBuf>, settings: &ServiceSettings) -> PathBuf {
    if let Some(path) = flag {
        return path;
    }
    if let Ok(path) = std::env::var(ENV_DB) {
        if !path.is_empty() {
            return PathBuf::from(path);
        }
    }
    if let Some(path) = &settings.database_path {
        return path.clone();
    }
    DbConfig::new().db_path()
}

/// Same precedence as the database path. A TCP flag or setting always
/// beats a socket one at the same level.
pub(crate) fn resolve_endpoint(
    socket: Option<PathBuf>,
    tcp: Option<String>,
    settings: &ServiceSettings,
) -> Endpoint {
    if let Some(addr) = tcp {
        return Endpoint::Tcp(addr);
    }
    if let Some(path) = socket {
        return Endpoint::Unix(path);
    }
    if let Ok(path) = std::env::var(ENV_SOCKET) {
        if !path.is_empty() {
            return Endpoint::Unix(PathBuf::from(path));
        }
    }
    if let Some(addr) = &settings.listen_addr {
        return Endpoint::Tcp(addr.clone());
    }
    if let Some(path) = &settings.socket_path {
        return Endpoint::Unix(path.clone());
    }
    default_endpoint()
}

#[cfg(unix)]
fn default_endpoint() -> Endpoint {
    Endpoint::Unix(DbConfig::default_path().join(SOCKET_FILE))
}

#[cfg(not(unix))]
fn default_endpoint() -> Endpoint {
    Endpoint::Tcp(DEFAULT_TCP_ADDR.to_string())
}
