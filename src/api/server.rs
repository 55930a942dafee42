// src/api/server.rs
//! Framed socket server for the sprite sheet API
//!
//! Each request is one JSON frame: a u32 little-endian length prefix
//! followed by the payload. Connections are served one at a time; the
//! database layer assumes a single writer.

use std::fmt;
#[cfg(unix)]
use std::fs;
use std::io::{Read, Write};
use std::net::TcpListener;
#[cfg(unix)]
use std::os::unix::net::{UnixListener, UnixStream};
use std::path::{Path, PathBuf};

use rusqlite::Connection;
use thiserror::Error;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use super::handler::SpriteSheetApi;
use super::messages::{MessageCatalog, MessageCode};
use super::protocol::{ApiResponse, RequestEnvelope};
use crate::host::{AuditLog, IdentityProvider, TitleResolver};

/// Frames above this size are refused before allocation.
pub const MAX_FRAME_LEN: u32 = 4 * 1024 * 1024;

#[derive(Debug, Error)]
pub enum ServeError {
    #[cfg(unix)]
    #[error("another spritedb instance is already listening on {0:?}")]
    AlreadyRunning(PathBuf),
    #[error("failed to bind {endpoint}: {source}")]
    Bind {
        endpoint: String,
        source: std::io::Error,
    },
    #[cfg(not(unix))]
    #[error("{0}")]
    Unsupported(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Where the server listens and clients connect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Endpoint {
    Unix(PathBuf),
    Tcp(String),
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Endpoint::Unix(path) => write!(f, "unix:{}", path.display()),
            Endpoint::Tcp(addr) => write!(f, "tcp:{}", addr),
        }
    }
}

/// Trait for Read + Write to allow both listener stream types
pub trait ReadWrite: Read + Write {}

#[cfg(unix)]
impl ReadWrite for UnixStream {}
impl ReadWrite for std::net::TcpStream {}
#[cfg(test)]
impl ReadWrite for std::io::Cursor<Vec<u8>> {}

pub struct ApiServer<'a> {
    conn: &'a Connection,
    identity: &'a dyn IdentityProvider,
    titles: &'a dyn TitleResolver,
    audit: &'a dyn AuditLog,
    catalog: &'a dyn MessageCatalog,
}

impl<'a> ApiServer<'a> {
    pub fn new(
        conn: &'a Connection,
        identity: &'a dyn IdentityProvider,
        titles: &'a dyn TitleResolver,
        audit: &'a dyn AuditLog,
        catalog: &'a dyn MessageCatalog,
    ) -> Self {
        Self {
            conn,
            identity,
            titles,
            audit,
            catalog,
        }
    }

    /// Binds the endpoint and serves until the process is stopped.
    pub fn run(&self, endpoint: &Endpoint) -> Result<(), ServeError> {
        match endpoint {
            Endpoint::Unix(path) => self.run_unix(path),
            Endpoint::Tcp(addr) => self.run_tcp(addr),
        }
    }

    #[cfg(unix)]
    fn run_unix(&self, path: &Path) -> Result<(), ServeError> {
        claim_socket(path)?;
        let listener = UnixListener::bind(path).map_err(|source| ServeError::Bind {
            endpoint: format!("unix:{}", path.display()),
            source,
        })?;
        info!("Listening on unix socket {}", path.display());

        for stream in listener.incoming() {
            match stream {
                Ok(mut stream) => self.serve_connection(&mut stream),
                Err(e) => warn!("Failed to accept connection: {}", e),
            }
        }
        Ok(())
    }

    #[cfg(not(unix))]
    fn run_unix(&self, path: &Path) -> Result<(), ServeError> {
        Err(ServeError::Unsupported(format!(
            "unix sockets are unavailable on this platform (requested {})",
            path.display()
        )))
    }

    fn run_tcp(&self, addr: &str) -> Result<(), ServeError> {
        let listener = TcpListener::bind(addr).map_err(|source| ServeError::Bind {
            endpoint: format!("tcp:{}", addr),
            source,
        })?;
        info!("Listening on tcp {}", addr);

        for stream in listener.incoming() {
            match stream {
                Ok(mut stream) => self.serve_connection(&mut stream),
                Err(e) => warn!("Failed to accept connection: {}", e),
            }
        }
        Ok(())
    }

    /// Serves frames from one connection until the peer closes it.
    fn serve_connection(&self, stream: &mut dyn ReadWrite) {
        let connection_id = Uuid::new_v4();
        debug!("Connection {} opened", connection_id);

        loop {
            let frame = match read_frame(stream) {
                Ok(Some(frame)) => frame,
                Ok(None) => break,
                Err(e) => {
                    warn!("Connection {}: {}", connection_id, e);
                    break;
                }
            };

            let response = self.handle_frame(&frame, connection_id);
            let payload = match serde_json::to_vec(&response) {
                Ok(payload) => payload,
                Err(e) => {
                    error!(
                        "Connection {}: failed to serialize response: {}",
                        connection_id, e
                    );
                    break;
                }
            };
            if let Err(e) = write_frame(stream, &payload) {
                warn!(
                    "Connection {}: failed to write response: {}",
                    connection_id, e
                );
                break;
            }
        }

        debug!("Connection {} closed", connection_id);
    }

    /// A frame that does not parse as a request envelope still gets a
    /// response, so clients see a code instead of a dropped connection.
    fn handle_frame(&self, frame: &[u8], connection_id: Uuid) -> ApiResponse {
        let request: RequestEnvelope = match serde_json::from_slice(frame) {
            Ok(request) => request,
            Err(e) => {
                warn!("Connection {}: bad request frame: {}", connection_id, e);
                return ApiResponse {
                    success: false,
                    message: MessageCode::BadRequest.key().to_string(),
                    message_text: self.catalog.text(MessageCode::BadRequest),
                    sprite_sheet_id: None,
                    tag: None,
                    data: None,
                };
            }
        };

        debug!(
            "Connection {}: do={} method={:?}",
            connection_id, request.action, request.method
        );
        let api = SpriteSheetApi::new(self.conn, self.identity, self.titles, self.audit, self.catalog);
        api.execute(&request)
    }
}

/// Removes a stale socket file, but refuses to displace a live server.
#[cfg(unix)]
fn claim_socket(path: &Path) -> Result<(), ServeError> {
    if !path.exists() {
        return Ok(());
    }
    match UnixStream::connect(path) {
        Ok(_) => Err(ServeError::AlreadyRunning(path.to_path_buf())),
        Err(_) => {
            info!("Removing stale socket {}", path.display());
            fs::remove_file(path)?;
            Ok(())
        }
    }
}

/// Reads one length-prefixed frame. EOF before the first prefix byte is
/// a clean close; EOF anywhere later is an error.
pub(crate) fn read_frame(stream: &mut dyn ReadWrite) -> std::io::Result<Option<Vec<u8>>> {
    let mut length_buf = [0u8; 4];
    let mut filled = 0;
    while filled < length_buf.len() {
        match stream.read(&mut length_buf[filled..]) {
            Ok(0) if filled == 0 => return Ok(None),
            Ok(0) => {
                return Err(std::io::Error::new(
                    std::io::ErrorKind::UnexpectedEof,
                    "connection closed inside a frame length prefix",
                ));
            }
            Ok(n) => filled += n,
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => {}
            Err(e) => return Err(e),
        }
    }

    let length = u32::from_le_bytes(length_buf);
    if length > MAX_FRAME_LEN {
        return Err(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            format!("frame of {} bytes exceeds the {} byte limit", length, MAX_FRAME_LEN),
        ));
    }

    let mut payload = vec![0u8; length as usize];
    stream.read_exact(&mut payload)?;
    Ok(Some(payload))
}

pub(crate) fn write_frame(stream: &mut dyn ReadWrite, payload: &[u8]) -> std::io::Result<()> {
    let length = payload.len() as u32;
    stream.write_all(&length.to_le_bytes())?;
    stream.write_all(payload)?;
    stream.flush()
}
