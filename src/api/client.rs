// src/api/client.rs
//! Client side of the framed socket protocol
//!
//! Connects per request: one envelope out, one response back. The CLI
//! uses this; anything that can speak the framing can do the same.

use std::net::TcpStream;
#[cfg(unix)]
use std::os::unix::net::UnixStream;
#[cfg(not(unix))]
use std::path::Path;

use thiserror::Error;

use super::protocol::{ApiResponse, RequestEnvelope};
use super::server::{read_frame, write_frame, Endpoint, ReadWrite};

#[derive(Debug, Error)]
pub enum CallError {
    #[error("failed to connect to {endpoint}: {source}")]
    Connect {
        endpoint: String,
        source: std::io::Error,
    },
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("server closed the connection without responding")]
    NoResponse,
    #[cfg(not(unix))]
    #[error("{0}")]
    Unsupported(String),
}

pub struct ApiClient {
    endpoint: Endpoint,
}

impl ApiClient {
    pub fn new(endpoint: Endpoint) -> Self {
        Self { endpoint }
    }

    /// Sends one request and waits for its response.
    pub fn send(&self, request: &RequestEnvelope) -> Result<ApiResponse, CallError> {
        let mut stream = self.connect()?;

        let payload = serde_json::to_vec(request)?;
        write_frame(&mut *stream, &payload)?;

        let frame = read_frame(&mut *stream)?.ok_or(CallError::NoResponse)?;
        let response: ApiResponse = serde_json::from_slice(&frame)?;
        Ok(response)
    }

    fn connect(&self) -> Result<Box<dyn ReadWrite>, CallError> {
        match &self.endpoint {
            Endpoint::Unix(path) => Self::connect_unix(path),
            Endpoint::Tcp(addr) => {
                let stream = TcpStream::connect(addr).map_err(|source| CallError::Connect {
                    endpoint: format!("tcp:{}", addr),
                    source,
                })?;
                Ok(Box::new(stream))
            }
        }
    }

    #[cfg(unix)]
    fn connect_unix(path: &std::path::Path) -> Result<Box<dyn ReadWrite>, CallError> {
        let stream = UnixStream::connect(path).map_err(|source| CallError::Connect {
            endpoint: format!("unix:{}", path.display()),
            source,
        })?;
        Ok(Box::new(stream))
    }

    #[cfg(not(unix))]
    fn connect_unix(path: &Path) -> Result<Box<dyn ReadWrite>, CallError> {
        Err(CallError::Unsupported(format!(
            "unix sockets are unavailable on this platform (requested {})",
            path.display()
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::TcpListener;

    #[test]
    fn sends_one_frame_and_reads_one_response() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();

        let server = std::thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let frame = read_frame(&mut stream).unwrap().unwrap();
            let request: RequestEnvelope = serde_json::from_slice(&frame).unwrap();
            assert_eq!(request.action, "getAllSpriteNames");
            assert_eq!(request.user.as_deref(), Some("alexia"));

            let response = ApiResponse {
                success: true,
                message: "ss-api-okay".to_string(),
                message_text: "Okay".to_string(),
                sprite_sheet_id: None,
                tag: None,
                data: Some(Vec::new()),
            };
            write_frame(&mut stream, &serde_json::to_vec(&response).unwrap()).unwrap();
        });

        let client = ApiClient::new(Endpoint::Tcp(addr.to_string()));
        let request = RequestEnvelope {
            action: "getAllSpriteNames".to_string(),
            user: Some("alexia".to_string()),
            spritesheet_id: Some(1),
            ..Default::default()
        };
        let response = client.send(&request).unwrap();
        assert!(response.success);
        assert_eq!(response.data, Some(Vec::new()));

        server.join().unwrap();
    }

    #[test]
    fn refused_connections_report_the_endpoint() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = ApiClient::new(Endpoint::Tcp(addr.to_string()));
        match client.send(&RequestEnvelope::default()) {
            Err(CallError::Connect { endpoint, .. }) => assert!(endpoint.contains("tcp:")),
            other => panic!("expected Connect error, got {:?}", other),
        }
    }
}
