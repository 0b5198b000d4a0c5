//! HTTP server: accept loop and per-connection handling.
//!
//! # Responsibilities
//! - Accept connections and spawn one task per connection
//! - Read one request under a deadline, dispatch it, write one response
//! - Map parse and compression failures to statuses
//! - Stop accepting on shutdown and drain in-flight connections
//!
//! # Design Decisions
//! - One request per connection; the socket is closed after the response
//! - Connection read failures close silently, nothing is written
//! - Tasks share only the immutable router and settings

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use flate2::Compression;
use tokio::io::{AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio::sync::broadcast;
use tokio::time::timeout;

use crate::config::ServerConfig;
use crate::http::encoding::CompressionError;
use crate::http::request::{ParseError, Request, RequestLimits};
use crate::http::response::{EncodedResponse, Response, StatusCode};
use crate::net::{ConnectionId, ConnectionTracker, Listener, ListenerError};
use crate::routing::{FileStore, Router};

/// Per-connection settings, shared by all connection tasks.
#[derive(Debug)]
struct ConnectionContext {
    router: Router,
    limits: RequestLimits,
    read_timeout: Duration,
    write_timeout: Duration,
    compression: Compression,
}

/// HTTP server for the file/echo routes.
pub struct HttpServer {
    context: Arc<ConnectionContext>,
    tracker: ConnectionTracker,
    shutdown_grace: Duration,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: ServerConfig) -> Self {
        let router = Router::new(FileStore::new(config.files.directory.clone()));
        let context = ConnectionContext {
            router,
            limits: config.limits.request_limits(),
            read_timeout: Duration::from_secs(config.timeouts.read_secs),
            write_timeout: Duration::from_secs(config.timeouts.write_secs),
            compression: config.compression.gzip_level(),
        };

        Self {
            context: Arc::new(context),
            tracker: ConnectionTracker::new(),
            shutdown_grace: Duration::from_secs(config.timeouts.shutdown_grace_secs),
        }
    }

    /// Run the server until `shutdown` fires, then drain.
    pub async fn run(
        self,
        listener: Listener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), ListenerError> {
        tracing::info!(
            address = ?listener.local_addr().ok(),
            directory = %self.context.router.files().root().display(),
            "HTTP server starting"
        );

        loop {
            tokio::select! {
                accepted = listener.accept() => {
                    let (stream, peer_addr, permit) = match accepted {
                        Ok(accepted) => accepted,
                        Err(ListenerError::Accept(e)) => {
                            tracing::warn!(error = %e, "Failed to accept connection");
                            continue;
                        }
                        Err(e) => return Err(e),
                    };

                    let guard = self.tracker.track();
                    let context = Arc::clone(&self.context);
                    tokio::spawn(async move {
                        handle_connection(&context, stream, peer_addr, guard.id()).await;
                        drop(guard);
                        drop(permit);
                    });
                }
                _ = shutdown.recv() => {
                    tracing::info!("Shutdown requested, no longer accepting connections");
                    break;
                }
            }
        }

        drop(listener);
        if self.tracker.wait_for_drain(self.shutdown_grace).await {
            tracing::info!("HTTP server stopped");
        } else {
            tracing::warn!(
                active_connections = self.tracker.active_count(),
                "Shutdown grace period elapsed with connections still open"
            );
        }
        Ok(())
    }
}

async fn handle_connection(
    context: &ConnectionContext,
    mut stream: TcpStream,
    peer_addr: SocketAddr,
    id: ConnectionId,
) {
    let (read_half, mut write_half) = stream.split();
    let mut reader = BufReader::new(read_half);

    let parsed = match timeout(
        context.read_timeout,
        Request::read_from(&mut reader, context.limits),
    )
    .await
    {
        Ok(parsed) => parsed,
        Err(_) => {
            tracing::debug!(connection_id = %id, peer_addr = %peer_addr, "Read deadline elapsed");
            return;
        }
    };

    let response = match parsed {
        Ok(request) => {
            let response = context.router.dispatch(&request).await;
            tracing::info!(
                connection_id = %id,
                peer_addr = %peer_addr,
                method = %request.method,
                path = %request.path,
                status = response.status().as_u16(),
                "Request handled"
            );
            response
        }
        Err(e) => match e.status() {
            Some(status) => {
                tracing::warn!(connection_id = %id, peer_addr = %peer_addr, error = %e, "Rejected request");
                Response::status_only(status)
            }
            None => {
                tracing::debug!(connection_id = %id, peer_addr = %peer_addr, error = %e, "Connection closed before a request was read");
                return;
            }
        },
    };

    let Some(encoded) = encode(response, context.compression, id) else {
        return;
    };

    match timeout(context.write_timeout, encoded.write_to(&mut write_half)).await {
        Ok(Ok(())) => {
            let _ = write_half.shutdown().await;
        }
        Ok(Err(e)) => {
            tracing::warn!(connection_id = %id, error = %e, "Failed to write response");
        }
        Err(_) => {
            tracing::warn!(connection_id = %id, "Write deadline elapsed");
        }
    }
}

fn encode(response: Response, level: Compression, id: ConnectionId) -> Option<EncodedResponse> {
    encode_with(response, id, |response| response.encode(level))
}

/// Run `encoder` on `response`, falling back to a plain 500 when it fails.
///
/// `None` means not even the 500 could be encoded and the connection is dropped.
fn encode_with<F>(response: Response, id: ConnectionId, encoder: F) -> Option<EncodedResponse>
where
    F: Fn(Response) -> Result<EncodedResponse, CompressionError>,
{
    match encoder(response) {
        Ok(encoded) => Some(encoded),
        Err(e) => {
            tracing::error!(connection_id = %id, error = %e, "Failed to encode response");
            match encoder(Response::status_only(StatusCode::InternalServerError)) {
                Ok(encoded) => Some(encoded),
                Err(e) => {
                    tracing::error!(connection_id = %id, error = %e, "Failed to encode error response");
                    None
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::encoding::Encoding;
    use std::io;

    fn failing_gzip(response: Response) -> Result<EncodedResponse, CompressionError> {
        if response.encodings().is_empty() {
            response.encode(Compression::default())
        } else {
            Err(io::Error::new(io::ErrorKind::Other, "encoder failed").into())
        }
    }

    #[test]
    fn test_encode_negotiates_gzip() {
        let response = Response::text(StatusCode::Ok, "abc").with_encodings(&[Encoding::Gzip]);
        let encoded = encode(response, Compression::default(), ConnectionId::new()).unwrap();
        let head = std::str::from_utf8(encoded.head()).unwrap();
        assert!(head.contains("Content-Encoding: gzip\r\n"));
    }

    #[test]
    fn test_compression_failure_becomes_plain_500() {
        let response = Response::text(StatusCode::Ok, "abc").with_encodings(&[Encoding::Gzip]);
        let encoded = encode_with(response, ConnectionId::new(), failing_gzip).unwrap();

        assert_eq!(encoded.status(), StatusCode::InternalServerError);
        let head = std::str::from_utf8(encoded.head()).unwrap();
        assert!(head.starts_with("HTTP/1.1 500 Internal Server Error\r\n"));
        assert!(!head.contains("Content-Encoding"));
        assert_eq!(encoded.body(), b"Internal Server Error");
    }

    #[test]
    fn test_connection_dropped_when_error_response_fails() {
        let response = Response::text(StatusCode::Ok, "abc");
        let encoded = encode_with(response, ConnectionId::new(), |_| {
            Err(io::Error::new(io::ErrorKind::Other, "encoder failed").into())
        });
        assert!(encoded.is_none());
    }
}
