//! Route dispatch.
//!
//! # Responsibilities
//! - Turn a parsed request into a response descriptor
//! - Serve and store files under the configured directory
//! - Attach the request's accepted encodings to every response
//!
//! # Design Decisions
//! - Immutable after construction, shared via Arc across connections
//! - File errors become statuses here; the HTTP layer never sees `FileError`

use crate::http::request::{Method, Request};
use crate::http::response::{Response, StatusCode};
use crate::routing::files::{FileError, FileStore};
use crate::routing::matcher::{content_type_for, Route};

/// Dispatches requests to the fixed route table.
#[derive(Debug, Clone)]
pub struct Router {
    files: FileStore,
}

impl Router {
    pub fn new(files: FileStore) -> Self {
        Self { files }
    }

    pub fn files(&self) -> &FileStore {
        &self.files
    }

    /// Build the response for `request`, negotiated against its `Accept-Encoding`.
    pub async fn dispatch(&self, request: &Request) -> Response {
        let response = match Route::match_path(&request.path) {
            Route::Root => Response::text(StatusCode::Ok, ""),
            Route::Echo(value) => Response::new(StatusCode::Ok, content_type_for(value), value),
            Route::UserAgent => Response::text(StatusCode::Ok, request.headers.user_agent.as_str()),
            Route::Files(name) => self.files_route(&request.method, name, &request.body).await,
            Route::NotFound => Response::status_only(StatusCode::NotFound),
        };
        response.with_encodings(&request.headers.accepted_encodings)
    }

    async fn files_route(&self, method: &Method, name: &str, body: &[u8]) -> Response {
        match method {
            Method::Get => match self.files.read(name).await {
                Ok(data) => Response::new(StatusCode::Ok, "application/octet-stream", data),
                Err(e) => file_error_response(e),
            },
            Method::Post => match self.files.write(name, body).await {
                Ok(()) => {
                    tracing::debug!(file = %name, bytes = body.len(), "File stored");
                    Response::status_only(StatusCode::Created)
                }
                Err(e) => file_error_response(e),
            },
            Method::Other(_) => Response::status_only(StatusCode::MethodNotAllowed),
        }
    }
}

fn file_error_response(error: FileError) -> Response {
    match error {
        FileError::InvalidName(ref name) => {
            tracing::warn!(file = %name, "Rejected file name");
            Response::status_only(StatusCode::NotFound)
        }
        FileError::NotFound(_) => Response::status_only(StatusCode::NotFound),
        FileError::Read { .. } | FileError::Write { .. } => {
            tracing::error!(error = %error, "File access failed");
            Response::status_only(StatusCode::InternalServerError)
        }
    }
}
