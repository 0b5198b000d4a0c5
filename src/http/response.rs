//! Response construction and serialization.
//!
//! # Responsibilities
//! - Map status codes to reason phrases
//! - Negotiate the content encoding and compress the body
//! - Serialize the status line and header block
//!
//! # Design Decisions
//! - Status codes are a closed set, every code has its own reason phrase
//! - `Content-Length` is computed from the bytes actually written, after compression
//! - Head and body are kept apart so they can go out as two writes

use std::fmt;

use flate2::Compression;
use tokio::io::{AsyncWrite, AsyncWriteExt};

use crate::http::encoding::{self, CompressionError, Encoding};

/// Status codes the server produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatusCode {
    Ok,
    Created,
    BadRequest,
    NotFound,
    MethodNotAllowed,
    PayloadTooLarge,
    RequestHeaderFieldsTooLarge,
    InternalServerError,
}

impl StatusCode {
    pub fn as_u16(self) -> u16 {
        match self {
            StatusCode::Ok => 200,
            StatusCode::Created => 201,
            StatusCode::BadRequest => 400,
            StatusCode::NotFound => 404,
            StatusCode::MethodNotAllowed => 405,
            StatusCode::PayloadTooLarge => 413,
            StatusCode::RequestHeaderFieldsTooLarge => 431,
            StatusCode::InternalServerError => 500,
        }
    }

    pub fn reason(self) -> &'static str {
        match self {
            StatusCode::Ok => "OK",
            StatusCode::Created => "Created",
            StatusCode::BadRequest => "Bad Request",
            StatusCode::NotFound => "Not Found",
            StatusCode::MethodNotAllowed => "Method Not Allowed",
            StatusCode::PayloadTooLarge => "Payload Too Large",
            StatusCode::RequestHeaderFieldsTooLarge => "Request Header Fields Too Large",
            StatusCode::InternalServerError => "Internal Server Error",
        }
    }
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.as_u16(), self.reason())
    }
}

/// A response before encoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    status: StatusCode,
    content_type: String,
    encodings: Vec<Encoding>,
    body: Vec<u8>,
}

impl Response {
    pub fn new(status: StatusCode, content_type: impl Into<String>, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            content_type: content_type.into(),
            encodings: Vec::new(),
            body: body.into(),
        }
    }

    /// A `text/plain` response.
    pub fn text(status: StatusCode, body: impl Into<Vec<u8>>) -> Self {
        Self::new(status, "text/plain", body)
    }

    /// A `text/plain` response whose body is the reason phrase.
    pub fn status_only(status: StatusCode) -> Self {
        Self::text(status, status.reason())
    }

    /// Encodings to apply, in order. Each one yields a `Content-Encoding` line.
    pub fn with_encodings(mut self, encodings: &[Encoding]) -> Self {
        self.encodings = encodings.to_vec();
        self
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    pub fn encodings(&self) -> &[Encoding] {
        &self.encodings
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Apply the negotiated encoding and serialize the header block.
    ///
    /// Only the first encoding is applied to the body; chains are not composed.
    pub fn encode(self, level: Compression) -> Result<EncodedResponse, CompressionError> {
        let body = match self.encodings.first() {
            Some(Encoding::Gzip) => encoding::gzip(&self.body, level)?,
            None => self.body,
        };

        let mut head = format!(
            "HTTP/1.1 {}\r\nContent-Type: {}\r\nContent-Length: {}\r\n",
            self.status,
            self.content_type,
            body.len()
        );
        for encoding in &self.encodings {
            head.push_str("Content-Encoding: ");
            head.push_str(encoding.token());
            head.push_str("\r\n");
        }
        head.push_str("\r\n");

        Ok(EncodedResponse {
            status: self.status,
            head: head.into_bytes(),
            body,
        })
    }
}

/// Wire bytes of a response, split into head and body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedResponse {
    status: StatusCode,
    head: Vec<u8>,
    body: Vec<u8>,
}

impl EncodedResponse {
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Status line and headers, terminated by the blank line.
    pub fn head(&self) -> &[u8] {
        &self.head
    }

    /// Body bytes as written, after any compression.
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Value of the `Content-Length` header.
    pub fn content_length(&self) -> usize {
        self.body.len()
    }

    pub fn into_bytes(self) -> Vec<u8> {
        let mut bytes = self.head;
        bytes.extend_from_slice(&self.body);
        bytes
    }

    /// Write the head, then the body.
    pub async fn write_to<W>(&self, writer: &mut W) -> std::io::Result<()>
    where
        W: AsyncWrite + Unpin,
    {
        writer.write_all(&self.head).await?;
        if !self.body.is_empty() {
            writer.write_all(&self.body).await?;
        }
        writer.flush().await
    }
}
