//! Request parsing.
//!
//! # Responsibilities
//! - Read the request line and split it into method, target and version
//! - Project the recognized headers onto a fixed record
//! - Read exactly `Content-Length` bytes of body
//!
//! # Design Decisions
//! - Single pass over CRLF-terminated lines; framing is "no body" or "exactly N bytes"
//! - Unrecognized headers are dropped, the parser is not a general header store
//! - A non-numeric `Content-Length` is logged and left at 0
//! - Body size is checked against the limit before any body byte is read
//! - The request line and headers share one byte budget, so the head cannot grow unbounded

use std::fmt;
use std::io;

use thiserror::Error;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt};

use crate::http::encoding::Encoding;
use crate::http::response::StatusCode;

/// Request method. Anything other than GET and POST is passed through opaquely.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Other(String),
}

impl Method {
    pub fn parse(token: &str) -> Self {
        match token {
            "GET" => Method::Get,
            "POST" => Method::Post,
            other => Method::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Other(token) => token,
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The headers the server understands. Everything else is ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Headers {
    pub content_type: String,
    pub content_length: usize,
    pub user_agent: String,
    /// Supported encodings from `Accept-Encoding`, in the order offered, without repeats.
    pub accepted_encodings: Vec<Encoding>,
}

impl Headers {
    fn apply(&mut self, name: &str, value: &str) {
        match name {
            "User-Agent" => self.user_agent = value.to_string(),
            "Content-Type" => self.content_type = value.to_string(),
            "Content-Length" => match value.parse::<usize>() {
                Ok(length) => self.content_length = length,
                Err(e) => {
                    tracing::warn!(value = %value, error = %e, "Ignoring non-numeric Content-Length");
                }
            },
            "Accept-Encoding" => {
                for encoding in value.split(", ").filter_map(Encoding::from_token) {
                    if !self.accepted_encodings.contains(&encoding) {
                        self.accepted_encodings.push(encoding);
                    }
                }
            }
            _ => {}
        }
    }
}

/// Errors produced while reading a request off a connection.
#[derive(Debug, Error)]
pub enum ParseError {
    /// The connection failed or closed before the header section was complete.
    #[error("failed to read request: {0}")]
    ConnectionRead(#[from] io::Error),

    /// The request line lacks a method or a target.
    #[error("malformed request line: {0:?}")]
    MalformedRequestLine(String),

    /// The stream ended before `Content-Length` bytes of body arrived.
    #[error("truncated body: expected {expected} bytes, received {received}")]
    TruncatedBody { expected: usize, received: usize },

    /// The declared body exceeds the configured limit.
    #[error("body of {length} bytes exceeds limit of {limit} bytes")]
    BodyTooLarge { length: usize, limit: usize },

    /// The request line and headers exceed the configured limit.
    #[error("request head exceeds limit of {limit} bytes")]
    HeadTooLarge { limit: usize },
}

impl ParseError {
    /// Status to answer with, or `None` when the connection should just be closed.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ParseError::ConnectionRead(_) => None,
            ParseError::MalformedRequestLine(_) | ParseError::TruncatedBody { .. } => {
                Some(StatusCode::BadRequest)
            }
            ParseError::BodyTooLarge { .. } => Some(StatusCode::PayloadTooLarge),
            ParseError::HeadTooLarge { .. } => Some(StatusCode::RequestHeaderFieldsTooLarge),
        }
    }
}

/// Size limits applied while reading a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestLimits {
    /// Request line plus header section, terminators included.
    pub max_head_bytes: usize,
    /// Largest accepted `Content-Length`.
    pub max_body_bytes: usize,
}

impl Default for RequestLimits {
    fn default() -> Self {
        Self {
            max_head_bytes: 8 * 1024,
            max_body_bytes: 10 * 1024 * 1024,
        }
    }
}

/// One parsed HTTP request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub method: Method,
    /// Raw request target, e.g. `/echo/abc`.
    pub path: String,
    /// Third token of the request line. Read, never validated.
    pub version: Option<String>,
    pub headers: Headers,
    pub body: Vec<u8>,
}

impl Request {
    /// Read one request from `reader`.
    ///
    /// Bodies larger than `limits.max_body_bytes` are rejected with
    /// [`ParseError::BodyTooLarge`] without being read. Reading stops with
    /// [`ParseError::HeadTooLarge`] once the head passes `limits.max_head_bytes`.
    pub async fn read_from<R>(reader: &mut R, limits: RequestLimits) -> Result<Self, ParseError>
    where
        R: AsyncBufRead + Unpin,
    {
        let mut head = HeadBudget::new(limits.max_head_bytes);

        let request_line = head
            .read_line(reader)
            .await?
            .ok_or_else(|| closed("connection closed before request line"))?;

        let mut tokens = request_line.trim().splitn(3, ' ');
        let method = tokens.next().filter(|t| !t.is_empty());
        let target = tokens.next().filter(|t| !t.is_empty());
        let (method, path) = match (method, target) {
            (Some(method), Some(target)) => (Method::parse(method), target.to_string()),
            _ => return Err(ParseError::MalformedRequestLine(request_line)),
        };
        let version = tokens.next().map(str::to_string);

        let mut headers = Headers::default();
        loop {
            let line = head
                .read_line(reader)
                .await?
                .ok_or_else(|| closed("connection closed inside header section"))?;
            let line = line.trim();
            if line.is_empty() {
                break;
            }
            if let Some((name, value)) = line.split_once(':') {
                headers.apply(name.trim(), value.trim());
            }
        }

        let body = read_body(reader, headers.content_length, limits.max_body_bytes).await?;

        Ok(Self {
            method,
            path,
            version,
            headers,
            body,
        })
    }
}

/// Bytes left for the request line and headers.
struct HeadBudget {
    limit: usize,
    remaining: usize,
}

impl HeadBudget {
    fn new(limit: usize) -> Self {
        Self {
            limit,
            remaining: limit,
        }
    }

    /// Read one line, without its terminator. `None` at end of stream.
    async fn read_line<R>(&mut self, reader: &mut R) -> Result<Option<String>, ParseError>
    where
        R: AsyncBufRead + Unpin,
    {
        let mut buf = Vec::new();
        let read = (&mut *reader)
            .take(self.remaining as u64)
            .read_until(b'\n', &mut buf)
            .await?;
        self.remaining -= read;

        if buf.last() != Some(&b'\n') && self.remaining == 0 {
            return Err(ParseError::HeadTooLarge { limit: self.limit });
        }
        if read == 0 {
            return Ok(None);
        }
        let line = String::from_utf8_lossy(&buf);
        Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
    }
}

async fn read_body<R>(reader: &mut R, length: usize, limit: usize) -> Result<Vec<u8>, ParseError>
where
    R: AsyncBufRead + Unpin,
{
    if length == 0 {
        return Ok(Vec::new());
    }
    if length > limit {
        return Err(ParseError::BodyTooLarge { length, limit });
    }

    let mut body = Vec::with_capacity(length);
    (&mut *reader).take(length as u64).read_to_end(&mut body).await?;
    if body.len() < length {
        return Err(ParseError::TruncatedBody {
            expected: length,
            received: body.len(),
        });
    }
    Ok(body)
}

fn closed(context: &'static str) -> io::Error {
    io::Error::new(io::ErrorKind::UnexpectedEof, context)
}
