//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (accept loop, deadlines, one task per connection)
//!     → request.rs (request line, recognized headers, Content-Length body)
//!     → [routing layer builds a Response]
//!     → response.rs (status line, headers, negotiated encoding)
//!     → encoding.rs (gzip)
//!     → Written back, connection closed
//! ```

pub mod encoding;
pub mod request;
pub mod response;
pub mod server;

pub use encoding::{CompressionError, Encoding};
pub use request::{Headers, Method, ParseError, Request, RequestLimits};
pub use response::{EncodedResponse, Response, StatusCode};
pub use server::HttpServer;
