//! Minimal HTTP/1.1 server with echo, user-agent and file routes.
//!
//! Each connection carries exactly one request. Responses are gzip-compressed
//! when the client accepts it.

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod net;
pub mod observability;
pub mod routing;

pub use config::schema::ServerConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
