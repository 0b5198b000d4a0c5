//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from TOML and carry
//! defaults, so an empty file is a valid configuration.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::http::request::RequestLimits;

/// Root configuration for the server.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ServerConfig {
    /// Listener configuration (bind address, connection limit).
    pub listener: ListenerConfig,

    /// Directory served under `/files/`.
    pub files: FilesConfig,

    /// Request size limits.
    pub limits: LimitsConfig,

    /// Per-connection deadlines and shutdown grace.
    pub timeouts: TimeoutConfig,

    /// Response compression settings.
    pub compression: CompressionConfig,

    /// Logging settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:4221").
    pub bind_address: String,

    /// Maximum concurrent connections (backpressure).
    pub max_connections: usize,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:4221".to_string(),
            max_connections: 1024,
        }
    }
}

/// File route configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct FilesConfig {
    /// Root directory for `/files/<name>` reads and uploads.
    pub directory: PathBuf,
}

impl Default for FilesConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("."),
        }
    }
}

/// Request size limits.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Largest request line plus header section, in bytes.
    pub max_header_bytes: usize,

    /// Largest accepted `Content-Length`, in bytes.
    pub max_body_bytes: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_header_bytes: 8 * 1024,       // 8KB
            max_body_bytes: 10 * 1024 * 1024, // 10MB
        }
    }
}

impl LimitsConfig {
    pub fn request_limits(&self) -> RequestLimits {
        RequestLimits {
            max_head_bytes: self.max_header_bytes,
            max_body_bytes: self.max_body_bytes,
        }
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Time allowed to receive a complete request, in seconds.
    pub read_secs: u64,

    /// Time allowed to write the response, in seconds.
    pub write_secs: u64,

    /// How long shutdown waits for in-flight connections, in seconds.
    pub shutdown_grace_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            read_secs: 30,
            write_secs: 30,
            shutdown_grace_secs: 10,
        }
    }
}

/// Compression configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CompressionConfig {
    /// gzip level, 0 (store) to 9 (best).
    pub level: u32,
}

impl Default for CompressionConfig {
    fn default() -> Self {
        Self { level: 6 }
    }
}

impl CompressionConfig {
    pub fn gzip_level(&self) -> flate2::Compression {
        flate2::Compression::new(self.level)
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error). `RUST_LOG` takes precedence.
    pub log_level: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_uses_defaults() {
        let config: ServerConfig = toml::from_str("").unwrap();
        assert_eq!(config.listener.bind_address, "0.0.0.0:4221");
        assert_eq!(config.files.directory, PathBuf::from("."));
        assert_eq!(config.compression.level, 6);
        assert_eq!(config.limits.request_limits(), RequestLimits::default());
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let config: ServerConfig = toml::from_str(
            r#"
            [files]
            directory = "/tmp/served"

            [timeouts]
            read_secs = 5
            "#,
        )
        .unwrap();
        assert_eq!(config.files.directory, PathBuf::from("/tmp/served"));
        assert_eq!(config.timeouts.read_secs, 5);
        assert_eq!(config.timeouts.write_secs, 30);
        assert_eq!(config.listener.max_connections, 1024);
    }
}
