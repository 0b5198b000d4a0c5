//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Parsed Request (method, path, headers, body)
//!     → matcher.rs (classify path into a Route)
//!     → router.rs (run the route, map failures to statuses)
//!     → files.rs (serving directory, for /files/)
//!     → Response descriptor, negotiated encodings attached
//! ```
//!
//! # Design Decisions
//! - Fixed route table, no registration API
//! - Deterministic: same input always matches same route
//! - Path traversal rejected before the filesystem is touched

pub mod files;
pub mod matcher;
pub mod router;

pub use files::{FileError, FileStore};
pub use matcher::Route;
pub use router::Router;
