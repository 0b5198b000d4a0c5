//! Observability subsystem.
//!
//! Every connection logs under its `connection_id`, with `peer_addr`,
//! `method`, `path` and `status` as structured fields.

pub mod logging;

pub use logging::init_logging;
