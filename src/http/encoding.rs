//! Content encodings and the gzip step.
//!
//! # Responsibilities
//! - Recognize the encoding tokens the server can honor
//! - Compress response bodies with gzip
//!
//! # Design Decisions
//! - Only gzip is supported; unknown tokens are dropped at parse time
//! - Encoder failures surface as `CompressionError`, never as a plain body

use std::fmt;
use std::io::{self, Write};

use flate2::write::GzEncoder;
use flate2::Compression;
use thiserror::Error;

/// A content encoding the server is able to apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Encoding {
    Gzip,
}

impl Encoding {
    /// Look up a single `Accept-Encoding` token.
    ///
    /// Returns `None` for anything the server cannot produce (`deflate`, `br`,
    /// `identity`, ...).
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "gzip" => Some(Encoding::Gzip),
            _ => None,
        }
    }

    /// The token as it appears in `Content-Encoding`.
    pub fn token(&self) -> &'static str {
        match self {
            Encoding::Gzip => "gzip",
        }
    }
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

/// The gzip encoder failed.
#[derive(Debug, Error)]
#[error("gzip compression failed: {0}")]
pub struct CompressionError(#[from] io::Error);

/// Compress `data` into a complete gzip member.
pub fn gzip(data: &[u8], level: Compression) -> Result<Vec<u8>, CompressionError> {
    let mut encoder = GzEncoder::new(Vec::with_capacity(data.len() / 2 + 32), level);
    encoder.write_all(data)?;
    Ok(encoder.finish()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::read::GzDecoder;
    use std::io::Read;

    fn gunzip(data: &[u8]) -> Vec<u8> {
        let mut out = Vec::new();
        GzDecoder::new(data).read_to_end(&mut out).unwrap();
        out
    }

    #[test]
    fn only_gzip_token_is_recognized() {
        assert_eq!(Encoding::from_token("gzip"), Some(Encoding::Gzip));
        assert_eq!(Encoding::from_token("deflate"), None);
        assert_eq!(Encoding::from_token("br"), None);
        assert_eq!(Encoding::from_token("identity"), None);
        assert_eq!(Encoding::from_token("GZIP"), None);
    }

    #[test]
    fn gzip_round_trips() {
        let input = b"The quick brown fox jumps over the lazy dog".repeat(20);
        let compressed = gzip(&input, Compression::default()).unwrap();
        assert_ne!(compressed, input);
        assert_eq!(gunzip(&compressed), input);
    }

    #[test]
    fn gzip_of_empty_body_is_a_valid_member() {
        let compressed = gzip(b"", Compression::fast()).unwrap();
        // 10 byte header + empty deflate block + 8 byte trailer
        assert!(compressed.len() >= 18);
        assert!(gunzip(&compressed).is_empty());
    }

    #[test]
    fn display_uses_wire_token() {
        assert_eq!(Encoding::Gzip.to_string(), "gzip");
    }
}
