//! Route matching logic.
//!
//! # Responsibilities
//! - Classify a request target into one of the fixed routes
//! - Pick a content type from a file-style extension
//!
//! # Design Decisions
//! - Matching is on the first path segment only; the second segment is the argument
//! - Path matching is case-sensitive
//! - No regex, plain `match` tables

/// The routes the server knows about, borrowed from the request target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route<'a> {
    /// `/`
    Root,
    /// `/echo/<value>`
    Echo(&'a str),
    /// `/user-agent`
    UserAgent,
    /// `/files/<name>`
    Files(&'a str),
    /// Anything else.
    NotFound,
}

impl<'a> Route<'a> {
    /// Match a raw request target.
    ///
    /// Segments beyond the second are ignored, so `/echo/a/b` echoes `a`.
    pub fn match_path(path: &'a str) -> Self {
        if path == "/" {
            return Route::Root;
        }

        let mut segments = path.split('/');
        // Targets start with '/', so the first segment is empty.
        if segments.next() != Some("") {
            return Route::NotFound;
        }
        let head = segments.next().unwrap_or("");
        let argument = segments.next().unwrap_or("");

        match head {
            "echo" => Route::Echo(argument),
            "user-agent" => Route::UserAgent,
            "files" => Route::Files(argument),
            _ => Route::NotFound,
        }
    }
}

/// Content type for a file-style name, keyed on everything after the first `.`.
pub fn content_type_for(name: &str) -> &'static str {
    let extension = match name.split_once('.') {
        Some((_, extension)) => extension,
        None => return "text/plain",
    };

    match extension {
        "jpeg" => "image/jpeg",
        "png" => "image/png",
        "html" => "text/html",
        "json" => "application/json",
        "xml" => "application/xml",
        _ => "text/plain",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_route_matching() {
        assert_eq!(Route::match_path("/"), Route::Root);
        assert_eq!(Route::match_path("/echo/abc"), Route::Echo("abc"));
        assert_eq!(Route::match_path("/echo/abc/def"), Route::Echo("abc"));
        assert_eq!(Route::match_path("/echo"), Route::Echo(""));
        assert_eq!(Route::match_path("/user-agent"), Route::UserAgent);
        assert_eq!(Route::match_path("/files/a.txt"), Route::Files("a.txt"));
        assert_eq!(Route::match_path("/files"), Route::Files(""));
    }

    #[test]
    fn test_unmatched_paths() {
        assert_eq!(Route::match_path(""), Route::NotFound);
        assert_eq!(Route::match_path("/index.html"), Route::NotFound);
        assert_eq!(Route::match_path("/Echo/abc"), Route::NotFound);
        assert_eq!(Route::match_path("echo/abc"), Route::NotFound);
        assert_eq!(Route::match_path("//echo"), Route::NotFound);
    }

    #[test]
    fn test_content_type_sniffing() {
        assert_eq!(content_type_for("abc"), "text/plain");
        assert_eq!(content_type_for("photo.jpeg"), "image/jpeg");
        assert_eq!(content_type_for("logo.png"), "image/png");
        assert_eq!(content_type_for("index.html"), "text/html");
        assert_eq!(content_type_for("data.json"), "application/json");
        assert_eq!(content_type_for("feed.xml"), "application/xml");
        assert_eq!(content_type_for("notes.txt"), "text/plain");
        // Everything after the first dot is the extension.
        assert_eq!(content_type_for("archive.tar.json"), "text/plain");
    }
}
