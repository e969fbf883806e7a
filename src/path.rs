//! Path codec: splitting a path string into pathname/search/hash and
//! joining them back.
//!
//! It does not decode percent-escapes and does
//! not interpret the query string; `search` and `hash` keep their leading
//! `?` / `#`.
//!
//! ```
//! use navigation_history::path::{create_path, parse_path};
//!
//! let parts = parse_path("/home?the=query#top");
//! assert_eq!(parts.pathname, "/home");
//! assert_eq!(parts.search, "?the=query");
//! assert_eq!(parts.hash, "#top");
//! assert_eq!(create_path(&parts.pathname, &parts.search, &parts.hash), "/home?the=query#top");
//! ```

/// The three address components of a path.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PathParts {
    /// Path portion, always starting with `/` after parsing.
    pub pathname: String,
    /// Query portion including the leading `?`, or empty.
    pub search: String,
    /// Fragment portion including the leading `#`, or empty.
    pub hash: String,
}

/// Split a path (or absolute URL) into pathname, search and hash.
///
/// A leading `scheme://host` or protocol-relative `//host` is dropped. An
/// empty pathname becomes `/`.
pub fn parse_path(path: &str) -> PathParts {
    let mut pathname = strip_origin(path);
    let mut search = "";
    let mut hash = "";

    if let Some(index) = pathname.find('#') {
        hash = &pathname[index..];
        pathname = &pathname[..index];
    }

    if let Some(index) = pathname.find('?') {
        search = &pathname[index..];
        pathname = &pathname[..index];
    }

    PathParts {
        pathname: if pathname.is_empty() {
            "/".to_string()
        } else {
            pathname.to_string()
        },
        search: search.to_string(),
        hash: hash.to_string(),
    }
}

/// Join pathname, search and hash into a single path string.
///
/// A search consisting of a bare `?` is dropped.
pub fn create_path(pathname: &str, search: &str, hash: &str) -> String {
    let mut path = String::with_capacity(pathname.len() + search.len() + hash.len());
    path.push_str(pathname);
    if !search.is_empty() && search != "?" {
        path.push_str(search);
    }
    path.push_str(hash);
    path
}

fn strip_origin(path: &str) -> &str {
    let rest = if let Some(rest) = path.strip_prefix("//") {
        rest
    } else if let Some(rest) = path
        .strip_prefix("https://")
        .or_else(|| path.strip_prefix("http://"))
    {
        rest
    } else {
        return path;
    };

    match rest.find(|c: char| matches!(c, '/' | '?' | '#')) {
        Some(index) => &rest[index..],
        None => "",
    }
}
