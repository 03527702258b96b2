//! Field paths for `state-tree` documents.
//!
//! A path is the chain of field names leading from a node to one of its
//! descendants. On the wire it is written as an RFC 6901 JSON Pointer:
//! every segment is prefixed with `/`, `~` is escaped as `~0` and `/` as `~1`.
//! The root path is the empty string.
//!
//! # Example
//!
//! ```
//! use state_tree_pointer::{format_path, parse_path};
//!
//! let path = parse_path("/box/width");
//! assert_eq!(path, vec!["box".to_string(), "width".to_string()]);
//! assert_eq!(format_path(&path), "/box/width");
//! ```

pub mod validate;

pub use validate::{validate_path, validate_pointer, PointerError};

/// A single field name inside a path.
pub type Segment = String;

/// A parsed path: field names from the base node downwards.
pub type Path = Vec<Segment>;

/// Escapes one path segment.
///
/// ```
/// use state_tree_pointer::escape_segment;
///
/// assert_eq!(escape_segment("a/b"), "a~1b");
/// assert_eq!(escape_segment("a~b"), "a~0b");
/// assert_eq!(escape_segment("plain"), "plain");
/// ```
pub fn escape_segment(segment: &str) -> String {
    if !segment.contains(['/', '~']) {
        return segment.to_string();
    }
    // `~` first, otherwise the `~` introduced by `~1` is escaped again
    segment.replace('~', "~0").replace('/', "~1")
}

/// Reverses [`escape_segment`].
///
/// ```
/// use state_tree_pointer::unescape_segment;
///
/// assert_eq!(unescape_segment("a~1b"), "a/b");
/// assert_eq!(unescape_segment("a~0b"), "a~b");
/// assert_eq!(unescape_segment("~01"), "~1");
/// ```
pub fn unescape_segment(segment: &str) -> String {
    if !segment.contains('~') {
        return segment.to_string();
    }
    segment.replace("~1", "/").replace("~0", "~")
}

/// Parses a path string into segments.
///
/// Both absolute (`/a/b`) and relative (`a/b`) forms are accepted; the empty
/// segment produced by a leading `/` is dropped. The empty string is the root.
///
/// ```
/// use state_tree_pointer::parse_path;
///
/// assert!(parse_path("").is_empty());
/// assert_eq!(parse_path("/to"), vec!["to"]);
/// assert_eq!(parse_path("to"), vec!["to"]);
/// assert_eq!(parse_path("/"), vec![""]);
/// ```
pub fn parse_path(pointer: &str) -> Path {
    if pointer.is_empty() {
        return Vec::new();
    }
    let body = pointer.strip_prefix('/').unwrap_or(pointer);
    body.split('/').map(unescape_segment).collect()
}

/// Formats segments as an absolute path string.
///
/// ```
/// use state_tree_pointer::format_path;
///
/// assert_eq!(format_path(&[]), "");
/// assert_eq!(format_path(&["a/b".to_string(), "c".to_string()]), "/a~1b/c");
/// ```
pub fn format_path(path: &[Segment]) -> String {
    let mut out = String::with_capacity(path.iter().map(|s| s.len() + 1).sum());
    for segment in path {
        out.push('/');
        out.push_str(&escape_segment(segment));
    }
    out
}

/// Appends one segment to an already formatted path string.
///
/// ```
/// use state_tree_pointer::join_segment;
///
/// assert_eq!(join_segment("", "to"), "/to");
/// assert_eq!(join_segment("/box", "a/b"), "/box/a~1b");
/// ```
pub fn join_segment(base: &str, segment: &str) -> String {
    let escaped = escape_segment(segment);
    let mut out = String::with_capacity(base.len() + escaped.len() + 1);
    out.push_str(base);
    out.push('/');
    out.push_str(&escaped);
    out
}

/// Splits a path into its parent path and last segment.
///
/// # Errors
///
/// [`PointerError::NoParent`] for the root path.
///
/// ```
/// use state_tree_pointer::split_last;
///
/// let path = ["a".to_string(), "b".to_string()];
/// let (parent, last) = split_last(&path).unwrap();
/// assert_eq!(parent, ["a".to_string()]);
/// assert_eq!(last, "b");
/// assert!(split_last(&[]).is_err());
/// ```
pub fn split_last(path: &[Segment]) -> Result<(&[Segment], &str), PointerError> {
    match path.split_last() {
        Some((last, parent)) => Ok((parent, last.as_str())),
        None => Err(PointerError::NoParent),
    }
}
