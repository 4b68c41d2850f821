//! JSON Pointer (RFC 6901) utilities.
//!
//! String-level helpers shared by the leafpatch comparator (which produces
//! pointers) and applier (which consumes them): component escaping, strict
//! parsing, formatting and array-index checks.
//!
//! # Example
//!
//! ```
//! use leafpatch_json_pointer::{format_json_pointer, parse_json_pointer};
//!
//! let path = parse_json_pointer("/event/start~1end").unwrap();
//! assert_eq!(path, vec!["event".to_string(), "start/end".to_string()]);
//!
//! assert_eq!(format_json_pointer(&path), "/event/start~1end");
//! ```

use thiserror::Error;

pub mod types;
pub use types::{Path, PathStep};

pub mod validate;
pub use validate::{validate_json_pointer, validate_path, MAX_PATH_LENGTH, MAX_POINTER_LENGTH};

/// Token that addresses the slot one past the end of an array.
pub const APPEND_TOKEN: &str = "-";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum JsonPointerError {
    #[error("malformed pointer: {0}")]
    Malformed(String),
    #[error("POINTER_TOO_LONG")]
    PointerTooLong,
    #[error("PATH_TOO_LONG")]
    PathTooLong,
    #[error("NO_PARENT")]
    NoParent,
}

/// Unescapes a JSON Pointer path component.
///
/// `~1` becomes `/` and `~0` becomes `~`. Any other `~` sequence, including a
/// trailing `~`, is rejected.
///
/// # Example
///
/// ```
/// use leafpatch_json_pointer::unescape_component;
///
/// assert_eq!(unescape_component("a~0b").unwrap(), "a~b");
/// assert_eq!(unescape_component("c~1d").unwrap(), "c/d");
/// assert!(unescape_component("bad~2").is_err());
/// ```
pub fn unescape_component(component: &str) -> Result<String, JsonPointerError> {
    if !component.contains('~') {
        return Ok(component.to_string());
    }
    let mut out = String::with_capacity(component.len());
    let mut chars = component.chars();
    while let Some(c) = chars.next() {
        if c != '~' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('0') => out.push('~'),
            Some('1') => out.push('/'),
            Some(other) => {
                return Err(JsonPointerError::Malformed(format!(
                    "invalid escape sequence \"~{other}\" in \"{component}\""
                )))
            }
            None => {
                return Err(JsonPointerError::Malformed(format!(
                    "dangling \"~\" in \"{component}\""
                )))
            }
        }
    }
    Ok(out)
}

/// Escapes a JSON Pointer path component.
///
/// # Example
///
/// ```
/// use leafpatch_json_pointer::escape_component;
///
/// assert_eq!(escape_component("a~b"), "a~0b");
/// assert_eq!(escape_component("c/d"), "c~1d");
/// assert_eq!(escape_component("plain"), "plain");
/// ```
pub fn escape_component(component: &str) -> String {
    if !component.contains('/') && !component.contains('~') {
        return component.to_string();
    }
    // `~` first, otherwise the `~` introduced by `~1` would be escaped again.
    component.replace('~', "~0").replace('/', "~1")
}

/// Parse a JSON Pointer string into unescaped path components.
///
/// - The empty string is the root and yields an empty path.
/// - Any other pointer must start with `/`.
///
/// # Example
///
/// ```
/// use leafpatch_json_pointer::parse_json_pointer;
///
/// assert_eq!(parse_json_pointer("").unwrap(), Vec::<String>::new());
/// assert_eq!(parse_json_pointer("/").unwrap(), vec![""]);
/// assert_eq!(parse_json_pointer("/a~0b/c~1d").unwrap(), vec!["a~b", "c/d"]);
/// assert!(parse_json_pointer("no-slash").is_err());
/// ```
pub fn parse_json_pointer(pointer: &str) -> Result<Path, JsonPointerError> {
    if pointer.is_empty() {
        return Ok(Vec::new());
    }
    let Some(rest) = pointer.strip_prefix('/') else {
        return Err(JsonPointerError::Malformed(format!(
            "pointer \"{pointer}\" must be empty or start with \"/\""
        )));
    };
    rest.split('/').map(unescape_component).collect()
}

/// Format path components into a JSON Pointer string.
///
/// Returns an empty string for the root path.
///
/// # Example
///
/// ```
/// use leafpatch_json_pointer::format_json_pointer;
///
/// assert_eq!(format_json_pointer(&[]), "");
/// assert_eq!(format_json_pointer(&["events".to_string(), "1".to_string()]), "/events/1");
/// ```
pub fn format_json_pointer(path: &[String]) -> String {
    let mut out = String::with_capacity(path.iter().map(|s| s.len() + 1).sum());
    for component in path {
        out.push('/');
        out.push_str(&escape_component(component));
    }
    out
}

/// Check if a path points to the root value.
pub fn is_root(path: &[String]) -> bool {
    path.is_empty()
}

/// Check if `child` lies strictly below `parent`.
///
/// # Example
///
/// ```
/// use leafpatch_json_pointer::is_child;
///
/// let parent = vec!["event".to_string()];
/// let child = vec!["event".to_string(), "startTime".to_string()];
/// assert!(is_child(&parent, &child));
/// assert!(!is_child(&child, &parent));
/// ```
pub fn is_child(parent: &[String], child: &[String]) -> bool {
    parent.len() < child.len() && child.starts_with(parent)
}

/// Get the parent path of a given path.
///
/// # Errors
///
/// Returns [`JsonPointerError::NoParent`] for the root path.
pub fn parent(path: &[String]) -> Result<&[String], JsonPointerError> {
    match path.split_last() {
        Some((_, init)) => Ok(init),
        None => Err(JsonPointerError::NoParent),
    }
}

/// Check if a token is a canonical non-negative array index.
///
/// # Example
///
/// ```
/// use leafpatch_json_pointer::is_valid_index;
///
/// assert!(is_valid_index("0"));
/// assert!(is_valid_index("42"));
/// assert!(!is_valid_index("01"));
/// assert!(!is_valid_index("-1"));
/// assert!(!is_valid_index("-"));
/// ```
pub fn is_valid_index(token: &str) -> bool {
    let bytes = token.as_bytes();
    if bytes.is_empty() {
        return false;
    }
    // A leading zero is only valid for "0" itself.
    if bytes.len() > 1 && bytes[0] == b'0' {
        return false;
    }
    bytes.iter().all(u8::is_ascii_digit)
}

/// Parse a token as an array index, returning `None` for non-canonical input
/// or values that overflow `usize`.
pub fn parse_index(token: &str) -> Option<usize> {
    if !is_valid_index(token) {
        return None;
    }
    token.parse().ok()
}
