//! Validation of path strings and parsed paths.

use thiserror::Error;

/// Maximum accepted length of a path string.
const MAX_POINTER_LENGTH: usize = 1024;

/// Maximum accepted number of segments.
const MAX_PATH_DEPTH: usize = 256;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PointerError {
    #[error("POINTER_TOO_LONG")]
    PointerTooLong,
    #[error("PATH_TOO_DEEP")]
    PathTooDeep,
    #[error("INVALID_ESCAPE: {0}")]
    InvalidEscape(String),
    #[error("NO_PARENT")]
    NoParent,
}

/// Validates a path string.
///
/// `~` may only appear as part of the `~0` and `~1` escapes.
///
/// # Errors
///
/// [`PointerError::PointerTooLong`] past 1024 bytes,
/// [`PointerError::InvalidEscape`] for a dangling `~`.
///
/// ```
/// use state_tree_pointer::validate_pointer;
///
/// validate_pointer("").unwrap();
/// validate_pointer("/a~0b/c~1d").unwrap();
/// validate_pointer("to").unwrap();
/// validate_pointer("/a~2").unwrap_err();
/// ```
pub fn validate_pointer(pointer: &str) -> Result<(), PointerError> {
    if pointer.len() > MAX_POINTER_LENGTH {
        return Err(PointerError::PointerTooLong);
    }
    let bytes = pointer.as_bytes();
    for (i, b) in bytes.iter().enumerate() {
        if *b == b'~' && !matches!(bytes.get(i + 1), Some(b'0') | Some(b'1')) {
            return Err(PointerError::InvalidEscape(pointer.to_string()));
        }
    }
    Ok(())
}

/// Validates the depth of a parsed path.
///
/// # Errors
///
/// [`PointerError::PathTooDeep`] past 256 segments.
pub fn validate_path(path: &[String]) -> Result<(), PointerError> {
    if path.len() > MAX_PATH_DEPTH {
        return Err(PointerError::PathTooDeep);
    }
    Ok(())
}
