//! Length limits for pointers and paths.

use crate::JsonPointerError;

/// Maximum allowed pointer string length.
pub const MAX_POINTER_LENGTH: usize = 1024;

/// Maximum allowed path depth.
pub const MAX_PATH_LENGTH: usize = 256;

/// Validate a JSON Pointer string without allocating a path.
///
/// # Errors
///
/// - the pointer is non-empty but doesn't start with `/`
/// - a `~` is not followed by `0` or `1`
/// - the pointer exceeds [`MAX_POINTER_LENGTH`] bytes
///
/// # Example
///
/// ```
/// use leafpatch_json_pointer::validate_json_pointer;
///
/// validate_json_pointer("").unwrap();
/// validate_json_pointer("/foo/bar").unwrap();
/// validate_json_pointer("foo").unwrap_err();
/// validate_json_pointer("/foo~").unwrap_err();
/// ```
pub fn validate_json_pointer(pointer: &str) -> Result<(), JsonPointerError> {
    if pointer.is_empty() {
        return Ok(());
    }
    if !pointer.starts_with('/') {
        return Err(JsonPointerError::Malformed(format!(
            "pointer \"{pointer}\" must be empty or start with \"/\""
        )));
    }
    if pointer.len() > MAX_POINTER_LENGTH {
        return Err(JsonPointerError::PointerTooLong);
    }
    let bytes = pointer.as_bytes();
    for (i, &b) in bytes.iter().enumerate() {
        if b == b'~' && !matches!(bytes.get(i + 1), Some(b'0' | b'1')) {
            return Err(JsonPointerError::Malformed(format!(
                "invalid escape at byte {i} in \"{pointer}\""
            )));
        }
    }
    Ok(())
}

/// Validate a parsed path.
///
/// # Errors
///
/// Returns [`JsonPointerError::PathTooLong`] past [`MAX_PATH_LENGTH`] steps.
pub fn validate_path(path: &[String]) -> Result<(), JsonPointerError> {
    if path.len() > MAX_PATH_LENGTH {
        return Err(JsonPointerError::PathTooLong);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_root_and_absolute() {
        assert!(validate_json_pointer("").is_ok());
        assert!(validate_json_pointer("/").is_ok());
        assert!(validate_json_pointer("/a~0b/c~1d").is_ok());
    }

    #[test]
    fn test_validate_relative_pointer() {
        assert!(validate_json_pointer("foo").is_err());
        assert!(validate_json_pointer("foo/bar").is_err());
    }

    #[test]
    fn test_validate_bad_escape() {
        assert!(validate_json_pointer("/a~").is_err());
        assert!(validate_json_pointer("/a~2b").is_err());
    }

    #[test]
    fn test_validate_long_pointer() {
        let long_pointer = "/".to_string() + &"a".repeat(2000);
        assert_eq!(
            validate_json_pointer(&long_pointer),
            Err(JsonPointerError::PointerTooLong)
        );
    }

    #[test]
    fn test_validate_path_depth() {
        let ok: Vec<String> = (0..MAX_PATH_LENGTH).map(|i| i.to_string()).collect();
        assert!(validate_path(&ok).is_ok());

        let deep: Vec<String> = (0..300).map(|i| i.to_string()).collect();
        assert_eq!(validate_path(&deep), Err(JsonPointerError::PathTooLong));
    }
}
