//! Pointer resolution over [`Value`] trees.

use leafpatch_json_pointer::{parse_index, parse_json_pointer, JsonPointerError, APPEND_TOKEN};

use crate::error::PatchErrorReason;
use crate::value::Value;

/// Get a value by path. Returns `None` if any step is missing, addresses a
/// non-container, or is not a valid index into an array.
///
/// # Example
///
/// ```
/// use leafpatch::{resolve::get, Value};
///
/// let doc = Value::from(serde_json::json!({"events": [{"subject": "Meeting 1"}]}));
/// let path = vec!["events".to_string(), "0".to_string(), "subject".to_string()];
/// assert_eq!(get(&doc, &path).and_then(Value::as_str), Some("Meeting 1"));
/// ```
pub fn get<'a>(doc: &'a Value, path: &[String]) -> Option<&'a Value> {
    let mut current = doc;
    for step in path {
        current = match current {
            Value::Object(map) => map.get(step)?,
            Value::Array(items) => items.get(parse_index(step)?)?,
            _ => return None,
        };
    }
    Some(current)
}

/// Parse `pointer` and get the value it addresses.
///
/// # Errors
///
/// Returns an error only for malformed pointer syntax; a well-formed pointer
/// that resolves to nothing yields `Ok(None)`.
pub fn get_by_pointer<'a>(
    doc: &'a Value,
    pointer: &str,
) -> Result<Option<&'a Value>, JsonPointerError> {
    let path = parse_json_pointer(pointer)?;
    Ok(get(doc, &path))
}

/// Walk to the container that holds the last step of a path.
///
/// Every step of `parent_path` must exist; walking into a primitive or leaf,
/// or past the end of an array, is `ParentMissing`.
pub(crate) fn parent_mut<'a>(
    doc: &'a mut Value,
    parent_path: &[String],
) -> Result<&'a mut Value, PatchErrorReason> {
    let mut current = doc;
    for step in parent_path {
        current = match current {
            Value::Object(map) => map.get_mut(step).ok_or(PatchErrorReason::ParentMissing)?,
            Value::Array(items) => {
                let idx = array_index(step)?;
                items.get_mut(idx).ok_or(PatchErrorReason::ParentMissing)?
            }
            _ => return Err(PatchErrorReason::ParentMissing),
        };
    }
    Ok(current)
}

/// Interpret a step addressing an existing array slot.
pub(crate) fn array_index(step: &str) -> Result<usize, PatchErrorReason> {
    if step == APPEND_TOKEN {
        return Err(PatchErrorReason::IndexOutOfRange);
    }
    match parse_index(step) {
        Some(idx) => Ok(idx),
        // All-digit tokens that overflow usize are out of range, not malformed.
        None if !step.is_empty() && step.bytes().all(|b| b.is_ascii_digit()) && !step.starts_with('0') => {
            Err(PatchErrorReason::IndexOutOfRange)
        }
        None => Err(PatchErrorReason::MalformedPointer),
    }
}
