//! Patch application.
//!
//! Operations are applied in order against a working document owned by the
//! caller of [`apply_ops`]. Values carried by `add`/`replace` are moved into
//! the document as they are; nothing here needs the leaf registry.

use leafpatch_json_pointer::{validate_json_pointer, validate_path, APPEND_TOKEN};
use tracing::{debug, trace};

use crate::error::{PatchError, PatchErrorReason};
use crate::resolve::{array_index, parent_mut};
use crate::types::{ApplyPatchOptions, Op};
use crate::value::Value;

type OpOutcome = Result<Option<Value>, PatchErrorReason>;

// ── Individual operation applicators ─────────────────────────────────────

fn apply_add(doc: &mut Value, path: &[String], value: Value) -> OpOutcome {
    let Some((key, parent_path)) = path.split_last() else {
        return Ok(Some(std::mem::replace(doc, value)));
    };
    match parent_mut(doc, parent_path)? {
        Value::Object(map) => Ok(map.insert(key.clone(), value)),
        Value::Array(items) => {
            if key == APPEND_TOKEN {
                items.push(value);
                return Ok(None);
            }
            let idx = array_index(key)?;
            if idx > items.len() {
                return Err(PatchErrorReason::IndexOutOfRange);
            }
            items.insert(idx, value);
            Ok(None)
        }
        _ => Err(PatchErrorReason::ParentMissing),
    }
}

fn apply_remove(doc: &mut Value, path: &[String]) -> OpOutcome {
    let Some((key, parent_path)) = path.split_last() else {
        return Err(PatchErrorReason::ParentMissing);
    };
    match parent_mut(doc, parent_path)? {
        Value::Object(map) => map
            .shift_remove(key)
            .map(Some)
            .ok_or(PatchErrorReason::KeyNotFound),
        Value::Array(items) => {
            let idx = array_index(key)?;
            if idx >= items.len() {
                return Err(PatchErrorReason::IndexOutOfRange);
            }
            Ok(Some(items.remove(idx)))
        }
        _ => Err(PatchErrorReason::ParentMissing),
    }
}

fn apply_replace(doc: &mut Value, path: &[String], value: Value) -> OpOutcome {
    let Some((key, parent_path)) = path.split_last() else {
        return Ok(Some(std::mem::replace(doc, value)));
    };
    let slot = match parent_mut(doc, parent_path)? {
        Value::Object(map) => map.get_mut(key).ok_or(PatchErrorReason::KeyNotFound)?,
        Value::Array(items) => {
            let idx = array_index(key)?;
            items.get_mut(idx).ok_or(PatchErrorReason::IndexOutOfRange)?
        }
        _ => return Err(PatchErrorReason::ParentMissing),
    };
    Ok(Some(std::mem::replace(slot, value)))
}

// ── Main apply function ───────────────────────────────────────────────────

/// Apply a single operation in place.
///
/// Returns the value the operation displaced, if any.
pub fn apply_op(doc: &mut Value, op: Op) -> OpOutcome {
    match op {
        Op::Add { path, value } => apply_add(doc, &path, value),
        Op::Remove { path } => apply_remove(doc, &path),
        Op::Replace { path, value } => apply_replace(doc, &path, value),
    }
}

/// Check every operation against the pointer length and depth limits without
/// touching a document. Only run when `validate_operations` is set.
pub fn validate_ops(ops: &[Op]) -> Result<(), PatchError> {
    for (op_index, op) in ops.iter().enumerate() {
        let pointer = op.pointer();
        if validate_path(op.path()).is_err() || validate_json_pointer(&pointer).is_err() {
            return Err(PatchError::new(
                op_index,
                PatchErrorReason::MalformedPointer,
                pointer,
            ));
        }
    }
    Ok(())
}

/// Apply `ops` in order to `doc`.
///
/// On success returns the per-operation displaced values. On failure `doc` is
/// left partially patched; callers that hand out documents must discard it.
pub fn apply_ops(
    doc: &mut Value,
    ops: Vec<Op>,
    options: &ApplyPatchOptions,
) -> Result<Vec<Option<Value>>, PatchError> {
    if options.validate_operations {
        validate_ops(&ops)?;
    }
    let total = ops.len();
    let mut removed = Vec::with_capacity(total);
    for (op_index, op) in ops.into_iter().enumerate() {
        trace!(op_index, op = op.op_name(), "applying operation");
        let pointer = op.pointer();
        match apply_op(doc, op) {
            Ok(old) => removed.push(old),
            Err(reason) => {
                debug!(op_index, %reason, path = %pointer, "patch rejected");
                return Err(PatchError::new(op_index, reason, pointer));
            }
        }
    }
    debug!(ops = total, "patch applied");
    Ok(removed)
}

// ── Tests ─────────────────────────────────────────────────────────────────
