//! JSON codec for values and patch operations.
//!
//! Leaves travel as single-key objects named by their registry tag, e.g.
//! `{"$date": "2025-11-11T10:00:00.000Z"}`. A plain object that would read back
//! as a tag (its only key is a registered tag or [`OBJECT_TAG`]) is wrapped as
//! `{"$object": {...}}`. Operations use the RFC 6902 shape
//! `{"op", "path", "value"?}`.

use leafpatch_json_pointer::{format_json_pointer, parse_json_pointer};
use serde::ser::{Serialize, SerializeSeq, Serializer};
use serde_json::{json, Map};

use crate::error::{Error, PatchError, PatchErrorReason, Result};
use crate::registry::LeafRegistry;
use crate::types::Op;
use crate::value::{Object, Value};

// ── Values ────────────────────────────────────────────────────────────────

/// Wrapper tag for plain objects shaped like a tagged value.
pub const OBJECT_TAG: &str = "$object";

/// Encode a tree as plain JSON.
///
/// # Errors
///
/// `UnsupportedType` for a leaf whose type isn't registered.
pub fn value_to_json(registry: &LeafRegistry, value: &Value) -> Result<serde_json::Value> {
    Ok(match value {
        Value::Null => serde_json::Value::Null,
        Value::Bool(b) => serde_json::Value::Bool(*b),
        Value::Number(n) => serde_json::Value::Number(n.clone()),
        Value::String(s) => serde_json::Value::String(s.clone()),
        Value::Array(items) => serde_json::Value::Array(
            items
                .iter()
                .map(|item| value_to_json(registry, item))
                .collect::<Result<Vec<_>>>()?,
        ),
        Value::Object(map) => {
            let mut out = Map::new();
            for (key, item) in map {
                out.insert(key.clone(), value_to_json(registry, item)?);
            }
            if looks_tagged(registry, map) {
                let mut wrapper = Map::new();
                wrapper.insert(OBJECT_TAG.to_string(), serde_json::Value::Object(out));
                return Ok(serde_json::Value::Object(wrapper));
            }
            serde_json::Value::Object(out)
        }
        Value::Leaf(leaf) => {
            let leaf_type = registry.describe(leaf)?;
            let mut out = Map::new();
            out.insert(leaf_type.tag.to_string(), leaf_type.encode_leaf(leaf)?);
            serde_json::Value::Object(out)
        }
    })
}

/// Decode plain JSON, turning tagged single-key objects into leaves.
///
/// An object whose only key is a registered tag but whose payload the leaf
/// type rejects stays an ordinary object. `{"$object": {k: v}}` unwraps to the
/// plain object `{k: v}`.
pub fn value_from_json(registry: &LeafRegistry, json: serde_json::Value) -> Value {
    match json {
        serde_json::Value::Array(items) => Value::Array(
            items
                .into_iter()
                .map(|item| value_from_json(registry, item))
                .collect(),
        ),
        serde_json::Value::Object(mut map) => {
            if let Some(leaf) = decode_leaf(registry, &map) {
                return Value::Leaf(leaf);
            }
            // Only single-key payloads were ever wrapped.
            let wrapped = map.len() == 1
                && matches!(map.get(OBJECT_TAG), Some(serde_json::Value::Object(inner)) if inner.len() == 1);
            if wrapped {
                if let Some(serde_json::Value::Object(inner)) = map.remove(OBJECT_TAG) {
                    return decode_object(registry, inner);
                }
            }
            decode_object(registry, map)
        }
        other => Value::from(other),
    }
}

fn decode_object(registry: &LeafRegistry, map: Map<String, serde_json::Value>) -> Value {
    Value::Object(
        map.into_iter()
            .map(|(k, v)| (k, value_from_json(registry, v)))
            .collect::<Object>(),
    )
}

/// Whether `map` would be mistaken for a tagged value on the way back in.
fn looks_tagged(registry: &LeafRegistry, map: &Object) -> bool {
    match map.keys().next() {
        Some(key) if map.len() == 1 => key == OBJECT_TAG || registry.lookup_tag(key).is_some(),
        _ => false,
    }
}

fn decode_leaf(
    registry: &LeafRegistry,
    map: &Map<String, serde_json::Value>,
) -> Option<crate::value::Leaf> {
    if map.len() != 1 {
        return None;
    }
    let (tag, payload) = map.iter().next()?;
    let leaf_type = registry.lookup_tag(tag)?;
    (leaf_type.decode)(payload)
}

// ── Operations ────────────────────────────────────────────────────────────

/// Serialize an `Op` to its wire form.
pub fn op_to_json(registry: &LeafRegistry, op: &Op) -> Result<serde_json::Value> {
    let path = format_json_pointer(op.path());
    Ok(match op {
        Op::Add { value, .. } => json!({
            "op": "add",
            "path": path,
            "value": value_to_json(registry, value)?,
        }),
        Op::Remove { .. } => json!({
            "op": "remove",
            "path": path,
        }),
        Op::Replace { value, .. } => json!({
            "op": "replace",
            "path": path,
            "value": value_to_json(registry, value)?,
        }),
    })
}

/// Deserialize an `Op` from its wire form. Errors report `op_index` 0.
pub fn op_from_json(registry: &LeafRegistry, json: &serde_json::Value) -> Result<Op> {
    decode_op(registry, json, 0)
}

pub fn patch_to_json(registry: &LeafRegistry, ops: &[Op]) -> Result<serde_json::Value> {
    ops.iter()
        .map(|op| op_to_json(registry, op))
        .collect::<Result<Vec<_>>>()
        .map(serde_json::Value::Array)
}

/// Decode a JSON array of operations.
pub fn patch_from_json(registry: &LeafRegistry, json: &serde_json::Value) -> Result<Vec<Op>> {
    let items = json
        .as_array()
        .ok_or_else(|| Error::InvalidOperation("patch must be an array".into()))?;
    items
        .iter()
        .enumerate()
        .map(|(i, item)| decode_op(registry, item, i))
        .collect()
}

fn decode_op(registry: &LeafRegistry, json: &serde_json::Value, op_index: usize) -> Result<Op> {
    let obj = json
        .as_object()
        .ok_or_else(|| Error::InvalidOperation(format!("operation {op_index} must be an object")))?;
    let name = obj
        .get("op")
        .and_then(serde_json::Value::as_str)
        .ok_or_else(|| Error::InvalidOperation(format!("operation {op_index} missing \"op\"")))?;
    let pointer = obj
        .get("path")
        .and_then(serde_json::Value::as_str)
        .ok_or_else(|| Error::InvalidOperation(format!("operation {op_index} missing \"path\"")))?;
    let path = parse_json_pointer(pointer)
        .map_err(|_| PatchError::new(op_index, PatchErrorReason::MalformedPointer, pointer))?;
    let value = || {
        obj.get("value")
            .cloned()
            .map(|v| value_from_json(registry, v))
            .ok_or_else(|| {
                Error::InvalidOperation(format!("operation {op_index} ({name}) missing \"value\""))
            })
    };
    match name {
        "add" => Ok(Op::Add { path, value: value()? }),
        "remove" => Ok(Op::Remove { path }),
        "replace" => Ok(Op::Replace { path, value: value()? }),
        other => Err(Error::InvalidOperation(format!(
            "operation {op_index} has unsupported op \"{other}\""
        ))),
    }
}

/// Serde adaptor writing a patch in wire form.
///
/// # Example
///
/// ```
/// use leafpatch::{codec::SerializePatch, Engine, Value};
///
/// let engine = Engine::default();
/// let ops = engine
///     .compare(&Value::from(serde_json::json!({"a": 1})), &Value::from(serde_json::json!({"a": 2})))
///     .unwrap();
/// let text = serde_json::to_string(&SerializePatch::new(engine.registry(), &ops)).unwrap();
/// assert_eq!(text, r#"[{"op":"replace","path":"/a","value":2}]"#);
/// ```
pub struct SerializePatch<'a> {
    registry: &'a LeafRegistry,
    ops: &'a [Op],
}

impl<'a> SerializePatch<'a> {
    pub fn new(registry: &'a LeafRegistry, ops: &'a [Op]) -> Self {
        Self { registry, ops }
    }
}

impl Serialize for SerializePatch<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.ops.len()))?;
        for op in self.ops {
            let json = op_to_json(self.registry, op).map_err(serde::ser::Error::custom)?;
            seq.serialize_element(&json)?;
        }
        seq.end()
    }
}
