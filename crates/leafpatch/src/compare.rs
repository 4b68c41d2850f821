//! Structural diff: generate the operations that turn one tree into another.
//!
//! Objects are diffed key by key. Arrays are diffed positionally over their
//! common prefix, with the surplus appended or trimmed at the tail; there is
//! no sequence alignment, so an insertion in the middle of an array shows up
//! as a run of replaces plus one trailing add.

use tracing::debug;

use crate::clone::deep_clone;
use crate::error::Result;
use crate::registry::{Class, LeafRegistry};
use crate::types::Op;
use crate::value::{numbers_equal, Object, Value};

// ── Public API ────────────────────────────────────────────────────────────

/// Generate the operations that transform `src` into `dst`.
///
/// Per object level, the output lists the changes below keys present in both
/// trees (in `src` order), then `add` for new keys (in `dst` order), then
/// `remove` for dropped keys (in `src` order). Values carried by `add` and
/// `replace` are deep clones of the `dst` subtrees.
///
/// # Errors
///
/// `UnsupportedType` if a leaf the diff has to inspect or copy isn't
/// registered.
pub fn compare(registry: &LeafRegistry, src: &Value, dst: &Value) -> Result<Vec<Op>> {
    let mut ops = Vec::new();
    diff_at_path(registry, &mut ops, &[], src, dst)?;
    debug!(ops = ops.len(), "patch computed");
    Ok(ops)
}

/// Leaf-aware deep equality. Object key order is not significant.
///
/// # Errors
///
/// `UnsupportedType` if an inspected leaf isn't registered.
pub fn equals(registry: &LeafRegistry, a: &Value, b: &Value) -> Result<bool> {
    Ok(match (a, b) {
        (Value::Null, Value::Null) => true,
        (Value::Bool(x), Value::Bool(y)) => x == y,
        (Value::Number(x), Value::Number(y)) => numbers_equal(x, y),
        (Value::String(x), Value::String(y)) => x == y,
        (Value::Array(x), Value::Array(y)) => {
            if x.len() != y.len() {
                return Ok(false);
            }
            for (x, y) in x.iter().zip(y) {
                if !equals(registry, x, y)? {
                    return Ok(false);
                }
            }
            true
        }
        (Value::Object(x), Value::Object(y)) => {
            if x.len() != y.len() {
                return Ok(false);
            }
            for (key, x) in x {
                match y.get(key) {
                    Some(y) if equals(registry, x, y)? => {}
                    _ => return Ok(false),
                }
            }
            true
        }
        (Value::Leaf(x), Value::Leaf(y)) => registry.leaf_equals(x, y)?,
        (Value::Leaf(leaf), _) | (_, Value::Leaf(leaf)) => {
            registry.describe(leaf)?;
            false
        }
        _ => false,
    })
}

// ── Core recursive differ ─────────────────────────────────────────────────

fn diff_at_path(
    registry: &LeafRegistry,
    ops: &mut Vec<Op>,
    path: &[String],
    src: &Value,
    dst: &Value,
) -> Result<()> {
    match (src, dst) {
        (Value::Object(s), Value::Object(d)) => diff_obj(registry, ops, path, s, d),
        (Value::Array(s), Value::Array(d)) => diff_arr(registry, ops, path, s, d),
        _ => diff_val(registry, ops, path, src, dst),
    }
}

/// Anything that is not a pair of like containers: emit one `replace` unless
/// the two values are equal.
fn diff_val(
    registry: &LeafRegistry,
    ops: &mut Vec<Op>,
    path: &[String],
    src: &Value,
    dst: &Value,
) -> Result<()> {
    let unchanged = match (registry.classify(src)?, registry.classify(dst)?) {
        (Class::Primitive, Class::Primitive) => equals(registry, src, dst)?,
        (Class::Leaf(_), Class::Leaf(_)) => equals(registry, src, dst)?,
        _ => false,
    };
    if !unchanged {
        ops.push(Op::Replace {
            path: path.to_vec(),
            value: deep_clone(registry, dst)?,
        });
    }
    Ok(())
}

fn diff_obj(
    registry: &LeafRegistry,
    ops: &mut Vec<Op>,
    path: &[String],
    src: &Object,
    dst: &Object,
) -> Result<()> {
    for (key, src_val) in src {
        if let Some(dst_val) = dst.get(key) {
            diff_at_path(registry, ops, &child(path, key), src_val, dst_val)?;
        }
    }
    for (key, dst_val) in dst {
        if !src.contains_key(key) {
            ops.push(Op::Add {
                path: child(path, key),
                value: deep_clone(registry, dst_val)?,
            });
        }
    }
    for key in src.keys() {
        if !dst.contains_key(key) {
            ops.push(Op::Remove {
                path: child(path, key),
            });
        }
    }
    Ok(())
}

fn diff_arr(
    registry: &LeafRegistry,
    ops: &mut Vec<Op>,
    path: &[String],
    src: &[Value],
    dst: &[Value],
) -> Result<()> {
    let common = src.len().min(dst.len());
    for (i, (s, d)) in src.iter().zip(dst).enumerate() {
        diff_at_path(registry, ops, &child(path, &i.to_string()), s, d)?;
    }
    // Ascending adds: each index is the slot the element lands in once the
    // earlier adds have been applied.
    for (i, d) in dst.iter().enumerate().skip(common) {
        ops.push(Op::Add {
            path: child(path, &i.to_string()),
            value: deep_clone(registry, d)?,
        });
    }
    // Descending removes so every index is still valid when applied.
    for i in (common..src.len()).rev() {
        ops.push(Op::Remove {
            path: child(path, &i.to_string()),
        });
    }
    Ok(())
}

fn child(path: &[String], step: &str) -> Vec<String> {
    let mut p = Vec::with_capacity(path.len() + 1);
    p.extend_from_slice(path);
    p.push(step.to_string());
    p
}

// ── Tests ─────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::registry::Binary;
    use chrono::{DateTime, Utc};
    use leafpatch_json_pointer::format_json_pointer;
    use serde_json::json;

    fn date(s: &str) -> Value {
        Value::leaf(DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc))
    }

    fn diff(src: &Value, dst: &Value) -> Vec<Op> {
        compare(&LeafRegistry::default(), src, dst).unwrap()
    }

    fn summary(ops: &[Op]) -> Vec<(String, String)> {
        ops.iter()
            .map(|op| (op.op_name().to_string(), format_json_pointer(op.path())))
            .collect()
    }

    fn s(op: &str, path: &str) -> (String, String) {
        (op.to_string(), path.to_string())
    }

    #[test]
    fn diff_equal_docs() {
        let a = Value::from(json!({"a": 1, "b": [1, {"c": null}]}));
        let b = Value::from(json!({"a": 1, "b": [1, {"c": null}]}));
        assert!(diff(&a, &b).is_empty());
    }

    #[test]
    fn diff_replace_scalar_at_root() {
        let ops = diff(&Value::from(1), &Value::from(2));
        assert_eq!(summary(&ops), vec![s("replace", "")]);
    }

    #[test]
    fn diff_number_representation_is_not_a_change() {
        let a = Value::from(json!({"n": 1}));
        let b = Value::from(json!({"n": 1.0}));
        assert!(diff(&a, &b).is_empty());
    }

    #[test]
    fn diff_no_coercion() {
        let a = Value::from(json!({"n": 1}));
        let b = Value::from(json!({"n": "1"}));
        assert_eq!(summary(&diff(&a, &b)), vec![s("replace", "/n")]);
    }

    #[test]
    fn diff_nested_date_replace() {
        let a = Value::object([(
            "event",
            Value::object([("startTime", date("2025-11-11T10:00:00.000Z"))]),
        )]);
        let b = Value::object([(
            "event",
            Value::object([("startTime", date("2025-11-11T11:00:00.000Z"))]),
        )]);
        let ops = diff(&a, &b);
        assert_eq!(summary(&ops), vec![s("replace", "/event/startTime")]);
        let value = ops[0].value().unwrap();
        assert_eq!(
            value.downcast_leaf::<DateTime<Utc>>().map(DateTime::timestamp_millis),
            Some(1_762_858_800_000)
        );
    }

    #[test]
    fn diff_equal_dates_are_distinct_instances() {
        let a = Value::object([("startTime", date("2025-11-11T10:00:00.000Z"))]);
        let b = Value::object([("startTime", date("2025-11-11T11:00:00.000+01:00"))]);
        assert!(diff(&a, &b).is_empty());
    }

    #[test]
    fn diff_add_and_remove_key() {
        let a = Value::object([("name", Value::from("Event"))]);
        let b = Value::object([
            ("name", Value::from("Event")),
            ("startTime", date("2025-11-11T10:00:00.000Z")),
        ]);
        let ops = diff(&a, &b);
        assert_eq!(summary(&ops), vec![s("add", "/startTime")]);
        assert!(ops[0].value().unwrap().downcast_leaf::<DateTime<Utc>>().is_some());

        assert_eq!(summary(&diff(&b, &a)), vec![s("remove", "/startTime")]);
    }

    #[test]
    fn diff_object_layering() {
        let a = Value::from(json!({"keep": {"x": 1}, "gone": 1, "also_gone": 2}));
        let b = Value::from(json!({"new": 1, "keep": {"x": 2}, "newer": 2}));
        assert_eq!(
            summary(&diff(&a, &b)),
            vec![
                s("replace", "/keep/x"),
                s("add", "/new"),
                s("add", "/newer"),
                s("remove", "/gone"),
                s("remove", "/also_gone"),
            ]
        );
    }

    #[test]
    fn diff_array_append() {
        let a = Value::object([(
            "events",
            Value::array([Value::object([("date", date("2025-11-11T10:00:00.000Z"))])]),
        )]);
        let b = Value::object([(
            "events",
            Value::array([
                Value::object([("date", date("2025-11-11T10:00:00.000Z"))]),
                Value::object([("date", date("2025-11-11T11:00:00.000Z"))]),
            ]),
        )]);
        let ops = diff(&a, &b);
        assert_eq!(summary(&ops), vec![s("add", "/events/1")]);
        assert!(ops[0]
            .value()
            .and_then(|v| v.get("date"))
            .and_then(Value::downcast_leaf::<DateTime<Utc>>)
            .is_some());
    }

    #[test]
    fn diff_array_grow_and_shrink() {
        let a = Value::from(json!([1, 2]));
        let b = Value::from(json!([1, 2, 3, 4]));
        assert_eq!(summary(&diff(&a, &b)), vec![s("add", "/2"), s("add", "/3")]);
        assert_eq!(summary(&diff(&b, &a)), vec![s("remove", "/3"), s("remove", "/2")]);
    }

    #[test]
    fn diff_array_middle_insert_is_positional() {
        let a = Value::from(json!([1, 2, 3]));
        let b = Value::from(json!([1, 99, 2, 3]));
        assert_eq!(
            summary(&diff(&a, &b)),
            vec![s("replace", "/1"), s("replace", "/2"), s("add", "/3")]
        );
    }

    #[test]
    fn diff_kind_change_replaces_subtree() {
        let a = Value::from(json!({"x": {"a": 1}}));
        let b = Value::from(json!({"x": [1]}));
        assert_eq!(summary(&diff(&a, &b)), vec![s("replace", "/x")]);

        let a = Value::object([("x", date("2025-11-11T10:00:00.000Z"))]);
        let b = Value::from(json!({"x": "2025-11-11T10:00:00.000Z"}));
        assert_eq!(summary(&diff(&a, &b)), vec![s("replace", "/x")]);
    }

    #[test]
    fn diff_leaf_type_change() {
        let a = Value::object([("x", Value::leaf(Binary(vec![1])))]);
        let b = Value::object([("x", date("2025-11-11T10:00:00.000Z"))]);
        assert_eq!(summary(&diff(&a, &b)), vec![s("replace", "/x")]);
    }

    #[test]
    fn diff_escapes_keys() {
        let a = Value::from(json!({"a/b": 1, "c~d": 1}));
        let b = Value::from(json!({"a/b": 2, "c~d": 2}));
        assert_eq!(
            summary(&diff(&a, &b)),
            vec![s("replace", "/a~1b"), s("replace", "/c~0d")]
        );
    }

    #[test]
    fn diff_unregistered_leaf_fails() {
        let a = Value::object([("h", Value::leaf(std::sync::Mutex::new(1)))]);
        let b = Value::object([("h", Value::from(1))]);
        assert!(matches!(
            compare(&LeafRegistry::default(), &a, &b),
            Err(Error::UnsupportedType { .. })
        ));
    }

    #[test]
    fn equals_ignores_key_order() {
        let registry = LeafRegistry::default();
        let a = Value::from(json!({"a": 1, "b": 2}));
        let b = Value::from(json!({"b": 2, "a": 1}));
        assert!(equals(&registry, &a, &b).unwrap());
        assert!(!equals(&registry, &a, &Value::from(json!({"a": 1}))).unwrap());
    }
}
