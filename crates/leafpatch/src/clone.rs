//! Deep clone of document trees.

use crate::error::Result;
use crate::registry::LeafRegistry;
use crate::value::{Object, Value};

/// Recursively copy `value`.
///
/// Containers are rebuilt in their original order, leaves are copied through
/// their registry descriptor and primitives are copied as values. The result
/// shares no allocation with `value`.
///
/// # Errors
///
/// `UnsupportedType` if the tree holds a leaf whose type isn't registered.
pub fn deep_clone(registry: &LeafRegistry, value: &Value) -> Result<Value> {
    Ok(match value {
        Value::Null => Value::Null,
        Value::Bool(b) => Value::Bool(*b),
        Value::Number(n) => Value::Number(n.clone()),
        Value::String(s) => Value::String(s.clone()),
        Value::Array(items) => Value::Array(
            items
                .iter()
                .map(|item| deep_clone(registry, item))
                .collect::<Result<Vec<_>>>()?,
        ),
        Value::Object(map) => {
            let mut out = Object::with_capacity(map.len());
            for (key, item) in map {
                out.insert(key.clone(), deep_clone(registry, item)?);
            }
            Value::Object(out)
        }
        Value::Leaf(leaf) => Value::Leaf(registry.clone_leaf(leaf)?),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::registry::Binary;
    use chrono::{DateTime, Utc};
    use std::any::Any;

    fn date(s: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
    }

    fn leaf_addr(v: &Value) -> *const u8 {
        v.as_leaf().unwrap().as_any() as *const dyn Any as *const u8
    }

    #[test]
    fn clones_a_bare_leaf() {
        let registry = LeafRegistry::default();
        let original = Value::leaf(date("2025-11-11T10:00:00.000Z"));
        let cloned = deep_clone(&registry, &original).unwrap();

        assert_eq!(
            cloned.downcast_leaf::<DateTime<Utc>>(),
            original.downcast_leaf::<DateTime<Utc>>()
        );
        assert_ne!(leaf_addr(&cloned), leaf_addr(&original));
    }

    #[test]
    fn clones_objects_holding_leaves() {
        let registry = LeafRegistry::default();
        let original = Value::object([
            ("name", Value::from("Event")),
            ("startTime", Value::leaf(date("2025-11-11T10:00:00.000Z"))),
            ("endTime", Value::leaf(date("2025-11-11T11:00:00.000Z"))),
        ]);
        let cloned = deep_clone(&registry, &original).unwrap();

        for key in ["startTime", "endTime"] {
            let a = original.get(key).unwrap();
            let b = cloned.get(key).unwrap();
            assert_eq!(
                a.downcast_leaf::<DateTime<Utc>>(),
                b.downcast_leaf::<DateTime<Utc>>()
            );
            assert_ne!(leaf_addr(a), leaf_addr(b));
        }
        assert_eq!(cloned.get("name").and_then(Value::as_str), Some("Event"));
    }

    #[test]
    fn clones_arrays_in_order() {
        let registry = LeafRegistry::default();
        let original = Value::array([
            Value::object([("date", Value::leaf(date("2025-11-11T10:00:00.000Z")))]),
            Value::object([("date", Value::leaf(date("2025-11-11T11:00:00.000Z")))]),
            Value::leaf(Binary(vec![0xde, 0xad])),
        ]);
        let cloned = deep_clone(&registry, &original).unwrap();

        let items = cloned.as_array().unwrap();
        assert_eq!(items.len(), 3);
        assert_eq!(
            items[0].get("date").and_then(Value::downcast_leaf::<DateTime<Utc>>),
            Some(&date("2025-11-11T10:00:00.000Z"))
        );
        assert_eq!(
            items[1].get("date").and_then(Value::downcast_leaf::<DateTime<Utc>>),
            Some(&date("2025-11-11T11:00:00.000Z"))
        );
        assert_eq!(items[2].downcast_leaf::<Binary>(), Some(&Binary(vec![0xde, 0xad])));
        assert_ne!(
            original.as_array().unwrap().as_ptr(),
            items.as_ptr()
        );
    }

    #[test]
    fn preserves_key_order() {
        let registry = LeafRegistry::default();
        let original = Value::from(serde_json::json!({"b": 1, "a": {"y": 2, "x": 3}}));
        let cloned = deep_clone(&registry, &original).unwrap();
        let keys: Vec<&String> = cloned.as_object().unwrap().keys().collect();
        assert_eq!(keys, ["b", "a"]);
        let inner: Vec<&String> = cloned.get("a").unwrap().as_object().unwrap().keys().collect();
        assert_eq!(inner, ["y", "x"]);
    }

    #[test]
    fn fails_on_unregistered_leaf() {
        let registry = LeafRegistry::default();
        let original = Value::object([("handle", Value::leaf(std::sync::Mutex::new(())))]);
        assert!(matches!(
            deep_clone(&registry, &original),
            Err(Error::UnsupportedType { .. })
        ));
    }
}
