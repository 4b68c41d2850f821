//! The document tree: primitives, ordered containers and opaque leaves.

use std::any::{Any, TypeId};
use std::fmt;

use indexmap::IndexMap;
use serde_json::Number;

/// Ordered object container. Key order is insertion order and is preserved by
/// clone, compare and apply.
pub type Object = IndexMap<String, Value>;

/// A node of a document tree.
///
/// `Value` implements neither `Clone` nor `PartialEq`: leaves are
/// type-erased and only the [`LeafRegistry`](crate::LeafRegistry) knows how to
/// copy and compare them. Use [`Engine::deep_clone`](crate::Engine::deep_clone)
/// and [`Engine::equals`](crate::Engine::equals).
#[derive(Debug)]
pub enum Value {
    Null,
    Bool(bool),
    Number(Number),
    String(String),
    Array(Vec<Value>),
    Object(Object),
    /// An atomic value such as a timestamp, never traversed into.
    Leaf(Leaf),
}

/// An owned, type-erased leaf instance.
pub struct Leaf {
    inner: Box<dyn Any + Send + Sync>,
    type_name: &'static str,
}

impl Leaf {
    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        Self {
            inner: Box::new(value),
            type_name: std::any::type_name::<T>(),
        }
    }

    /// `TypeId` of the wrapped value (not of the box).
    pub fn type_id(&self) -> TypeId {
        (*self.inner).type_id()
    }

    /// Rust type name of the wrapped value, used in diagnostics.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub fn as_any(&self) -> &dyn Any {
        &*self.inner
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.inner.downcast_ref::<T>()
    }

    pub fn is<T: Any>(&self) -> bool {
        self.inner.is::<T>()
    }
}

impl fmt::Debug for Leaf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Leaf<{}>", self.type_name)
    }
}

impl Value {
    pub fn leaf<T: Any + Send + Sync>(value: T) -> Self {
        Value::Leaf(Leaf::new(value))
    }

    pub fn object<K, I>(entries: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Value)>,
    {
        Value::Object(entries.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    pub fn array<I: IntoIterator<Item = Value>>(items: I) -> Self {
        Value::Array(items.into_iter().collect())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(n) => n.as_f64(),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&Vec<Value>> {
        match self {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&Object> {
        match self {
            Value::Object(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_leaf(&self) -> Option<&Leaf> {
        match self {
            Value::Leaf(leaf) => Some(leaf),
            _ => None,
        }
    }

    /// Borrow the leaf as `T` if this value is a leaf of that type.
    pub fn downcast_leaf<T: Any>(&self) -> Option<&T> {
        self.as_leaf().and_then(Leaf::downcast_ref::<T>)
    }

    /// Look up a key of an object value.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.as_object().and_then(|map| map.get(key))
    }

    /// Look up an element of an array value.
    pub fn at(&self, index: usize) -> Option<&Value> {
        self.as_array().and_then(|items| items.get(index))
    }

    /// Short kind name used in logs and error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Array(_) => "array",
            Value::Object(_) => "object",
            Value::Leaf(_) => "leaf",
        }
    }
}

/// `===`-style number equality: integers compare exactly, anything involving
/// a float compares as `f64`, so `1` equals `1.0`.
pub fn numbers_equal(a: &Number, b: &Number) -> bool {
    if let (Some(x), Some(y)) = (a.as_i64(), b.as_i64()) {
        return x == y;
    }
    if let (Some(x), Some(y)) = (a.as_u64(), b.as_u64()) {
        return x == y;
    }
    if (a.is_f64() || b.is_f64()) && a.as_f64() == b.as_f64() {
        return true;
    }
    false
}

impl From<serde_json::Value> for Value {
    fn from(v: serde_json::Value) -> Self {
        match v {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => Value::Number(n),
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(items) => {
                Value::Array(items.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(map) => {
                Value::Object(map.into_iter().map(|(k, v)| (k, Value::from(v))).collect())
            }
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Number(n.into())
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Number(n.into())
    }
}

impl From<u64> for Value {
    fn from(n: u64) -> Self {
        Value::Number(n.into())
    }
}

/// Non-finite floats become `Null`, as in `serde_json`.
impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Number::from_f64(n).map_or(Value::Null, Value::Number)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::Array(items)
    }
}

impl From<Object> for Value {
    fn from(map: Object) -> Self {
        Value::Object(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn from_json_preserves_key_order() {
        let v = Value::from(json!({"z": 1, "a": 2, "m": 3}));
        let keys: Vec<&str> = v.as_object().unwrap().keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["z", "a", "m"]);
    }

    #[test]
    fn leaf_reports_inner_type() {
        let leaf = Leaf::new(42u32);
        assert_eq!(leaf.type_id(), TypeId::of::<u32>());
        assert!(leaf.is::<u32>());
        assert_eq!(leaf.downcast_ref::<u32>(), Some(&42));
        assert_eq!(leaf.type_name(), "u32");
        assert_eq!(format!("{leaf:?}"), "Leaf<u32>");
    }

    #[test]
    fn number_equality_is_strict_but_numeric() {
        let one = Number::from(1);
        let one_f = Number::from_f64(1.0).unwrap();
        let two = Number::from(2);
        assert!(numbers_equal(&one, &one_f));
        assert!(numbers_equal(&one, &Number::from(1u64)));
        assert!(!numbers_equal(&one, &two));
        assert!(!numbers_equal(&Number::from(u64::MAX), &Number::from(-1)));
    }

    #[test]
    fn accessors() {
        let v = Value::object([
            ("name", Value::from("Event")),
            ("tags", Value::array([Value::from(true)])),
        ]);
        assert_eq!(v.get("name").and_then(Value::as_str), Some("Event"));
        assert_eq!(v.get("tags").and_then(|t| t.at(0)).and_then(Value::as_bool), Some(true));
        assert!(v.get("missing").is_none());
        assert_eq!(v.kind(), "object");
    }
}
