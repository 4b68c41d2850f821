//! Leaf-type registry.
//!
//! A leaf is any value the comparator must treat as a unit: it is compared
//! with a type-specific equality, copied with a type-specific clone and
//! serialized through a tagged wire form. The registry is an ordered list of
//! [`LeafType`] descriptors keyed by `TypeId`; the comparator, clone and
//! applier only ever go through it.

use std::any::{Any, TypeId};

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use chrono::{DateTime, SecondsFormat, TimeZone, Utc};

use crate::error::{Error, Result};
use crate::value::{Leaf, Value};

/// Classification of a value for traversal purposes.
#[derive(Debug, Clone, Copy)]
pub enum Class<'r> {
    /// Null, booleans, numbers and strings.
    Primitive,
    /// Objects and arrays.
    Container,
    /// A registered atomic type.
    Leaf(&'r LeafType),
}

/// A type that can live in a tree as an atomic leaf.
///
/// # Example
///
/// ```
/// use leafpatch::{Engine, LeafKind, LeafRegistry, Value};
///
/// #[derive(Clone, Debug)]
/// struct Pattern(String);
///
/// impl LeafKind for Pattern {
///     const TAG: &'static str = "$regex";
///     fn leaf_eq(&self, other: &Self) -> bool { self.0 == other.0 }
///     fn to_wire(&self) -> serde_json::Value { self.0.clone().into() }
///     fn from_wire(wire: &serde_json::Value) -> Option<Self> {
///         wire.as_str().map(|s| Pattern(s.to_string()))
///     }
/// }
///
/// let engine = Engine::new(LeafRegistry::default().register::<Pattern>());
/// let a = Value::leaf(Pattern("^a".into()));
/// let b = Value::leaf(Pattern("^a".into()));
/// assert!(engine.equals(&a, &b).unwrap());
/// ```
pub trait LeafKind: Any + Clone + Send + Sync {
    /// Key of the single-entry object this leaf serializes to.
    const TAG: &'static str;

    fn leaf_eq(&self, other: &Self) -> bool;

    fn to_wire(&self) -> serde_json::Value;

    fn from_wire(wire: &serde_json::Value) -> Option<Self>;
}

/// Descriptor of one leaf type.
#[derive(Debug, Clone, Copy)]
pub struct LeafType {
    pub tag: &'static str,
    pub type_id: TypeId,
    pub type_name: &'static str,
    pub equals: fn(&dyn Any, &dyn Any) -> bool,
    pub clone: fn(&dyn Any) -> Option<Leaf>,
    pub encode: fn(&dyn Any) -> Option<serde_json::Value>,
    pub decode: fn(&serde_json::Value) -> Option<Leaf>,
}

impl LeafType {
    /// Build the descriptor for a [`LeafKind`] implementation.
    pub fn of<T: LeafKind>() -> Self {
        Self {
            tag: T::TAG,
            type_id: TypeId::of::<T>(),
            type_name: std::any::type_name::<T>(),
            equals: equals_as::<T>,
            clone: clone_as::<T>,
            encode: encode_as::<T>,
            decode: decode_as::<T>,
        }
    }

    pub fn leaf_equals(&self, a: &Leaf, b: &Leaf) -> bool {
        a.type_id() == b.type_id() && (self.equals)(a.as_any(), b.as_any())
    }

    pub fn clone_leaf(&self, leaf: &Leaf) -> Result<Leaf> {
        (self.clone)(leaf.as_any()).ok_or_else(|| unsupported(leaf))
    }

    pub fn encode_leaf(&self, leaf: &Leaf) -> Result<serde_json::Value> {
        (self.encode)(leaf.as_any()).ok_or_else(|| unsupported(leaf))
    }
}

fn unsupported(leaf: &Leaf) -> Error {
    Error::UnsupportedType {
        type_name: leaf.type_name().to_string(),
    }
}

fn equals_as<T: LeafKind>(a: &dyn Any, b: &dyn Any) -> bool {
    match (a.downcast_ref::<T>(), b.downcast_ref::<T>()) {
        (Some(a), Some(b)) => a.leaf_eq(b),
        _ => false,
    }
}

fn clone_as<T: LeafKind>(v: &dyn Any) -> Option<Leaf> {
    v.downcast_ref::<T>().map(|v| Leaf::new(v.clone()))
}

fn encode_as<T: LeafKind>(v: &dyn Any) -> Option<serde_json::Value> {
    v.downcast_ref::<T>().map(T::to_wire)
}

fn decode_as<T: LeafKind>(wire: &serde_json::Value) -> Option<Leaf> {
    T::from_wire(wire).map(Leaf::new)
}

/// Ordered, extensible set of leaf descriptors.
#[derive(Debug, Clone)]
pub struct LeafRegistry {
    types: Vec<LeafType>,
}

impl Default for LeafRegistry {
    /// Date-time (`chrono::DateTime<Utc>`) and [`Binary`] leaves.
    fn default() -> Self {
        Self::empty()
            .register::<DateTime<Utc>>()
            .register::<Binary>()
    }
}

impl LeafRegistry {
    /// A registry with no leaf types: every `Value::Leaf` is unsupported.
    pub fn empty() -> Self {
        Self { types: Vec::new() }
    }

    /// Register `T`, replacing any earlier descriptor for the same type.
    pub fn register<T: LeafKind>(self) -> Self {
        self.with_type(LeafType::of::<T>())
    }

    /// Register a hand-built descriptor, replacing any earlier descriptor for
    /// the same type.
    pub fn with_type(mut self, leaf_type: LeafType) -> Self {
        match self.types.iter_mut().find(|t| t.type_id == leaf_type.type_id) {
            Some(slot) => *slot = leaf_type,
            None => self.types.push(leaf_type),
        }
        self
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    pub fn types(&self) -> impl Iterator<Item = &LeafType> {
        self.types.iter()
    }

    pub fn lookup(&self, type_id: TypeId) -> Option<&LeafType> {
        self.types.iter().find(|t| t.type_id == type_id)
    }

    pub fn lookup_tag(&self, tag: &str) -> Option<&LeafType> {
        self.types.iter().find(|t| t.tag == tag)
    }

    /// Descriptor for a leaf, or `UnsupportedType` if its type isn't registered.
    pub fn describe(&self, leaf: &Leaf) -> Result<&LeafType> {
        self.lookup(leaf.type_id()).ok_or_else(|| unsupported(leaf))
    }

    /// Classify a value.
    ///
    /// # Errors
    ///
    /// `UnsupportedType` for a leaf whose type isn't registered.
    pub fn classify(&self, value: &Value) -> Result<Class<'_>> {
        match value {
            Value::Null | Value::Bool(_) | Value::Number(_) | Value::String(_) => {
                Ok(Class::Primitive)
            }
            Value::Array(_) | Value::Object(_) => Ok(Class::Container),
            Value::Leaf(leaf) => self.describe(leaf).map(Class::Leaf),
        }
    }

    /// Leaf-aware equality of two leaves. Leaves of different types are never
    /// equal.
    ///
    /// # Errors
    ///
    /// `UnsupportedType` if either leaf type isn't registered.
    pub fn leaf_equals(&self, a: &Leaf, b: &Leaf) -> Result<bool> {
        let a_type = self.describe(a)?;
        self.describe(b)?;
        Ok(a_type.leaf_equals(a, b))
    }

    /// Copy a leaf into a new, independently owned instance.
    pub fn clone_leaf(&self, leaf: &Leaf) -> Result<Leaf> {
        self.describe(leaf)?.clone_leaf(leaf)
    }
}

// ── Built-in leaf kinds ───────────────────────────────────────────────────

impl LeafKind for DateTime<Utc> {
    const TAG: &'static str = "$date";

    /// Instants are equal when they agree to the millisecond.
    fn leaf_eq(&self, other: &Self) -> bool {
        self.timestamp_millis() == other.timestamp_millis()
    }

    fn to_wire(&self) -> serde_json::Value {
        serde_json::Value::String(self.to_rfc3339_opts(SecondsFormat::Millis, true))
    }

    /// Accepts an RFC 3339 string or a number of epoch milliseconds.
    fn from_wire(wire: &serde_json::Value) -> Option<Self> {
        match wire {
            serde_json::Value::String(s) => DateTime::parse_from_rfc3339(s)
                .ok()
                .map(|dt| dt.with_timezone(&Utc)),
            serde_json::Value::Number(n) => {
                n.as_i64().and_then(|ms| Utc.timestamp_millis_opt(ms).single())
            }
            _ => None,
        }
    }
}

/// An opaque byte string leaf.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Binary(pub Vec<u8>);

impl From<Vec<u8>> for Binary {
    fn from(bytes: Vec<u8>) -> Self {
        Binary(bytes)
    }
}

impl LeafKind for Binary {
    const TAG: &'static str = "$binary";

    fn leaf_eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }

    fn to_wire(&self) -> serde_json::Value {
        serde_json::Value::String(STANDARD.encode(&self.0))
    }

    fn from_wire(wire: &serde_json::Value) -> Option<Self> {
        wire.as_str()
            .and_then(|s| STANDARD.decode(s).ok())
            .map(Binary)
    }
}
