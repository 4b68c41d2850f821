//! leafpatch: structural diff, patch and deep clone for value trees with
//! opaque leaves.
//!
//! A [`Value`] tree holds JSON-like primitives, ordered objects, arrays and
//! [`Leaf`] values (timestamps, byte strings, or any type registered in a
//! [`LeafRegistry`]). Leaves are compared and copied as units through their
//! registry descriptor, never structurally.
//!
//! - [`compare`] produces `add`/`remove`/`replace` operations turning one tree
//!   into another.
//! - [`apply_patch`] replays operations on a clone of a document.
//! - [`deep_clone`] copies a tree without sharing any node.
//!
//! For every pair of trees `a`, `b`:
//! `apply_patch(&a, compare(&a, &b)?)?.new_document` equals `b`.
//!
//! The free functions use the built-in registry; build an [`Engine`] to add
//! leaf types or change [`ApplyPatchOptions`].

pub mod apply;
pub mod clone;
pub mod codec;
pub mod compare;
pub mod engine;
pub mod error;
pub mod registry;
pub mod resolve;
pub mod types;
pub mod value;

pub use engine::Engine;
pub use error::{Error, PatchError, PatchErrorReason, Result};
pub use registry::{Binary, Class, LeafKind, LeafRegistry, LeafType};
pub use types::{ApplyPatchOptions, Op, PatchResult};
pub use value::{Leaf, Object, Value};

pub use leafpatch_json_pointer::{format_json_pointer, parse_json_pointer, Path};

/// Deep-clone with the built-in leaf registry.
pub fn deep_clone(value: &Value) -> Result<Value> {
    Engine::default().deep_clone(value)
}

/// Diff with the built-in leaf registry.
pub fn compare(a: &Value, b: &Value) -> Result<Vec<Op>> {
    Engine::default().compare(a, b)
}

/// Leaf-aware equality with the built-in leaf registry.
pub fn equals(a: &Value, b: &Value) -> Result<bool> {
    Engine::default().equals(a, b)
}

/// Apply a patch to a clone of `doc` with default options.
pub fn apply_patch(doc: &Value, ops: Vec<Op>) -> Result<PatchResult> {
    Engine::default().apply_patch(doc, ops)
}
