//! [`Engine`]: a leaf registry plus apply options, with the whole API on it.

use leafpatch_json_pointer::Path;

use crate::apply::apply_ops;
use crate::clone::deep_clone;
use crate::codec;
use crate::compare::{compare, equals};
use crate::error::{PatchError, PatchErrorReason, Result};
use crate::registry::{Class, LeafRegistry};
use crate::resolve::get_by_pointer;
use crate::types::{ApplyPatchOptions, Op, PatchResult};
use crate::value::Value;

/// Diff/patch/clone engine.
///
/// Holds no state beyond its configuration; every call is a pure function of
/// its arguments, and an `Engine` can be shared freely across threads.
///
/// # Example
///
/// ```
/// use chrono::{DateTime, Utc};
/// use leafpatch::{Engine, Value};
///
/// let engine = Engine::default();
/// let at = |s: &str| Value::leaf(DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc));
///
/// let old = Value::object([("startTime", at("2025-11-11T10:00:00.000Z"))]);
/// let new = Value::object([("startTime", at("2025-11-11T11:00:00.000Z"))]);
///
/// let ops = engine.compare(&old, &new).unwrap();
/// assert_eq!(ops.len(), 1);
/// assert_eq!(ops[0].pointer(), "/startTime");
///
/// let result = engine.apply_patch(&old, ops).unwrap();
/// assert!(engine.equals(&result.new_document, &new).unwrap());
/// ```
#[derive(Debug, Clone, Default)]
pub struct Engine {
    registry: LeafRegistry,
    options: ApplyPatchOptions,
}

impl Engine {
    pub fn new(registry: LeafRegistry) -> Self {
        Self {
            registry,
            options: ApplyPatchOptions::default(),
        }
    }

    pub fn with_options(mut self, options: ApplyPatchOptions) -> Self {
        self.options = options;
        self
    }

    pub fn registry(&self) -> &LeafRegistry {
        &self.registry
    }

    pub fn options(&self) -> &ApplyPatchOptions {
        &self.options
    }

    pub fn classify<'a>(&'a self, value: &Value) -> Result<Class<'a>> {
        self.registry.classify(value)
    }

    /// Copy a tree so that no container or leaf is shared with `value`.
    ///
    /// # Errors
    ///
    /// `UnsupportedType` for unregistered leaves.
    pub fn deep_clone(&self, value: &Value) -> Result<Value> {
        deep_clone(&self.registry, value)
    }

    /// Leaf-aware deep equality; object key order is not significant.
    pub fn equals(&self, a: &Value, b: &Value) -> Result<bool> {
        equals(&self.registry, a, b)
    }

    /// Operations turning `a` into `b`; empty iff the two are equal.
    pub fn compare(&self, a: &Value, b: &Value) -> Result<Vec<Op>> {
        compare(&self.registry, a, b)
    }

    /// Apply `ops` to a deep clone of `doc`.
    ///
    /// All or nothing: on error no document is returned and `doc` is
    /// untouched.
    ///
    /// # Errors
    ///
    /// `Error::Patch` with the failing operation's index and reason, or
    /// `UnsupportedType` if `doc` can't be cloned.
    pub fn apply_patch(&self, doc: &Value, ops: Vec<Op>) -> Result<PatchResult> {
        let working = self.deep_clone(doc)?;
        self.apply_to(working, ops)
    }

    /// Apply `ops` to an owned document.
    ///
    /// With `mutate_document` set the document is patched directly; otherwise
    /// it is cloned first like [`Engine::apply_patch`]. Either way the
    /// document is consumed and only handed back on success.
    pub fn apply_patch_owned(&self, doc: Value, ops: Vec<Op>) -> Result<PatchResult> {
        let working = if self.options.mutate_document {
            doc
        } else {
            self.deep_clone(&doc)?
        };
        self.apply_to(working, ops)
    }

    /// Apply one operation to a clone of `doc` and return the new document.
    pub fn apply_operation(&self, doc: &Value, op: Op) -> Result<Value> {
        self.apply_patch(doc, vec![op]).map(|r| r.new_document)
    }

    /// Dry-run `ops` against `doc`, reporting the first failure.
    pub fn validate(&self, doc: &Value, ops: &[Op]) -> Result<()> {
        let ops = self.clone_patch(ops)?;
        self.apply_patch(doc, ops).map(|_| ())
    }

    /// Deep-clone the values carried by a patch.
    pub fn clone_patch(&self, ops: &[Op]) -> Result<Vec<Op>> {
        ops.iter().map(|op| self.clone_op(op)).collect()
    }

    fn clone_op(&self, op: &Op) -> Result<Op> {
        let path: Path = op.path().clone();
        Ok(match op {
            Op::Add { value, .. } => Op::Add {
                path,
                value: self.deep_clone(value)?,
            },
            Op::Remove { .. } => Op::Remove { path },
            Op::Replace { value, .. } => Op::Replace {
                path,
                value: self.deep_clone(value)?,
            },
        })
    }

    /// Resolve a JSON Pointer string inside `doc`.
    ///
    /// # Errors
    ///
    /// `MalformedPointer` (as `op_index` 0) for bad pointer syntax.
    pub fn get<'a>(&self, doc: &'a Value, pointer: &str) -> Result<Option<&'a Value>> {
        get_by_pointer(doc, pointer).map_err(|_| {
            PatchError::new(0, PatchErrorReason::MalformedPointer, pointer).into()
        })
    }

    pub fn to_json(&self, value: &Value) -> Result<serde_json::Value> {
        codec::value_to_json(&self.registry, value)
    }

    pub fn from_json(&self, json: serde_json::Value) -> Value {
        codec::value_from_json(&self.registry, json)
    }

    pub fn patch_to_json(&self, ops: &[Op]) -> Result<serde_json::Value> {
        codec::patch_to_json(&self.registry, ops)
    }

    pub fn patch_from_json(&self, json: &serde_json::Value) -> Result<Vec<Op>> {
        codec::patch_from_json(&self.registry, json)
    }

    fn apply_to(&self, mut working: Value, ops: Vec<Op>) -> Result<PatchResult> {
        let removed = apply_ops(&mut working, ops, &self.options)?;
        Ok(PatchResult {
            new_document: working,
            removed,
        })
    }
}
