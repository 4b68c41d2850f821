//! Patch operations, results and options.

use leafpatch_json_pointer::{format_json_pointer, Path};

use crate::value::Value;

/// A single patch operation.
///
/// `path` is the unescaped pointer; use [`Op::pointer`] for its string form.
#[derive(Debug)]
pub enum Op {
    Add { path: Path, value: Value },
    Remove { path: Path },
    Replace { path: Path, value: Value },
}

impl Op {
    pub fn add(path: Path, value: Value) -> Self {
        Op::Add { path, value }
    }

    pub fn remove(path: Path) -> Self {
        Op::Remove { path }
    }

    pub fn replace(path: Path, value: Value) -> Self {
        Op::Replace { path, value }
    }

    /// Operation name as it appears on the wire.
    pub fn op_name(&self) -> &'static str {
        match self {
            Op::Add { .. } => "add",
            Op::Remove { .. } => "remove",
            Op::Replace { .. } => "replace",
        }
    }

    pub fn path(&self) -> &Path {
        match self {
            Op::Add { path, .. } | Op::Remove { path } | Op::Replace { path, .. } => path,
        }
    }

    /// The escaped JSON Pointer of this operation.
    pub fn pointer(&self) -> String {
        format_json_pointer(self.path())
    }

    pub fn value(&self) -> Option<&Value> {
        match self {
            Op::Add { value, .. } | Op::Replace { value, .. } => Some(value),
            Op::Remove { .. } => None,
        }
    }
}

/// Result of a successful patch.
#[derive(Debug)]
pub struct PatchResult {
    pub new_document: Value,
    /// Per operation, the value displaced by it: the removed or replaced value,
    /// or the previous value of an object key overwritten by `add`.
    pub removed: Vec<Option<Value>>,
}

/// Options for applying a patch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ApplyPatchOptions {
    /// Apply directly to an owned document instead of a deep clone. Only
    /// honoured by [`Engine::apply_patch_owned`](crate::Engine::apply_patch_owned).
    pub mutate_document: bool,
    /// Check every operation's pointer against the length and depth limits of
    /// `leafpatch_json_pointer::validate` before applying the first one. Off by
    /// default: `compare` output may exceed those limits on deep or wide trees.
    pub validate_operations: bool,
}

impl Default for ApplyPatchOptions {
    fn default() -> Self {
        Self {
            mutate_document: false,
            validate_operations: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path(steps: &[&str]) -> Path {
        steps.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn op_accessors() {
        let op = Op::replace(path(&["event", "start/time"]), Value::from(1));
        assert_eq!(op.op_name(), "replace");
        assert_eq!(op.pointer(), "/event/start~1time");
        assert!(op.value().is_some());

        let op = Op::remove(path(&["a"]));
        assert_eq!(op.op_name(), "remove");
        assert!(op.value().is_none());
    }

    #[test]
    fn default_options() {
        let options = ApplyPatchOptions::default();
        assert!(!options.mutate_document);
        assert!(!options.validate_operations);
    }
}
