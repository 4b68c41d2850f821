//! Error types for clone, compare and apply.

use std::fmt;

use thiserror::Error;

/// Why a patch operation could not be applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatchErrorReason {
    /// An intermediate token does not exist, or walks into a primitive or leaf.
    ParentMissing,
    /// `remove`/`replace` target key is absent from its object.
    KeyNotFound,
    /// Array index past the end (or `-` where only existing slots are valid).
    IndexOutOfRange,
    /// Bad pointer syntax, or a non-index token addressing an array.
    MalformedPointer,
}

impl PatchErrorReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            PatchErrorReason::ParentMissing => "PARENT_MISSING",
            PatchErrorReason::KeyNotFound => "KEY_NOT_FOUND",
            PatchErrorReason::IndexOutOfRange => "INDEX_OUT_OF_RANGE",
            PatchErrorReason::MalformedPointer => "MALFORMED_POINTER",
        }
    }
}

impl fmt::Display for PatchErrorReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A failed patch, with the position of the offending operation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{reason} at operation {op_index} (path \"{path}\")")]
pub struct PatchError {
    pub op_index: usize,
    pub reason: PatchErrorReason,
    /// Pointer of the failing operation as written.
    pub path: String,
}

impl PatchError {
    pub fn new(op_index: usize, reason: PatchErrorReason, path: impl Into<String>) -> Self {
        Self {
            op_index,
            reason,
            path: path.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum Error {
    /// A leaf whose type has no registry entry.
    #[error("unsupported value type: {type_name}")]
    UnsupportedType { type_name: String },

    #[error(transparent)]
    Patch(#[from] PatchError),

    /// A wire-format operation that could not be decoded.
    #[error("invalid operation: {0}")]
    InvalidOperation(String),
}

impl Error {
    /// The patch failure, if this is one.
    pub fn as_patch_error(&self) -> Option<&PatchError> {
        match self {
            Error::Patch(e) => Some(e),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
