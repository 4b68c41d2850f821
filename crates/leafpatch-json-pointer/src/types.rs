//! Type definitions for JSON Pointer.

/// A single unescaped step of a pointer: an object key or a decimal array
/// index, both carried as strings.
pub type PathStep = String;

/// A parsed JSON Pointer.
pub type Path = Vec<PathStep>;
