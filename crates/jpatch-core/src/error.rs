use thiserror::Error;

use crate::Value;

/// Errors that can occur while decoding external data into a [`Value`].
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The provided JSON input was invalid.
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    /// The provided YAML input was invalid.
    #[error("invalid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
    /// Encountered a number that cannot be represented.
    #[error("number {value} cannot be represented")]
    NumberOutOfRange {
        /// The textual representation of the offending number.
        value: String,
    },
    /// Attempted to construct a [`Number`](crate::Number) that is not finite.
    #[error("non-finite number encountered: {value}")]
    NotFinite {
        /// The offending numeric value.
        value: f64,
    },
    /// YAML maps may only contain string keys.
    #[error("unsupported YAML key type: {found}")]
    NonStringYamlKey {
        /// A description of the key that triggered the error.
        found: String,
    },
    /// YAML tags have no JSON counterpart.
    #[error("unsupported YAML tag: {tag}")]
    UnsupportedYamlTag {
        /// The tag identifier encountered in the document.
        tag: String,
    },
}

/// Errors raised while parsing a JSON Pointer string.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PointerError {
    /// Non-empty pointers must start with `/`.
    #[error("JSON Pointer {pointer:?} must be empty or start with '/'")]
    NotAbsolute {
        /// The rejected pointer text.
        pointer: String,
    },
    /// `~` must be followed by `0` or `1`.
    #[error("JSON Pointer {pointer:?} contains an invalid escape sequence")]
    InvalidEscape {
        /// The rejected pointer text.
        pointer: String,
    },
}

/// A single operation that does not have the RFC 6902 shape.
#[derive(Debug, Error)]
pub enum OperationError {
    /// The operation must be a JSON object.
    #[error("expected a JSON object, found {found}")]
    NotAnObject {
        /// JSON type name of the value found instead.
        found: &'static str,
    },
    /// The `op` member named an operation this library does not know.
    #[error("unknown op {op:?}")]
    UnknownOp {
        /// The unrecognised op name.
        op: String,
    },
    /// A member required by the operation is absent.
    #[error("missing required field {field:?}")]
    MissingField {
        /// Name of the missing member.
        field: &'static str,
    },
    /// A member is present but has the wrong JSON type.
    #[error("field {field:?} must be a string")]
    NotAString {
        /// Name of the offending member.
        field: &'static str,
    },
    /// `path` or `from` is not a valid JSON Pointer.
    #[error(transparent)]
    Pointer(#[from] PointerError),
    /// `value` could not be represented as a [`Value`].
    #[error("invalid value: {0}")]
    Value(#[from] DecodeError),
}

/// A patch document that does not have the RFC 6902 shape.
#[derive(Debug, Error)]
pub enum PatchFormatError {
    /// The patch text is not valid JSON.
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    /// The top-level patch value must be an array.
    #[error("patch must be a JSON array of operations, found {found}")]
    NotAnArray {
        /// JSON type name of the value found instead.
        found: &'static str,
    },
    /// One of the operations is malformed.
    #[error("operation {index}: {source}")]
    Operation {
        /// Position of the operation within the patch.
        index: usize,
        /// What is wrong with it.
        #[source]
        source: OperationError,
    },
}

/// Failure to apply a patch operation to a document.
///
/// Every variant carries the pointer being resolved so callers can report
/// which operation went wrong.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ApplyError {
    /// An object along the path does not contain the requested key.
    #[error("{pointer}: key {key:?} does not exist")]
    MissingKey {
        /// Pointer of the failing operation.
        pointer: String,
        /// The key that could not be found.
        key: String,
    },
    /// An array index lies outside the array.
    #[error("{pointer}: index {index} is out of bounds for array of length {len}")]
    IndexOutOfBounds {
        /// Pointer of the failing operation.
        pointer: String,
        /// The requested index.
        index: usize,
        /// Length of the array at the time of the operation.
        len: usize,
    },
    /// A token used against an array is not a canonical index.
    #[error("{pointer}: {token:?} is not a valid array index")]
    InvalidIndex {
        /// Pointer of the failing operation.
        pointer: String,
        /// The offending reference token.
        token: String,
    },
    /// The path tries to descend into a scalar.
    #[error("{pointer}: cannot descend into {found}")]
    NotAContainer {
        /// Pointer of the failing operation.
        pointer: String,
        /// JSON type name of the value found.
        found: &'static str,
    },
    /// `remove` or `move` targeted the whole document.
    #[error("cannot remove the document root")]
    RemoveRoot,
    /// `move` whose destination lies inside the value being moved.
    #[error("cannot move {from} into its own child {pointer}")]
    MoveIntoChild {
        /// Source pointer of the move.
        from: String,
        /// Destination pointer of the move.
        pointer: String,
    },
    /// A `test` operation found a different value.
    #[error("{pointer}: test failed, expected {expected} but found {found}")]
    TestFailed {
        /// Pointer of the failing operation.
        pointer: String,
        /// Value the patch expected.
        expected: Box<Value>,
        /// Value present in the document.
        found: Box<Value>,
    },
}
