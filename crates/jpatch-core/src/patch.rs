//! RFC 6902 patch documents.
//!
//! A [`Patch`] is an ordered list of [`PatchOperation`]s. On the wire it is a
//! JSON array of objects carrying `op` and `path`, plus `value` for `add`,
//! `replace` and `test`, and `from` for `move` and `copy`. No other member
//! is ever written.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value as JsonValue;

use crate::{OperationError, PatchFormatError, Pointer, Value};

/// One RFC 6902 operation.
#[derive(Clone, Debug, PartialEq)]
pub enum PatchOperation {
    /// Insert `value` at `path`, or overwrite an existing object member.
    Add {
        /// Target location.
        path: Pointer,
        /// Value to insert.
        value: Value,
    },
    /// Delete the value at `path`.
    Remove {
        /// Target location.
        path: Pointer,
    },
    /// Overwrite the existing value at `path`.
    Replace {
        /// Target location.
        path: Pointer,
        /// Replacement value.
        value: Value,
    },
    /// Remove the value at `from` and add it at `path`.
    Move {
        /// Source location.
        from: Pointer,
        /// Target location.
        path: Pointer,
    },
    /// Add a copy of the value at `from` at `path`.
    Copy {
        /// Source location.
        from: Pointer,
        /// Target location.
        path: Pointer,
    },
    /// Check that the value at `path` equals `value`.
    Test {
        /// Target location.
        path: Pointer,
        /// Expected value.
        value: Value,
    },
}

impl PatchOperation {
    /// Builds an `add` operation.
    #[must_use]
    pub fn add(path: Pointer, value: Value) -> Self {
        Self::Add { path, value }
    }

    /// Builds a `remove` operation.
    #[must_use]
    pub fn remove(path: Pointer) -> Self {
        Self::Remove { path }
    }

    /// Builds a `replace` operation.
    #[must_use]
    pub fn replace(path: Pointer, value: Value) -> Self {
        Self::Replace { path, value }
    }

    /// The `op` member written for this operation.
    #[must_use]
    pub fn op(&self) -> &'static str {
        match self {
            Self::Add { .. } => "add",
            Self::Remove { .. } => "remove",
            Self::Replace { .. } => "replace",
            Self::Move { .. } => "move",
            Self::Copy { .. } => "copy",
            Self::Test { .. } => "test",
        }
    }

    /// The target location of the operation.
    #[must_use]
    pub fn path(&self) -> &Pointer {
        match self {
            Self::Add { path, .. }
            | Self::Remove { path }
            | Self::Replace { path, .. }
            | Self::Move { path, .. }
            | Self::Copy { path, .. }
            | Self::Test { path, .. } => path,
        }
    }

    /// The `value` member, for operations that carry one.
    #[must_use]
    pub fn value(&self) -> Option<&Value> {
        match self {
            Self::Add { value, .. } | Self::Replace { value, .. } | Self::Test { value, .. } => {
                Some(value)
            }
            _ => None,
        }
    }

    /// The `from` member, for `move` and `copy`.
    #[must_use]
    pub fn from_path(&self) -> Option<&Pointer> {
        match self {
            Self::Move { from, .. } | Self::Copy { from, .. } => Some(from),
            _ => None,
        }
    }

    /// Converts one already parsed operation object.
    ///
    /// ```
    /// # use jpatch_core::{OperationError, PatchOperation};
    /// let op = PatchOperation::from_json_value(serde_json::json!({"op":"remove","path":"/a"}))?;
    /// assert_eq!(op.op(), "remove");
    /// let err = PatchOperation::from_json_value(serde_json::json!({"op":"remove"})).unwrap_err();
    /// assert_eq!(err.to_string(), r#"missing required field "path""#);
    /// # Ok::<(), OperationError>(())
    /// ```
    pub fn from_json_value(value: JsonValue) -> Result<Self, OperationError> {
        let JsonValue::Object(mut object) = value else {
            return Err(OperationError::NotAnObject { found: json_type_name(&value) });
        };

        let op = match object.remove("op") {
            Some(JsonValue::String(op)) => op,
            Some(_) => return Err(OperationError::NotAString { field: "op" }),
            None => return Err(OperationError::MissingField { field: "op" }),
        };

        let operation = match op.as_str() {
            "add" | "replace" | "test" => {
                let path = take_pointer(&mut object, "path")?;
                let value = object
                    .remove("value")
                    .ok_or(OperationError::MissingField { field: "value" })?;
                let value = Value::from_json_value(value)?;
                match op.as_str() {
                    "add" => Self::Add { path, value },
                    "replace" => Self::Replace { path, value },
                    _ => Self::Test { path, value },
                }
            }
            "remove" => Self::Remove { path: take_pointer(&mut object, "path")? },
            "move" | "copy" => {
                let path = take_pointer(&mut object, "path")?;
                let from = take_pointer(&mut object, "from")?;
                if op == "move" {
                    Self::Move { from, path }
                } else {
                    Self::Copy { from, path }
                }
            }
            _ => return Err(OperationError::UnknownOp { op }),
        };
        Ok(operation)
    }
}

impl fmt::Display for PatchOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = serde_json::to_string(self).map_err(|_| fmt::Error)?;
        f.write_str(&text)
    }
}

#[derive(Serialize)]
struct WireOperation<'a> {
    op: &'static str,
    path: &'a Pointer,
    #[serde(skip_serializing_if = "Option::is_none")]
    from: Option<&'a Pointer>,
    #[serde(skip_serializing_if = "Option::is_none")]
    value: Option<&'a Value>,
}

impl Serialize for PatchOperation {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let wire = WireOperation {
            op: self.op(),
            path: self.path(),
            from: self.from_path(),
            value: self.value(),
        };
        wire.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for PatchOperation {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = JsonValue::deserialize(deserializer)?;
        Self::from_json_value(value).map_err(serde::de::Error::custom)
    }
}

/// An ordered list of operations; applying them in order transforms one
/// document into another. The empty patch means "no change".
///
/// ```
/// # use jpatch_core::{Patch, PatchOperation, Pointer, Value};
/// let patch = Patch::from_operations(vec![
///     PatchOperation::remove(Pointer::parse("/foo")?),
///     PatchOperation::add(Pointer::parse("/bar")?, Value::from("baz")),
/// ]);
/// let text = patch.to_json_string();
/// assert_eq!(text, r#"[{"op":"remove","path":"/foo"},{"op":"add","path":"/bar","value":"baz"}]"#);
/// assert_eq!(Patch::from_json_str(&text)?, patch);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Patch {
    operations: Vec<PatchOperation>,
}

impl Patch {
    /// Constructs an empty patch.
    #[must_use]
    pub fn empty() -> Self {
        Self { operations: Vec::new() }
    }

    /// Builds a patch from the provided operations.
    #[must_use]
    pub fn from_operations(operations: Vec<PatchOperation>) -> Self {
        Self { operations }
    }

    /// Parses RFC 6902 patch text.
    pub fn from_json_str(input: &str) -> Result<Self, PatchFormatError> {
        let value: JsonValue = serde_json::from_str(input)?;
        Self::from_json_value(value)
    }

    /// Converts an already parsed JSON array of operations.
    pub fn from_json_value(value: JsonValue) -> Result<Self, PatchFormatError> {
        let JsonValue::Array(items) = value else {
            return Err(PatchFormatError::NotAnArray { found: json_type_name(&value) });
        };
        items
            .into_iter()
            .enumerate()
            .map(|(index, item)| {
                PatchOperation::from_json_value(item)
                    .map_err(|source| PatchFormatError::Operation { index, source })
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Self::from_operations)
    }

    /// Renders compact RFC 6902 text; the empty patch renders as `[]`.
    #[must_use]
    pub fn to_json_string(&self) -> String {
        self.to_string()
    }

    /// Renders indented RFC 6902 text.
    pub fn to_json_string_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Converts the patch into a `serde_json::Value` array.
    pub fn to_json_value(&self) -> Result<JsonValue, serde_json::Error> {
        serde_json::to_value(self)
    }

    /// Returns the number of operations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.operations.len()
    }

    /// Indicates whether the patch has no operations.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    /// Returns an iterator over the operations.
    pub fn iter(&self) -> std::slice::Iter<'_, PatchOperation> {
        self.operations.iter()
    }

    /// Returns the operations as a slice.
    #[must_use]
    pub fn operations(&self) -> &[PatchOperation] {
        &self.operations
    }

    /// Consumes the patch and returns the operations.
    #[must_use]
    pub fn into_operations(self) -> Vec<PatchOperation> {
        self.operations
    }

    pub(crate) fn push(&mut self, operation: PatchOperation) {
        self.operations.push(operation);
    }
}

impl fmt::Display for Patch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = serde_json::to_string(self).map_err(|_| fmt::Error)?;
        f.write_str(&text)
    }
}

impl Serialize for Patch {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.operations.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Patch {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = JsonValue::deserialize(deserializer)?;
        Self::from_json_value(value).map_err(serde::de::Error::custom)
    }
}

impl IntoIterator for Patch {
    type Item = PatchOperation;
    type IntoIter = std::vec::IntoIter<PatchOperation>;

    fn into_iter(self) -> Self::IntoIter {
        self.operations.into_iter()
    }
}

impl<'a> IntoIterator for &'a Patch {
    type Item = &'a PatchOperation;
    type IntoIter = std::slice::Iter<'a, PatchOperation>;

    fn into_iter(self) -> Self::IntoIter {
        self.operations.iter()
    }
}

impl From<Vec<PatchOperation>> for Patch {
    fn from(value: Vec<PatchOperation>) -> Self {
        Self::from_operations(value)
    }
}

fn take_pointer(
    object: &mut serde_json::Map<String, JsonValue>,
    field: &'static str,
) -> Result<Pointer, OperationError> {
    match object.remove(field) {
        Some(JsonValue::String(text)) => Ok(Pointer::parse(&text)?),
        Some(_) => Err(OperationError::NotAString { field }),
        None => Err(OperationError::MissingField { field }),
    }
}

fn json_type_name(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "boolean",
        JsonValue::Number(_) => "number",
        JsonValue::String(_) => "string",
        JsonValue::Array(_) => "array",
        JsonValue::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PointerError;

    fn pointer(text: &str) -> Pointer {
        Pointer::parse(text).unwrap()
    }

    #[test]
    fn empty_patch_renders_as_empty_array() {
        assert_eq!(Patch::empty().to_json_string(), "[]");
        assert_eq!(serde_json::to_string(&Patch::default()).unwrap(), "[]");
    }

    #[test]
    fn remove_has_no_value_member() {
        let patch = Patch::from_operations(vec![PatchOperation::remove(pointer("/a/0"))]);
        assert_eq!(patch.to_json_string(), r#"[{"op":"remove","path":"/a/0"}]"#);
    }

    #[test]
    fn move_and_copy_carry_from() {
        let patch = Patch::from_operations(vec![
            PatchOperation::Move { from: pointer("/a"), path: pointer("/b") },
            PatchOperation::Copy { from: pointer("/b"), path: pointer("/c") },
        ]);
        let text = patch.to_json_string();
        assert_eq!(
            text,
            r#"[{"op":"move","path":"/b","from":"/a"},{"op":"copy","path":"/c","from":"/b"}]"#
        );
        assert_eq!(Patch::from_json_str(&text).unwrap(), patch);
    }

    #[test]
    fn explicit_null_value_is_present() {
        let patch = Patch::from_json_str(r#"[{"op":"add","path":"/a","value":null}]"#).unwrap();
        assert_eq!(patch.operations(), [PatchOperation::add(pointer("/a"), Value::Null)]);
    }

    #[test]
    fn value_on_remove_is_ignored() {
        let patch = Patch::from_json_str(r#"[{"op":"remove","path":"/a","value":1}]"#).unwrap();
        assert_eq!(patch.operations(), [PatchOperation::remove(pointer("/a"))]);
    }

    #[test]
    fn unknown_op_is_rejected() {
        let err = Patch::from_json_str(r#"[{"op":"frobnicate","path":"/a"}]"#).unwrap_err();
        assert!(matches!(
            err,
            PatchFormatError::Operation { index: 0, source: OperationError::UnknownOp { ref op } }
                if op == "frobnicate"
        ));
    }

    fn operation_error(text: &str) -> (usize, OperationError) {
        match Patch::from_json_str(text) {
            Err(PatchFormatError::Operation { index, source }) => (index, source),
            other => panic!("expected an operation error, got {other:?}"),
        }
    }

    #[test]
    fn missing_fields_are_rejected() {
        let (index, err) = operation_error(r#"[{"op":"remove"}]"#);
        assert_eq!(index, 0);
        assert!(matches!(err, OperationError::MissingField { field: "path" }));

        let (index, err) =
            operation_error(r#"[{"op":"remove","path":""},{"op":"add","path":"/x"}]"#);
        assert_eq!(index, 1);
        assert!(matches!(err, OperationError::MissingField { field: "value" }));

        let (_, err) = operation_error(r#"[{"op":"copy","path":"/x"}]"#);
        assert!(matches!(err, OperationError::MissingField { field: "from" }));

        let (_, err) = operation_error(r#"[{"path":"/x"}]"#);
        assert!(matches!(err, OperationError::MissingField { field: "op" }));
    }

    #[test]
    fn wrong_shapes_are_rejected() {
        assert!(matches!(
            Patch::from_json_str(r#"{"op":"remove","path":"/a"}"#),
            Err(PatchFormatError::NotAnArray { found: "object" })
        ));
        assert!(matches!(
            operation_error("[1]"),
            (0, OperationError::NotAnObject { found: "number" })
        ));
        assert!(matches!(
            operation_error(r#"[{"op":"remove","path":3}]"#),
            (0, OperationError::NotAString { field: "path" })
        ));
        assert!(matches!(
            operation_error(r#"[{"op":"remove","path":"a"}]"#),
            (0, OperationError::Pointer(PointerError::NotAbsolute { .. }))
        ));
        assert!(matches!(Patch::from_json_str("[{"), Err(PatchFormatError::Json(_))));
    }

    #[test]
    fn patch_errors_name_the_failing_operation() {
        let err = Patch::from_json_str(r#"[{"op":"remove","path":"/a"},{"op":"add","path":"/b"}]"#)
            .unwrap_err();
        assert_eq!(err.to_string(), r#"operation 1: missing required field "value""#);
    }

    #[test]
    fn standalone_operations_report_no_index() {
        let err = serde_json::from_str::<Vec<PatchOperation>>(
            r#"[{"op":"remove","path":"/a"},{"op":"move","path":"/b"}]"#,
        )
        .unwrap_err();
        let message = err.to_string();
        assert!(message.starts_with(r#"missing required field "from""#), "{message}");
        assert!(!message.contains("operation 0"), "{message}");
    }

    #[test]
    fn serde_deserialize_matches_from_json_str() {
        let text = r#"[{"op":"test","path":"/n","value":1.5}]"#;
        let via_serde: Patch = serde_json::from_str(text).unwrap();
        assert_eq!(via_serde, Patch::from_json_str(text).unwrap());
    }

    #[test]
    fn accessors_expose_members() {
        let op = PatchOperation::Copy { from: pointer("/a"), path: pointer("/b") };
        assert_eq!(op.op(), "copy");
        assert_eq!(op.path(), &pointer("/b"));
        assert_eq!(op.from_path(), Some(&pointer("/a")));
        assert_eq!(op.value(), None);
    }
}
