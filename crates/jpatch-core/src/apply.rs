//! Patch application.
//!
//! Operations are replayed in order against a private copy of the input
//! document, so a failing patch never leaves the caller's value half
//! modified. Array indices are resolved against the document as it stands
//! after all preceding operations.

use tracing::{debug, trace};

use crate::{ApplyError, Patch, PatchOperation, Pointer, Value};

/// Applies `patch` to a copy of `document` and returns the patched copy.
///
/// ```
/// # use jpatch_core::{apply_patch, Patch, Value};
/// let doc = Value::from_json_str(r#"{"list":[1,2]}"#)?;
/// let patch = Patch::from_json_str(
///     r#"[{"op":"add","path":"/list/-","value":3},{"op":"remove","path":"/list/0"}]"#,
/// )?;
/// let patched = apply_patch(&patch, &doc)?;
/// assert_eq!(patched, Value::from_json_str(r#"{"list":[2,3]}"#)?);
/// assert_eq!(doc, Value::from_json_str(r#"{"list":[1,2]}"#)?);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn apply_patch(patch: &Patch, document: &Value) -> Result<Value, ApplyError> {
    debug!(operations = patch.len(), "applying patch");
    let mut current = document.clone();
    for operation in patch {
        trace!(op = operation.op(), path = %operation.path(), "applying operation");
        apply_operation(&mut current, operation)?;
    }
    Ok(current)
}

fn apply_operation(document: &mut Value, operation: &PatchOperation) -> Result<(), ApplyError> {
    match operation {
        PatchOperation::Add { path, value } => add(document, path, value.clone()),
        PatchOperation::Remove { path } => remove(document, path).map(drop),
        PatchOperation::Replace { path, value } => replace(document, path, value.clone()),
        PatchOperation::Move { from, path } => {
            if from == path {
                // Still has to exist.
                return get(document, from).map(drop);
            }
            if path.starts_with(from) {
                return Err(ApplyError::MoveIntoChild {
                    from: from.to_string(),
                    pointer: path.to_string(),
                });
            }
            let value = remove(document, from)?;
            add(document, path, value)
        }
        PatchOperation::Copy { from, path } => {
            let value = get(document, from)?.clone();
            add(document, path, value)
        }
        PatchOperation::Test { path, value } => {
            let found = get(document, path)?;
            if found == value {
                Ok(())
            } else {
                Err(ApplyError::TestFailed {
                    pointer: path.to_string(),
                    expected: Box::new(value.clone()),
                    found: Box::new(found.clone()),
                })
            }
        }
    }
}

fn add(document: &mut Value, path: &Pointer, value: Value) -> Result<(), ApplyError> {
    let Some((last, parent)) = split_last(path) else {
        *document = value;
        return Ok(());
    };
    match resolve_mut(document, path, parent)? {
        Value::Object(map) => {
            map.insert(last.clone(), value);
            Ok(())
        }
        Value::Array(items) => {
            let index = if last == "-" { items.len() } else { parse_index(path, last)? };
            if index > items.len() {
                return Err(out_of_bounds(path, index, items.len()));
            }
            items.insert(index, value);
            Ok(())
        }
        other => Err(not_a_container(path, other)),
    }
}

fn remove(document: &mut Value, path: &Pointer) -> Result<Value, ApplyError> {
    let Some((last, parent)) = split_last(path) else {
        return Err(ApplyError::RemoveRoot);
    };
    match resolve_mut(document, path, parent)? {
        Value::Object(map) => map.shift_remove(last).ok_or_else(|| missing_key(path, last)),
        Value::Array(items) => {
            let index = parse_index(path, last)?;
            if index >= items.len() {
                return Err(out_of_bounds(path, index, items.len()));
            }
            Ok(items.remove(index))
        }
        other => Err(not_a_container(path, other)),
    }
}

fn replace(document: &mut Value, path: &Pointer, value: Value) -> Result<(), ApplyError> {
    let slot = resolve_mut(document, path, path.tokens())?;
    *slot = value;
    Ok(())
}

fn get<'a>(document: &'a Value, path: &Pointer) -> Result<&'a Value, ApplyError> {
    let mut current = document;
    for token in path {
        current = match current {
            Value::Object(map) => map.get(token).ok_or_else(|| missing_key(path, token))?,
            Value::Array(items) => {
                let index = parse_index(path, token)?;
                items.get(index).ok_or_else(|| out_of_bounds(path, index, items.len()))?
            }
            other => return Err(not_a_container(path, other)),
        };
    }
    Ok(current)
}

/// Walks `tokens` (a prefix of `path`) and returns the value they address.
fn resolve_mut<'a>(
    document: &'a mut Value,
    path: &Pointer,
    tokens: &[String],
) -> Result<&'a mut Value, ApplyError> {
    let mut current = document;
    for token in tokens {
        current = match current {
            Value::Object(map) => map.get_mut(token).ok_or_else(|| missing_key(path, token))?,
            Value::Array(items) => {
                let index = parse_index(path, token)?;
                let len = items.len();
                items.get_mut(index).ok_or_else(|| out_of_bounds(path, index, len))?
            }
            other => return Err(not_a_container(path, other)),
        };
    }
    Ok(current)
}

fn split_last(path: &Pointer) -> Option<(&String, &[String])> {
    path.tokens().split_last()
}

/// Accepts `0` or a decimal number without leading zeros.
fn parse_index(path: &Pointer, token: &str) -> Result<usize, ApplyError> {
    let canonical = !token.is_empty()
        && token.bytes().all(|b| b.is_ascii_digit())
        && (token == "0" || !token.starts_with('0'));
    let parsed = if canonical { token.parse::<usize>().ok() } else { None };
    parsed.ok_or_else(|| ApplyError::InvalidIndex {
        pointer: path.to_string(),
        token: token.to_owned(),
    })
}

fn missing_key(path: &Pointer, key: &str) -> ApplyError {
    ApplyError::MissingKey { pointer: path.to_string(), key: key.to_owned() }
}

fn out_of_bounds(path: &Pointer, index: usize, len: usize) -> ApplyError {
    ApplyError::IndexOutOfBounds { pointer: path.to_string(), index, len }
}

fn not_a_container(path: &Pointer, found: &Value) -> ApplyError {
    ApplyError::NotAContainer { pointer: path.to_string(), found: found.type_name() }
}
