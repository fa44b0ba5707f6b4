use crate::{Patch, PatchOperation, Pointer, Value};

/// Replaces a value that cannot be diffed structurally.
pub(super) fn diff_primitives(rhs: &Value, path: &Pointer, patch: &mut Patch) {
    patch.push(PatchOperation::replace(path.clone(), rhs.clone()));
}
