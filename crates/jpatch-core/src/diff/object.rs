use super::diff_impl;
use crate::{value::Map, DiffOptions, KeyOrder, Patch, PatchOperation, Pointer};

pub(super) fn diff_objects(
    lhs: &Map,
    rhs: &Map,
    path: &mut Pointer,
    options: &DiffOptions,
    patch: &mut Patch,
) {
    for key in ordered_keys(lhs, options.key_order()) {
        let value = &lhs[key];
        path.push(key.as_str());
        match rhs.get(key) {
            Some(other) => diff_impl(value, other, path, options, patch),
            None => patch.push(PatchOperation::remove(path.clone())),
        }
        path.pop();
    }

    for key in ordered_keys(rhs, options.key_order()) {
        if lhs.contains_key(key) {
            continue;
        }
        path.push(key.as_str());
        patch.push(PatchOperation::add(path.clone(), rhs[key].clone()));
        path.pop();
    }
}

fn ordered_keys(map: &Map, order: KeyOrder) -> Vec<&String> {
    let mut keys: Vec<_> = map.keys().collect();
    if order == KeyOrder::Sorted {
        keys.sort();
    }
    keys
}
