//! Structural diff producing RFC 6902 patches.
//!
//! Objects are compared member by member, arrays through the split tree in
//! [`crate::lcs`], and everything else by equality. Operations are emitted in
//! the order they must be applied: array indices account for the shifts
//! caused by earlier operations on the same array.

mod list;
mod object;
mod primitives;

use tracing::debug;

use crate::{DiffOptions, Patch, Pointer, Value};

/// Computes the patch that turns `lhs` into `rhs`.
///
/// Never fails: values that cannot be diffed structurally are replaced
/// wholesale, including at the document root.
///
/// ```
/// # use jpatch_core::{make_patch, Value};
/// let lhs = Value::from_json_str(r#"{"a":[0,1,2,3]}"#)?;
/// let rhs = Value::from_json_str(r#"{"a":[1,2,4,"hi"]}"#)?;
/// let patch = make_patch(&lhs, &rhs);
/// assert_eq!(
///     patch.to_json_string(),
///     r#"[{"op":"remove","path":"/a/0"},{"op":"replace","path":"/a/2","value":4},{"op":"add","path":"/a/3","value":"hi"}]"#
/// );
/// assert_eq!(lhs.apply_patch(&patch).unwrap(), rhs);
/// # Ok::<(), jpatch_core::DecodeError>(())
/// ```
#[must_use]
pub fn make_patch(lhs: &Value, rhs: &Value) -> Patch {
    make_patch_with_options(lhs, rhs, &DiffOptions::default())
}

/// Computes the patch that turns `lhs` into `rhs` using `options`.
///
/// # Recursion
///
/// The differ recurses once per level of nesting shared by both values, and
/// the array matcher once per common run (see [`SplitNode::build`]). Parsed
/// documents are bounded by `serde_json`'s nesting limit of 128; values
/// built in code with far deeper nesting can exhaust the stack, as cloning
/// or dropping them would.
///
/// [`SplitNode::build`]: crate::lcs::SplitNode::build
#[must_use]
pub fn make_patch_with_options(lhs: &Value, rhs: &Value, options: &DiffOptions) -> Patch {
    let mut patch = Patch::empty();
    let mut path = Pointer::root();
    diff_impl(lhs, rhs, &mut path, options, &mut patch);
    debug!(operations = patch.len(), "computed patch");
    patch
}

pub(super) fn diff_impl(
    lhs: &Value,
    rhs: &Value,
    path: &mut Pointer,
    options: &DiffOptions,
    patch: &mut Patch,
) {
    if lhs == rhs {
        return;
    }

    match (lhs, rhs) {
        (Value::Object(left), Value::Object(right)) => {
            object::diff_objects(left, right, path, options, patch);
        }
        (Value::Array(left), Value::Array(right)) => {
            list::diff_lists(left, right, path, options, patch);
        }
        _ => primitives::diff_primitives(rhs, path, patch),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{KeyOrder, PatchOperation};
    use proptest::prelude::*;

    fn value(text: &str) -> Value {
        Value::from_json_str(text).unwrap()
    }

    fn pointer(text: &str) -> Pointer {
        Pointer::parse(text).unwrap()
    }

    #[test]
    fn diff_of_numbers_replaces_root() {
        let patch = make_patch(&value("1"), &value("2"));
        assert_eq!(patch.operations(), [PatchOperation::replace(Pointer::root(), value("2"))]);
    }

    #[test]
    fn diff_of_different_container_types_replaces() {
        let patch = make_patch(&value(r#"{"a":[]}"#), &value(r#"{"a":{}}"#));
        assert_eq!(patch.operations(), [PatchOperation::replace(pointer("/a"), value("{}"))]);
    }

    #[test]
    fn numerically_equal_numbers_do_not_diff() {
        assert!(make_patch(&value("[1, 2.0]"), &value("[1.0, 2]")).is_empty());
    }

    #[test]
    fn large_integer_differs_from_nearby_float() {
        let lhs = value(r#"{"n":9007199254740993}"#);
        let rhs = value(r#"{"n":9007199254740992.0}"#);
        let patch = make_patch(&lhs, &rhs);
        let expected = PatchOperation::replace(pointer("/n"), value("9007199254740992.0"));
        assert_eq!(patch.operations(), [expected]);
        assert_eq!(lhs.apply_patch(&patch).unwrap(), rhs);
    }

    #[test]
    fn diff_of_objects_tracks_additions_and_removals() {
        let patch = make_patch(&value(r#"{"a":1,"b":2}"#), &value(r#"{"b":2,"c":3}"#));
        assert_eq!(
            patch.operations(),
            [
                PatchOperation::remove(pointer("/a")),
                PatchOperation::add(pointer("/c"), value("3")),
            ]
        );
    }

    #[test]
    fn sorted_key_order_is_lexicographic() {
        let lhs = value(r#"{"z":1,"m":1,"a":1}"#);
        let rhs = value(r#"{"y":2,"m":2,"b":2}"#);
        let opts = DiffOptions::default().with_key_order(KeyOrder::Sorted);
        let ops: Vec<_> = lhs
            .diff_with_options(&rhs, &opts)
            .iter()
            .map(|op| format!("{} {}", op.op(), op.path()))
            .collect();
        assert_eq!(ops, ["remove /a", "replace /m", "remove /z", "add /b", "add /y"]);
    }

    #[test]
    fn keys_needing_escapes_produce_escaped_pointers() {
        let patch = make_patch(&value(r#"{"a/b":1}"#), &value(r#"{"a/b":2,"~":0}"#));
        let text = patch.to_json_string();
        assert_eq!(
            text,
            r#"[{"op":"replace","path":"/a~1b","value":2},{"op":"add","path":"/~0","value":0}]"#
        );
    }

    #[test]
    fn deepest_parsable_nesting_diffs_and_applies() {
        let depth = 120;
        let nested = |leaf: &str| format!("{}{leaf}{}", "[".repeat(depth), "]".repeat(depth));
        let lhs = value(&nested("1"));
        let rhs = value(&nested("2"));

        let patch = make_patch(&lhs, &rhs);
        assert_eq!(patch.len(), 1);
        assert_eq!(patch.operations()[0].path().len(), depth);
        assert_eq!(lhs.apply_patch(&patch).unwrap(), rhs);
    }

    #[test]
    fn diff_of_arrays_with_nested_object_uses_child_path() {
        let lhs = value(r#"[{"name":"jpatch","version":1}]"#);
        let rhs = value(r#"[{"name":"jpatch","version":2}]"#);
        let patch = make_patch(&lhs, &rhs);
        assert_eq!(patch.operations(), [PatchOperation::replace(pointer("/0/version"), value("2"))]);
    }

    fn arb_json_value() -> impl Strategy<Value = serde_json::Value> {
        use proptest::{collection::btree_map, collection::vec, string::string_regex};

        let leaf = prop_oneof![
            Just(serde_json::Value::Null),
            any::<bool>().prop_map(serde_json::Value::Bool),
            (-4i64..4).prop_map(|i| serde_json::Value::Number(i.into())),
            string_regex("[a-c]{0,2}").unwrap().prop_map(serde_json::Value::String),
        ];
        leaf.prop_recursive(4, 16, 6, move |inner| {
            prop_oneof![
                vec(inner.clone(), 0..6).prop_map(serde_json::Value::Array),
                btree_map(string_regex("[a-d]{1,2}").unwrap(), inner, 0..4).prop_map(|map| {
                    let mut object = serde_json::Map::new();
                    for (k, v) in map {
                        object.insert(k, v);
                    }
                    serde_json::Value::Object(object)
                }),
            ]
        })
    }

    proptest! {
        #[test]
        fn identical_values_produce_empty_patch(json in arb_json_value()) {
            let lhs = Value::from_json_value(json.clone()).unwrap();
            let rhs = Value::from_json_value(json).unwrap();
            prop_assert!(make_patch(&lhs, &rhs).is_empty());
        }

        #[test]
        fn diff_is_deterministic(a in arb_json_value(), b in arb_json_value()) {
            let lhs = Value::from_json_value(a).unwrap();
            let rhs = Value::from_json_value(b).unwrap();
            prop_assert_eq!(make_patch(&lhs, &rhs), make_patch(&lhs, &rhs));
        }
    }
}
