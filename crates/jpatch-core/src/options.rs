use serde::{Deserialize, Serialize};

/// Order in which object members are visited while diffing.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum KeyOrder {
    /// Members of the source object in insertion order, then members only
    /// present in the target object in its insertion order (default).
    #[default]
    Document,
    /// Lexicographic byte order of the keys, for both passes.
    Sorted,
}

/// Configuration knobs passed to the differ.
///
/// ```
/// # use jpatch_core::{DiffOptions, KeyOrder, Value};
/// let lhs = Value::from_json_str(r#"{"b":1,"a":1}"#)?;
/// let rhs = Value::from_json_str(r#"{"b":2,"a":2}"#)?;
/// let opts = DiffOptions::default().with_key_order(KeyOrder::Sorted);
/// let patch = lhs.diff_with_options(&rhs, &opts);
/// let paths: Vec<_> = patch.iter().map(|op| op.path().to_string()).collect();
/// assert_eq!(paths, ["/a", "/b"]);
/// # Ok::<(), jpatch_core::DecodeError>(())
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffOptions {
    key_order: KeyOrder,
}

impl DiffOptions {
    /// Returns the configured key order.
    #[must_use]
    pub fn key_order(&self) -> KeyOrder {
        self.key_order
    }

    /// Sets the key order.
    #[must_use]
    pub fn with_key_order(mut self, key_order: KeyOrder) -> Self {
        self.key_order = key_order;
        self
    }
}
