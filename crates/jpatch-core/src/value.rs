use std::fmt;

use indexmap::IndexMap;
use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value as JsonValue;
use serde_yaml::Value as YamlValue;

use crate::{ApplyError, DecodeError, DiffOptions, Number, Patch};

/// Insertion-ordered JSON object.
pub type Map = IndexMap<String, Value>;

/// The JSON data model shared by the differ and the applier.
///
/// Object keys keep the order in which they were inserted. That order only
/// affects the order of emitted operations; it never affects equality.
///
/// ```
/// # use jpatch_core::Value;
/// let lhs = Value::from_json_str(r#"{"a":1,"b":[true,null]}"#)?;
/// let rhs = Value::from_json_str(r#"{"b":[true,null],"a":1.0}"#)?;
/// assert_eq!(lhs, rhs);
/// # Ok::<(), jpatch_core::DecodeError>(())
/// ```
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    /// JSON `null`.
    Null,
    /// JSON boolean.
    Bool(bool),
    /// JSON number.
    Number(Number),
    /// JSON string.
    String(String),
    /// JSON array.
    Array(Vec<Value>),
    /// JSON object.
    Object(Map),
}

impl Value {
    /// Parses JSON text, keeping object members in document order.
    pub fn from_json_str(input: &str) -> Result<Self, DecodeError> {
        Ok(serde_json::from_str(input)?)
    }

    /// Parses YAML text.
    ///
    /// ```
    /// # use jpatch_core::Value;
    /// let node = Value::from_yaml_str("---\nanswer: 42\n")?;
    /// assert_eq!(node, Value::from_json_str(r#"{"answer":42}"#)?);
    /// # Ok::<(), jpatch_core::DecodeError>(())
    /// ```
    pub fn from_yaml_str(input: &str) -> Result<Self, DecodeError> {
        let value: YamlValue = serde_yaml::from_str(input)?;
        Self::from_yaml_value(value)
    }

    /// Converts a serde JSON value.
    pub fn from_json_value(value: JsonValue) -> Result<Self, DecodeError> {
        match value {
            JsonValue::Null => Ok(Self::Null),
            JsonValue::Bool(v) => Ok(Self::Bool(v)),
            JsonValue::Number(num) => Ok(Self::Number(Number::from_json_number(&num)?)),
            JsonValue::String(s) => Ok(Self::String(s)),
            JsonValue::Array(values) => {
                let mut items = Vec::with_capacity(values.len());
                for value in values {
                    items.push(Self::from_json_value(value)?);
                }
                Ok(Self::Array(items))
            }
            JsonValue::Object(map) => {
                let mut object = Map::with_capacity(map.len());
                for (key, value) in map {
                    object.insert(key, Self::from_json_value(value)?);
                }
                Ok(Self::Object(object))
            }
        }
    }

    fn from_yaml_value(value: YamlValue) -> Result<Self, DecodeError> {
        match value {
            YamlValue::Null => Ok(Self::Null),
            YamlValue::Bool(v) => Ok(Self::Bool(v)),
            YamlValue::Number(num) => {
                if let Some(i) = num.as_i64() {
                    return Ok(Self::Number(Number::from(i)));
                }
                if let Some(u) = num.as_u64() {
                    return Ok(Self::Number(Number::from(u)));
                }
                match num.as_f64() {
                    Some(f) => Ok(Self::Number(Number::new(f)?)),
                    None => Err(DecodeError::NumberOutOfRange { value: num.to_string() }),
                }
            }
            YamlValue::String(s) => Ok(Self::String(s)),
            YamlValue::Sequence(seq) => {
                let mut items = Vec::with_capacity(seq.len());
                for value in seq {
                    items.push(Self::from_yaml_value(value)?);
                }
                Ok(Self::Array(items))
            }
            YamlValue::Mapping(map) => {
                let mut object = Map::with_capacity(map.len());
                for (key, value) in map {
                    let key = match key {
                        YamlValue::String(s) => s,
                        other => {
                            return Err(DecodeError::NonStringYamlKey {
                                found: format!("{other:?}"),
                            });
                        }
                    };
                    object.insert(key, Self::from_yaml_value(value)?);
                }
                Ok(Self::Object(object))
            }
            YamlValue::Tagged(tagged) => {
                Err(DecodeError::UnsupportedYamlTag { tag: tagged.tag.to_string() })
            }
        }
    }

    /// Converts the value into a serde JSON value.
    #[must_use]
    pub fn to_json_value(&self) -> JsonValue {
        match self {
            Self::Null => JsonValue::Null,
            Self::Bool(v) => JsonValue::Bool(*v),
            Self::Number(n) => JsonValue::Number(n.to_json_number()),
            Self::String(s) => JsonValue::String(s.clone()),
            Self::Array(values) => JsonValue::Array(values.iter().map(Self::to_json_value).collect()),
            Self::Object(map) => {
                let mut object = serde_json::Map::new();
                for (key, value) in map {
                    object.insert(key.clone(), value.to_json_value());
                }
                JsonValue::Object(object)
            }
        }
    }

    /// Renders compact JSON text, preserving object key order.
    #[must_use]
    pub fn to_json_string(&self) -> String {
        self.to_string()
    }

    /// Renders indented JSON text, preserving object key order.
    pub fn to_json_string_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Name of the JSON type, used in error messages.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "boolean",
            Self::Number(_) => "number",
            Self::String(_) => "string",
            Self::Array(_) => "array",
            Self::Object(_) => "object",
        }
    }

    /// Returns `true` for JSON `null`.
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Returns `true` for arrays.
    #[must_use]
    pub fn is_array(&self) -> bool {
        matches!(self, Self::Array(_))
    }

    /// Returns `true` for objects.
    #[must_use]
    pub fn is_object(&self) -> bool {
        matches!(self, Self::Object(_))
    }

    /// Returns `true` for anything that is neither an array nor an object.
    #[must_use]
    pub fn is_scalar(&self) -> bool {
        !self.is_array() && !self.is_object()
    }

    /// Computes the patch that turns `self` into `other`.
    ///
    /// ```
    /// # use jpatch_core::Value;
    /// let lhs = Value::from_json_str("[1,2,3]")?;
    /// let rhs = Value::from_json_str("[1,4,3]")?;
    /// let patch = lhs.diff(&rhs);
    /// assert_eq!(patch.to_json_string(), r#"[{"op":"replace","path":"/1","value":4}]"#);
    /// # Ok::<(), jpatch_core::DecodeError>(())
    /// ```
    #[must_use]
    pub fn diff(&self, other: &Self) -> Patch {
        crate::diff::make_patch(self, other)
    }

    /// Computes the patch that turns `self` into `other` using `options`.
    #[must_use]
    pub fn diff_with_options(&self, other: &Self, options: &DiffOptions) -> Patch {
        crate::diff::make_patch_with_options(self, other, options)
    }

    /// Applies `patch` to a copy of this value and returns the result.
    ///
    /// ```
    /// # use jpatch_core::{Patch, Value};
    /// let doc = Value::from_json_str(r#"{"foo":"bar"}"#)?;
    /// let patch = Patch::from_json_str(r#"[{"op":"add","path":"/baz","value":"qux"}]"#)?;
    /// let patched = doc.apply_patch(&patch)?;
    /// assert_eq!(patched.to_json_string(), r#"{"foo":"bar","baz":"qux"}"#);
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn apply_patch(&self, patch: &Patch) -> Result<Self, ApplyError> {
        crate::apply::apply_patch(patch, self)
    }
}

impl TryFrom<JsonValue> for Value {
    type Error = DecodeError;

    fn try_from(value: JsonValue) -> Result<Self, Self::Error> {
        Self::from_json_value(value)
    }
}

impl From<&Value> for JsonValue {
    fn from(value: &Value) -> Self {
        value.to_json_value()
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::Number(Number::from(value))
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Self::Number(Number::from(value))
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::String(value.to_owned())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<Vec<Value>> for Value {
    fn from(value: Vec<Value>) -> Self {
        Self::Array(value)
    }
}

impl From<Map> for Value {
    fn from(value: Map) -> Self {
        Self::Object(value)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = serde_json::to_string(self).map_err(|_| fmt::Error)?;
        f.write_str(&text)
    }
}

impl Serialize for Value {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Self::Null => serializer.serialize_unit(),
            Self::Bool(v) => serializer.serialize_bool(*v),
            Self::Number(n) => n.serialize(serializer),
            Self::String(s) => serializer.serialize_str(s),
            Self::Array(values) => {
                let mut seq = serializer.serialize_seq(Some(values.len()))?;
                for value in values {
                    seq.serialize_element(value)?;
                }
                seq.end()
            }
            Self::Object(object) => {
                let mut map = serializer.serialize_map(Some(object.len()))?;
                for (key, value) in object {
                    map.serialize_entry(key, value)?;
                }
                map.end()
            }
        }
    }
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct Visitor;

        impl<'de> serde::de::Visitor<'de> for Visitor {
            type Value = Value;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("any JSON value")
            }

            fn visit_unit<E>(self) -> Result<Self::Value, E> {
                Ok(Value::Null)
            }

            fn visit_none<E>(self) -> Result<Self::Value, E> {
                Ok(Value::Null)
            }

            fn visit_some<D>(self, deserializer: D) -> Result<Self::Value, D::Error>
            where
                D: Deserializer<'de>,
            {
                Value::deserialize(deserializer)
            }

            fn visit_bool<E>(self, v: bool) -> Result<Self::Value, E> {
                Ok(Value::Bool(v))
            }

            fn visit_i64<E>(self, v: i64) -> Result<Self::Value, E> {
                Ok(Value::Number(Number::from(v)))
            }

            fn visit_u64<E>(self, v: u64) -> Result<Self::Value, E> {
                Ok(Value::Number(Number::from(v)))
            }

            fn visit_f64<E>(self, v: f64) -> Result<Self::Value, E>
            where
                E: serde::de::Error,
            {
                Number::new(v).map(Value::Number).map_err(E::custom)
            }

            fn visit_str<E>(self, v: &str) -> Result<Self::Value, E> {
                Ok(Value::String(v.to_owned()))
            }

            fn visit_string<E>(self, v: String) -> Result<Self::Value, E> {
                Ok(Value::String(v))
            }

            fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
            where
                A: serde::de::SeqAccess<'de>,
            {
                let mut items = Vec::with_capacity(seq.size_hint().unwrap_or(0));
                while let Some(item) = seq.next_element()? {
                    items.push(item);
                }
                Ok(Value::Array(items))
            }

            fn visit_map<A>(self, mut access: A) -> Result<Self::Value, A::Error>
            where
                A: serde::de::MapAccess<'de>,
            {
                let mut object = Map::with_capacity(access.size_hint().unwrap_or(0));
                while let Some((key, value)) = access.next_entry::<String, Value>()? {
                    object.insert(key, value);
                }
                Ok(Value::Object(object))
            }
        }

        deserializer.deserialize_any(Visitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::{
        collection::{btree_map, vec},
        prelude::*,
        string::string_regex,
    };

    fn arb_json_value() -> impl Strategy<Value = JsonValue> {
        let leaf = prop_oneof![
            Just(JsonValue::Null),
            any::<bool>().prop_map(JsonValue::Bool),
            any::<i64>().prop_map(|i| JsonValue::Number(i.into())),
            proptest::num::f64::NORMAL.prop_filter_map("finite", |f| {
                serde_json::Number::from_f64(f).map(JsonValue::Number)
            }),
            string_regex("[a-zA-Z0-9]{0,8}").unwrap().prop_map(JsonValue::String),
        ];
        leaf.prop_recursive(4, 8, 4, move |inner| {
            prop_oneof![
                vec(inner.clone(), 0..4).prop_map(JsonValue::Array),
                btree_map(string_regex("[a-zA-Z0-9]{1,8}").unwrap(), inner, 0..4).prop_map(|map| {
                    let mut object = serde_json::Map::new();
                    for (k, v) in map {
                        object.insert(k, v);
                    }
                    JsonValue::Object(object)
                }),
            ]
        })
    }

    #[test]
    fn object_equality_ignores_key_order() {
        let lhs = Value::from_json_str(r#"{"a":1,"b":2}"#).unwrap();
        let rhs = Value::from_json_str(r#"{"b":2,"a":1}"#).unwrap();
        assert_eq!(lhs, rhs);
    }

    #[test]
    fn array_equality_respects_order() {
        let lhs = Value::from_json_str("[1,2]").unwrap();
        let rhs = Value::from_json_str("[2,1]").unwrap();
        assert_ne!(lhs, rhs);
        assert_ne!(lhs, Value::from_json_str("[1,2,2]").unwrap());
    }

    #[test]
    fn differing_types_are_not_equal() {
        assert_ne!(Value::Null, Value::Bool(false));
        assert_ne!(Value::from(0), Value::from("0"));
        assert_ne!(Value::Array(Vec::new()), Value::Object(Map::new()));
    }

    #[test]
    fn rendering_preserves_insertion_order() {
        let text = r#"{"z":1,"a":{"y":[1,2.5,"x"],"b":null}}"#;
        let value = Value::from_json_str(text).unwrap();
        assert_eq!(value.to_json_string(), text);
    }

    #[test]
    fn introspection() {
        let value = Value::from_json_str(r#"{"a":[]}"#).unwrap();
        assert!(value.is_object());
        assert!(!value.is_scalar());
        assert_eq!(value.type_name(), "object");
        assert!(Value::Null.is_null());
        assert!(Value::from("x").is_scalar());
    }

    #[test]
    fn yaml_non_string_key_errors() {
        let err = Value::from_yaml_str("? [1, 2]: 3").unwrap_err();
        let DecodeError::NonStringYamlKey { .. } = err else {
            panic!("expected NonStringYamlKey error");
        };
    }

    #[test]
    fn deserialize_matches_from_json_str() {
        let text = r#"{"k":[1,-2,3.5,true,null,"s"]}"#;
        let via_serde: Value = serde_json::from_str(text).unwrap();
        assert_eq!(via_serde, Value::from_json_str(text).unwrap());
    }

    proptest! {
        #[test]
        fn json_roundtrips_through_value(json in arb_json_value()) {
            let value = Value::from_json_value(json.clone()).unwrap();
            let reconstructed = value.to_json_value();
            let again = Value::from_json_value(reconstructed).unwrap();
            prop_assert_eq!(again, value.clone());
            let reparsed = Value::from_json_str(&value.to_json_string()).unwrap();
            prop_assert_eq!(reparsed, value);
        }
    }
}
