//! Fuzzing harnesses for `jpatch-core`.
//!
//! Each public function accepts raw bytes so it can be driven from
//! `cargo fuzz` targets as well as plain unit tests. Decoding failures are
//! ignored; violated round-trip properties panic.
//!
//! ```
//! jpatch_fuzz::fuzz_decode(b"{\"a\":1}");
//! jpatch_fuzz::fuzz_diff(&[1, 2, 3, 4]);
//! jpatch_fuzz::fuzz_patch(b"example");
//! ```
#![forbid(unsafe_code)]
#![warn(missing_docs)]

use arbitrary::Unstructured;
use jpatch_core::{Patch, Value};
use serde_json::{Map as JsonMap, Number as JsonNumber, Value as JsonValue};

const MAX_DEPTH: usize = 4;
const MAX_ARRAY_LEN: u8 = 8;
const MAX_OBJECT_LEN: u8 = 6;
const MAX_STRING_LEN: u8 = 12;

/// Feeds arbitrary bytes through the JSON and YAML decoders.
///
/// A successfully decoded JSON document must survive re-encoding.
///
/// ```
/// jpatch_fuzz::fuzz_decode(b"{\"key\":\"value\"}");
/// ```
pub fn fuzz_decode(data: &[u8]) {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    if let Ok(value) = Value::from_json_str(text) {
        let reparsed = Value::from_json_str(&value.to_json_string())
            .expect("encoded document must decode");
        assert_eq!(reparsed, value);
    }
    let _ = Value::from_yaml_str(text);
    let _ = Patch::from_json_str(text);
}

/// Diffs two generated documents and checks the patch reproduces the target.
///
/// ```
/// jpatch_fuzz::fuzz_diff(b"seed");
/// ```
pub fn fuzz_diff(data: &[u8]) {
    let mut unstructured = Unstructured::new(data);
    let Some(lhs) = random_value(&mut unstructured) else {
        return;
    };
    let Some(rhs) = random_value(&mut unstructured) else {
        return;
    };

    let patch = lhs.diff(&rhs);
    let patched = lhs.apply_patch(&patch).expect("generated patch must apply");
    assert_eq!(patched, rhs);
    assert!(patched.diff(&rhs).is_empty());

    let reparsed = Patch::from_json_str(&patch.to_json_string()).expect("patch must reparse");
    assert_eq!(reparsed, patch);
}

/// Applies arbitrary patches to generated documents.
///
/// The raw bytes are first tried as a patch document and applied to a
/// generated value, exercising the applier's error paths. Failures are
/// fine; panics are not.
///
/// ```
/// jpatch_fuzz::fuzz_patch(b"patch fuzz");
/// ```
pub fn fuzz_patch(data: &[u8]) {
    if let Ok(patch) = serde_json::from_slice::<Patch>(data) {
        let mut unstructured = Unstructured::new(data);
        if let Some(seed) = random_value(&mut unstructured) {
            let _ = seed.apply_patch(&patch);
        }
        let _ = Value::Null.apply_patch(&patch);
    }

    let mut unstructured = Unstructured::new(data);
    if let (Some(base), Some(target)) =
        (random_value(&mut unstructured), random_value(&mut unstructured))
    {
        let reverse = target.diff(&base);
        let restored = target.apply_patch(&reverse).expect("generated patch must apply");
        assert_eq!(restored, base);
    }
}

fn random_value(unstructured: &mut Unstructured<'_>) -> Option<Value> {
    let value = json_value_from_unstructured(unstructured, 0).ok()?;
    Value::from_json_value(value).ok()
}

fn json_value_from_unstructured(
    unstructured: &mut Unstructured<'_>,
    depth: usize,
) -> Result<JsonValue, arbitrary::Error> {
    if depth >= MAX_DEPTH {
        return json_leaf(unstructured);
    }

    let choice = unstructured.int_in_range::<u8>(0..=5)?;
    match choice {
        0 => Ok(JsonValue::Null),
        1 => Ok(JsonValue::Bool(unstructured.arbitrary()?)),
        2 => Ok(JsonValue::Number(random_number(unstructured)?)),
        3 => Ok(JsonValue::String(random_string(unstructured)?)),
        4 => {
            let len = usize::from(unstructured.int_in_range::<u8>(0..=MAX_ARRAY_LEN)?);
            let mut items = Vec::with_capacity(len);
            for _ in 0..len {
                items.push(json_value_from_unstructured(unstructured, depth + 1)?);
            }
            Ok(JsonValue::Array(items))
        }
        _ => {
            let len = usize::from(unstructured.int_in_range::<u8>(0..=MAX_OBJECT_LEN)?);
            let mut map = JsonMap::new();
            for _ in 0..len {
                let key = random_string(unstructured)?;
                let value = json_value_from_unstructured(unstructured, depth + 1)?;
                map.insert(key, value);
            }
            Ok(JsonValue::Object(map))
        }
    }
}

fn json_leaf(unstructured: &mut Unstructured<'_>) -> Result<JsonValue, arbitrary::Error> {
    let choice = unstructured.int_in_range::<u8>(0..=3)?;
    match choice {
        0 => Ok(JsonValue::Null),
        1 => Ok(JsonValue::Bool(unstructured.arbitrary()?)),
        2 => Ok(JsonValue::Number(random_number(unstructured)?)),
        _ => Ok(JsonValue::String(random_string(unstructured)?)),
    }
}

fn random_number(unstructured: &mut Unstructured<'_>) -> Result<JsonNumber, arbitrary::Error> {
    if unstructured.arbitrary()? {
        // Small range so arrays share elements often enough to match.
        let int = unstructured.int_in_range::<i64>(-4..=4)?;
        Ok(JsonNumber::from(int))
    } else {
        let numerator = f64::from(unstructured.arbitrary::<i32>()?);
        let denominator = f64::from(unstructured.int_in_range::<u16>(1..=1024)?);
        JsonNumber::from_f64(numerator / denominator).ok_or(arbitrary::Error::IncorrectFormat)
    }
}

fn random_string(unstructured: &mut Unstructured<'_>) -> Result<String, arbitrary::Error> {
    let len = usize::from(unstructured.int_in_range::<u8>(0..=MAX_STRING_LEN)?);
    let mut string = String::with_capacity(len);
    for _ in 0..len {
        let byte = unstructured.int_in_range::<u8>(0x20..=0x7e)?;
        string.push(char::from(byte));
    }
    Ok(string)
}
