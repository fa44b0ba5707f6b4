//! Synthetic corpora for benchmarking `jpatch-core`.
//!
//! Every corpus is generated deterministically so benchmark runs are
//! comparable without checking large fixtures into the repository.
//!
//! # Examples
//!
//! ```
//! use jpatch_core::DiffOptions;
//!
//! let corpus = jpatch_benches::available_corpora()
//!     .iter()
//!     .find(|corpus| corpus.name() == "records")
//!     .expect("registered corpus");
//! let dataset = corpus.load()?;
//! let patch = dataset.diff(&DiffOptions::default());
//! assert_eq!(dataset.before().apply_patch(&patch)?, *dataset.after());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
#![forbid(unsafe_code)]
#![warn(missing_docs)]

use jpatch_core::{DecodeError, DiffOptions, Patch, Value};
use serde_json::{json, Value as JsonValue};

/// A named generator for a pair of documents.
#[derive(Debug)]
pub struct Corpus {
    name: &'static str,
    generate: fn() -> (JsonValue, JsonValue),
}

impl Corpus {
    /// Short identifier used as the benchmark parameter.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Generates both documents and decodes them into [`Value`]s.
    pub fn load(&self) -> Result<Dataset, DecodeError> {
        let (before, after) = (self.generate)();
        let before_text = before.to_string();
        let after_text = after.to_string();
        Ok(Dataset {
            bytes: before_text.len() + after_text.len(),
            before: Value::from_json_str(&before_text)?,
            after: Value::from_json_str(&after_text)?,
        })
    }
}

/// A decoded pair of documents.
#[derive(Clone, Debug)]
pub struct Dataset {
    before: Value,
    after: Value,
    bytes: usize,
}

impl Dataset {
    /// The document patches are computed from.
    #[must_use]
    pub fn before(&self) -> &Value {
        &self.before
    }

    /// The document patches should produce.
    #[must_use]
    pub fn after(&self) -> &Value {
        &self.after
    }

    /// Combined size of both documents as compact JSON.
    #[must_use]
    pub fn bytes(&self) -> usize {
        self.bytes
    }

    /// Computes the patch from [`Self::before`] to [`Self::after`].
    #[must_use]
    pub fn diff(&self, options: &DiffOptions) -> Patch {
        self.before.diff_with_options(&self.after, options)
    }
}

static CORPORA: [Corpus; 3] = [
    Corpus { name: "config", generate: config },
    Corpus { name: "shifted-array", generate: shifted_array },
    Corpus { name: "records", generate: records },
];

/// Returns every registered corpus.
#[must_use]
pub fn available_corpora() -> &'static [Corpus] {
    &CORPORA
}

fn config() -> (JsonValue, JsonValue) {
    let service = |port: u32, replicas: u32, debug: bool| {
        json!({
            "image": "registry.local/api:1.4.2",
            "ports": [port, port + 1],
            "replicas": replicas,
            "env": {"RUST_LOG": if debug { "debug" } else { "info" }, "REGION": "eu-west-1"},
        })
    };
    let mut before = serde_json::Map::new();
    let mut after = serde_json::Map::new();
    for i in 0..64 {
        let name = format!("service-{i}");
        before.insert(name.clone(), service(8000 + i, 2, false));
        match i % 8 {
            0 => {}
            1 => {
                after.insert(name, service(8000 + i, 3, false));
            }
            2 => {
                after.insert(name, service(8000 + i, 2, true));
            }
            _ => {
                after.insert(name, service(8000 + i, 2, false));
            }
        }
    }
    after.insert("service-new".to_owned(), service(9000, 1, true));
    (JsonValue::Object(before), JsonValue::Object(after))
}

fn shifted_array() -> (JsonValue, JsonValue) {
    let before: Vec<u32> = (1..=600).collect();
    let after: Vec<u32> = before
        .iter()
        .filter(|n| *n % 37 != 0)
        .flat_map(|&n| if n % 53 == 0 { vec![n, n + 100_000] } else { vec![n] })
        .collect();
    (json!(before), json!(after))
}

fn records() -> (JsonValue, JsonValue) {
    let record = |id: u32, name: String, active: bool| {
        json!({"id": id, "name": name, "active": active, "tags": ["a", "b"]})
    };
    let before: Vec<JsonValue> = (0..300).map(|id| record(id, format!("user-{id}"), true)).collect();
    let after: Vec<JsonValue> = (0..300)
        .filter(|id| id % 50 != 7)
        .map(|id| {
            let name = if id % 17 == 0 { format!("renamed-{id}") } else { format!("user-{id}") };
            record(id, name, id % 23 != 0)
        })
        .collect();
    (JsonValue::Array(before), JsonValue::Array(after))
}

#[cfg(test)]
mod tests {
    use super::available_corpora;
    use jpatch_core::DiffOptions;

    #[test]
    fn every_corpus_roundtrips() {
        for corpus in available_corpora() {
            let dataset = corpus.load().expect("corpus decodes");
            let patch = dataset.diff(&DiffOptions::default());
            assert!(!patch.is_empty(), "{} should differ", corpus.name());
            let patched = dataset.before().apply_patch(&patch).expect("patch applies");
            assert_eq!(&patched, dataset.after(), "{}", corpus.name());
        }
    }
}
