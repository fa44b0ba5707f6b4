//! Generate and apply RFC 6902 JSON Patches.
//!
//! `jpatch-core` compares two JSON documents and produces the list of
//! `add`, `remove` and `replace` operations that turns the first into the
//! second. Arrays are compared with a longest-common-run split so untouched
//! elements keep their relative order and only the differing regions are
//! edited. Patches (de)serialize to the RFC 6902 wire format and can be
//! applied back to a document.
//!
//! ```
//! use jpatch_core::{Patch, Value};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let base = Value::from_json_str(r#"{"this":{"is":"my","document":"sir"}}"#)?;
//!     let target =
//!         Value::from_json_str(r#"{"this":{"document":"my","is":"sir","now":{"go":"away!"}}}"#)?;
//!     let patch = base.diff(&target);
//!     assert_eq!(patch.len(), 3);
//!
//!     let text = patch.to_json_string();
//!     assert!(text.starts_with(r#"[{"op":"replace","path":"/this/is","value":"sir"}"#));
//!
//!     let patched = base.apply_patch(&Patch::from_json_str(&text)?)?;
//!     assert_eq!(patched, target);
//!     Ok(())
//! }
//! ```
#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod apply;
pub mod diff;
mod error;
pub mod lcs;
mod number;
mod options;
mod patch;
pub mod pointer;
mod value;

pub use apply::apply_patch;
pub use diff::{make_patch, make_patch_with_options};
pub use error::{ApplyError, DecodeError, OperationError, PatchFormatError, PointerError};
pub use number::Number;
pub use options::{DiffOptions, KeyOrder};
pub use patch::{Patch, PatchOperation};
pub use pointer::Pointer;
pub use value::{Map, Value};

/// Returns the semantic version of the `jpatch-core` crate.
///
/// ```
/// assert!(!jpatch_core::version().is_empty());
/// ```
#[must_use]
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
