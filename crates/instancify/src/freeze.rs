//! Freeze service.
//!
//! Nested objects and arrays of a `Doc` are only reachable through the
//! document's own lock, so freezing the document makes the whole graph
//! immutable in one step. No cycle handling is needed: a `serde_json::Value`
//! is always a tree.

use crate::doc_cell::Doc;
use serde_json::Value;

/// Make `doc` and everything it contains immutable.
///
/// With `should_freeze == false` the document is returned unchanged and stays
/// mutable. Freezing an already frozen document is a no-op. The same handle
/// is returned in every case.
pub fn deep_freeze(doc: Doc, should_freeze: bool) -> Doc {
    if should_freeze {
        doc.freeze();
    }
    doc
}

/// Wrap a bare value in a new document and freeze it.
pub fn freeze_value(value: Value, should_freeze: bool) -> Doc {
    deep_freeze(Doc::new(value), should_freeze)
}
