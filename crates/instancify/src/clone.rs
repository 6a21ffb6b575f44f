//! Clone service.

use crate::config::Lineage;
use crate::doc_cell::Doc;
use serde_json::Value;
use std::sync::Arc;

/// Caller-supplied clone strategy.
pub type CloneFn = Arc<dyn Fn(&Value) -> Value + Send + Sync>;

/// Produce the document a new snapshot is built from.
///
/// - `should_clone == false`: the same handle is returned (aliased).
/// - a custom clone function, if configured, builds the new document.
/// - otherwise a full structural deep copy.
///
/// The result is never frozen unless it is an alias of a frozen document.
pub fn clone_doc(lineage: &Lineage, doc: &Doc) -> Doc {
    if !lineage.should_clone() {
        return doc.clone();
    }
    let source = doc.read();
    let copied = match lineage.custom_clone() {
        Some(custom) => custom(&*source),
        None => source.clone(),
    };
    Doc::new(copied)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Config;
    use serde_json::json;

    #[test]
    fn test_deep_copy_is_independent() {
        let lineage = Lineage::resolve(Config::default());
        let original = Doc::new(json!({"a": [1, 2, 3], "b": {"c": [4]}}));
        let copy = clone_doc(&lineage, &original);

        assert_eq!(copy, original);
        assert!(!Doc::ptr_eq(&copy, &original));
        copy.update(|v| v["b"]["c"][0] = json!(5)).unwrap();
        assert_eq!(original.get("b.c[0]"), Some(json!(4)));
    }

    #[test]
    fn test_should_clone_false_aliases() {
        let lineage = Lineage::resolve(Config::default().with_should_clone(false));
        let original = Doc::new(json!({"a": 1}));
        let alias = clone_doc(&lineage, &original);

        assert!(Doc::ptr_eq(&alias, &original));
    }

    #[test]
    fn test_custom_clone_is_used() {
        let lineage = Lineage::resolve(
            Config::default().with_custom_clone(|value| json!({"cloned": value.clone()})),
        );
        let copy = clone_doc(&lineage, &Doc::new(json!(1)));

        assert_eq!(copy, json!({"cloned": 1}));
    }

    #[test]
    fn test_copy_of_frozen_doc_is_mutable() {
        let lineage = Lineage::resolve(Config::default());
        let frozen = crate::freeze::freeze_value(json!({"a": 1}), true);
        let copy = clone_doc(&lineage, &frozen);

        assert!(!copy.is_frozen());
        assert!(copy.replace(json!(null)).is_ok());
    }
}
