//! Custom setters and getters.
//!
//! Setters run as transformations through the write guard and produce the
//! next instance. Getters read an instance's private snapshot and never
//! advance the version. Each instance captures the method table of its
//! lineage at construction, so methods lifted later only show up on later
//! instances.

use crate::candidate::{Candidate, TransformFn};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// A named transformation `(snapshot, args) -> candidate`.
pub type Setter = TransformFn;

/// A named read `(snapshot, args) -> result`.
pub type Getter = Arc<dyn Fn(&Value, &[Value]) -> Value + Send + Sync>;

/// A set of custom setters and getters.
#[derive(Clone, Default)]
pub struct Methods {
    /// Setters by name.
    pub setters: BTreeMap<String, Setter>,
    /// Getters by name.
    pub getters: BTreeMap<String, Getter>,
}

impl Methods {
    /// Create an empty method set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a setter (builder pattern).
    pub fn with_setter<F, R>(mut self, name: impl Into<String>, f: F) -> Self
    where
        F: Fn(Value, &[Value]) -> R + Send + Sync + 'static,
        R: Into<Candidate>,
    {
        self.setters.insert(name.into(), setter(f));
        self
    }

    /// Add a getter (builder pattern).
    pub fn with_getter<F>(mut self, name: impl Into<String>, f: F) -> Self
    where
        F: Fn(&Value, &[Value]) -> Value + Send + Sync + 'static,
    {
        self.getters.insert(name.into(), Arc::new(f));
        self
    }

    /// Merge `other` into this set. Entries of `other` win on name clashes.
    pub fn extend(&mut self, other: Methods) {
        self.setters.extend(other.setters);
        self.getters.extend(other.getters);
    }

    /// Look up a setter.
    #[inline]
    pub fn setter(&self, name: &str) -> Option<&Setter> {
        self.setters.get(name)
    }

    /// Look up a getter.
    #[inline]
    pub fn getter(&self, name: &str) -> Option<&Getter> {
        self.getters.get(name)
    }

    /// Returns true if a setter or getter with this name exists.
    pub fn contains(&self, name: &str) -> bool {
        self.setters.contains_key(name) || self.getters.contains_key(name)
    }

    /// Setter names in sorted order.
    pub fn setter_names(&self) -> impl Iterator<Item = &str> {
        self.setters.keys().map(String::as_str)
    }

    /// Getter names in sorted order.
    pub fn getter_names(&self) -> impl Iterator<Item = &str> {
        self.getters.keys().map(String::as_str)
    }

    /// Returns true if there are no methods.
    pub fn is_empty(&self) -> bool {
        self.setters.is_empty() && self.getters.is_empty()
    }
}

impl fmt::Debug for Methods {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Methods")
            .field("setters", &self.setters.keys().collect::<Vec<_>>())
            .field("getters", &self.getters.keys().collect::<Vec<_>>())
            .finish()
    }
}

pub(crate) fn setter<F, R>(f: F) -> Setter
where
    F: Fn(Value, &[Value]) -> R + Send + Sync + 'static,
    R: Into<Candidate>,
{
    Arc::new(move |data: Value, args: &[Value]| -> Candidate { f(data, args).into() })
}
