//! Configuration options and the resolved lineage context.
//!
//! [`Config`] is what callers hand to [`wrap`](crate::wrap): every field is
//! optional. [`Lineage`] is the resolved form, shared by every instance
//! derived from one `wrap` call. It owns the instance counter and the custom
//! method tables that `lift` grows.

use crate::candidate::Candidate;
use crate::clone::CloneFn;
use crate::instance::Instance;
use crate::methods::{setter, Getter, Methods, Setter};
use crate::InstancifyResult;
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use tracing::warn;

/// Callback for a write attempted on an instance that already has a
/// successor. Receives that successor.
pub type ErrorFn = Arc<dyn Fn(&Instance) + Send + Sync>;

/// Options for a new lineage.
///
/// The plain flags can be read from JSON; unknown fields are ignored.
///
/// ```
/// use instancify::Config;
/// use serde_json::json;
///
/// let config = Config::from_json(json!({"shouldFreeze": false, "extra": 1})).unwrap();
/// assert_eq!(config.should_freeze, Some(false));
/// assert_eq!(config.should_clone, None);
/// ```
#[derive(Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Config {
    /// `Some(false)` leaves produced data mutable.
    pub should_freeze: Option<bool>,
    /// `Some(false)` aliases documents instead of copying them.
    pub should_clone: Option<bool>,
    /// Replaces the structural deep copy.
    #[serde(skip)]
    pub custom_clone: Option<CloneFn>,
    /// Setters available from the first instance on.
    #[serde(skip)]
    pub custom_setters: BTreeMap<String, Setter>,
    /// Getters available from the first instance on.
    #[serde(skip)]
    pub custom_getters: BTreeMap<String, Getter>,
    /// Called when a write hits an already written instance.
    #[serde(skip)]
    pub error_function: Option<ErrorFn>,
}

impl Config {
    /// Read the plain flags from a JSON object.
    pub fn from_json(value: Value) -> InstancifyResult<Self> {
        Ok(serde_json::from_value(value)?)
    }

    /// Set `should_freeze`.
    pub fn with_should_freeze(mut self, should_freeze: bool) -> Self {
        self.should_freeze = Some(should_freeze);
        self
    }

    /// Set `should_clone`.
    pub fn with_should_clone(mut self, should_clone: bool) -> Self {
        self.should_clone = Some(should_clone);
        self
    }

    /// Set a custom clone function.
    pub fn with_custom_clone<F>(mut self, f: F) -> Self
    where
        F: Fn(&Value) -> Value + Send + Sync + 'static,
    {
        self.custom_clone = Some(Arc::new(f));
        self
    }

    /// Register a custom setter.
    pub fn with_setter<F, R>(mut self, name: impl Into<String>, f: F) -> Self
    where
        F: Fn(Value, &[Value]) -> R + Send + Sync + 'static,
        R: Into<Candidate>,
    {
        self.custom_setters.insert(name.into(), setter(f));
        self
    }

    /// Register a custom getter.
    pub fn with_getter<F>(mut self, name: impl Into<String>, f: F) -> Self
    where
        F: Fn(&Value, &[Value]) -> Value + Send + Sync + 'static,
    {
        self.custom_getters.insert(name.into(), Arc::new(f));
        self
    }

    /// Set the already-written callback.
    pub fn with_error_function<F>(mut self, f: F) -> Self
    where
        F: Fn(&Instance) + Send + Sync + 'static,
    {
        self.error_function = Some(Arc::new(f));
        self
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("should_freeze", &self.should_freeze)
            .field("should_clone", &self.should_clone)
            .field("custom_clone", &self.custom_clone.is_some())
            .field("custom_setters", &self.custom_setters.keys().collect::<Vec<_>>())
            .field("custom_getters", &self.custom_getters.keys().collect::<Vec<_>>())
            .field("error_function", &self.error_function.is_some())
            .finish()
    }
}

fn default_error_function(successor: &Instance) {
    warn!(
        instance_number = successor.instance_number(),
        value = %successor.value(),
        "can't write an already written instance"
    );
}

/// Resolved configuration shared across one lineage.
pub struct Lineage {
    error_function: ErrorFn,
    should_freeze: bool,
    should_clone: bool,
    custom_clone: Option<CloneFn>,
    methods: Mutex<Methods>,
    instance_number: AtomicU64,
}

impl Lineage {
    /// Apply defaults to `config`. Never fails.
    pub fn resolve(config: Config) -> Self {
        Self {
            error_function: config
                .error_function
                .unwrap_or_else(|| Arc::new(default_error_function) as ErrorFn),
            should_freeze: config.should_freeze != Some(false),
            should_clone: config.should_clone != Some(false),
            custom_clone: config.custom_clone,
            methods: Mutex::new(Methods {
                setters: config.custom_setters,
                getters: config.custom_getters,
            }),
            instance_number: AtomicU64::new(1),
        }
    }

    /// Whether produced data is frozen.
    #[inline]
    pub fn should_freeze(&self) -> bool {
        self.should_freeze
    }

    /// Whether documents are copied rather than aliased.
    #[inline]
    pub fn should_clone(&self) -> bool {
        self.should_clone
    }

    /// The custom clone function, if any.
    #[inline]
    pub fn custom_clone(&self) -> Option<&CloneFn> {
        self.custom_clone.as_ref()
    }

    /// The number the next created instance will receive.
    pub fn peek_instance_number(&self) -> u64 {
        self.instance_number.load(Ordering::Acquire)
    }

    pub(crate) fn next_instance_number(&self) -> u64 {
        self.instance_number.fetch_add(1, Ordering::AcqRel)
    }

    /// Copy of the current method table.
    pub fn methods(&self) -> Methods {
        self.methods
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Merge `methods` into the shared tables.
    pub(crate) fn lift(&self, methods: Methods) {
        self.methods
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .extend(methods);
    }

    pub(crate) fn report_already_written(&self, successor: &Instance) {
        (self.error_function)(successor);
    }
}

impl fmt::Debug for Lineage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Lineage")
            .field("should_freeze", &self.should_freeze)
            .field("should_clone", &self.should_clone)
            .field("custom_clone", &self.custom_clone.is_some())
            .field("methods", &self.methods())
            .field("instance_number", &self.peek_instance_number())
            .finish()
    }
}
