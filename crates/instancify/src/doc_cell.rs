//! Shared document handle with a one-way frozen flag.
//!
//! `Doc` wraps an `Arc<DocCell>` so that several owners (the caller, an
//! instance's public value, its private snapshot) can hold the very same
//! document. Reference identity is observable through [`Doc::ptr_eq`].
//! Once frozen, every mutation entry point fails with
//! [`InstancifyError::Frozen`].

use crate::{InstancifyError, InstancifyResult};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard};

struct DocCell {
    value: RwLock<Value>,
    frozen: AtomicBool,
}

/// Shared handle to a JSON document.
///
/// Cloning a `Doc` clones the handle, not the document.
#[derive(Clone)]
pub struct Doc(Arc<DocCell>);

impl Doc {
    /// Create a new, mutable document.
    pub fn new(value: Value) -> Self {
        Self(Arc::new(DocCell {
            value: RwLock::new(value),
            frozen: AtomicBool::new(false),
        }))
    }

    /// Serialize `value` into a new document.
    pub fn from_serialize<T: Serialize>(value: &T) -> InstancifyResult<Self> {
        Ok(Self::new(serde_json::to_value(value)?))
    }

    /// Acquire a read lock on the document.
    ///
    /// Callers should clone any needed data before dropping the guard.
    #[inline]
    pub fn read(&self) -> RwLockReadGuard<'_, Value> {
        self.0.value.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Clone the current document value.
    pub fn snapshot(&self) -> Value {
        self.read().clone()
    }

    /// Read the value at `path`.
    pub fn get(&self, path: impl Into<crate::Path>) -> Option<Value> {
        crate::get_at_path(&self.read(), &path.into()).cloned()
    }

    /// Deserialize the document into a typed value.
    pub fn deserialize<T: DeserializeOwned>(&self) -> InstancifyResult<T> {
        Ok(T::deserialize(&*self.read())?)
    }

    /// Mutate the document in place.
    ///
    /// Fails without running `f` when the document is frozen.
    pub fn update<R>(&self, f: impl FnOnce(&mut Value) -> R) -> InstancifyResult<R> {
        let mut guard = self.0.value.write().unwrap_or_else(PoisonError::into_inner);
        if self.is_frozen() {
            return Err(InstancifyError::Frozen);
        }
        Ok(f(&mut guard))
    }

    /// Replace the whole document.
    pub fn replace(&self, value: Value) -> InstancifyResult<()> {
        self.update(|current| *current = value)
    }

    /// Returns true once the document has been frozen.
    #[inline]
    pub fn is_frozen(&self) -> bool {
        self.0.frozen.load(Ordering::Acquire)
    }

    /// Freeze the document. Later calls are no-ops.
    pub(crate) fn freeze(&self) {
        // Taken under the write lock so no update straddles the transition.
        let _guard = self.0.value.write().unwrap_or_else(PoisonError::into_inner);
        self.0.frozen.store(true, Ordering::Release);
    }

    /// Returns true if both handles point at the same document.
    #[inline]
    pub fn ptr_eq(a: &Doc, b: &Doc) -> bool {
        Arc::ptr_eq(&a.0, &b.0)
    }
}

impl From<Value> for Doc {
    fn from(value: Value) -> Self {
        Doc::new(value)
    }
}

impl Default for Doc {
    fn default() -> Self {
        Self::new(Value::Object(Default::default()))
    }
}

impl PartialEq for Doc {
    fn eq(&self, other: &Self) -> bool {
        Doc::ptr_eq(self, other) || *self.read() == *other.read()
    }
}

impl PartialEq<Value> for Doc {
    fn eq(&self, other: &Value) -> bool {
        *self.read() == *other
    }
}

impl Serialize for Doc {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.read().serialize(serializer)
    }
}

impl fmt::Display for Doc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", *self.read())
    }
}

impl fmt::Debug for Doc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Doc")
            .field("value", &*self.read())
            .field("frozen", &self.is_frozen())
            .finish()
    }
}
