//! Values a write can produce.
//!
//! A write yields either finished data or a deferred function waiting for
//! more arguments. Deferred candidates keep the write open: the guard is only
//! consumed once some call finally produces data.

use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// A function producing the next candidate from further arguments.
pub type Deferred = Arc<dyn Fn(&[Value]) -> Candidate + Send + Sync>;

/// A transformation `(snapshot, args) -> candidate`.
pub type TransformFn = Arc<dyn Fn(Value, &[Value]) -> Candidate + Send + Sync>;

/// The result of a write producer.
#[derive(Clone)]
pub enum Candidate {
    /// Finished data for the next instance.
    Data(Value),
    /// A curried step; finalization waits until it yields data.
    Deferred(Deferred),
}

impl Candidate {
    /// Finished data.
    pub fn data(value: impl Into<Value>) -> Self {
        Candidate::Data(value.into())
    }

    /// A curried step taking further arguments.
    ///
    /// The function may be invoked any number of times.
    pub fn deferred<F, R>(f: F) -> Self
    where
        F: Fn(&[Value]) -> R + Send + Sync + 'static,
        R: Into<Candidate>,
    {
        Candidate::Deferred(Arc::new(move |args: &[Value]| -> Candidate { f(args).into() }))
    }

    /// Returns true for a curried step.
    #[inline]
    pub fn is_deferred(&self) -> bool {
        matches!(self, Candidate::Deferred(_))
    }
}

impl From<Value> for Candidate {
    fn from(value: Value) -> Self {
        Candidate::Data(value)
    }
}

impl fmt::Debug for Candidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Candidate::Data(value) => f.debug_tuple("Data").field(value).finish(),
            Candidate::Deferred(_) => f.write_str("Deferred(<fn>)"),
        }
    }
}

/// The first argument of a transformation write.
///
/// Anything that is not [`Transform::Callable`] is rejected with a warning
/// and handed back unchanged.
#[derive(Clone)]
pub enum Transform {
    /// A callable transformation.
    Callable(TransformFn),
    /// A plain value where a function was expected.
    Plain(Value),
}

impl Transform {
    /// Build a callable transformation.
    pub fn new<F, R>(f: F) -> Self
    where
        F: Fn(Value, &[Value]) -> R + Send + Sync + 'static,
        R: Into<Candidate>,
    {
        Transform::Callable(Arc::new(
            move |data: Value, args: &[Value]| -> Candidate { f(data, args).into() },
        ))
    }

    /// Returns true for a callable transformation.
    #[inline]
    pub fn is_callable(&self) -> bool {
        matches!(self, Transform::Callable(_))
    }
}

impl From<Value> for Transform {
    fn from(value: Value) -> Self {
        Transform::Plain(value)
    }
}

impl From<TransformFn> for Transform {
    fn from(f: TransformFn) -> Self {
        Transform::Callable(f)
    }
}

impl fmt::Debug for Transform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Transform::Callable(_) => f.write_str("Callable(<fn>)"),
            Transform::Plain(value) => f.debug_tuple("Plain").field(value).finish(),
        }
    }
}
