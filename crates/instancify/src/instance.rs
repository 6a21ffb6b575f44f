//! Versioned instances and the write transition.
//!
//! Every [`Instance`] holds two documents: the frozen public value and a
//! private snapshot used by transformations, path writes and getters. Writes
//! funnel through a single transition that consults the instance's write
//! guard:
//!
//! ```text
//! Unwritten --(write yielding data)--> Written(successor)
//! Written   --(any write)-----------> error function, successor returned
//! ```
//!
//! A write yielding a deferred candidate leaves the guard `Unwritten` and
//! hands back a [`PendingWrite`].

use crate::candidate::{Candidate, Deferred, Transform};
use crate::clone::clone_doc;
use crate::config::{Config, Lineage};
use crate::doc_cell::Doc;
use crate::error::value_type_name;
use crate::freeze::deep_freeze;
use crate::guard::WriteGuard;
use crate::methods::Methods;
use crate::path::{set_at_path, Path};
use crate::{InstancifyError, InstancifyResult};
use serde::ser::SerializeStruct;
use serde::Serialize;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};

struct InstanceInner {
    instance_number: u64,
    value: Doc,
    snapshot: Doc,
    methods: Methods,
    guard: WriteGuard,
    lineage: Arc<Lineage>,
}

/// An immutable, versioned snapshot of data.
///
/// Cloning an `Instance` clones a handle; both handles share one write guard.
#[derive(Clone)]
pub struct Instance(Arc<InstanceInner>);

/// What a write produced.
#[derive(Debug)]
pub enum Outcome {
    /// The write created the successor instance.
    Created(Instance),
    /// The instance already had a successor; it is returned unchanged and the
    /// error function has been notified.
    AlreadyWritten(Instance),
    /// The write yielded a deferred candidate; call it with more arguments.
    Pending(PendingWrite),
    /// The transformation was not callable and is handed back unchanged.
    Untransformed(Value),
}

impl Outcome {
    /// The resulting instance, for created and rejected writes.
    pub fn instance(&self) -> Option<&Instance> {
        match self {
            Outcome::Created(instance) | Outcome::AlreadyWritten(instance) => Some(instance),
            Outcome::Pending(_) | Outcome::Untransformed(_) => None,
        }
    }

    /// Consume into the resulting instance, for created and rejected writes.
    pub fn into_instance(self) -> Option<Instance> {
        match self {
            Outcome::Created(instance) | Outcome::AlreadyWritten(instance) => Some(instance),
            Outcome::Pending(_) | Outcome::Untransformed(_) => None,
        }
    }

    /// Consume into the pending write, if the write was deferred.
    pub fn into_pending(self) -> Option<PendingWrite> {
        match self {
            Outcome::Pending(pending) => Some(pending),
            _ => None,
        }
    }

    /// Returns true if a new instance was created.
    #[inline]
    pub fn is_created(&self) -> bool {
        matches!(self, Outcome::Created(_))
    }

    /// Returns true if the write hit an already written instance.
    #[inline]
    pub fn is_rejected(&self) -> bool {
        matches!(self, Outcome::AlreadyWritten(_))
    }

    /// Returns true if the write is waiting for more arguments.
    #[inline]
    pub fn is_pending(&self) -> bool {
        matches!(self, Outcome::Pending(_))
    }
}

/// A curried write waiting for more arguments.
///
/// Each call re-checks the originating instance's guard, so a chain can
/// finalize at most once no matter how many intermediate calls happen.
#[derive(Clone)]
pub struct PendingWrite {
    origin: Instance,
    deferred: Deferred,
}

impl PendingWrite {
    /// Feed further arguments to the deferred candidate.
    pub fn call(&self, args: &[Value]) -> Outcome {
        self.origin.transition(|| (self.deferred)(args))
    }

    /// The instance this write was started on.
    pub fn origin(&self) -> &Instance {
        &self.origin
    }
}

impl fmt::Debug for PendingWrite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PendingWrite")
            .field("origin", &self.origin.instance_number())
            .finish()
    }
}

/// Wrap `initial` in the first instance of a new lineage.
///
/// Unless cloning is disabled, the caller's document is copied structurally
/// and left untouched. The clone function, custom or not, runs once and
/// builds the private snapshot only. With `should_clone == false` the
/// caller's document becomes the instance value and is frozen in place.
pub fn wrap(initial: impl Into<Doc>, config: Config) -> Instance {
    let lineage = Arc::new(Lineage::resolve(config));
    let initial = initial.into();
    let snapshot = clone_doc(&lineage, &initial);
    let value = if lineage.should_clone() {
        Doc::new(initial.snapshot())
    } else {
        initial
    };
    Instance::assemble(&lineage, value, snapshot)
}

/// Wrap `initial` with the default configuration.
pub fn wrap_default(initial: impl Into<Doc>) -> Instance {
    wrap(initial, Config::default())
}

impl Instance {
    fn assemble(lineage: &Arc<Lineage>, value: Doc, snapshot: Doc) -> Instance {
        let instance_number = lineage.next_instance_number();
        let value = deep_freeze(value, lineage.should_freeze());
        debug!(instance_number, "instance created");
        Instance(Arc::new(InstanceInner {
            instance_number,
            value,
            snapshot,
            methods: lineage.methods(),
            guard: WriteGuard::new(),
            lineage: Arc::clone(lineage),
        }))
    }

    /// The public value. Frozen unless `should_freeze` was `false`.
    #[inline]
    pub fn value(&self) -> &Doc {
        &self.0.value
    }

    /// Position in the lineage, starting at 1.
    #[inline]
    pub fn instance_number(&self) -> u64 {
        self.0.instance_number
    }

    /// Returns true once this instance has produced its successor.
    pub fn is_written(&self) -> bool {
        self.0.guard.is_written()
    }

    /// The successor produced from this instance, if any.
    pub fn successor(&self) -> Option<Instance> {
        self.0.guard.successor()
    }

    /// Returns true if both handles refer to the same instance.
    #[inline]
    pub fn ptr_eq(a: &Instance, b: &Instance) -> bool {
        Arc::ptr_eq(&a.0, &b.0)
    }

    /// Use `candidate` verbatim as the next value.
    pub fn write_new_instance(&self, candidate: impl Into<Candidate>) -> Outcome {
        let candidate = candidate.into();
        self.transition(move || candidate)
    }

    /// Run `transform(snapshot, args)` and use its result as the next value.
    ///
    /// A non-callable transform is handed back in [`Outcome::Untransformed`]
    /// and the guard is left untouched.
    pub fn write_new_instance_with_transformation(
        &self,
        transform: impl Into<Transform>,
        args: &[Value],
    ) -> Outcome {
        match transform.into() {
            Transform::Callable(f) => self.transition(|| f(self.0.snapshot.snapshot(), args)),
            Transform::Plain(value) => {
                warn!(
                    found = value_type_name(&value),
                    "trying to use a non function for transformation"
                );
                Outcome::Untransformed(value)
            }
        }
    }

    /// Assign `new_data` at `path` in the snapshot and use the result as the
    /// next value. Assignment failures are silent.
    pub fn write_new_instance_with_path(
        &self,
        path: impl Into<Path>,
        new_data: impl Into<Value>,
    ) -> Outcome {
        let path = path.into();
        let new_data = new_data.into();
        self.transition_in_place(|snapshot| {
            set_at_path(snapshot, new_data, &path);
        })
    }

    /// Register custom methods on the lineage and produce the next instance
    /// with unchanged data. The methods exist from that instance on.
    pub fn lift(&self, methods: Methods) -> Outcome {
        self.0.lineage.lift(methods);
        self.transition_in_place(|_| {})
    }

    /// Run the custom setter `name` as a transformation.
    pub fn call(&self, name: &str, args: &[Value]) -> InstancifyResult<Outcome> {
        let setter = self
            .0
            .methods
            .setter(name)
            .cloned()
            .ok_or_else(|| InstancifyError::unknown_setter(name))?;
        Ok(self.write_new_instance_with_transformation(Transform::Callable(setter), args))
    }

    /// Run the custom getter `name` against the snapshot.
    pub fn get(&self, name: &str, args: &[Value]) -> InstancifyResult<Value> {
        let getter = self
            .0
            .methods
            .getter(name)
            .ok_or_else(|| InstancifyError::unknown_getter(name))?;
        Ok(getter(&*self.0.snapshot.read(), args))
    }

    /// Returns true if a custom setter or getter `name` exists on this instance.
    pub fn has_method(&self, name: &str) -> bool {
        self.0.methods.contains(name)
    }

    /// Custom setter names available on this instance.
    pub fn setter_names(&self) -> Vec<String> {
        self.0.methods.setter_names().map(str::to_owned).collect()
    }

    /// Custom getter names available on this instance.
    pub fn getter_names(&self) -> Vec<String> {
        self.0.methods.getter_names().map(str::to_owned).collect()
    }

    /// Take this instance's successor when this is the last handle to it.
    /// The instance itself is dropped without touching the rest of the chain.
    pub(crate) fn unlink(self) -> Option<Instance> {
        Arc::into_inner(self.0).and_then(|mut inner| inner.guard.take_successor())
    }

    fn transition(&self, produce: impl FnOnce() -> Candidate) -> Outcome {
        if let Some(successor) = self.0.guard.successor() {
            return self.reject(successor);
        }
        match produce() {
            Candidate::Deferred(deferred) => Outcome::Pending(PendingWrite {
                origin: self.clone(),
                deferred,
            }),
            Candidate::Data(data) => self.commit(Doc::new(data)),
        }
    }

    // The snapshot itself becomes the successor's value, so the mutation runs
    // under the guard lock.
    fn transition_in_place(&self, mutate: impl FnOnce(&Doc)) -> Outcome {
        let lineage = &self.0.lineage;
        let value = &self.0.snapshot;
        self.settle(self.0.guard.finalize(|| {
            mutate(value);
            let snapshot = clone_doc(lineage, value);
            Instance::assemble(lineage, value.clone(), snapshot)
        }))
    }

    fn commit(&self, value: Doc) -> Outcome {
        let lineage = &self.0.lineage;
        let snapshot = clone_doc(lineage, &value);
        self.settle(
            self.0
                .guard
                .finalize(|| Instance::assemble(lineage, value, snapshot)),
        )
    }

    fn settle(&self, finalized: Result<Instance, Instance>) -> Outcome {
        match finalized {
            Ok(successor) => Outcome::Created(successor),
            Err(successor) => self.reject(successor),
        }
    }

    fn reject(&self, successor: Instance) -> Outcome {
        self.0.lineage.report_already_written(&successor);
        Outcome::AlreadyWritten(successor)
    }
}

impl fmt::Debug for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Instance")
            .field("instance_number", &self.0.instance_number)
            .field("value", &self.0.value)
            .field("methods", &self.0.methods)
            .field("guard", &self.0.guard)
            .finish()
    }
}

impl Serialize for Instance {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Instance", 2)?;
        state.serialize_field("instanceNumber", &self.0.instance_number)?;
        state.serialize_field("value", &self.0.value)?;
        state.end()
    }
}
