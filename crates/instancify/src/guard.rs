//! Per-instance write guard with set-once semantics.
//!
//! A guard starts `Unwritten` and moves to `Written` exactly once, storing
//! the successor instance on the same transition. The check and the store
//! happen under one lock acquisition, so concurrent writers cannot both
//! produce a successor.

use crate::instance::Instance;
use std::fmt;
use std::sync::{Mutex, MutexGuard, PoisonError};

enum GuardState {
    Unwritten,
    Written(Instance),
}

/// Enforces "at most one successor" for a single instance.
pub(crate) struct WriteGuard {
    state: Mutex<GuardState>,
}

impl WriteGuard {
    pub(crate) fn new() -> Self {
        Self {
            state: Mutex::new(GuardState::Unwritten),
        }
    }

    fn lock(&self) -> MutexGuard<'_, GuardState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// The stored successor, once written.
    pub(crate) fn successor(&self) -> Option<Instance> {
        match &*self.lock() {
            GuardState::Unwritten => None,
            GuardState::Written(successor) => Some(successor.clone()),
        }
    }

    pub(crate) fn is_written(&self) -> bool {
        matches!(*self.lock(), GuardState::Written(_))
    }

    /// Detach the stored successor, leaving the guard `Unwritten`.
    pub(crate) fn take_successor(&mut self) -> Option<Instance> {
        let state = self.state.get_mut().unwrap_or_else(PoisonError::into_inner);
        match std::mem::replace(state, GuardState::Unwritten) {
            GuardState::Written(successor) => Some(successor),
            GuardState::Unwritten => None,
        }
    }

    /// Build and store the successor if the guard is still unwritten.
    ///
    /// Returns `Err` with the existing successor when another write got there
    /// first; `build` is not run in that case. `build` runs with the guard
    /// locked and must not write to the same instance.
    pub(crate) fn finalize(&self, build: impl FnOnce() -> Instance) -> Result<Instance, Instance> {
        let mut state = self.lock();
        if let GuardState::Written(existing) = &*state {
            return Err(existing.clone());
        }
        let successor = build();
        *state = GuardState::Written(successor.clone());
        Ok(successor)
    }
}

// A lineage is a singly linked list through the guards. Unlink it one node
// at a time so a long chain does not recurse once per instance on drop.
impl Drop for WriteGuard {
    fn drop(&mut self) {
        let mut next = self.take_successor();
        while let Some(instance) = next {
            next = instance.unlink();
        }
    }
}

impl fmt::Debug for WriteGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &*self.lock() {
            GuardState::Unwritten => f.write_str("Unwritten"),
            GuardState::Written(successor) => {
                write!(f, "Written(#{})", successor.instance_number())
            }
        }
    }
}
