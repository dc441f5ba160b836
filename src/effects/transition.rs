//! State handles, callbacks and guarded transitions.

use crate::core::Guard;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Callback run against the machine's context: enter, exit, tick and
/// global enter hooks all share this shape.
pub type Hook<C> = Box<dyn Fn(&mut C) + Send + Sync>;

/// Opaque handle to a registered state.
///
/// Handles are only meaningful to the machine that issued them; passing a
/// handle to any other machine is rejected at registration time.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StateHandle {
    machine: u32,
    index: usize,
}

impl StateHandle {
    pub(crate) fn new(machine: u32, index: usize) -> Self {
        Self { machine, index }
    }

    pub(crate) fn machine(self) -> u32 {
        self.machine
    }

    pub(crate) fn index(self) -> usize {
        self.index
    }
}

impl fmt::Display for StateHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.machine, self.index)
    }
}

/// A guarded edge between two registered states.
pub struct Transition<C> {
    pub(crate) from: StateHandle,
    pub(crate) to: StateHandle,
    pub(crate) guard: Guard<C>,
}

impl<C> Transition<C> {
    pub fn from(&self) -> StateHandle {
        self.from
    }

    pub fn to(&self) -> StateHandle {
        self.to
    }
}

impl<C> fmt::Debug for Transition<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Transition")
            .field("from", &self.from)
            .field("to", &self.to)
            .finish_non_exhaustive()
    }
}
