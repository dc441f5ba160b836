//! State transition history tracking.
//!
//! The engine runs forever, so the journal is bounded: once full, the
//! oldest record is evicted for every new one.

use super::state::State;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Default number of transitions retained by a [`StateHistory`].
pub const DEFAULT_HISTORY_CAPACITY: usize = 32;

/// Record of a single fired transition.
///
/// # Example
///
/// ```rust
/// use kickguard::core::{State, StateTransition};
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
/// enum Lamp {
///     Off,
///     On,
/// }
///
/// impl State for Lamp {
///     fn name(&self) -> &str {
///         match self {
///             Self::Off => "OFF",
///             Self::On => "ON",
///         }
///     }
/// }
///
/// let transition = StateTransition {
///     from: Lamp::Off,
///     to: Lamp::On,
///     tick: 7,
/// };
/// assert_eq!(transition.tick, 7);
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct StateTransition<S: State> {
    /// The state being transitioned from
    pub from: S,
    /// The state being transitioned to
    pub to: S,
    /// Engine tick on which the transition fired
    pub tick: u64,
}

/// Bounded, ordered journal of fired transitions.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct StateHistory<S: State> {
    capacity: usize,
    transitions: VecDeque<StateTransition<S>>,
    evicted: u64,
}

impl<S: State> Default for StateHistory<S> {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_HISTORY_CAPACITY)
    }
}

impl<S: State> StateHistory<S> {
    /// Create a new empty history with the default capacity.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new empty history retaining at most `capacity` records.
    ///
    /// A capacity of zero keeps nothing but still counts evictions.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity,
            transitions: VecDeque::with_capacity(capacity),
            evicted: 0,
        }
    }

    /// Record a transition, evicting the oldest one if the journal is full.
    pub fn record(&mut self, transition: StateTransition<S>) {
        if self.capacity == 0 {
            self.evicted += 1;
            return;
        }
        if self.transitions.len() == self.capacity {
            self.transitions.pop_front();
            self.evicted += 1;
        }
        self.transitions.push_back(transition);
    }

    /// Get the path of states traversed by the retained records.
    ///
    /// Returns the `from` state of the oldest retained record, then the
    /// `to` state of each record in order.
    ///
    /// # Example
    ///
    /// ```rust
    /// use kickguard::core::{State, StateHistory, StateTransition};
    /// use serde::{Deserialize, Serialize};
    ///
    /// #[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
    /// enum Phase { One, Two, Three }
    ///
    /// impl State for Phase {
    ///     fn name(&self) -> &str {
    ///         match self {
    ///             Self::One => "One",
    ///             Self::Two => "Two",
    ///             Self::Three => "Three",
    ///         }
    ///     }
    /// }
    ///
    /// let mut history = StateHistory::new();
    /// history.record(StateTransition { from: Phase::One, to: Phase::Two, tick: 1 });
    /// history.record(StateTransition { from: Phase::Two, to: Phase::Three, tick: 4 });
    ///
    /// let path = history.get_path();
    /// assert_eq!(path, vec![&Phase::One, &Phase::Two, &Phase::Three]);
    /// ```
    pub fn get_path(&self) -> Vec<&S> {
        let mut path = Vec::with_capacity(self.transitions.len() + 1);
        if let Some(first) = self.transitions.front() {
            path.push(&first.from);
        }
        for transition in &self.transitions {
            path.push(&transition.to);
        }
        path
    }

    /// Most recent transition, if any.
    pub fn last(&self) -> Option<&StateTransition<S>> {
        self.transitions.back()
    }

    /// Retained transitions, oldest first.
    pub fn transitions(&self) -> impl Iterator<Item = &StateTransition<S>> {
        self.transitions.iter()
    }

    /// Number of retained transitions.
    pub fn len(&self) -> usize {
        self.transitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transitions.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of records dropped to stay within capacity.
    pub fn evicted(&self) -> u64 {
        self.evicted
    }
}
