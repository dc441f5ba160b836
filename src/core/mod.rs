//! Core state machine types.
//!
//! This module contains the pure pieces of the engine:
//! - State tags via the `State` trait
//! - Guard predicates for transition control
//! - The bounded transition journal
//!
//! Nothing here performs I/O; side effects live in [`crate::effects`].

mod guard;
mod history;
mod state;

pub use guard::Guard;
pub use history::{StateHistory, StateTransition, DEFAULT_HISTORY_CAPACITY};
pub use state::State;
