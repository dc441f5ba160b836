//! The imperative shell around the pure core.
//!
//! This module runs state callbacks: it owns the state table and the
//! guarded transitions, and drives one evaluation step per `tick()`.
//!
//! # Key Concepts
//!
//! - **Handles**: `add_state` returns an opaque `StateHandle` used to wire
//!   transitions
//! - **Callbacks**: enter, exit and tick hooks receive the caller's context
//!   by `&mut`; global enter hooks run after every state's own enter hook
//! - **Guards**: evaluated in registration order, first match fires

mod machine;
mod transition;

pub use machine::{StateMachine, TickOutcome};
pub use transition::{Hook, StateHandle, Transition};
