//! Setup errors for state machines and the controllers built on them.

use crate::config::ConfigError;
use crate::effects::StateHandle;
use thiserror::Error;

/// Errors raised while wiring a state machine together.
///
/// All of these are programming or configuration mistakes. They surface
/// during setup and abort it; nothing here can happen once the machine runs.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("State handle {handle} was never registered (machine has {registered} states)")]
    UnknownState {
        handle: StateHandle,
        registered: usize,
    },

    #[error("State '{name}' is already registered")]
    DuplicateState { name: String },

    #[error("No states registered. Call add_state() before startup()")]
    NoStates,

    #[error("Machine already started in state '{current}'")]
    AlreadyStarted { current: String },

    #[error("Configuration rejected: {}", summarize(.0))]
    InvalidConfig(Vec<ConfigError>),
}

fn summarize(errors: &[ConfigError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
