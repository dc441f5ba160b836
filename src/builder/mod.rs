//! Registration API for state machines.
//!
//! This module provides the pieces used while wiring a machine together:
//! state descriptions, the `state_enum!` macro for state tags, and the
//! errors that abort setup when the wiring is wrong.

pub mod error;
pub mod macros;
pub mod state;

pub use error::BuildError;
pub use state::StateDef;
