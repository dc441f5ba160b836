//! Core State trait for state machine state tags.
//!
//! A state tag is the typed name of a registered state. The engine keys
//! its table by opaque handles; tags exist so that callers, logs and
//! checkpoints can talk about states by what they mean.

use serde::{Deserialize, Serialize};
use std::fmt::Debug;

/// Trait for state machine state tags.
///
/// All methods are pure. Tags are small immutable values, usually a
/// fieldless enum generated with [`state_enum!`](crate::state_enum).
///
/// # Required Traits
///
/// - `Clone`: tags are copied into the transition journal
/// - `PartialEq`: tags are compared when resolving the current state
/// - `Debug`: tags appear in diagnostics
/// - `Serialize` + `Deserialize`: tags are written into checkpoints
///
/// # Example
///
/// ```rust
/// use kickguard::core::State;
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
/// enum DoorState {
///     Open,
///     Closed,
/// }
///
/// impl State for DoorState {
///     fn name(&self) -> &str {
///         match self {
///             Self::Open => "OPEN",
///             Self::Closed => "CLOSED",
///         }
///     }
/// }
///
/// assert_eq!(DoorState::Closed.name(), "CLOSED");
/// ```
pub trait State:
    Clone + PartialEq + Debug + Serialize + for<'de> Deserialize<'de> + Send + Sync
{
    /// Get the state's name for display/logging.
    fn name(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
    enum TestState {
        Idle,
        Armed,
        Sounding,
    }

    impl State for TestState {
        fn name(&self) -> &str {
            match self {
                Self::Idle => "IDLE",
                Self::Armed => "ARMED",
                Self::Sounding => "SOUNDING",
            }
        }
    }

    #[test]
    fn state_name_returns_correct_value() {
        assert_eq!(TestState::Idle.name(), "IDLE");
        assert_eq!(TestState::Armed.name(), "ARMED");
        assert_eq!(TestState::Sounding.name(), "SOUNDING");
    }

    #[test]
    fn state_serializes_correctly() {
        let state = TestState::Armed;
        let json = serde_json::to_string(&state).unwrap();
        let deserialized: TestState = serde_json::from_str(&json).unwrap();
        assert_eq!(state, deserialized);
    }

    #[test]
    fn state_is_comparable() {
        assert_eq!(TestState::Sounding, TestState::Sounding.clone());
        assert_ne!(TestState::Idle, TestState::Armed);
    }
}
