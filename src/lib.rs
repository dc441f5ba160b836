//! Kickguard: control logic for a battery-powered bicycle kickstand alarm.
//!
//! The crate is a small cooperative state machine engine plus a debounced
//! sensor layer, with the alarm's seven-state graph built on top:
//!
//! - **core**: state tags, guard predicates, the transition journal
//! - **effects**: the engine; one guarded evaluation step per `tick()`
//! - **io**: the hardware boundary, debounced reads, the persisted flag
//! - **alarm**: the concrete graph and its actuation side effects
//! - **driver**: the main loop
//! - **sim**: a deterministic board for tests and the host simulator
//!
//! # Example
//!
//! ```rust
//! use kickguard::alarm::{AlarmController, AlarmState};
//! use kickguard::config::AlarmConfig;
//! use kickguard::io::MemoryNv;
//! use kickguard::sim::SimBoard;
//!
//! let config = AlarmConfig::default();
//! let button = config.button_line;
//! let board = SimBoard::for_config(&config);
//! let mut alarm = AlarmController::new(config, board, MemoryNv::new()).unwrap();
//!
//! alarm.startup().unwrap();
//! alarm.tick();
//! assert_eq!(alarm.state(), Some(AlarmState::WaitForButtonPress));
//!
//! alarm.board_mut().set_actuated(button, true);
//! alarm.tick();
//! assert_eq!(alarm.state(), Some(AlarmState::WaitForKickstandDown));
//! ```

pub mod alarm;
pub mod builder;
pub mod checkpoint;
pub mod config;
pub mod core;
pub mod driver;
pub mod effects;
pub mod io;
pub mod sim;

// Re-export commonly used types
pub use alarm::{AlarmContext, AlarmController, AlarmState};
pub use builder::{BuildError, StateDef};
pub use config::AlarmConfig;
pub use crate::core::{Guard, State, StateHistory, StateTransition};
pub use effects::{StateHandle, StateMachine, TickOutcome};
