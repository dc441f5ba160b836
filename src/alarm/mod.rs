//! Bicycle kickstand alarm built on the generic engine.
//!
//! Arming: press and hold the button, lower the kickstand, release the
//! button. Lifting the kickstand while armed sounds the alarm. Disarming:
//! hold the button with the kickstand down, then raise the kickstand.
//! After two minutes of sounding, a lowered kickstand alone re-arms.
//!
//! The "alarm was sounding" flag is persisted, so a power cycle in the
//! middle of an alarm boots straight back into ALARM_TRIGGERED.

mod context;
mod controller;
mod states;

pub use context::{AlarmContext, AlarmEnv};
pub use controller::AlarmController;
pub use states::AlarmState;
