//! The seven states of the kickstand alarm.

use crate::state_enum;

state_enum! {
    /// Where the alarm is in its arm/trigger/disarm cycle.
    pub enum AlarmState {
        /// Boot: recover whether the alarm was sounding at power loss.
        Start = "START",
        /// Idle, LED off. The machine spends most of its life here.
        WaitForButtonPress = "WAIT_FOR_BUTTON_PRESS",
        /// Button held, waiting for the kickstand to go down. LED green.
        WaitForKickstandDown = "WAIT_FOR_KICKSTAND_DOWN",
        /// Kickstand down, waiting for the button to be let go. LED red.
        WaitForButtonRelease = "WAIT_FOR_BUTTON_RELEASE",
        /// Armed; lifting the kickstand triggers the alarm.
        AlarmArmed = "ALARM_ARMED",
        /// Sounding: relay beeps until disarmed or auto-reset.
        AlarmTriggered = "ALARM_TRIGGERED",
        /// Owner is disarming; kickstand must come up with the button held.
        WaitForKickstandUp = "WAIT_FOR_KICKSTAND_UP",
    }
}

impl AlarmState {
    /// States in which the relay is driven by the beep pattern.
    pub fn is_sounding(self) -> bool {
        matches!(self, AlarmState::AlarmTriggered)
    }
}
