//! Application data shared by every guard and callback.

use crate::config::AlarmConfig;
use crate::io::{elapsed_ms, Board, DebouncedReader, FlagStore, Indicator, NvStorage};
use serde::{Deserialize, Serialize};

/// The alarm's only mutable application data.
///
/// Written by enter/exit callbacks, read by guards.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlarmContext {
    pub alarm_triggered: bool,
    /// Clock reading at the most recent state entry.
    pub state_change_time: u32,
}

/// Everything a guard or callback can reach: the context plus the board,
/// the persisted flag and the configuration.
///
/// The controller lends this to the engine on every tick. Guards receive it
/// by shared reference and can therefore only observe.
pub struct AlarmEnv<B: Board, N: NvStorage> {
    pub(crate) context: AlarmContext,
    pub(crate) board: B,
    pub(crate) flag: FlagStore<N>,
    pub(crate) reader: DebouncedReader,
    pub(crate) config: AlarmConfig,
}

impl<B: Board, N: NvStorage> AlarmEnv<B, N> {
    pub(crate) fn new(config: AlarmConfig, board: B, nv: N) -> Self {
        let context = AlarmContext {
            alarm_triggered: false,
            state_change_time: board.now_ms(),
        };
        Self {
            context,
            flag: FlagStore::new(nv, config.persisted_flag_address),
            reader: config.reader(),
            board,
            config,
        }
    }

    /// Debounced: button held down.
    pub fn button(&self) -> bool {
        self.reader.read_stable(&self.board, self.config.button_line)
    }

    /// Debounced: kickstand deployed.
    pub fn kickstand(&self) -> bool {
        self.reader.read_stable(&self.board, self.config.kickstand_line)
    }

    /// Milliseconds since the current state was entered.
    pub fn elapsed_in_state(&self) -> u32 {
        elapsed_ms(self.board.now_ms(), self.context.state_change_time)
    }

    /// Whether the auto-reset timeout has run out in the current state.
    pub fn reset_timeout_elapsed(&self) -> bool {
        self.elapsed_in_state() >= self.config.auto_reset_timeout_ms
    }

    /// Relay level for the beep pattern: on for the first half period after
    /// entry, off for the next, and so on.
    pub fn beep_phase_on(&self) -> bool {
        (self.elapsed_in_state() / self.config.beep_half_period_ms) % 2 == 0
    }

    pub(crate) fn set_indicator(&mut self, indicator: Indicator) {
        self.board.write_led(&self.config.led_lines, indicator.rgb());
    }

    pub(crate) fn set_relay(&mut self, on: bool) {
        self.board.write_output(self.config.relay_line, on);
    }

    /// Record the alarm flag both in the context and durably.
    pub(crate) fn set_triggered(&mut self, triggered: bool) {
        self.flag.store(triggered);
        self.context.alarm_triggered = triggered;
    }

    pub(crate) fn recover_triggered(&mut self) {
        self.context.alarm_triggered = self.flag.load();
    }

    pub(crate) fn stamp_entry(&mut self) {
        self.context.state_change_time = self.board.now_ms();
    }

    pub fn context(&self) -> &AlarmContext {
        &self.context
    }

    pub fn config(&self) -> &AlarmConfig {
        &self.config
    }

    pub fn board(&self) -> &B {
        &self.board
    }
}
