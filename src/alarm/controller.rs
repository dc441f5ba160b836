//! The alarm's state graph, wired onto the generic engine.

use super::context::{AlarmContext, AlarmEnv};
use super::states::AlarmState;
use crate::builder::{BuildError, StateDef};
use crate::checkpoint::Checkpoint;
use crate::config::AlarmConfig;
use crate::core::StateHistory;
use crate::effects::{StateHandle, StateMachine, TickOutcome};
use crate::io::{Board, FlagStore, Indicator, NvStorage};
use tracing::info;

type AlarmMachine<B, N> = StateMachine<AlarmState, AlarmEnv<B, N>>;

/// Kickstand alarm: the seven-state graph plus the board and storage it
/// drives.
///
/// Call [`startup`](Self::startup) once, then [`tick`](Self::tick) as often
/// as the main loop allows.
pub struct AlarmController<B: Board + 'static, N: NvStorage + 'static> {
    machine: AlarmMachine<B, N>,
    env: AlarmEnv<B, N>,
    start: StateHandle,
}

impl<B: Board + 'static, N: NvStorage + 'static> AlarmController<B, N> {
    /// Validate `config` and wire the alarm graph.
    pub fn new(config: AlarmConfig, board: B, nv: N) -> Result<Self, BuildError> {
        config.validate().map_err(BuildError::InvalidConfig)?;

        let mut machine = StateMachine::with_history_capacity(config.history_capacity);
        let start = wire(&mut machine)?;

        Ok(Self {
            machine,
            env: AlarmEnv::new(config, board, nv),
            start,
        })
    }

    /// Enter START, which recovers the persisted alarm flag. The first
    /// `tick()` afterwards resolves to ALARM_TRIGGERED or
    /// WAIT_FOR_BUTTON_PRESS.
    pub fn startup(&mut self) -> Result<(), BuildError> {
        self.machine.startup(self.start, &mut self.env)
    }

    /// Run one scheduler step.
    pub fn tick(&mut self) -> TickOutcome<AlarmState> {
        self.machine.tick(&mut self.env)
    }

    /// Current state, `None` before startup.
    pub fn state(&self) -> Option<AlarmState> {
        self.machine.current_state().copied()
    }

    pub fn context(&self) -> &AlarmContext {
        &self.env.context
    }

    pub fn env(&self) -> &AlarmEnv<B, N> {
        &self.env
    }

    pub fn config(&self) -> &AlarmConfig {
        &self.env.config
    }

    pub fn board(&self) -> &B {
        &self.env.board
    }

    /// Mutable board access, for simulators that move the clock or the
    /// switches between ticks.
    pub fn board_mut(&mut self) -> &mut B {
        &mut self.env.board
    }

    pub fn flag_store(&self) -> &FlagStore<N> {
        &self.env.flag
    }

    pub fn machine(&self) -> &AlarmMachine<B, N> {
        &self.machine
    }

    pub fn history(&self) -> &StateHistory<AlarmState> {
        self.machine.history()
    }

    pub fn checkpoint(&self) -> Checkpoint<AlarmState, AlarmContext> {
        Checkpoint::capture(&self.machine, self.env.context)
    }

    /// Tear down, handing back the board and storage. Used to model a
    /// power cycle: build a fresh controller from the returned storage.
    pub fn into_parts(self) -> (B, N) {
        (self.env.board, self.env.flag.into_inner())
    }
}

/// Register states and transitions. Transitions sharing a source are listed
/// in priority order: the earlier one wins when both guards hold.
fn wire<B, N>(machine: &mut AlarmMachine<B, N>) -> Result<StateHandle, BuildError>
where
    B: Board + 'static,
    N: NvStorage + 'static,
{
    use AlarmState::*;

    let start = machine.add_state(
        StateDef::new(Start).on_enter(|env: &mut AlarmEnv<B, N>| env.recover_triggered()),
    )?;
    let wait_press = machine.add_state(
        StateDef::new(WaitForButtonPress)
            .on_enter(|env: &mut AlarmEnv<B, N>| env.set_indicator(Indicator::Off)),
    )?;
    let wait_down = machine.add_state(
        StateDef::new(WaitForKickstandDown)
            .on_enter(|env: &mut AlarmEnv<B, N>| env.set_indicator(Indicator::Green)),
    )?;
    let wait_release = machine.add_state(
        StateDef::new(WaitForButtonRelease)
            .on_enter(|env: &mut AlarmEnv<B, N>| env.set_indicator(Indicator::Red)),
    )?;
    let armed = machine.add_state(StateDef::new(AlarmArmed).on_enter(
        |env: &mut AlarmEnv<B, N>| {
            env.set_indicator(Indicator::Off);
            env.set_relay(false);
        },
    ))?;
    let triggered = machine.add_state(
        StateDef::new(AlarmTriggered)
            .on_enter(|env: &mut AlarmEnv<B, N>| {
                env.set_relay(true);
                env.set_triggered(true);
                // LED off while sounding to save the battery.
                env.set_indicator(Indicator::Off);
            })
            .on_tick(|env: &mut AlarmEnv<B, N>| {
                let on = env.beep_phase_on();
                env.set_relay(on);
            }),
    )?;
    let wait_up = machine.add_state(
        StateDef::new(WaitForKickstandUp)
            .on_enter(|env: &mut AlarmEnv<B, N>| {
                let indicator = env.config.kickstand_up_indicator;
                env.set_indicator(indicator);
            })
            .on_exit(|env: &mut AlarmEnv<B, N>| {
                env.set_relay(false);
                env.set_triggered(false);
            }),
    )?;

    machine.add_global_enter(|env: &mut AlarmEnv<B, N>| {
        env.stamp_entry();
        info!(
            at_ms = env.context.state_change_time,
            alarm_triggered = env.context.alarm_triggered,
            "entered new state"
        );
    });

    // Boot: resume sounding if power was lost mid-alarm.
    machine.add_transition(start, triggered, |env: &AlarmEnv<B, N>| {
        env.context.alarm_triggered
    })?;
    machine.add_transition(start, wait_press, |env: &AlarmEnv<B, N>| {
        !env.context.alarm_triggered
    })?;

    // Kickstand state is not checked here, so a parked bike goes straight
    // through to WAIT_FOR_BUTTON_RELEASE on the next tick.
    machine.add_transition(wait_press, wait_down, |env: &AlarmEnv<B, N>| env.button())?;

    machine.add_transition(wait_down, wait_press, |env: &AlarmEnv<B, N>| !env.button())?;
    machine.add_transition(wait_down, wait_release, |env: &AlarmEnv<B, N>| env.kickstand())?;

    // Kickstand up again: the rider is repositioning the bike.
    machine.add_transition(wait_release, wait_down, |env: &AlarmEnv<B, N>| !env.kickstand())?;
    machine.add_transition(wait_release, armed, |env: &AlarmEnv<B, N>| !env.button())?;

    machine.add_transition(armed, triggered, |env: &AlarmEnv<B, N>| !env.kickstand())?;
    machine.add_transition(armed, wait_release, |env: &AlarmEnv<B, N>| env.button())?;

    // Silencing needs both controls engaged, so a thief who triggered it
    // has to put the kickstand back down first.
    machine.add_transition(triggered, wait_up, |env: &AlarmEnv<B, N>| {
        env.button() && env.kickstand()
    })?;
    machine.add_transition(triggered, armed, |env: &AlarmEnv<B, N>| {
        env.kickstand() && env.reset_timeout_elapsed()
    })?;

    machine.add_transition(wait_up, wait_down, |env: &AlarmEnv<B, N>| !env.kickstand())?;
    machine.add_transition(wait_up, triggered, |env: &AlarmEnv<B, N>| !env.button())?;

    Ok(start)
}
