//! Main loop: start the controller once, then tick it forever.

use crate::alarm::AlarmController;
use crate::builder::BuildError;
use crate::io::{Board, NvStorage};
use std::convert::Infallible;
use std::ops::ControlFlow;
use tracing::info;

/// Summary of a bounded run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RunStats {
    pub ticks: u64,
    pub transitions: u64,
}

/// Repeatedly invokes the controller's tick with no fixed period: each
/// iteration starts as soon as the previous one completes.
pub struct MainLoop<B: Board + 'static, N: NvStorage + 'static> {
    controller: AlarmController<B, N>,
}

impl<B: Board + 'static, N: NvStorage + 'static> MainLoop<B, N> {
    pub fn new(controller: AlarmController<B, N>) -> Self {
        Self { controller }
    }

    /// Start the controller if it has not been started yet.
    pub fn ensure_started(&mut self) -> Result<(), BuildError> {
        if self.controller.state().is_none() {
            self.controller.startup()?;
            info!(
                at_ms = self.controller.board().now_ms(),
                "alarm controller started"
            );
        }
        Ok(())
    }

    /// Tick forever. Only returns if startup fails.
    pub fn run(mut self) -> Result<Infallible, BuildError> {
        self.ensure_started()?;
        loop {
            self.controller.tick();
        }
    }

    /// Tick exactly `ticks` times.
    pub fn run_ticks(&mut self, ticks: u64) -> Result<RunStats, BuildError> {
        self.run_with(|_| ControlFlow::Continue(()), ticks)
    }

    /// Tick until `done` holds after a tick, giving up after `max_ticks`.
    /// Returns whether `done` was reached.
    pub fn run_until<P>(&mut self, mut done: P, max_ticks: u64) -> Result<bool, BuildError>
    where
        P: FnMut(&AlarmController<B, N>) -> bool,
    {
        let mut reached = false;
        self.run_with(
            |controller| {
                if done(controller) {
                    reached = true;
                    ControlFlow::Break(())
                } else {
                    ControlFlow::Continue(())
                }
            },
            max_ticks,
        )?;
        Ok(reached)
    }

    /// Tick up to `max_ticks` times, calling `between` after each tick.
    /// Simulators use `between` to move the clock and the switches.
    pub fn run_with<F>(&mut self, mut between: F, max_ticks: u64) -> Result<RunStats, BuildError>
    where
        F: FnMut(&mut AlarmController<B, N>) -> ControlFlow<()>,
    {
        self.ensure_started()?;
        let mut stats = RunStats::default();
        while stats.ticks < max_ticks {
            if self.controller.tick().transitioned() {
                stats.transitions += 1;
            }
            stats.ticks += 1;
            if between(&mut self.controller).is_break() {
                break;
            }
        }
        Ok(stats)
    }

    pub fn controller(&self) -> &AlarmController<B, N> {
        &self.controller
    }

    pub fn controller_mut(&mut self) -> &mut AlarmController<B, N> {
        &mut self.controller
    }

    pub fn into_controller(self) -> AlarmController<B, N> {
        self.controller
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alarm::AlarmState;
    use crate::config::AlarmConfig;
    use crate::io::MemoryNv;
    use crate::sim::SimBoard;

    fn main_loop() -> MainLoop<SimBoard, MemoryNv> {
        let config = AlarmConfig::default();
        let board = SimBoard::for_config(&config);
        MainLoop::new(AlarmController::new(config, board, MemoryNv::new()).unwrap())
    }

    #[test]
    fn run_ticks_starts_and_counts() {
        let mut main_loop = main_loop();

        let stats = main_loop.run_ticks(3).unwrap();

        assert_eq!(
            stats,
            RunStats {
                ticks: 3,
                transitions: 1
            }
        );
        assert_eq!(
            main_loop.controller().state(),
            Some(AlarmState::WaitForButtonPress)
        );
    }

    #[test]
    fn ensure_started_is_idempotent() {
        let mut main_loop = main_loop();
        main_loop.ensure_started().unwrap();
        main_loop.ensure_started().unwrap();

        assert_eq!(main_loop.controller().state(), Some(AlarmState::Start));
    }

    #[test]
    fn run_until_stops_on_predicate() {
        let mut main_loop = main_loop();
        let button = main_loop.controller().config().button_line;
        main_loop
            .controller_mut()
            .board_mut()
            .set_actuated(button, true);

        let reached = main_loop
            .run_until(
                |c| c.state() == Some(AlarmState::WaitForKickstandDown),
                10,
            )
            .unwrap();

        assert!(reached);
        assert_eq!(main_loop.controller().machine().tick_count(), 2);
    }

    #[test]
    fn run_until_gives_up_after_max_ticks() {
        let mut main_loop = main_loop();

        let reached = main_loop
            .run_until(|c| c.state() == Some(AlarmState::AlarmArmed), 5)
            .unwrap();

        assert!(!reached);
        assert_eq!(main_loop.controller().machine().tick_count(), 5);
    }

    #[test]
    fn run_with_advances_simulated_time() {
        let mut main_loop = main_loop();

        main_loop
            .run_with(
                |c| {
                    c.board_mut().advance(10);
                    ControlFlow::Continue(())
                },
                100,
            )
            .unwrap();

        assert_eq!(main_loop.controller().board().now_ms(), 1_000);
    }
}
