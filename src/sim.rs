//! Deterministic board for tests and the host simulator.
//!
//! Time only moves when told to, switches hold whatever level they were
//! set to, and one-shot glitch samples can be queued to model contact
//! bounce. Outputs are recorded as a change log.

use crate::config::AlarmConfig;
use crate::io::{Board, LedLines, Level, Line, Rgb};
use serde::{Deserialize, Serialize};
use std::cell::{Cell, RefCell};
use std::collections::{HashMap, VecDeque};

/// One recorded change of a binary output.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputChange {
    pub at_ms: u32,
    pub line: Line,
    pub value: bool,
}

/// Simulated board with a virtual millisecond clock.
#[derive(Debug)]
pub struct SimBoard {
    now: Cell<u32>,
    actuated_level: Level,
    levels: HashMap<Line, Level>,
    glitches: RefCell<HashMap<Line, VecDeque<Level>>>,
    reads: Cell<u64>,
    outputs: HashMap<Line, bool>,
    changes: Vec<OutputChange>,
    led: Rgb,
    led_writes: u64,
}

impl Default for SimBoard {
    fn default() -> Self {
        Self::new(Level::Low)
    }
}

impl SimBoard {
    /// Board whose switches read `actuated_level` when closed. Every line
    /// starts released.
    pub fn new(actuated_level: Level) -> Self {
        Self {
            now: Cell::new(0),
            actuated_level,
            levels: HashMap::new(),
            glitches: RefCell::new(HashMap::new()),
            reads: Cell::new(0),
            outputs: HashMap::new(),
            changes: Vec::new(),
            led: Rgb::OFF,
            led_writes: 0,
        }
    }

    /// Board wired the way `config` expects.
    pub fn for_config(config: &AlarmConfig) -> Self {
        Self::new(config.actuated_level)
    }

    pub fn set_now(&mut self, ms: u32) {
        self.now.set(ms);
    }

    /// Move the clock forward, wrapping like the hardware counter.
    pub fn advance(&mut self, ms: u32) {
        self.now.set(self.now.get().wrapping_add(ms));
    }

    /// Close (`true`) or open (`false`) the switch on `line`.
    pub fn set_actuated(&mut self, line: Line, actuated: bool) {
        let level = if actuated {
            self.actuated_level
        } else {
            self.actuated_level.inverted()
        };
        self.levels.insert(line, level);
    }

    pub fn is_actuated(&self, line: Line) -> bool {
        self.steady_level(line) == self.actuated_level
    }

    /// Queue raw samples returned before the steady level resumes.
    pub fn inject_glitch(&mut self, line: Line, samples: &[Level]) {
        self.glitches
            .borrow_mut()
            .entry(line)
            .or_default()
            .extend(samples.iter().copied());
    }

    /// Last value written to `line`, `false` if never written.
    pub fn output(&self, line: Line) -> bool {
        self.outputs.get(&line).copied().unwrap_or(false)
    }

    /// Recorded changes of every output, oldest first.
    pub fn output_changes(&self) -> &[OutputChange] {
        &self.changes
    }

    pub fn led(&self) -> Rgb {
        self.led
    }

    pub fn led_writes(&self) -> u64 {
        self.led_writes
    }

    /// Raw samples taken so far across all lines.
    pub fn raw_reads(&self) -> u64 {
        self.reads.get()
    }

    fn steady_level(&self, line: Line) -> Level {
        self.levels
            .get(&line)
            .copied()
            .unwrap_or_else(|| self.actuated_level.inverted())
    }
}

impl Board for SimBoard {
    fn raw_read(&self, line: Line) -> Level {
        self.reads.set(self.reads.get() + 1);
        let glitch = self
            .glitches
            .borrow_mut()
            .get_mut(&line)
            .and_then(VecDeque::pop_front);
        glitch.unwrap_or_else(|| self.steady_level(line))
    }

    fn write_output(&mut self, line: Line, value: bool) {
        let previous = self.outputs.insert(line, value);
        if previous != Some(value) {
            self.changes.push(OutputChange {
                at_ms: self.now.get(),
                line,
                value,
            });
        }
    }

    fn write_led(&mut self, _lines: &LedLines, color: Rgb) {
        self.led = color;
        self.led_writes += 1;
    }

    fn now_ms(&self) -> u32 {
        self.now.get()
    }
}

/// Which switch a script event moves.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Input {
    Button,
    Kickstand,
}

impl Input {
    pub fn line(self, config: &AlarmConfig) -> Line {
        match self {
            Input::Button => config.button_line,
            Input::Kickstand => config.kickstand_line,
        }
    }
}

/// A switch change at a point in simulated time.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScriptEvent {
    pub at_ms: u32,
    pub input: Input,
    pub actuated: bool,
}

/// Time-ordered switch changes replayed against a [`SimBoard`].
///
/// Serialized as a plain event array; events are sorted on the way in.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<ScriptEvent>", into = "Vec<ScriptEvent>")]
pub struct Script {
    events: VecDeque<ScriptEvent>,
}

impl Script {
    pub fn new(mut events: Vec<ScriptEvent>) -> Self {
        events.sort_by_key(|event| event.at_ms);
        Self {
            events: events.into(),
        }
    }

    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Apply every event due at or before `now`. Returns how many fired.
    pub fn apply_due(&mut self, board: &mut SimBoard, config: &AlarmConfig, now: u32) -> usize {
        let mut applied = 0;
        while let Some(event) = self.events.front().copied() {
            if event.at_ms > now {
                break;
            }
            self.events.pop_front();
            board.set_actuated(event.input.line(config), event.actuated);
            applied += 1;
        }
        applied
    }

    pub fn remaining(&self) -> usize {
        self.events.len()
    }
}

impl From<Vec<ScriptEvent>> for Script {
    fn from(events: Vec<ScriptEvent>) -> Self {
        Self::new(events)
    }
}

impl From<Script> for Vec<ScriptEvent> {
    fn from(script: Script) -> Self {
        script.events.into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn released_lines_read_inverse_of_actuated() {
        let board = SimBoard::new(Level::Low);
        assert_eq!(board.raw_read(Line(2)), Level::High);
        assert!(!board.is_actuated(Line(2)));
    }

    #[test]
    fn glitches_are_consumed_before_steady_level() {
        let mut board = SimBoard::new(Level::Low);
        board.set_actuated(Line(3), true);
        board.inject_glitch(Line(3), &[Level::High]);

        assert_eq!(board.raw_read(Line(3)), Level::High);
        assert_eq!(board.raw_read(Line(3)), Level::Low);
        assert_eq!(board.raw_reads(), 2);
    }

    #[test]
    fn output_log_records_only_changes() {
        let mut board = SimBoard::default();
        board.write_output(Line(4), true);
        board.advance(10);
        board.write_output(Line(4), true);
        board.write_output(Line(4), false);

        assert_eq!(
            board.output_changes(),
            &[
                OutputChange {
                    at_ms: 0,
                    line: Line(4),
                    value: true
                },
                OutputChange {
                    at_ms: 10,
                    line: Line(4),
                    value: false
                },
            ]
        );
    }

    #[test]
    fn clock_wraps() {
        let mut board = SimBoard::default();
        board.set_now(u32::MAX);
        board.advance(5);
        assert_eq!(board.now_ms(), 4);
    }

    #[test]
    fn script_applies_events_in_time_order() {
        let config = AlarmConfig::default();
        let mut board = SimBoard::for_config(&config);
        let mut script = Script::from_json_str(
            r#"[
                { "at_ms": 500, "input": "kickstand", "actuated": true },
                { "at_ms": 100, "input": "button", "actuated": true }
            ]"#,
        )
        .unwrap();

        assert_eq!(script.apply_due(&mut board, &config, 99), 0);
        assert_eq!(script.apply_due(&mut board, &config, 100), 1);
        assert!(board.is_actuated(config.button_line));
        assert!(!board.is_actuated(config.kickstand_line));

        assert_eq!(script.apply_due(&mut board, &config, 1_000), 1);
        assert!(board.is_actuated(config.kickstand_line));
        assert_eq!(script.remaining(), 0);
    }

    #[test]
    fn deserialized_script_is_time_ordered() {
        let config = AlarmConfig::default();
        let mut board = SimBoard::for_config(&config);
        let mut script: Script = serde_json::from_value(serde_json::json!([
            { "at_ms": 900, "input": "button", "actuated": false },
            { "at_ms": 200, "input": "button", "actuated": true }
        ]))
        .unwrap();

        assert_eq!(script.apply_due(&mut board, &config, 200), 1);
        assert!(board.is_actuated(config.button_line));

        let json = serde_json::to_string(&script).unwrap();
        assert!(json.starts_with('['));
        assert_eq!(script.apply_due(&mut board, &config, 900), 1);
        assert!(!board.is_actuated(config.button_line));
    }
}
