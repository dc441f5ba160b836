//! Debounced reads of switch inputs.
//!
//! The switches are normally open and pulled to a defined level, so the
//! released reading is inherently stable. Only "actuated" needs
//! confirmation: it is reported when every one of the samples agrees.

use super::{Board, Level, Line};

/// Number of samples taken per stable read.
pub const DEFAULT_SAMPLE_COUNT: u32 = 20;

/// Samples a line back to back and requires unanimous actuation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DebouncedReader {
    sample_count: u32,
    actuated_level: Level,
}

impl Default for DebouncedReader {
    fn default() -> Self {
        Self::new(DEFAULT_SAMPLE_COUNT, Level::Low)
    }
}

impl DebouncedReader {
    /// `actuated_level` is the raw level a closed switch produces: `Low`
    /// for a switch to ground against a pull-up.
    pub fn new(sample_count: u32, actuated_level: Level) -> Self {
        Self {
            sample_count,
            actuated_level,
        }
    }

    pub fn sample_count(&self) -> u32 {
        self.sample_count
    }

    pub fn actuated_level(&self) -> Level {
        self.actuated_level
    }

    /// `true` only if all samples read the actuated level.
    ///
    /// Always takes exactly `sample_count` samples, even once the answer is
    /// known, so every call costs the same and blocks for the same time.
    /// A reader configured with zero samples never reports actuation.
    pub fn read_stable<B: Board + ?Sized>(&self, board: &B, line: Line) -> bool {
        let actuated = (0..self.sample_count)
            .map(|_| board.raw_read(line))
            .filter(|level| *level == self.actuated_level)
            .count();

        self.sample_count > 0 && actuated == self.sample_count as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::{LedLines, Rgb};
    use std::cell::{Cell, RefCell};
    use std::collections::VecDeque;

    struct ScriptedLine {
        samples: RefCell<VecDeque<Level>>,
        steady: Level,
        reads: Cell<u32>,
    }

    impl ScriptedLine {
        fn new(script: &[Level], steady: Level) -> Self {
            Self {
                samples: RefCell::new(script.iter().copied().collect()),
                steady,
                reads: Cell::new(0),
            }
        }
    }

    impl Board for ScriptedLine {
        fn raw_read(&self, _line: Line) -> Level {
            self.reads.set(self.reads.get() + 1);
            self.samples.borrow_mut().pop_front().unwrap_or(self.steady)
        }

        fn write_output(&mut self, _line: Line, _value: bool) {}

        fn write_led(&mut self, _lines: &LedLines, _color: Rgb) {}

        fn now_ms(&self) -> u32 {
            0
        }
    }

    #[test]
    fn unanimous_low_reads_actuated() {
        let board = ScriptedLine::new(&[], Level::Low);
        assert!(DebouncedReader::default().read_stable(&board, Line(2)));
    }

    #[test]
    fn released_line_reads_not_actuated() {
        let board = ScriptedLine::new(&[], Level::High);
        assert!(!DebouncedReader::default().read_stable(&board, Line(2)));
    }

    #[test]
    fn single_bounce_rejects_actuation() {
        let mut script = vec![Level::Low; 19];
        script.insert(11, Level::High);
        let board = ScriptedLine::new(&script, Level::Low);

        assert!(!DebouncedReader::default().read_stable(&board, Line(2)));
    }

    #[test]
    fn takes_exactly_sample_count_samples() {
        let board = ScriptedLine::new(&[Level::High], Level::Low);
        let reader = DebouncedReader::new(20, Level::Low);

        reader.read_stable(&board, Line(3));
        assert_eq!(board.reads.get(), 20);

        reader.read_stable(&board, Line(3));
        assert_eq!(board.reads.get(), 40);
    }

    #[test]
    fn active_high_wiring_is_supported() {
        let board = ScriptedLine::new(&[], Level::High);
        assert!(DebouncedReader::new(5, Level::High).read_stable(&board, Line(3)));
    }

    #[test]
    fn zero_samples_never_actuated() {
        let board = ScriptedLine::new(&[], Level::Low);
        assert!(!DebouncedReader::new(0, Level::Low).read_stable(&board, Line(3)));
        assert_eq!(board.reads.get(), 0);
    }
}
