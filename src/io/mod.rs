//! Hardware boundary.
//!
//! The alarm logic never touches pins, PWM or EEPROM directly. It talks to
//! a [`Board`] for sensor lines, outputs and the millisecond clock, and to
//! an [`NvStorage`] for the persisted byte. Everything above this module is
//! plain logic that runs the same against real hardware or a simulator.

mod debounce;
mod storage;

pub use debounce::{DebouncedReader, DEFAULT_SAMPLE_COUNT};
pub use storage::{FileNv, FlagStore, MemoryNv, NvStorage, StorageError};

use serde::{Deserialize, Serialize};
use std::fmt;

/// Electrical level of a digital line.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Low,
    High,
}

impl Level {
    pub fn is_high(self) -> bool {
        matches!(self, Level::High)
    }

    pub fn inverted(self) -> Level {
        match self {
            Level::Low => Level::High,
            Level::High => Level::Low,
        }
    }
}

/// Identifier of a physical line (pin number).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Line(pub u8);

impl fmt::Display for Line {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}", self.0)
    }
}

/// Lines driving the three channels of the status LED.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedLines {
    pub red: Line,
    pub green: Line,
    pub blue: Line,
}

/// 8-bit channel intensities for the status LED.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const OFF: Rgb = Rgb::new(0, 0, 0);
    pub const RED: Rgb = Rgb::new(255, 0, 0);
    pub const GREEN: Rgb = Rgb::new(0, 255, 0);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

/// Symbolic indicator colors used by the alarm states.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Indicator {
    Off,
    Red,
    Green,
}

impl Indicator {
    pub fn rgb(self) -> Rgb {
        match self {
            Indicator::Off => Rgb::OFF,
            Indicator::Red => Rgb::RED,
            Indicator::Green => Rgb::GREEN,
        }
    }
}

/// Digital I/O and the monotonic clock.
///
/// Reads take `&self` so guards can sample sensors through a shared
/// reference; implementations that need to mutate on read (simulators)
/// use interior mutability.
pub trait Board {
    /// Current electrical level of an input line.
    fn raw_read(&self, line: Line) -> Level;

    /// Drive a binary output line.
    fn write_output(&mut self, line: Line, value: bool);

    /// Set the status LED channel intensities.
    fn write_led(&mut self, lines: &LedLines, color: Rgb);

    /// Monotonic milliseconds since boot. Wraps at `u32::MAX`.
    fn now_ms(&self) -> u32;
}

/// Milliseconds from `since` to `now` on a wrapping counter.
///
/// Correct across a single wrap of the counter. An interval longer than a
/// full wrap period (about 49.7 days) aliases to a shorter one.
pub fn elapsed_ms(now: u32, since: u32) -> u32 {
    now.wrapping_sub(since)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn elapsed_survives_counter_wrap() {
        assert_eq!(elapsed_ms(1_500, 500), 1_000);
        assert_eq!(elapsed_ms(99, u32::MAX - 900), 1_000);
        assert_eq!(elapsed_ms(42, 42), 0);
    }

    #[test]
    fn indicator_maps_to_rgb() {
        assert_eq!(Indicator::Off.rgb(), Rgb::OFF);
        assert_eq!(Indicator::Red.rgb(), Rgb::new(255, 0, 0));
        assert_eq!(Indicator::Green.rgb(), Rgb::new(0, 255, 0));
    }

    #[test]
    fn level_parses_lowercase() {
        let level: Level = serde_json::from_str("\"low\"").unwrap();
        assert_eq!(level, Level::Low);
        assert_eq!(level.inverted(), Level::High);
        assert!(!level.is_high());
    }

    #[test]
    fn line_is_transparent_in_json() {
        let line: Line = serde_json::from_str("4").unwrap();
        assert_eq!(line, Line(4));
        assert_eq!(line.to_string(), "line 4");
    }
}
