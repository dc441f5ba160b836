//! Alarm configuration and its validation.
//!
//! Pin assignments and timing constants live in one structure built once at
//! startup, so the same controller serves every board variant. Validation
//! collects every problem in a single pass instead of stopping at the first.

use crate::core::DEFAULT_HISTORY_CAPACITY;
use crate::io::{DebouncedReader, Indicator, LedLines, Level, Line, DEFAULT_SAMPLE_COUNT};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use stillwater::validation::Validation;
use stillwater::NonEmptyVec;
use thiserror::Error;

pub const DEFAULT_BEEP_HALF_PERIOD_MS: u32 = 1_000;
pub const DEFAULT_AUTO_RESET_TIMEOUT_MS: u32 = 120_000;

/// Problems found in an [`AlarmConfig`].
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ConfigError {
    #[error("debounce_sample_count must be at least 1")]
    ZeroSampleCount,

    #[error("beep_half_period_ms must be at least 1")]
    ZeroBeepPeriod,

    #[error("auto_reset_timeout_ms must be at least 1")]
    ZeroResetTimeout,

    #[error("{line} is assigned to both {first} and {second}")]
    LineConflict {
        line: Line,
        first: &'static str,
        second: &'static str,
    },

    #[error("Failed to read config {path}: {message}")]
    Io { path: String, message: String },

    #[error("Failed to parse config: {0}")]
    Parse(String),
}

type Check = Validation<(), NonEmptyVec<ConfigError>>;

/// Pin assignments, timing constants and cosmetic choices for one board.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AlarmConfig {
    /// Samples per debounced read; all must agree to report actuation.
    pub debounce_sample_count: u32,
    /// Relay on/off time while the alarm sounds.
    pub beep_half_period_ms: u32,
    /// Time in the triggered state after which a lowered kickstand re-arms.
    pub auto_reset_timeout_ms: u32,
    pub button_line: Line,
    pub kickstand_line: Line,
    pub relay_line: Line,
    pub led_lines: LedLines,
    /// NV address of the "alarm was sounding" byte.
    pub persisted_flag_address: u16,
    /// Raw level of a closed switch.
    pub actuated_level: Level,
    /// LED color while waiting for the kickstand to come up after disarm.
    pub kickstand_up_indicator: Indicator,
    /// Transitions kept in the journal.
    pub history_capacity: usize,
}

impl Default for AlarmConfig {
    fn default() -> Self {
        Self {
            debounce_sample_count: DEFAULT_SAMPLE_COUNT,
            beep_half_period_ms: DEFAULT_BEEP_HALF_PERIOD_MS,
            auto_reset_timeout_ms: DEFAULT_AUTO_RESET_TIMEOUT_MS,
            button_line: Line(2),
            kickstand_line: Line(3),
            relay_line: Line(4),
            led_lines: LedLines {
                red: Line(5),
                green: Line(6),
                blue: Line(7),
            },
            persisted_flag_address: 0,
            actuated_level: Level::Low,
            kickstand_up_indicator: Indicator::Red,
            history_capacity: DEFAULT_HISTORY_CAPACITY,
        }
    }
}

impl AlarmConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        Self::from_json_str(&json)
    }

    /// Debounced reader matching this board's switch wiring.
    pub fn reader(&self) -> DebouncedReader {
        DebouncedReader::new(self.debounce_sample_count, self.actuated_level)
    }

    /// Check every rule, accumulating ALL violations.
    pub fn validation(&self) -> Check {
        let mut checks: Vec<Check> = vec![
            nonzero(self.debounce_sample_count, ConfigError::ZeroSampleCount),
            nonzero(self.beep_half_period_ms, ConfigError::ZeroBeepPeriod),
            nonzero(self.auto_reset_timeout_ms, ConfigError::ZeroResetTimeout),
        ];

        let roles = self.line_roles();
        for (i, (first, line)) in roles.iter().enumerate() {
            for (second, other) in &roles[i + 1..] {
                let check = if line == other {
                    Validation::fail(ConfigError::LineConflict {
                        line: *line,
                        first: *first,
                        second: *second,
                    })
                } else {
                    Validation::success(())
                };
                checks.push(check);
            }
        }

        Validation::all_vec(checks).map(|_| ())
    }

    /// [`validation`](Self::validation) as a plain `Result`.
    pub fn validate(&self) -> Result<(), Vec<ConfigError>> {
        match self.validation() {
            Validation::Success(_) => Ok(()),
            Validation::Failure(errors) => Err(errors.iter().cloned().collect()),
        }
    }

    fn line_roles(&self) -> [(&'static str, Line); 6] {
        [
            ("button_line", self.button_line),
            ("kickstand_line", self.kickstand_line),
            ("relay_line", self.relay_line),
            ("led_lines.red", self.led_lines.red),
            ("led_lines.green", self.led_lines.green),
            ("led_lines.blue", self.led_lines.blue),
        ]
    }
}

fn nonzero(value: u32, error: ConfigError) -> Check {
    if value == 0 {
        Validation::fail(error)
    } else {
        Validation::success(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = AlarmConfig::default();
        assert!(config.validation().is_success());
        assert_eq!(config.validate(), Ok(()));
        assert_eq!(config.debounce_sample_count, 20);
        assert_eq!(config.beep_half_period_ms, 1_000);
        assert_eq!(config.auto_reset_timeout_ms, 120_000);
    }

    #[test]
    fn validation_accumulates_all_violations() {
        let config = AlarmConfig {
            debounce_sample_count: 0,
            beep_half_period_ms: 0,
            relay_line: Line(2),
            ..AlarmConfig::default()
        };

        let errors = config.validate().unwrap_err();

        assert_eq!(errors.len(), 3);
        assert!(errors.contains(&ConfigError::ZeroSampleCount));
        assert!(errors.contains(&ConfigError::ZeroBeepPeriod));
        assert!(errors.contains(&ConfigError::LineConflict {
            line: Line(2),
            first: "button_line",
            second: "relay_line",
        }));
    }

    #[test]
    fn led_channels_must_be_distinct() {
        let config = AlarmConfig {
            led_lines: LedLines {
                red: Line(9),
                green: Line(9),
                blue: Line(10),
            },
            ..AlarmConfig::default()
        };

        let errors = config.validate().unwrap_err();
        assert_eq!(
            errors,
            vec![ConfigError::LineConflict {
                line: Line(9),
                first: "led_lines.red",
                second: "led_lines.green",
            }]
        );
    }

    #[test]
    fn partial_json_falls_back_to_defaults() {
        let config = AlarmConfig::from_json_str(
            r#"{ "button_line": 8, "kickstand_line": 9, "kickstand_up_indicator": "green" }"#,
        )
        .unwrap();

        assert_eq!(config.button_line, Line(8));
        assert_eq!(config.kickstand_line, Line(9));
        assert_eq!(config.kickstand_up_indicator, Indicator::Green);
        assert_eq!(config.relay_line, Line(4));
        assert_eq!(config.actuated_level, Level::Low);
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let err = AlarmConfig::from_json_str(r#"{ "buton_line": 8 }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn missing_file_reports_io_error() {
        let err = AlarmConfig::from_file("/nonexistent/kickguard.json").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn reader_follows_wiring() {
        let config = AlarmConfig {
            debounce_sample_count: 7,
            actuated_level: Level::High,
            ..AlarmConfig::default()
        };

        let reader = config.reader();
        assert_eq!(reader.sample_count(), 7);
        assert_eq!(reader.actuated_level(), Level::High);
    }
}
