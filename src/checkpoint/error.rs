//! Errors reading and writing diagnostic snapshots.

use std::fmt;
use thiserror::Error;

/// Wire encoding a snapshot was being read from or written to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Encoding {
    Json,
    Bincode,
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Encoding::Json => f.write_str("JSON"),
            Encoding::Bincode => f.write_str("bincode"),
        }
    }
}

/// Snapshot encode/decode failures. None of these affect the running
/// controller; a snapshot is only ever an offline record.
#[derive(Debug, Error)]
pub enum CheckpointError {
    #[error("Could not encode state machine snapshot as {encoding}: {reason}")]
    Encode { encoding: Encoding, reason: String },

    #[error("Could not decode {encoding} state machine snapshot: {reason}")]
    Decode { encoding: Encoding, reason: String },

    #[error("Snapshot format v{found} is not readable by this build (expects v{supported})")]
    UnsupportedVersion { found: u32, supported: u32 },
}
