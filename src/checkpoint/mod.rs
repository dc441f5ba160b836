//! Diagnostic snapshots of a running state machine.
//!
//! A checkpoint captures the current state, the caller's context and the
//! transition journal so they can be inspected offline. It does not replace
//! the persisted alarm byte: recovery after power loss never reads one.

use crate::core::{State, StateHistory};
use crate::effects::StateMachine;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub mod error;

pub use error::{CheckpointError, Encoding};

/// Version identifier for checkpoint format
pub const CHECKPOINT_VERSION: u32 = 1;

/// Serializable snapshot of a machine and its context.
/// Does NOT include callbacks or guards (not serializable).
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(bound(serialize = "X: Serialize", deserialize = "X: DeserializeOwned"))]
pub struct Checkpoint<S: State, X> {
    /// Checkpoint format version
    pub version: u32,

    /// Unique checkpoint identifier
    pub id: Uuid,

    /// When checkpoint was created
    pub taken_at: DateTime<Utc>,

    /// Engine tick count at capture
    pub tick: u64,

    /// Current state, `None` if the machine had not started
    pub current_state: Option<S>,

    /// Application context at capture
    pub context: X,

    /// Retained transition journal
    pub history: StateHistory<S>,
}

impl<S: State, X: Serialize + DeserializeOwned> Checkpoint<S, X> {
    /// Snapshot `machine` together with a copy of its context.
    pub fn capture<C>(machine: &StateMachine<S, C>, context: X) -> Self {
        Self {
            version: CHECKPOINT_VERSION,
            id: Uuid::new_v4(),
            taken_at: Utc::now(),
            tick: machine.tick_count(),
            current_state: machine.current_state().cloned(),
            context,
            history: machine.history().clone(),
        }
    }

    pub fn to_json(&self) -> Result<String, CheckpointError> {
        serde_json::to_string_pretty(self).map_err(|e| CheckpointError::Encode {
            encoding: Encoding::Json,
            reason: e.to_string(),
        })
    }

    pub fn from_json(json: &str) -> Result<Self, CheckpointError> {
        let checkpoint: Self = serde_json::from_str(json).map_err(|e| CheckpointError::Decode {
            encoding: Encoding::Json,
            reason: e.to_string(),
        })?;
        checkpoint.check_version()
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, CheckpointError> {
        bincode::serialize(self).map_err(|e| CheckpointError::Encode {
            encoding: Encoding::Bincode,
            reason: e.to_string(),
        })
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CheckpointError> {
        let checkpoint: Self = bincode::deserialize(bytes)
            .map_err(|e| CheckpointError::Decode {
                encoding: Encoding::Bincode,
                reason: e.to_string(),
            })?;
        checkpoint.check_version()
    }

    fn check_version(self) -> Result<Self, CheckpointError> {
        if self.version != CHECKPOINT_VERSION {
            return Err(CheckpointError::UnsupportedVersion {
                found: self.version,
                supported: CHECKPOINT_VERSION,
            });
        }
        Ok(self)
    }
}
