//! Replay recording for the headless harness.
//!
//! A replay is the sequence of snapshots one controller saw during a match,
//! with the fleet and configuration it ran under. Feeding the snapshots
//! back through a fresh [`crate::dispatch::Controller`] reproduces its
//! decisions exactly.

use std::io::{Read, Write};

use serde::{Deserialize, Serialize};

use crate::config::ControllerConfig;
use crate::model::{Fleet, TickSnapshot};

/// Version number for the replay format (increment when format changes)
const REPLAY_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Replay {
    pub version: u32,
    pub own: Fleet,
    pub config: ControllerConfig,
    pub ticks: Vec<TickSnapshot>,
}

impl Replay {
    pub fn new(own: Fleet, config: ControllerConfig) -> Self {
        Self {
            version: REPLAY_VERSION,
            own,
            config,
            ticks: Vec::new(),
        }
    }

    pub fn record(&mut self, snapshot: &TickSnapshot) {
        self.ticks.push(snapshot.clone());
    }

    pub fn len(&self) -> usize {
        self.ticks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ticks.is_empty()
    }
}

/// Write a replay to a writer
pub fn save_replay<W: Write>(writer: W, replay: &Replay) -> Result<(), ReplayError> {
    bincode::serialize_into(writer, replay)?;
    log::debug!("saved replay with {} ticks", replay.ticks.len());
    Ok(())
}

/// Read a replay from a reader
pub fn load_replay<R: Read>(reader: R) -> Result<Replay, ReplayError> {
    let replay: Replay = bincode::deserialize_from(reader)?;
    if replay.version != REPLAY_VERSION {
        return Err(ReplayError::VersionMismatch {
            expected: REPLAY_VERSION,
            found: replay.version,
        });
    }
    Ok(replay)
}

/// Errors that can occur during replay save/load
#[derive(Debug)]
pub enum ReplayError {
    Io(std::io::Error),
    Bincode(Box<bincode::ErrorKind>),
    VersionMismatch { expected: u32, found: u32 },
}

impl From<std::io::Error> for ReplayError {
    fn from(e: std::io::Error) -> Self {
        ReplayError::Io(e)
    }
}

impl From<Box<bincode::ErrorKind>> for ReplayError {
    fn from(e: Box<bincode::ErrorKind>) -> Self {
        ReplayError::Bincode(e)
    }
}

impl std::fmt::Display for ReplayError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReplayError::Io(e) => write!(f, "IO error: {}", e),
            ReplayError::Bincode(e) => write!(f, "Serialization error: {}", e),
            ReplayError::VersionMismatch { expected, found } => {
                write!(
                    f,
                    "Replay version mismatch: expected {}, found {}",
                    expected, found
                )
            }
        }
    }
}

impl std::error::Error for ReplayError {}
