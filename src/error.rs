//! Error types
//!
//! Configuration is validated up front and rejected loudly. Commands issued in
//! the wrong match phase are refused without touching state.

use crate::sim::{EntityId, MatchPhase};

/// Invalid configuration detected at construction time
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{field} must be > 0 (got {value})")]
    NonPositive { field: &'static str, value: f32 },
    #[error("{field} must be >= 0 (got {value})")]
    Negative { field: &'static str, value: f32 },
    #[error("{field} must be finite")]
    NotFinite { field: &'static str },
    #[error("ring-out radius {ring_out} must exceed arena radius {radius}")]
    RingOutInsideArena { radius: f32, ring_out: f32 },
    #[error("substep count must be at least 1")]
    ZeroSubsteps,
    #[error("at least two spawn slots are required (got {0})")]
    TooFewSpawns(usize),
    #[error("{entities} entities need as many spawn slots (got {spawns})")]
    RosterSize { entities: usize, spawns: usize },
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// A command the simulation refused
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum CommandError {
    #[error("cannot {command} while match is {phase:?}")]
    WrongPhase {
        command: &'static str,
        phase: MatchPhase,
    },
    #[error("unknown entity {0:?}")]
    UnknownEntity(EntityId),
    #[error("unknown force preset '{0}'")]
    UnknownPreset(String),
    #[error("rejected stats: {0}")]
    InvalidStats(String),
}

/// Reject NaN/infinite values, then anything <= 0
pub(crate) fn check_positive(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if !value.is_finite() {
        return Err(ConfigError::NotFinite { field });
    }
    if value <= 0.0 {
        return Err(ConfigError::NonPositive { field, value });
    }
    Ok(())
}

/// Reject NaN/infinite values, then anything < 0
pub(crate) fn check_non_negative(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if !value.is_finite() {
        return Err(ConfigError::NotFinite { field });
    }
    if value < 0.0 {
        return Err(ConfigError::Negative { field, value });
    }
    Ok(())
}
