//! Spin Clash - bowl-arena spinning-top battle simulation
//!
//! Core modules:
//! - `sim`: Deterministic simulation (forces, combat, match lifecycle)
//! - `tuning`: Data-driven game balance
//! - `presets`: Stat preset persistence seam
//! - `error`: Configuration and command errors

pub mod error;
pub mod presets;
pub mod sim;
pub mod tuning;

pub use error::{CommandError, ConfigError};
pub use tuning::Tuning;

use glam::Vec2;

/// Game configuration constants (design defaults, overridable through `Tuning`)
pub mod consts {
    /// Physics substeps per rendered frame
    pub const SUBSTEPS: u32 = 8;
    /// Reference frame duration in milliseconds (60 Hz)
    pub const FRAME_MS: f32 = 1000.0 / 60.0;
    /// Duration of one physics substep in milliseconds
    pub const SUBSTEP_MS: f32 = FRAME_MS / SUBSTEPS as f32;

    /// Arena dimensions
    pub const ARENA_RADIUS: f32 = 300.0;
    pub const BOWL_HEIGHT: f32 = 60.0;
    /// Ring-out threshold sits this far outside the arena radius
    pub const RING_OUT_MARGIN: f32 = 50.0;

    /// Entity defaults
    pub const ENTITY_RADIUS: f32 = 25.0;
    pub const PLAYER_SPAWN: (f32, f32) = (0.0, 100.0);
    pub const OPPONENT_SPAWN: (f32, f32) = (0.0, -100.0);

    /// Arena force scale (dish + curl)
    pub const FORCE_CONSTANT: f32 = 2e-5;
    /// Launch velocity = launch_speed * LAUNCH_SCALE
    pub const LAUNCH_SCALE: f32 = 0.1;
    /// Spin-health units per unit of angular velocity
    pub const SPIN_PER_ANGULAR_VELOCITY: f32 = 100.0;

    /// Body speed above which a hit counts as critical
    pub const CRIT_SPEED_THRESHOLD: f32 = 8.0;

    /// Death drift shaping
    pub const DRIFT_SCALE: f32 = 1.2;
    pub const DRIFT_BIAS: f32 = 0.3;
    pub const DRIFT_MIN_RISE: f32 = 0.2;
    /// Span of the random tumble given to a dead body, per axis
    pub const DRIFT_SPIN_JITTER: f32 = 0.2;
    /// Horizontal speed below which drift falls back to a random float
    pub const DRIFT_STILL_SPEED: f32 = 0.5;
}

/// Normalized angle to [-π, π)
#[inline]
pub fn normalize_angle(mut angle: f32) -> f32 {
    use std::f32::consts::PI;
    while angle >= PI {
        angle -= 2.0 * PI;
    }
    while angle < -PI {
        angle += 2.0 * PI;
    }
    angle
}

/// Convert polar (r, theta) to cartesian (x, y)
#[inline]
pub fn polar_to_cartesian(r: f32, theta: f32) -> Vec2 {
    Vec2::new(r * theta.cos(), r * theta.sin())
}
