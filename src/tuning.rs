//! Data-driven game balance
//!
//! Every constant the simulation consults lives in `Tuning`. It is loaded
//! from JSON; missing fields fall back to the design defaults in `consts`.

use std::path::Path;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::{ConfigError, check_non_negative, check_positive};
use crate::sim::{Arena, ForcePresets};

/// How a hit is judged critical
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum CriticalRule {
    /// Critical when the attacker's body speed exceeds `threshold`
    ImpactSpeed { threshold: f32 },
    /// Critical when a roll falls below the attacker's `critical_chance`
    Chance,
}

impl Default for CriticalRule {
    fn default() -> Self {
        CriticalRule::ImpactSpeed {
            threshold: CRIT_SPEED_THRESHOLD,
        }
    }
}

/// What hitting an arena wall does to spin-health
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum WallRule {
    /// Wall hits only produce cosmetic events
    #[default]
    Cosmetic,
    /// Wall hits subtract a flat amount of spin-health
    Barrier { damage: f32 },
}

/// All tunable simulation parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    // === Arena ===
    pub arena_radius: f32,
    pub bowl_height: f32,
    /// Ring-out radius = arena_radius + ring_out_margin
    pub ring_out_margin: f32,
    /// Straight wall segments approximating the arena boundary
    pub wall_segments: usize,
    pub wall_restitution: f32,

    // === Loop ===
    pub substeps: u32,
    pub substep_ms: f32,

    // === Forces ===
    pub force_constant: f32,
    pub force_presets: ForcePresets,

    // === Launch ===
    pub launch_scale: f32,
    pub spin_per_angular_velocity: f32,
    pub entity_radius: f32,
    /// Fixed starting slots, one per entity
    pub spawn_points: Vec<Vec2>,

    // === Combat ===
    pub critical_rule: CriticalRule,
    pub wall_rule: WallRule,

    // === Death drift ===
    pub drift_scale: f32,
    pub drift_bias: f32,
    pub drift_min_rise: f32,
    pub drift_still_speed: f32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            arena_radius: ARENA_RADIUS,
            bowl_height: BOWL_HEIGHT,
            ring_out_margin: RING_OUT_MARGIN,
            wall_segments: 48,
            wall_restitution: 0.8,

            substeps: SUBSTEPS,
            substep_ms: SUBSTEP_MS,

            force_constant: FORCE_CONSTANT,
            force_presets: ForcePresets::default(),

            launch_scale: LAUNCH_SCALE,
            spin_per_angular_velocity: SPIN_PER_ANGULAR_VELOCITY,
            entity_radius: ENTITY_RADIUS,
            spawn_points: vec![
                Vec2::new(PLAYER_SPAWN.0, PLAYER_SPAWN.1),
                Vec2::new(OPPONENT_SPAWN.0, OPPONENT_SPAWN.1),
            ],

            critical_rule: CriticalRule::default(),
            wall_rule: WallRule::default(),

            drift_scale: DRIFT_SCALE,
            drift_bias: DRIFT_BIAS,
            drift_min_rise: DRIFT_MIN_RISE,
            drift_still_speed: DRIFT_STILL_SPEED,
        }
    }
}

impl Tuning {
    /// Fail fast on values that would corrupt the simulation
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.arena()?;
        if self.substeps == 0 {
            return Err(ConfigError::ZeroSubsteps);
        }
        check_positive("substep_ms", self.substep_ms)?;
        check_positive("entity_radius", self.entity_radius)?;
        check_positive("spin_per_angular_velocity", self.spin_per_angular_velocity)?;
        check_non_negative("force_constant", self.force_constant)?;
        check_non_negative("launch_scale", self.launch_scale)?;
        check_non_negative("wall_restitution", self.wall_restitution)?;
        check_non_negative("drift_scale", self.drift_scale)?;
        // Dead bodies must always leave upward
        check_positive("drift_min_rise", self.drift_min_rise)?;
        check_non_negative("drift_still_speed", self.drift_still_speed)?;
        if let CriticalRule::ImpactSpeed { threshold } = self.critical_rule {
            check_non_negative("critical_rule.threshold", threshold)?;
        }
        if let WallRule::Barrier { damage } = self.wall_rule {
            check_non_negative("wall_rule.damage", damage)?;
        }
        if self.spawn_points.len() < 2 {
            return Err(ConfigError::TooFewSpawns(self.spawn_points.len()));
        }
        Ok(())
    }

    /// Arena described by this tuning
    pub fn arena(&self) -> Result<Arena, ConfigError> {
        Arena::new(
            self.arena_radius,
            self.bowl_height,
            self.arena_radius + self.ring_out_margin,
        )
    }

    /// Simulated seconds covered by one frame's substeps
    #[inline]
    pub fn frame_seconds(&self) -> f32 {
        self.substep_ms * self.substeps as f32 / 1000.0
    }

    /// Parse and validate a JSON tuning document
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let tuning: Self = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    pub fn to_json_pretty(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Load from a JSON file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json(&contents)
    }

    /// Load from file, or fall back to defaults with a warning
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(tuning) => {
                log::info!("Loaded tuning from {}", path.display());
                tuning
            }
            Err(e) => {
                log::warn!("Failed to load tuning from {}: {e}, using defaults", path.display());
                Self::default()
            }
        }
    }

    /// Save as pretty JSON
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, self.to_json_pretty()?)?;
        Ok(())
    }
}
