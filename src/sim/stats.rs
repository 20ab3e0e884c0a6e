//! Per-entity combat and physical attributes
//!
//! `Stats` is plain data. Live copies may be adjusted mid-match; the
//! simulation snapshots them at launch so a soft reset can discard those
//! adjustments.

use serde::{Deserialize, Serialize};

use super::world::BodyProps;
use crate::error::{ConfigError, check_non_negative, check_positive};

/// Combat + physics attributes for one entity
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Stats {
    /// Initial and maximum spin-health
    pub max_spin: f32,
    /// Base damage dealt per hit
    pub attack: f32,
    /// Flat mitigation subtracted from incoming damage
    pub defense: f32,
    /// Mass multiplier
    pub weight: f32,
    /// Spin-health lost per simulated second
    pub stamina_decay: f32,
    /// Launch velocity scale
    pub launch_speed: f32,
    /// Probability a hit is critical (chance-based rule only)
    pub critical_chance: f32,
    /// Raw damage of a critical hit (replaces `attack`)
    pub critical_damage: f32,
    /// Body density before weight scaling
    pub density_base: f32,
    /// Air drag coefficient
    pub friction_air: f32,
    /// Bounciness
    pub restitution: f32,
    /// Surface friction
    pub friction: f32,
    /// Radial arena pull scale
    pub dish_force_multiplier: f32,
    /// Tangential arena swirl scale
    pub curl_force_multiplier: f32,
}

impl Default for Stats {
    fn default() -> Self {
        Self {
            max_spin: 1000.0,
            attack: 90.0,
            defense: 50.0,
            weight: 1.0,
            stamina_decay: 10.0,
            launch_speed: 60.0,
            critical_chance: 0.1,
            critical_damage: 180.0,
            density_base: 0.001,
            friction_air: 0.01,
            restitution: 0.8,
            friction: 0.05,
            dish_force_multiplier: 1.0,
            curl_force_multiplier: 1.0,
        }
    }
}

impl Stats {
    /// Fail fast on values that would break the simulation
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_positive("max_spin", self.max_spin)?;
        check_positive("weight", self.weight)?;
        check_positive("density_base", self.density_base)?;
        check_non_negative("attack", self.attack)?;
        check_non_negative("defense", self.defense)?;
        check_non_negative("stamina_decay", self.stamina_decay)?;
        check_non_negative("launch_speed", self.launch_speed)?;
        check_non_negative("critical_chance", self.critical_chance)?;
        check_non_negative("critical_damage", self.critical_damage)?;
        check_non_negative("friction_air", self.friction_air)?;
        check_non_negative("restitution", self.restitution)?;
        check_non_negative("friction", self.friction)?;
        check_non_negative("dish_force_multiplier", self.dish_force_multiplier)?;
        check_non_negative("curl_force_multiplier", self.curl_force_multiplier)?;
        Ok(())
    }

    /// Effective body density (weight scales mass through density)
    #[inline]
    pub fn density(&self) -> f32 {
        self.density_base * self.weight
    }

    /// Physical parameters handed to the rigid-body world
    pub fn body_props(&self) -> BodyProps {
        BodyProps {
            density: self.density(),
            friction_air: self.friction_air,
            restitution: self.restitution,
            friction: self.friction,
        }
    }

    /// Copy with every `Some` field of `overrides` applied
    pub fn merged(&self, overrides: &StatOverrides) -> Self {
        let mut out = *self;
        out.apply(overrides);
        out
    }

    /// Overwrite fields named by `overrides`
    pub fn apply(&mut self, o: &StatOverrides) {
        let pairs: [(&mut f32, Option<f32>); 14] = [
            (&mut self.max_spin, o.max_spin),
            (&mut self.attack, o.attack),
            (&mut self.defense, o.defense),
            (&mut self.weight, o.weight),
            (&mut self.stamina_decay, o.stamina_decay),
            (&mut self.launch_speed, o.launch_speed),
            (&mut self.critical_chance, o.critical_chance),
            (&mut self.critical_damage, o.critical_damage),
            (&mut self.density_base, o.density_base),
            (&mut self.friction_air, o.friction_air),
            (&mut self.restitution, o.restitution),
            (&mut self.friction, o.friction),
            (&mut self.dish_force_multiplier, o.dish_force_multiplier),
            (&mut self.curl_force_multiplier, o.curl_force_multiplier),
        ];
        for (field, value) in pairs {
            if let Some(v) = value {
                *field = v;
            }
        }
    }
}

/// Partial stat customization; `None` leaves a field untouched
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_spin: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attack: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub defense: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stamina_decay: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub launch_speed: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub critical_chance: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub critical_damage: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub density_base: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub friction_air: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub restitution: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub friction: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dish_force_multiplier: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub curl_force_multiplier: Option<f32>,
}

/// Named arena-force behaviour selected while a boost input is held
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ForcePresetKind {
    /// High curl, low drag: orbits the rim
    Edge,
    /// High dish, high drag: dives to the center
    Center,
}

impl ForcePresetKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ForcePresetKind::Edge => "EDGE",
            ForcePresetKind::Center => "CENTER",
        }
    }

    pub fn from_name(s: &str) -> Option<Self> {
        match s.to_ascii_uppercase().as_str() {
            "EDGE" => Some(ForcePresetKind::Edge),
            "CENTER" | "CENTRE" => Some(ForcePresetKind::Center),
            _ => None,
        }
    }
}

/// Force multipliers + body drag applied by a preset
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForcePreset {
    pub dish: f32,
    pub curl: f32,
    pub drag: f32,
}

/// The preset table, one entry per `ForcePresetKind`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForcePresets {
    pub edge: ForcePreset,
    pub center: ForcePreset,
}

impl Default for ForcePresets {
    fn default() -> Self {
        Self {
            edge: ForcePreset {
                dish: 0.4,
                curl: 3.0,
                drag: 0.002,
            },
            center: ForcePreset {
                dish: 3.0,
                curl: 0.2,
                drag: 0.04,
            },
        }
    }
}

impl ForcePresets {
    pub fn get(&self, kind: ForcePresetKind) -> ForcePreset {
        match kind {
            ForcePresetKind::Edge => self.edge,
            ForcePresetKind::Center => self.center,
        }
    }
}
