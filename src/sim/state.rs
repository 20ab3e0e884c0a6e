//! Match state and core simulation types
//!
//! All mutable match data lives in `MatchState`, owned by one `Simulation`.

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

use super::stats::{ForcePreset, ForcePresetKind, Stats};
use super::world::BodyHandle;

/// Stable index of an entity within its match
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntityId(pub usize);

/// Current phase of the match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchPhase {
    /// Entities parked on their spawn slots, waiting for launch
    PreLaunch,
    /// Entities spinning, forces and combat live
    Active,
    /// Match decided; terminal until reset
    GameOver,
}

/// How a decided match ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchOutcome {
    Winner(EntityId),
    /// Every remaining entity died in the same evaluation pass
    Draw,
}

/// Why an entity died
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeathCause {
    /// Spin-health reached zero
    SpinOut,
    /// Left the ring-out radius
    RingOut,
}

/// Post-death free-flight kinematics (bowl space: y is up)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Drift {
    pub position: Vec3,
    /// Distance per reference tick
    pub velocity: Vec3,
    /// Euler rotation rate per reference tick
    pub angular_drift: Vec3,
    pub rotation: Vec3,
}

impl Drift {
    /// Advance one reference tick
    pub fn advance(&mut self) {
        self.position += self.velocity;
        self.rotation += self.angular_drift;
    }
}

/// Per-entity life state
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Vitality {
    /// Spawned but not launched; no spin-health yet
    Idle,
    /// Launched and spinning
    Alive { spin: f32 },
    /// Eliminated; stays dead until the match is reset
    Dead { cause: DeathCause, drift: Drift },
}

/// Force multipliers saved while a preset is held
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoostState {
    pub kind: ForcePresetKind,
    pub saved: ForcePreset,
}

/// One combatant
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entity {
    pub id: EntityId,
    pub label: String,
    /// Theme key handed to effects when this entity lands a hit
    pub color_key: String,
    pub body: BodyHandle,
    /// Fixed starting slot
    pub spawn: Vec2,
    pub radius: f32,
    /// Persisted defaults restored by a hard reset
    pub default_stats: Stats,
    /// Live stats, adjustable mid-match
    pub stats: Stats,
    /// Live stats captured at launch, restored by a soft reset
    pub match_start_stats: Option<Stats>,
    pub vitality: Vitality,
    pub last_hit_critical: bool,
    pub boost: Option<BoostState>,
}

impl Entity {
    pub fn new(
        id: EntityId,
        label: impl Into<String>,
        color_key: impl Into<String>,
        body: BodyHandle,
        spawn: Vec2,
        radius: f32,
        stats: Stats,
    ) -> Self {
        Self {
            id,
            label: label.into(),
            color_key: color_key.into(),
            body,
            spawn,
            radius,
            default_stats: stats,
            stats,
            match_start_stats: None,
            vitality: Vitality::Idle,
            last_hit_critical: false,
            boost: None,
        }
    }

    pub fn current_spin(&self) -> f32 {
        match self.vitality {
            Vitality::Alive { spin } => spin,
            Vitality::Idle | Vitality::Dead { .. } => 0.0,
        }
    }

    pub fn is_alive(&self) -> bool {
        matches!(self.vitality, Vitality::Alive { .. })
    }

    pub fn is_dead(&self) -> bool {
        matches!(self.vitality, Vitality::Dead { .. })
    }

    pub fn drift(&self) -> Option<&Drift> {
        match &self.vitality {
            Vitality::Dead { drift, .. } => Some(drift),
            _ => None,
        }
    }

    /// Subtract spin-health, never below zero. Returns the amount removed.
    pub fn drain_spin(&mut self, amount: f32) -> f32 {
        if let Vitality::Alive { spin } = &mut self.vitality {
            let before = *spin;
            *spin = (*spin - amount.max(0.0)).max(0.0);
            before - *spin
        } else {
            0.0
        }
    }

    /// Keep spin inside [0, max_spin] after a stat change
    pub fn clamp_spin(&mut self) {
        let max = self.stats.max_spin;
        if let Vitality::Alive { spin } = &mut self.vitality {
            *spin = spin.clamp(0.0, max);
        }
    }
}

/// Observable simulation events for renderers, audio and UI
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SimEvent {
    Launched {
        player_angle: f32,
    },
    /// One direction of an entity-entity hit
    Collision {
        attacker: EntityId,
        defender: EntityId,
        point: Vec2,
        critical: bool,
        damage: f32,
        attacker_color: String,
    },
    WallHit {
        entity: EntityId,
        point: Vec2,
        damage: f32,
    },
    Death {
        entity: EntityId,
        cause: DeathCause,
    },
    Win {
        entity: EntityId,
    },
    Draw,
    Reset {
        keep_modifiers: bool,
    },
}

/// Read-only per-entity view for external consumers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntitySnapshot {
    pub id: EntityId,
    pub position: Vec2,
    /// Bowl height under the entity
    pub height: f32,
    pub angle: f32,
    pub angular_velocity: f32,
    pub current_spin: f32,
    pub max_spin: f32,
    pub is_dead: bool,
    pub last_hit_critical: bool,
    pub drift: Option<Drift>,
}

/// Complete match state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchState {
    pub phase: MatchPhase,
    pub outcome: Option<MatchOutcome>,
    /// Sorted by id for deterministic iteration
    pub entities: Vec<Entity>,
    /// Frames advanced since the last reset
    pub frame: u64,
    /// Events not yet drained by consumers
    #[serde(skip)]
    pub events: Vec<SimEvent>,
}

impl MatchState {
    pub fn new(entities: Vec<Entity>) -> Self {
        Self {
            phase: MatchPhase::PreLaunch,
            outcome: None,
            entities,
            frame: 0,
            events: Vec::new(),
        }
    }

    pub fn entity(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(id.0)
    }

    pub fn entity_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.get_mut(id.0)
    }

    /// Index of the entity owning `body`, if any
    pub fn index_of_body(&self, body: BodyHandle) -> Option<usize> {
        self.entities.iter().position(|e| e.body == body)
    }

    pub fn alive_count(&self) -> usize {
        self.entities.iter().filter(|e| e.is_alive()).count()
    }

    pub fn winner(&self) -> Option<EntityId> {
        match self.outcome {
            Some(MatchOutcome::Winner(id)) => Some(id),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entity() -> Entity {
        Entity::new(
            EntityId(0),
            "player",
            "cyan",
            BodyHandle(0),
            Vec2::new(0.0, 100.0),
            25.0,
            Stats::default(),
        )
    }

    #[test]
    fn test_idle_has_no_spin() {
        let mut e = entity();
        assert_eq!(e.current_spin(), 0.0);
        assert_eq!(e.drain_spin(50.0), 0.0);
        assert!(!e.is_alive());
        assert!(!e.is_dead());
    }

    #[test]
    fn test_drain_clamps_at_zero() {
        let mut e = entity();
        e.vitality = Vitality::Alive { spin: 30.0 };
        assert_eq!(e.drain_spin(50.0), 30.0);
        assert_eq!(e.current_spin(), 0.0);
        // Still alive until the evaluation pass kills it
        assert!(e.is_alive());
    }

    #[test]
    fn test_negative_drain_is_ignored() {
        let mut e = entity();
        e.vitality = Vitality::Alive { spin: 30.0 };
        assert_eq!(e.drain_spin(-10.0), 0.0);
        assert_eq!(e.current_spin(), 30.0);
    }

    #[test]
    fn test_clamp_spin_to_new_max() {
        let mut e = entity();
        e.vitality = Vitality::Alive { spin: 900.0 };
        e.stats.max_spin = 500.0;
        e.clamp_spin();
        assert_eq!(e.current_spin(), 500.0);
    }

    #[test]
    fn test_drift_advance() {
        let mut drift = Drift {
            position: Vec3::ZERO,
            velocity: Vec3::new(1.0, 0.5, 0.0),
            angular_drift: Vec3::new(0.0, 0.1, 0.0),
            rotation: Vec3::ZERO,
        };
        drift.advance();
        drift.advance();
        assert_eq!(drift.position, Vec3::new(2.0, 1.0, 0.0));
        assert!((drift.rotation.y - 0.2).abs() < 1e-6);
    }

    #[test]
    fn test_index_of_body() {
        let state = MatchState::new(vec![entity()]);
        assert_eq!(state.index_of_body(BodyHandle(0)), Some(0));
        assert_eq!(state.index_of_body(BodyHandle(9)), None);
        assert_eq!(state.phase, MatchPhase::PreLaunch);
    }
}
