//! Fixed-substep simulation loop
//!
//! One call to `Simulation::frame` is one rendered frame: pending commands,
//! then N physics substeps (forces, world step, combat), then the evaluation
//! pass, then drift for the dead.

use super::arena::Arena;
use super::combat;
use super::forces;
use super::lifecycle;
use super::rng::{PcgSource, RandomSource};
use super::state::{Entity, EntityId, EntitySnapshot, MatchOutcome, MatchPhase, MatchState, SimEvent};
use super::stats::{ForcePresetKind, StatOverrides, Stats};
use super::world::{BodyProps, RigidBodyWorld, SimpleWorld};
use crate::error::{CommandError, ConfigError};
use crate::tuning::Tuning;

/// Commands collected between frames
#[derive(Debug, Clone, Default)]
pub struct FrameInput {
    /// Launch with the player's heading (radians)
    pub launch: Option<f32>,
    /// Reset; the flag is `keep_modifiers`
    pub reset: Option<bool>,
    /// Hold (`Some`) or release (`None`) a force preset
    pub presets: Vec<(EntityId, Option<ForcePresetKind>)>,
}

/// Who enters the arena
#[derive(Debug, Clone, PartialEq)]
pub struct Combatant {
    pub label: String,
    pub color_key: String,
    pub stats: Stats,
}

impl Combatant {
    pub fn new(label: impl Into<String>, color_key: impl Into<String>, stats: Stats) -> Self {
        Self {
            label: label.into(),
            color_key: color_key.into(),
            stats,
        }
    }
}

/// Player and opponent with default stats
pub fn default_roster() -> Vec<Combatant> {
    vec![
        Combatant::new("player", "cyan", Stats::default()),
        Combatant::new("opponent", "magenta", Stats::default()),
    ]
}

/// Reference world: empty bowl ringed by static wall segments
pub fn arena_world(tuning: &Tuning) -> SimpleWorld {
    let wall = BodyProps {
        restitution: tuning.wall_restitution,
        ..Default::default()
    };
    SimpleWorld::with_ring_wall(tuning.arena_radius, tuning.wall_segments, wall)
}

/// One match: its state, its physics world and its random source
pub struct Simulation<W: RigidBodyWorld, R: RandomSource = PcgSource> {
    tuning: Tuning,
    arena: Arena,
    world: W,
    rng: R,
    state: MatchState,
}

impl Simulation<SimpleWorld, PcgSource> {
    /// Default roster in the reference world with a seeded PCG source
    pub fn with_seed(tuning: Tuning, seed: u64) -> Result<Self, ConfigError> {
        let world = arena_world(&tuning);
        Self::new(tuning, world, PcgSource::new(seed), default_roster())
    }
}

impl<W: RigidBodyWorld, R: RandomSource> Simulation<W, R> {
    /// Validate everything, then place one body per combatant on its spawn slot
    pub fn new(tuning: Tuning, mut world: W, rng: R, roster: Vec<Combatant>) -> Result<Self, ConfigError> {
        tuning.validate()?;
        let arena = tuning.arena()?;

        let spawns = tuning.spawn_points.len();
        if roster.len() < 2 || roster.len() > spawns {
            return Err(ConfigError::RosterSize {
                entities: roster.len(),
                spawns,
            });
        }

        let mut entities = Vec::with_capacity(roster.len());
        for (i, combatant) in roster.into_iter().enumerate() {
            combatant.stats.validate()?;
            let spawn = tuning.spawn_points[i];
            let body = world.create_circle(spawn, tuning.entity_radius, combatant.stats.body_props());
            world.add_body(body);
            entities.push(Entity::new(
                EntityId(i),
                combatant.label,
                combatant.color_key,
                body,
                spawn,
                tuning.entity_radius,
                combatant.stats,
            ));
        }

        log::info!(
            "Simulation ready: {} entities, {} substeps of {:.3} ms",
            entities.len(),
            tuning.substeps,
            tuning.substep_ms
        );

        Ok(Self {
            tuning,
            arena,
            world,
            rng,
            state: MatchState::new(entities),
        })
    }

    /// Advance one rendered frame
    pub fn frame(&mut self, input: &FrameInput) {
        self.apply_input(input);

        for _ in 0..self.tuning.substeps {
            forces::apply_arena_forces(
                &self.state,
                &mut self.world,
                self.tuning.force_constant,
                self.arena.radius,
            );
            let pairs = self.world.step(self.tuning.substep_ms);
            combat::resolve_collisions(&mut self.state, &self.world, &pairs, &self.tuning, &mut self.rng);
        }

        lifecycle::evaluate(
            &mut self.state,
            &mut self.world,
            &self.arena,
            &self.tuning,
            &mut self.rng,
        );
        lifecycle::advance_drifts(&mut self.state);
        self.state.frame += 1;
    }

    /// Reset, then launch, then presets; refusals are logged and skipped
    fn apply_input(&mut self, input: &FrameInput) {
        if let Some(keep_modifiers) = input.reset {
            self.reset_match(keep_modifiers);
        }
        if let Some(angle) = input.launch {
            if let Err(e) = self.launch(angle) {
                log::warn!("Launch ignored: {e}");
            }
        }
        for &(id, kind) in &input.presets {
            if let Err(e) = self.set_force_preset(id, kind) {
                log::warn!("Preset change ignored: {e}");
            }
        }
    }

    /// PreLaunch -> Active
    pub fn launch(&mut self, player_angle: f32) -> Result<(), CommandError> {
        lifecycle::launch(
            &mut self.state,
            &mut self.world,
            &self.tuning,
            &mut self.rng,
            player_angle,
        )
    }

    /// Back to PreLaunch from any phase
    pub fn reset_match(&mut self, keep_modifiers: bool) {
        lifecycle::reset(&mut self.state, &mut self.world, &self.tuning, keep_modifiers);
    }

    /// Hold or release a force preset
    pub fn set_force_preset(&mut self, id: EntityId, kind: Option<ForcePresetKind>) -> Result<(), CommandError> {
        let entity = self.state.entity_mut(id).ok_or(CommandError::UnknownEntity(id))?;
        forces::set_force_preset(entity, &mut self.world, &self.tuning.force_presets, kind);
        log::debug!("{} force preset: {:?}", entity.label, kind);
        Ok(())
    }

    /// `set_force_preset` by preset name (`"edge"`, `"center"`)
    pub fn set_force_preset_by_name(&mut self, id: EntityId, name: Option<&str>) -> Result<(), CommandError> {
        let kind = match name {
            Some(name) => Some(ForcePresetKind::from_name(name).ok_or_else(|| CommandError::UnknownPreset(name.to_string()))?),
            None => None,
        };
        self.set_force_preset(id, kind)
    }

    /// Adjust live stats in any phase; spin is clamped to the new ceiling
    pub fn apply_overrides(&mut self, id: EntityId, overrides: &StatOverrides) -> Result<(), CommandError> {
        let entity = self.state.entity_mut(id).ok_or(CommandError::UnknownEntity(id))?;
        let stats = entity.stats.merged(overrides);
        stats
            .validate()
            .map_err(|e| CommandError::InvalidStats(e.to_string()))?;

        entity.stats = stats;
        entity.clamp_spin();
        self.world.set_props(entity.body, stats.body_props());
        log::debug!("{} stats overridden", entity.label);
        Ok(())
    }

    /// Replace the persisted defaults a hard reset restores
    pub fn set_default_stats(&mut self, id: EntityId, stats: Stats) -> Result<(), CommandError> {
        stats
            .validate()
            .map_err(|e| CommandError::InvalidStats(e.to_string()))?;
        let entity = self.state.entity_mut(id).ok_or(CommandError::UnknownEntity(id))?;
        entity.default_stats = stats;
        Ok(())
    }

    /// Read-only view of every entity, in id order
    pub fn snapshot(&self) -> Vec<EntitySnapshot> {
        self.state
            .entities
            .iter()
            .map(|entity| {
                let body = self.world.body(entity.body);
                let position = body.map(|b| b.position).unwrap_or(entity.spawn);
                EntitySnapshot {
                    id: entity.id,
                    position,
                    height: self.arena.height_at(position.x, position.y),
                    angle: body.map(|b| b.angle).unwrap_or(0.0),
                    angular_velocity: body.map(|b| b.angular_velocity).unwrap_or(0.0),
                    current_spin: entity.current_spin(),
                    max_spin: entity.stats.max_spin,
                    is_dead: entity.is_dead(),
                    last_hit_critical: entity.last_hit_critical,
                    drift: entity.drift().copied(),
                }
            })
            .collect()
    }

    /// Take every event emitted since the last drain
    pub fn drain_events(&mut self) -> Vec<SimEvent> {
        std::mem::take(&mut self.state.events)
    }

    pub fn state(&self) -> &MatchState {
        &self.state
    }

    pub fn entity(&self, id: EntityId) -> Option<&Entity> {
        self.state.entity(id)
    }

    pub fn phase(&self) -> MatchPhase {
        self.state.phase
    }

    pub fn outcome(&self) -> Option<MatchOutcome> {
        self.state.outcome
    }

    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    pub fn arena(&self) -> &Arena {
        &self.arena
    }

    pub fn world(&self) -> &W {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut W {
        &mut self.world
    }
}
