//! Match lifecycle: launch, per-frame evaluation, death, win detection, reset
//!
//! ```text
//! PreLaunch --launch--> Active --one survivor / none--> GameOver
//!     ^                   |                                 |
//!     +------ reset ------+-------------- reset ------------+
//! ```
//!
//! Per entity: Idle --launch--> Alive --spin-out / ring-out--> Dead.

use std::f32::consts::TAU;

use glam::{Vec2, Vec3};

use super::arena::Arena;
use super::forces;
use super::rng::RandomSource;
use super::state::{DeathCause, Drift, Entity, EntityId, MatchOutcome, MatchPhase, MatchState, SimEvent, Vitality};
use super::world::RigidBodyWorld;
use crate::consts::DRIFT_SPIN_JITTER;
use crate::error::CommandError;
use crate::polar_to_cartesian;
use crate::tuning::Tuning;

/// Sign used when deriving angular velocity; zero counts as positive
#[inline]
fn spin_sign(angular_velocity: f32) -> f32 {
    if angular_velocity < 0.0 { -1.0 } else { 1.0 }
}

/// PreLaunch -> Active
///
/// The first entity launches along `player_angle`; every other entity gets a
/// uniformly random heading.
pub fn launch<W: RigidBodyWorld, R: RandomSource>(
    state: &mut MatchState,
    world: &mut W,
    tuning: &Tuning,
    rng: &mut R,
    player_angle: f32,
) -> Result<(), CommandError> {
    if state.phase != MatchPhase::PreLaunch {
        return Err(CommandError::WrongPhase {
            command: "launch",
            phase: state.phase,
        });
    }

    for (i, entity) in state.entities.iter_mut().enumerate() {
        let angle = if i == 0 { player_angle } else { rng.range(0.0, TAU) };
        let speed = entity.stats.launch_speed * tuning.launch_scale;

        world.set_props(entity.body, entity.stats.body_props());
        world.set_velocity(entity.body, polar_to_cartesian(speed, angle));

        let prior = world.body(entity.body).map(|b| b.angular_velocity).unwrap_or(0.0);
        let spin = entity.stats.max_spin;
        world.set_angular_velocity(
            entity.body,
            spin / tuning.spin_per_angular_velocity * spin_sign(prior),
        );

        entity.vitality = Vitality::Alive { spin };
        entity.match_start_stats = Some(entity.stats);
        entity.last_hit_critical = false;

        log::debug!("{} launched at {:.2} rad, speed {:.2}", entity.label, angle, speed);
    }

    state.phase = MatchPhase::Active;
    state.events.push(SimEvent::Launched { player_angle });
    log::info!("Match launched ({} entities)", state.entities.len());
    Ok(())
}

/// Post-substep pass: decay, spin-rate coupling, deaths, then win check
///
/// Death conditions are gathered for every entity before any death is
/// applied, so simultaneous deaths resolve the same regardless of order.
pub fn evaluate<W: RigidBodyWorld, R: RandomSource>(
    state: &mut MatchState,
    world: &mut W,
    arena: &Arena,
    tuning: &Tuning,
    rng: &mut R,
) {
    if state.phase != MatchPhase::Active {
        return;
    }

    let elapsed = tuning.frame_seconds();
    let mut dying: Vec<(usize, DeathCause)> = Vec::new();

    for (i, entity) in state.entities.iter_mut().enumerate() {
        if !entity.is_alive() {
            continue;
        }

        entity.drain_spin(entity.stats.stamina_decay * elapsed);

        let Some(body) = world.body(entity.body) else {
            continue;
        };
        let spin = entity.current_spin();
        world.set_angular_velocity(
            entity.body,
            spin / tuning.spin_per_angular_velocity * spin_sign(body.angular_velocity),
        );

        if spin <= 0.0 {
            dying.push((i, DeathCause::SpinOut));
        } else if arena.is_ring_out(body.position) {
            dying.push((i, DeathCause::RingOut));
        }
    }

    if dying.is_empty() {
        return;
    }

    for &(i, cause) in &dying {
        let event = kill(&mut state.entities[i], world, arena, tuning, rng, cause);
        state.events.push(event);
    }

    let survivors: Vec<EntityId> = state
        .entities
        .iter()
        .filter(|e| e.is_alive())
        .map(|e| e.id)
        .collect();

    let outcome = match survivors.as_slice() {
        [] => MatchOutcome::Draw,
        [winner] => MatchOutcome::Winner(*winner),
        _ => return,
    };

    state.phase = MatchPhase::GameOver;
    state.outcome = Some(outcome);
    match outcome {
        MatchOutcome::Winner(id) => {
            log::info!("Game over: {} wins", state.entities[id.0].label);
            state.events.push(SimEvent::Win { entity: id });
        }
        MatchOutcome::Draw => {
            log::info!("Game over: draw");
            state.events.push(SimEvent::Draw);
        }
    }
}

/// Alive -> Dead: capture drift, pull the body out of the world
fn kill<W: RigidBodyWorld, R: RandomSource>(
    entity: &mut Entity,
    world: &mut W,
    arena: &Arena,
    tuning: &Tuning,
    rng: &mut R,
    cause: DeathCause,
) -> SimEvent {
    let body = world.body(entity.body);
    let (pos, vel, angle) = body
        .map(|b| (b.position, b.velocity, b.angle))
        .unwrap_or((entity.spawn, Vec2::ZERO, 0.0));

    let rise = if vel.length() < tuning.drift_still_speed {
        // Too slow for the slope to say anything useful
        tuning.drift_min_rise + rng.next_f32() * tuning.drift_bias.max(tuning.drift_min_rise)
    } else {
        arena.vertical_rate(pos, vel) * tuning.drift_scale + tuning.drift_bias
    };

    let mut jitter = || (rng.next_f32() - 0.5) * DRIFT_SPIN_JITTER;
    let angular_drift = Vec3::new(jitter(), jitter(), jitter());

    let drift = Drift {
        position: Vec3::new(pos.x, arena.height_at(pos.x, pos.y), pos.y),
        velocity: Vec3::new(vel.x, rise.max(tuning.drift_min_rise), vel.y),
        angular_drift,
        rotation: Vec3::new(0.0, angle, 0.0),
    };

    world.clear_forces(entity.body);
    world.remove_body(entity.body);
    entity.vitality = Vitality::Dead { cause, drift };

    log::info!("{} eliminated ({:?})", entity.label, cause);
    SimEvent::Death {
        entity: entity.id,
        cause,
    }
}

/// Move every dead entity one reference tick along its drift
pub fn advance_drifts(state: &mut MatchState) {
    for entity in &mut state.entities {
        if let Vitality::Dead { drift, .. } = &mut entity.vitality {
            drift.advance();
        }
    }
}

/// Any phase -> PreLaunch
///
/// With `keep_modifiers` live stats return to the launch-time snapshot (or
/// stay as they are if the match never launched); otherwise they return to
/// the persisted defaults. Safe to call repeatedly.
pub fn reset<W: RigidBodyWorld>(state: &mut MatchState, world: &mut W, tuning: &Tuning, keep_modifiers: bool) {
    state.phase = MatchPhase::PreLaunch;
    state.outcome = None;
    state.frame = 0;
    state.events.clear();

    for entity in &mut state.entities {
        forces::set_force_preset(entity, world, &tuning.force_presets, None);

        entity.stats = if keep_modifiers {
            entity.match_start_stats.unwrap_or(entity.stats)
        } else {
            entity.default_stats
        };
        entity.match_start_stats = None;
        entity.vitality = Vitality::Idle;
        entity.last_hit_critical = false;

        world.remove_body(entity.body);
        world.add_body(entity.body);
        world.set_props(entity.body, entity.stats.body_props());
        world.set_position(entity.body, entity.spawn);
        world.set_velocity(entity.body, Vec2::ZERO);
        world.set_angular_velocity(entity.body, 0.0);
        world.set_angle(entity.body, 0.0);
        world.clear_forces(entity.body);
    }

    state.events.push(SimEvent::Reset { keep_modifiers });
    log::info!("Match reset (keep_modifiers={keep_modifiers})");
}
