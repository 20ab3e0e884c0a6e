//! Arena force field
//!
//! Two forces model the bowl: a radial "dish" pull toward the center and a
//! clockwise tangential "curl" swirl that fades out toward the rim. Both scale
//! with body mass and per-entity multipliers.

use glam::Vec2;

use super::state::{BoostState, Entity, MatchPhase, MatchState};
use super::stats::{ForcePreset, ForcePresetKind, ForcePresets};
use super::world::RigidBodyWorld;

/// Combined dish + curl force for a body at `pos`
///
/// Returns `Vec2::ZERO` at the exact center, where both directions are
/// undefined.
pub fn arena_force(
    pos: Vec2,
    mass: f32,
    dish_multiplier: f32,
    curl_multiplier: f32,
    force_constant: f32,
    arena_radius: f32,
) -> Vec2 {
    let dist = pos.length();
    if dist <= 0.0 {
        return Vec2::ZERO;
    }

    let inward = -pos / dist;
    let tangent = Vec2::new(inward.y, -inward.x);

    let dish = force_constant * mass * dist * dish_multiplier;
    // No slope beyond the rim, so no swirl there
    let curl = force_constant * mass * (1.0 - dist / arena_radius).max(0.0) * curl_multiplier;

    inward * dish + tangent * curl
}

/// Apply the field to every live entity for one substep
pub fn apply_arena_forces<W: RigidBodyWorld>(
    state: &MatchState,
    world: &mut W,
    force_constant: f32,
    arena_radius: f32,
) {
    if state.phase != MatchPhase::Active {
        return;
    }

    for entity in state.entities.iter().filter(|e| e.is_alive()) {
        let Some(body) = world.body(entity.body) else {
            continue;
        };
        let force = arena_force(
            body.position,
            body.mass,
            entity.stats.dish_force_multiplier,
            entity.stats.curl_force_multiplier,
            force_constant,
            arena_radius,
        );
        if force != Vec2::ZERO {
            world.apply_force(entity.body, body.position, force);
        }
    }
}

/// Switch an entity onto a named preset, or back off it with `None`
///
/// The multipliers and drag in effect before the first preset are saved and
/// restored on release. Switching directly between presets keeps the
/// original saved values.
pub fn set_force_preset<W: RigidBodyWorld>(
    entity: &mut Entity,
    world: &mut W,
    presets: &ForcePresets,
    kind: Option<ForcePresetKind>,
) {
    match kind {
        Some(kind) => {
            let saved = match entity.boost {
                Some(active) => active.saved,
                None => ForcePreset {
                    dish: entity.stats.dish_force_multiplier,
                    curl: entity.stats.curl_force_multiplier,
                    drag: entity.stats.friction_air,
                },
            };
            let preset = presets.get(kind);
            entity.stats.dish_force_multiplier = preset.dish;
            entity.stats.curl_force_multiplier = preset.curl;
            entity.stats.friction_air = preset.drag;
            world.set_friction_air(entity.body, preset.drag);
            entity.boost = Some(BoostState { kind, saved });
        }
        None => {
            if let Some(active) = entity.boost.take() {
                entity.stats.dish_force_multiplier = active.saved.dish;
                entity.stats.curl_force_multiplier = active.saved.curl;
                entity.stats.friction_air = active.saved.drag;
                world.set_friction_air(entity.body, active.saved.drag);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::{EntityId, Vitality};
    use crate::sim::stats::Stats;
    use crate::sim::world::{BodyProps, SimpleWorld};

    const K: f32 = 2e-5;

    #[test]
    fn test_zero_force_at_center() {
        assert_eq!(arena_force(Vec2::ZERO, 5.0, 1.0, 1.0, K, 300.0), Vec2::ZERO);
    }

    #[test]
    fn test_dish_points_inward() {
        let f = arena_force(Vec2::new(100.0, 0.0), 2.0, 1.0, 0.0, K, 300.0);
        assert!(f.x < 0.0);
        assert!(f.y.abs() < 1e-12);
        assert!((f.x + K * 2.0 * 100.0).abs() < 1e-7);
    }

    #[test]
    fn test_curl_is_clockwise_tangent() {
        // At (100, 0) the inward radial is (-1, 0); tangent (radialY, -radialX) = (0, 1)
        let f = arena_force(Vec2::new(100.0, 0.0), 2.0, 0.0, 1.0, K, 300.0);
        assert!(f.x.abs() < 1e-12);
        let expected = K * 2.0 * (1.0 - 100.0 / 300.0);
        assert!((f.y - expected).abs() < 1e-9);
    }

    #[test]
    fn test_curl_vanishes_past_rim() {
        let f = arena_force(Vec2::new(320.0, 0.0), 2.0, 0.0, 1.0, K, 300.0);
        assert_eq!(f, Vec2::ZERO);
    }

    #[test]
    fn test_apply_skips_center_and_inactive() {
        let mut world = SimpleWorld::new();
        let body = world.create_circle(Vec2::ZERO, 25.0, BodyProps::default());
        world.add_body(body);
        let mut entity = Entity::new(EntityId(0), "p", "cyan", body, Vec2::ZERO, 25.0, Stats::default());
        entity.vitality = Vitality::Alive { spin: 100.0 };
        let mut state = MatchState::new(vec![entity]);

        // Not active yet: nothing applied even off-center
        world.set_position(body, Vec2::new(100.0, 0.0));
        apply_arena_forces(&state, &mut world, K, 300.0);
        world.step(2.0);
        assert_eq!(world.body(body).unwrap().velocity, Vec2::ZERO);

        // Active at the exact center: guarded, still nothing
        state.phase = MatchPhase::Active;
        world.set_position(body, Vec2::ZERO);
        apply_arena_forces(&state, &mut world, K, 300.0);
        world.step(2.0);
        assert_eq!(world.body(body).unwrap().velocity, Vec2::ZERO);

        // Active off-center: pulled inward
        world.set_position(body, Vec2::new(100.0, 0.0));
        apply_arena_forces(&state, &mut world, K, 300.0);
        world.step(2.0);
        assert!(world.body(body).unwrap().velocity.x < 0.0);
    }

    #[test]
    fn test_preset_apply_and_revert() {
        let mut world = SimpleWorld::new();
        let body = world.create_circle(Vec2::ZERO, 25.0, BodyProps::default());
        let mut entity = Entity::new(EntityId(0), "p", "cyan", body, Vec2::ZERO, 25.0, Stats::default());
        let presets = ForcePresets::default();
        let original = entity.stats;

        set_force_preset(&mut entity, &mut world, &presets, Some(ForcePresetKind::Edge));
        assert_eq!(entity.stats.curl_force_multiplier, presets.edge.curl);
        assert_eq!(entity.stats.friction_air, presets.edge.drag);

        set_force_preset(&mut entity, &mut world, &presets, Some(ForcePresetKind::Center));
        assert_eq!(entity.stats.dish_force_multiplier, presets.center.dish);

        set_force_preset(&mut entity, &mut world, &presets, None);
        assert_eq!(entity.stats, original);
        assert!(entity.boost.is_none());

        // Releasing with nothing held is a no-op
        set_force_preset(&mut entity, &mut world, &presets, None);
        assert_eq!(entity.stats, original);
    }
}
