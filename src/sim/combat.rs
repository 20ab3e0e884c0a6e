//! Collision-driven damage exchange
//!
//! Every collision start between two live entities trades damage both ways at
//! once. Both directions are computed from pre-hit values before either
//! defender is touched.

use glam::Vec2;

use super::rng::RandomSource;
use super::state::{EntityId, MatchPhase, MatchState, SimEvent};
use super::stats::Stats;
use super::world::{CollisionPair, RigidBodyWorld};
use crate::tuning::{CriticalRule, Tuning, WallRule};

/// One direction of a hit
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hit {
    pub critical: bool,
    /// Net damage after defense, never negative
    pub damage: f32,
}

/// Damage left after flat mitigation
#[inline]
pub fn net_damage(raw: f32, defense: f32) -> f32 {
    (raw - defense).max(0.0)
}

/// Judge whether an attacker's hit is critical under `rule`
///
/// Only the chance rule consumes a random draw.
pub fn is_critical<R: RandomSource>(
    rule: CriticalRule,
    attacker: &Stats,
    attacker_speed: f32,
    rng: &mut R,
) -> bool {
    match rule {
        CriticalRule::ImpactSpeed { threshold } => attacker_speed > threshold,
        CriticalRule::Chance => rng.next_f32() < attacker.critical_chance,
    }
}

/// Resolve one direction of a hit
pub fn resolve_hit(attacker: &Stats, defender: &Stats, critical: bool) -> Hit {
    let raw = if critical {
        attacker.critical_damage
    } else {
        attacker.attack
    };
    Hit {
        critical,
        damage: net_damage(raw, defender.defense),
    }
}

/// Apply damage for every collision start reported by a physics substep
pub fn resolve_collisions<W: RigidBodyWorld, R: RandomSource>(
    state: &mut MatchState,
    world: &W,
    pairs: &[CollisionPair],
    tuning: &Tuning,
    rng: &mut R,
) {
    if state.phase != MatchPhase::Active {
        return;
    }

    for pair in pairs {
        let point = contact_point(world, pair);
        match (state.index_of_body(pair.body_a), state.index_of_body(pair.body_b)) {
            (Some(a), Some(b)) => exchange(
                state,
                (a, pair.speed_a),
                (b, pair.speed_b),
                point,
                tuning.critical_rule,
                rng,
            ),
            (Some(idx), None) | (None, Some(idx)) => wall_hit(state, idx, point, tuning.wall_rule),
            (None, None) => {}
        }
    }
}

fn contact_point<W: RigidBodyWorld>(world: &W, pair: &CollisionPair) -> Vec2 {
    if let Some(p) = pair.contacts.first() {
        return *p;
    }
    match (world.body(pair.body_a), world.body(pair.body_b)) {
        (Some(a), Some(b)) => (a.position + b.position) * 0.5,
        (Some(a), None) => a.position,
        (None, Some(b)) => b.position,
        (None, None) => Vec2::ZERO,
    }
}

/// `a` and `b` pair an entity index with its speed going into the contact
fn exchange<R: RandomSource>(
    state: &mut MatchState,
    (a, speed_a): (usize, f32),
    (b, speed_b): (usize, f32),
    point: Vec2,
    rule: CriticalRule,
    rng: &mut R,
) {
    if a == b || !state.entities[a].is_alive() || !state.entities[b].is_alive() {
        return;
    }

    // Snapshot both sides before mutating either
    let stats_a = state.entities[a].stats;
    let stats_b = state.entities[b].stats;

    let crit_a = is_critical(rule, &stats_a, speed_a, rng);
    let crit_b = is_critical(rule, &stats_b, speed_b, rng);
    let hit_on_b = resolve_hit(&stats_a, &stats_b, crit_a);
    let hit_on_a = resolve_hit(&stats_b, &stats_a, crit_b);

    state.entities[b].drain_spin(hit_on_b.damage);
    state.entities[a].drain_spin(hit_on_a.damage);
    state.entities[a].last_hit_critical = hit_on_b.critical;
    state.entities[b].last_hit_critical = hit_on_a.critical;

    log::debug!(
        "hit {} -> {}: {:.1}{} | {} -> {}: {:.1}{}",
        state.entities[a].label,
        state.entities[b].label,
        hit_on_b.damage,
        if hit_on_b.critical { " (crit)" } else { "" },
        state.entities[b].label,
        state.entities[a].label,
        hit_on_a.damage,
        if hit_on_a.critical { " (crit)" } else { "" },
    );

    let (id_a, id_b) = (EntityId(a), EntityId(b));
    let color_a = state.entities[a].color_key.clone();
    let color_b = state.entities[b].color_key.clone();
    state.events.push(SimEvent::Collision {
        attacker: id_a,
        defender: id_b,
        point,
        critical: hit_on_b.critical,
        damage: hit_on_b.damage,
        attacker_color: color_a,
    });
    state.events.push(SimEvent::Collision {
        attacker: id_b,
        defender: id_a,
        point,
        critical: hit_on_a.critical,
        damage: hit_on_a.damage,
        attacker_color: color_b,
    });
}

fn wall_hit(state: &mut MatchState, idx: usize, point: Vec2, rule: WallRule) {
    let entity = &mut state.entities[idx];
    if !entity.is_alive() {
        return;
    }
    let damage = match rule {
        WallRule::Cosmetic => 0.0,
        WallRule::Barrier { damage } => entity.drain_spin(damage),
    };
    state.events.push(SimEvent::WallHit {
        entity: entity.id,
        point,
        damage,
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::rng::SequenceSource;
    use crate::sim::state::{Entity, Vitality};
    use crate::consts::FRAME_MS;
    use crate::sim::world::{BodyHandle, BodyProps, SimpleWorld};

    fn stats(attack: f32, defense: f32) -> Stats {
        Stats {
            attack,
            defense,
            critical_damage: 180.0,
            ..Default::default()
        }
    }

    fn setup(a: Stats, b: Stats) -> (MatchState, SimpleWorld) {
        let mut world = SimpleWorld::with_ring_wall(300.0, 16, BodyProps::default());
        let ha = world.create_circle(Vec2::new(0.0, 10.0), 25.0, a.body_props());
        let hb = world.create_circle(Vec2::new(0.0, -10.0), 25.0, b.body_props());
        world.add_body(ha);
        world.add_body(hb);
        let mut ea = Entity::new(EntityId(0), "a", "cyan", ha, Vec2::ZERO, 25.0, a);
        let mut eb = Entity::new(EntityId(1), "b", "magenta", hb, Vec2::ZERO, 25.0, b);
        ea.vitality = Vitality::Alive { spin: 1000.0 };
        eb.vitality = Vitality::Alive { spin: 1000.0 };
        let mut state = MatchState::new(vec![ea, eb]);
        state.phase = MatchPhase::Active;
        (state, world)
    }

    fn pair(state: &MatchState) -> CollisionPair {
        CollisionPair {
            body_a: state.entities[0].body,
            body_b: state.entities[1].body,
            contacts: vec![Vec2::ZERO],
            speed_a: 0.0,
            speed_b: 0.0,
        }
    }

    #[test]
    fn test_damage_law() {
        let hit = resolve_hit(&stats(90.0, 0.0), &stats(0.0, 50.0), false);
        assert_eq!(hit.damage, 40.0);
        let hit = resolve_hit(&stats(90.0, 0.0), &stats(0.0, 120.0), false);
        assert_eq!(hit.damage, 0.0);
    }

    #[test]
    fn test_critical_law() {
        let hit = resolve_hit(&stats(90.0, 0.0), &stats(0.0, 50.0), true);
        assert!(hit.critical);
        assert_eq!(hit.damage, 130.0);
    }

    #[test]
    fn test_impact_speed_rule() {
        let rule = CriticalRule::ImpactSpeed { threshold: 8.0 };
        let mut rng = SequenceSource::new(vec![0.0]);
        assert!(!is_critical(rule, &Stats::default(), 8.0, &mut rng));
        assert!(is_critical(rule, &Stats::default(), 8.5, &mut rng));
    }

    #[test]
    fn test_chance_rule() {
        let attacker = Stats {
            critical_chance: 0.5,
            ..Default::default()
        };
        let mut rng = SequenceSource::new(vec![0.2, 0.7]);
        assert!(is_critical(CriticalRule::Chance, &attacker, 0.0, &mut rng));
        assert!(!is_critical(CriticalRule::Chance, &attacker, 0.0, &mut rng));
    }

    #[test]
    fn test_symmetric_exchange_uses_pre_hit_values() {
        let (mut state, world) = setup(stats(90.0, 50.0), stats(120.0, 30.0));
        let tuning = Tuning::default();
        let mut rng = SequenceSource::new(vec![0.9]);
        let pairs = [pair(&state)];
        resolve_collisions(&mut state, &world, &pairs, &tuning, &mut rng);

        // a deals 90 - 30 = 60, b deals 120 - 50 = 70
        assert_eq!(state.entities[1].current_spin(), 940.0);
        assert_eq!(state.entities[0].current_spin(), 930.0);

        let collisions: Vec<_> = state
            .events
            .iter()
            .filter(|e| matches!(e, SimEvent::Collision { .. }))
            .collect();
        assert_eq!(collisions.len(), 2);
        assert!(matches!(
            collisions[0],
            SimEvent::Collision { attacker: EntityId(0), attacker_color, damage, .. }
                if attacker_color == "cyan" && *damage == 60.0
        ));
    }

    #[test]
    fn test_lethal_exchange_still_hits_back() {
        let (mut state, world) = setup(stats(90.0, 0.0), stats(90.0, 0.0));
        state.entities[0].vitality = Vitality::Alive { spin: 10.0 };
        let tuning = Tuning::default();
        let mut rng = SequenceSource::default();
        let pairs = [pair(&state)];
        resolve_collisions(&mut state, &world, &pairs, &tuning, &mut rng);
        assert_eq!(state.entities[0].current_spin(), 0.0);
        assert_eq!(state.entities[1].current_spin(), 910.0);
    }

    #[test]
    fn test_no_damage_outside_active() {
        let (mut state, world) = setup(stats(90.0, 0.0), stats(90.0, 0.0));
        state.phase = MatchPhase::PreLaunch;
        let mut rng = SequenceSource::default();
        let pairs = [pair(&state)];
        resolve_collisions(&mut state, &world, &pairs, &Tuning::default(), &mut rng);
        assert_eq!(state.entities[0].current_spin(), 1000.0);
        assert!(state.events.is_empty());
    }

    #[test]
    fn test_wall_rules() {
        let (mut state, world) = setup(Stats::default(), Stats::default());
        let wall = world.walls()[0];
        let wall_pair = CollisionPair {
            body_a: wall,
            body_b: state.entities[0].body,
            contacts: vec![Vec2::new(300.0, 0.0)],
            speed_a: 0.0,
            speed_b: 0.0,
        };
        let mut rng = SequenceSource::default();

        let cosmetic = Tuning::default();
        resolve_collisions(&mut state, &world, &[wall_pair.clone()], &cosmetic, &mut rng);
        assert_eq!(state.entities[0].current_spin(), 1000.0);
        assert_eq!(
            state.events.last(),
            Some(&SimEvent::WallHit {
                entity: EntityId(0),
                point: Vec2::new(300.0, 0.0),
                damage: 0.0
            })
        );

        let barrier = Tuning {
            wall_rule: WallRule::Barrier { damage: 25.0 },
            ..Default::default()
        };
        resolve_collisions(&mut state, &world, &[wall_pair], &barrier, &mut rng);
        assert_eq!(state.entities[0].current_spin(), 975.0);
    }

    #[test]
    fn test_impact_speed_judged_before_bounce() {
        let a = stats(90.0, 50.0);
        let b = stats(90.0, 50.0);
        let mut world = SimpleWorld::new();
        let ha = world.create_circle(Vec2::ZERO, 25.0, BodyProps { friction_air: 0.0, ..a.body_props() });
        let hb = world.create_circle(Vec2::new(60.0, 0.0), 25.0, BodyProps { friction_air: 0.0, ..b.body_props() });
        world.add_body(ha);
        world.add_body(hb);
        world.set_velocity(ha, Vec2::new(9.5, 0.0));

        let mut ea = Entity::new(EntityId(0), "a", "cyan", ha, Vec2::ZERO, 25.0, a);
        let mut eb = Entity::new(EntityId(1), "b", "magenta", hb, Vec2::ZERO, 25.0, b);
        ea.vitality = Vitality::Alive { spin: 1000.0 };
        eb.vitality = Vitality::Alive { spin: 1000.0 };
        let mut state = MatchState::new(vec![ea, eb]);
        state.phase = MatchPhase::Active;

        let tuning = Tuning::default();
        let mut rng = SequenceSource::default();
        let mut pairs = Vec::new();
        for _ in 0..16 {
            pairs = world.step(FRAME_MS / 8.0);
            if !pairs.is_empty() {
                break;
            }
        }
        assert_eq!(pairs.len(), 1);
        // The bounce has already swapped momentum
        assert!(world.body(hb).unwrap().speed() > 8.0);
        resolve_collisions(&mut state, &world, &pairs, &tuning, &mut rng);

        // Fast attacker crits (180 - 50), the struck body does not (90 - 50)
        assert_eq!(state.entities[1].current_spin(), 870.0);
        assert_eq!(state.entities[0].current_spin(), 960.0);
        assert!(state.entities[0].last_hit_critical);
        assert!(!state.entities[1].last_hit_critical);
        assert!(state.events.iter().any(|e| matches!(
            e,
            SimEvent::Collision { attacker: EntityId(0), critical: true, damage, .. } if *damage == 130.0
        )));
    }

    #[test]
    fn test_unknown_pair_ignored() {
        let (mut state, world) = setup(Stats::default(), Stats::default());
        let stray = CollisionPair {
            body_a: BodyHandle(900),
            body_b: BodyHandle(901),
            contacts: vec![],
            speed_a: 0.0,
            speed_b: 0.0,
        };
        let mut rng = SequenceSource::default();
        resolve_collisions(&mut state, &world, &[stray], &Tuning::default(), &mut rng);
        assert!(state.events.is_empty());
    }
}
