//! Rigid-body world seam
//!
//! The match logic drives physics only through `RigidBodyWorld`, so any
//! solver that offers circle bodies, static walls and collision-start events
//! can sit underneath it. `SimpleWorld` is the deterministic implementation
//! used by tests and the headless runner.
//!
//! Units follow a fixed-tick convention: velocities are distance per reference
//! tick (`FRAME_MS`), angular velocity is radians per reference tick, and a
//! force `F` changes velocity by `F / m * dt_ms²` per step.

use std::collections::BTreeSet;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::contact::{ContactResult, circle_circle_contact, circle_segment_contact, ring_segments};
use crate::consts::FRAME_MS;
use crate::normalize_angle;

/// Opaque body identifier issued by the world
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct BodyHandle(pub u32);

/// Physical material of a body
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BodyProps {
    pub density: f32,
    pub friction_air: f32,
    pub restitution: f32,
    pub friction: f32,
}

impl Default for BodyProps {
    fn default() -> Self {
        Self {
            density: 0.001,
            friction_air: 0.01,
            restitution: 0.8,
            friction: 0.05,
        }
    }
}

/// Read-only kinematic view of a body
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodyState {
    pub position: Vec2,
    pub velocity: Vec2,
    pub angle: f32,
    pub angular_velocity: f32,
    pub mass: f32,
}

impl BodyState {
    #[inline]
    pub fn speed(&self) -> f32 {
        self.velocity.length()
    }
}

/// Two bodies that started touching during a step
#[derive(Debug, Clone, PartialEq)]
pub struct CollisionPair {
    pub body_a: BodyHandle,
    pub body_b: BodyHandle,
    pub contacts: Vec<Vec2>,
    /// Speed of `body_a` going into the contact, before any impulse
    pub speed_a: f32,
    /// Speed of `body_b` going into the contact, before any impulse
    pub speed_b: f32,
}

/// Everything the simulation needs from a rigid-body solver
pub trait RigidBodyWorld {
    /// Create a dynamic circle. It does not take part in stepping until added.
    fn create_circle(&mut self, position: Vec2, radius: f32, props: BodyProps) -> BodyHandle;
    /// Add a body to the world; no-op if already present
    fn add_body(&mut self, handle: BodyHandle);
    /// Remove a body from the world; no-op if absent
    fn remove_body(&mut self, handle: BodyHandle);
    fn contains(&self, handle: BodyHandle) -> bool;
    /// Current state of a body, whether or not it is in the world
    fn body(&self, handle: BodyHandle) -> Option<BodyState>;

    fn set_position(&mut self, handle: BodyHandle, position: Vec2);
    fn set_velocity(&mut self, handle: BodyHandle, velocity: Vec2);
    fn set_angle(&mut self, handle: BodyHandle, angle: f32);
    fn set_angular_velocity(&mut self, handle: BodyHandle, angular_velocity: f32);
    fn set_friction_air(&mut self, handle: BodyHandle, friction_air: f32);
    /// Replace the body's material (mass follows the new density)
    fn set_props(&mut self, handle: BodyHandle, props: BodyProps);

    /// Accumulate a force applied at world-space `point`
    fn apply_force(&mut self, handle: BodyHandle, point: Vec2, force: Vec2);
    /// Drop accumulated force and torque
    fn clear_forces(&mut self, handle: BodyHandle);

    /// Advance by `dt_ms`, returning pairs that began touching this step
    fn step(&mut self, dt_ms: f32) -> Vec<CollisionPair>;
}

#[derive(Debug, Clone, Copy)]
enum Shape {
    Circle { radius: f32 },
    Segment { start: Vec2, end: Vec2 },
}

#[derive(Debug, Clone, Copy)]
struct Body {
    shape: Shape,
    position: Vec2,
    velocity: Vec2,
    angle: f32,
    angular_velocity: f32,
    props: BodyProps,
    mass: f32,
    inv_mass: f32,
    inv_inertia: f32,
    force: Vec2,
    torque: f32,
    in_world: bool,
}

impl Body {
    fn circle(position: Vec2, radius: f32, props: BodyProps) -> Self {
        let mut body = Self {
            shape: Shape::Circle { radius },
            position,
            velocity: Vec2::ZERO,
            angle: 0.0,
            angular_velocity: 0.0,
            props,
            mass: 0.0,
            inv_mass: 0.0,
            inv_inertia: 0.0,
            force: Vec2::ZERO,
            torque: 0.0,
            in_world: false,
        };
        body.update_mass();
        body
    }

    fn segment(start: Vec2, end: Vec2, props: BodyProps) -> Self {
        Self {
            shape: Shape::Segment { start, end },
            position: (start + end) * 0.5,
            velocity: Vec2::ZERO,
            angle: 0.0,
            angular_velocity: 0.0,
            props,
            mass: f32::INFINITY,
            inv_mass: 0.0,
            inv_inertia: 0.0,
            force: Vec2::ZERO,
            torque: 0.0,
            in_world: true,
        }
    }

    fn update_mass(&mut self) {
        if let Shape::Circle { radius } = self.shape {
            self.mass = (self.props.density * std::f32::consts::PI * radius * radius).max(1e-6);
            self.inv_mass = 1.0 / self.mass;
            self.inv_inertia = 1.0 / (0.5 * self.mass * radius * radius).max(1e-6);
        }
    }

    fn is_static(&self) -> bool {
        self.inv_mass == 0.0
    }
}

/// Small deterministic circle-and-wall solver
#[derive(Debug, Clone, Default)]
pub struct SimpleWorld {
    bodies: Vec<Body>,
    walls: Vec<BodyHandle>,
    /// Pairs touching at the end of the previous step
    touching: BTreeSet<(BodyHandle, BodyHandle)>,
}

impl SimpleWorld {
    pub fn new() -> Self {
        Self::default()
    }

    /// World with a closed ring of static walls at `radius`
    pub fn with_ring_wall(radius: f32, segments: usize, props: BodyProps) -> Self {
        let mut world = Self::new();
        for (start, end) in ring_segments(radius, segments) {
            world.add_wall(start, end, props);
        }
        world
    }

    /// Add a static wall segment (always part of the world)
    pub fn add_wall(&mut self, start: Vec2, end: Vec2, props: BodyProps) -> BodyHandle {
        let handle = BodyHandle(self.bodies.len() as u32);
        self.bodies.push(Body::segment(start, end, props));
        self.walls.push(handle);
        handle
    }

    pub fn walls(&self) -> &[BodyHandle] {
        &self.walls
    }

    fn get_mut(&mut self, handle: BodyHandle) -> Option<&mut Body> {
        self.bodies.get_mut(handle.0 as usize)
    }

    fn integrate(&mut self, dt_ms: f32) {
        let scale = dt_ms / FRAME_MS;
        let dt_sq = dt_ms * dt_ms;

        for body in self.bodies.iter_mut().filter(|b| b.in_world && !b.is_static()) {
            body.velocity += body.force * body.inv_mass * dt_sq;
            body.velocity *= (1.0 - body.props.friction_air * scale).max(0.0);
            body.angular_velocity += body.torque * body.inv_inertia * dt_sq;

            body.position += body.velocity * scale;
            body.angle = normalize_angle(body.angle + body.angular_velocity * scale);

            body.force = Vec2::ZERO;
            body.torque = 0.0;
        }
    }

    fn detect(&self, ia: usize, ib: usize) -> Option<(usize, usize, ContactResult)> {
        let a = &self.bodies[ia];
        let b = &self.bodies[ib];
        let result = match (a.shape, b.shape) {
            (Shape::Circle { radius: ra }, Shape::Circle { radius: rb }) => {
                return Some((ia, ib, circle_circle_contact(a.position, ra, b.position, rb)));
            }
            (Shape::Circle { radius }, Shape::Segment { start, end }) => {
                (ia, ib, circle_segment_contact(a.position, radius, start, end))
            }
            (Shape::Segment { start, end }, Shape::Circle { radius }) => {
                (ib, ia, circle_segment_contact(b.position, radius, start, end))
            }
            (Shape::Segment { .. }, Shape::Segment { .. }) => return None,
        };
        Some(result)
    }

    /// Separate the pair and exchange impulses. `contact.normal` points toward `ia`.
    fn resolve(&mut self, ia: usize, ib: usize, contact: &ContactResult) {
        let mut a = self.bodies[ia];
        let mut b = self.bodies[ib];
        let inv_sum = a.inv_mass + b.inv_mass;
        if inv_sum <= 0.0 {
            return;
        }
        let n = contact.normal;

        a.position += n * contact.penetration * (a.inv_mass / inv_sum);
        b.position -= n * contact.penetration * (b.inv_mass / inv_sum);

        let v_rel_n = (a.velocity - b.velocity).dot(n);
        if v_rel_n < 0.0 {
            let restitution = a.props.restitution.max(b.props.restitution);
            let j = -(1.0 + restitution) * v_rel_n / inv_sum;
            a.velocity += n * j * a.inv_mass;
            b.velocity -= n * j * b.inv_mass;

            let tangent = n.perp();
            let v_rel_t = (a.velocity - b.velocity).dot(tangent);
            let mu = a.props.friction.min(b.props.friction);
            let jt = (-v_rel_t / inv_sum).clamp(-mu * j, mu * j);
            a.velocity += tangent * jt * a.inv_mass;
            b.velocity -= tangent * jt * b.inv_mass;
        }

        self.bodies[ia] = a;
        self.bodies[ib] = b;
    }
}

impl RigidBodyWorld for SimpleWorld {
    fn create_circle(&mut self, position: Vec2, radius: f32, props: BodyProps) -> BodyHandle {
        let handle = BodyHandle(self.bodies.len() as u32);
        self.bodies.push(Body::circle(position, radius, props));
        handle
    }

    fn add_body(&mut self, handle: BodyHandle) {
        if let Some(body) = self.get_mut(handle) {
            body.in_world = true;
        }
    }

    fn remove_body(&mut self, handle: BodyHandle) {
        if let Some(body) = self.get_mut(handle) {
            if !body.is_static() {
                body.in_world = false;
            }
        }
        self.touching.retain(|(a, b)| *a != handle && *b != handle);
    }

    fn contains(&self, handle: BodyHandle) -> bool {
        self.bodies
            .get(handle.0 as usize)
            .map(|b| b.in_world)
            .unwrap_or(false)
    }

    fn body(&self, handle: BodyHandle) -> Option<BodyState> {
        self.bodies.get(handle.0 as usize).map(|b| BodyState {
            position: b.position,
            velocity: b.velocity,
            angle: b.angle,
            angular_velocity: b.angular_velocity,
            mass: b.mass,
        })
    }

    fn set_position(&mut self, handle: BodyHandle, position: Vec2) {
        if let Some(body) = self.get_mut(handle) {
            body.position = position;
        }
    }

    fn set_velocity(&mut self, handle: BodyHandle, velocity: Vec2) {
        if let Some(body) = self.get_mut(handle) {
            body.velocity = velocity;
        }
    }

    fn set_angle(&mut self, handle: BodyHandle, angle: f32) {
        if let Some(body) = self.get_mut(handle) {
            body.angle = angle;
        }
    }

    fn set_angular_velocity(&mut self, handle: BodyHandle, angular_velocity: f32) {
        if let Some(body) = self.get_mut(handle) {
            body.angular_velocity = angular_velocity;
        }
    }

    fn set_friction_air(&mut self, handle: BodyHandle, friction_air: f32) {
        if let Some(body) = self.get_mut(handle) {
            body.props.friction_air = friction_air;
        }
    }

    fn set_props(&mut self, handle: BodyHandle, props: BodyProps) {
        if let Some(body) = self.get_mut(handle) {
            body.props = props;
            body.update_mass();
        }
    }

    fn apply_force(&mut self, handle: BodyHandle, point: Vec2, force: Vec2) {
        if let Some(body) = self.get_mut(handle) {
            body.force += force;
            body.torque += (point - body.position).perp_dot(force);
        }
    }

    fn clear_forces(&mut self, handle: BodyHandle) {
        if let Some(body) = self.get_mut(handle) {
            body.force = Vec2::ZERO;
            body.torque = 0.0;
        }
    }

    fn step(&mut self, dt_ms: f32) -> Vec<CollisionPair> {
        self.integrate(dt_ms);

        let live: Vec<usize> = (0..self.bodies.len())
            .filter(|&i| self.bodies[i].in_world)
            .collect();

        let mut touching_now = BTreeSet::new();
        let mut started = Vec::new();

        for (n, &i) in live.iter().enumerate() {
            for &j in &live[n + 1..] {
                let Some((ia, ib, contact)) = self.detect(i, j) else {
                    continue;
                };
                if !contact.hit {
                    continue;
                }
                let speed_a = self.bodies[i].velocity.length();
                let speed_b = self.bodies[j].velocity.length();
                self.resolve(ia, ib, &contact);

                let (ha, hb) = (BodyHandle(i as u32), BodyHandle(j as u32));
                let key = (ha.min(hb), ha.max(hb));
                touching_now.insert(key);
                if !self.touching.contains(&key) {
                    started.push(CollisionPair {
                        body_a: ha,
                        body_b: hb,
                        contacts: vec![contact.point],
                        speed_a,
                        speed_b,
                    });
                }
            }
        }

        self.touching = touching_now;
        started
    }
}
