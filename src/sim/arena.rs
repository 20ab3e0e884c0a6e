//! Bowl-shaped arena geometry
//!
//! The floor is a paraboloid `h = k * (x² + z²)` with `k = H / R²`, flattened
//! into a rim beyond the arena radius. Planar positions use the physics
//! world's (x, y) as the bowl's (x, z).

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, check_positive};

/// Static arena description
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Arena {
    /// Bowl radius `R`
    pub radius: f32,
    /// Bowl height at the rim `H`
    pub max_height: f32,
    /// Planar distance beyond which an entity is rung out
    pub ring_out_radius: f32,
}

impl Arena {
    /// Build an arena, rejecting degenerate dimensions
    pub fn new(radius: f32, max_height: f32, ring_out_radius: f32) -> Result<Self, ConfigError> {
        check_positive("arena_radius", radius)?;
        check_positive("bowl_height", max_height)?;
        if !ring_out_radius.is_finite() || ring_out_radius <= radius {
            return Err(ConfigError::RingOutInsideArena {
                radius,
                ring_out: ring_out_radius,
            });
        }
        Ok(Self {
            radius,
            max_height,
            ring_out_radius,
        })
    }

    /// Paraboloid coefficient `k = H / R²`
    #[inline]
    pub fn curvature(&self) -> f32 {
        self.max_height / (self.radius * self.radius)
    }

    /// Bowl height at planar position (x, z); flat rim past `R`
    pub fn height_at(&self, x: f32, z: f32) -> f32 {
        let dist = (x * x + z * z).sqrt().clamp(0.0, self.radius);
        let t = dist / self.radius;
        t * t * self.max_height
    }

    /// Unit surface normal of the paraboloid at (x, z)
    pub fn normal_at(&self, x: f32, z: f32) -> Vec3 {
        let k = self.curvature();
        Vec3::new(-2.0 * k * x, 1.0, -2.0 * k * z).normalize()
    }

    /// Rate of height change when moving with planar velocity `vel` from `pos`
    pub fn vertical_rate(&self, pos: Vec2, vel: Vec2) -> f32 {
        let k = self.curvature();
        2.0 * k * pos.x * vel.x + 2.0 * k * pos.y * vel.y
    }

    /// True once `pos` lies strictly outside the ring-out radius
    #[inline]
    pub fn is_ring_out(&self, pos: Vec2) -> bool {
        pos.length() > self.ring_out_radius
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn arena() -> Arena {
        Arena::new(300.0, 60.0, 350.0).unwrap()
    }

    #[test]
    fn test_height_parabolic() {
        let a = arena();
        assert_eq!(a.height_at(0.0, 0.0), 0.0);
        assert!((a.height_at(150.0, 0.0) - 15.0).abs() < 1e-4);
        assert!((a.height_at(300.0, 0.0) - 60.0).abs() < 1e-4);
    }

    #[test]
    fn test_height_flat_rim() {
        let a = arena();
        assert_eq!(a.height_at(500.0, 0.0), a.height_at(0.0, 300.0));
    }

    #[test]
    fn test_normal_points_up_and_inward() {
        let a = arena();
        let n = a.normal_at(100.0, 0.0);
        assert!((n.length() - 1.0).abs() < 1e-5);
        assert!(n.y > 0.0);
        assert!(n.x < 0.0);
        assert_eq!(a.normal_at(0.0, 0.0), Vec3::Y);
    }

    #[test]
    fn test_ring_out() {
        let a = arena();
        assert!(!a.is_ring_out(Vec2::new(350.0, 0.0)));
        assert!(a.is_ring_out(Vec2::new(0.0, -360.0)));
    }

    #[test]
    fn test_rejects_bad_dimensions() {
        assert!(Arena::new(0.0, 60.0, 50.0).is_err());
        assert!(Arena::new(300.0, -1.0, 350.0).is_err());
        assert!(matches!(
            Arena::new(300.0, 60.0, 250.0),
            Err(ConfigError::RingOutInsideArena { .. })
        ));
    }
}
