//! Contact detection for circles and static wall segments
//!
//! Narrow-phase helpers used by `SimpleWorld`. Normals always point from the
//! other shape toward the first circle, so pushing the circle along the
//! normal separates the pair.

use glam::Vec2;

use crate::polar_to_cartesian;

/// Result of a contact check
#[derive(Debug, Clone)]
pub struct ContactResult {
    /// Whether the shapes overlap
    pub hit: bool,
    /// Contact point (if hit)
    pub point: Vec2,
    /// Separation normal pointing toward the first circle
    pub normal: Vec2,
    /// Penetration depth (for position correction)
    pub penetration: f32,
}

impl ContactResult {
    pub fn miss() -> Self {
        Self {
            hit: false,
            point: Vec2::ZERO,
            normal: Vec2::ZERO,
            penetration: 0.0,
        }
    }
}

/// Check overlap between circle `a` and circle `b`
///
/// Coincident centers separate along +X so the pair can still be pushed apart.
pub fn circle_circle_contact(pos_a: Vec2, radius_a: f32, pos_b: Vec2, radius_b: f32) -> ContactResult {
    let delta = pos_a - pos_b;
    let dist = delta.length();
    let min_dist = radius_a + radius_b;

    if dist >= min_dist {
        return ContactResult::miss();
    }

    let normal = if dist > 1e-6 { delta / dist } else { Vec2::X };
    ContactResult {
        hit: true,
        point: pos_b + normal * radius_b,
        normal,
        penetration: min_dist - dist,
    }
}

/// Check overlap between a circle and the segment `start..end`
pub fn circle_segment_contact(pos: Vec2, radius: f32, start: Vec2, end: Vec2) -> ContactResult {
    let line_vec = end - start;
    let line_len_sq = line_vec.length_squared();

    if line_len_sq < 0.0001 {
        return ContactResult::miss(); // Degenerate segment
    }

    let t = ((pos - start).dot(line_vec) / line_len_sq).clamp(0.0, 1.0);
    let closest = start + line_vec * t;
    let offset = pos - closest;
    let dist = offset.length();

    if dist >= radius {
        return ContactResult::miss();
    }

    let normal = if dist > 1e-6 {
        offset / dist
    } else {
        // Center exactly on the line: push toward the arena center side
        let perp = Vec2::new(-line_vec.y, line_vec.x).normalize();
        if perp.dot(-closest) >= 0.0 { perp } else { -perp }
    };

    ContactResult {
        hit: true,
        point: closest,
        normal,
        penetration: radius - dist,
    }
}

/// Endpoints of `count` straight segments approximating a circle of `radius`
pub fn ring_segments(radius: f32, count: usize) -> Vec<(Vec2, Vec2)> {
    let count = count.max(3);
    let step = std::f32::consts::TAU / count as f32;
    (0..count)
        .map(|i| {
            let a = polar_to_cartesian(radius, step * i as f32);
            let b = polar_to_cartesian(radius, step * (i + 1) as f32);
            (a, b)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_circle_circle_overlap() {
        let result = circle_circle_contact(Vec2::new(0.0, 0.0), 10.0, Vec2::new(15.0, 0.0), 10.0);
        assert!(result.hit);
        assert!((result.penetration - 5.0).abs() < 1e-5);
        // Normal points from b toward a
        assert!(result.normal.x < 0.0);
        assert!((result.point - Vec2::new(5.0, 0.0)).length() < 1e-5);
    }

    #[test]
    fn test_circle_circle_miss() {
        let result = circle_circle_contact(Vec2::ZERO, 10.0, Vec2::new(25.0, 0.0), 10.0);
        assert!(!result.hit);
    }

    #[test]
    fn test_circle_circle_coincident() {
        let result = circle_circle_contact(Vec2::ONE, 5.0, Vec2::ONE, 5.0);
        assert!(result.hit);
        assert_eq!(result.normal, Vec2::X);
    }

    #[test]
    fn test_circle_segment_contact() {
        // Vertical wall at x = 100, circle approaching from the left
        let start = Vec2::new(100.0, -50.0);
        let end = Vec2::new(100.0, 50.0);
        let result = circle_segment_contact(Vec2::new(95.0, 0.0), 8.0, start, end);
        assert!(result.hit);
        assert!((result.normal - Vec2::new(-1.0, 0.0)).length() < 1e-5);
        assert!((result.penetration - 3.0).abs() < 1e-5);

        let result = circle_segment_contact(Vec2::new(80.0, 0.0), 8.0, start, end);
        assert!(!result.hit);
    }

    #[test]
    fn test_ring_segments_close_the_loop() {
        let segs = ring_segments(300.0, 32);
        assert_eq!(segs.len(), 32);
        for (a, b) in &segs {
            assert!((a.length() - 300.0).abs() < 1e-2);
            assert!((b.length() - 300.0).abs() < 1e-2);
        }
        let first = segs.first().unwrap().0;
        let last = segs.last().unwrap().1;
        assert!((first - last).length() < 1e-2);
    }
}
