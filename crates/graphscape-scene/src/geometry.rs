//! Placement math for node and edge primitives
//!
//! Edge meshes are unit-height cylinders along +Y, so every segment is
//! described by a translation to its midpoint, a rotation from +Y onto the
//! segment, and a Y scale equal to its length.

use bevy::prelude::*;
use graphscape_core::{Position, Rgba};
use std::f32::consts::TAU;

/// Radius of a node sphere at size 1
pub const NODE_RADIUS: f32 = 0.45;
/// Radius of an edge cylinder
pub const EDGE_RADIUS: f32 = 0.06;
pub const ARROW_RADIUS: f32 = 0.16;
pub const ARROW_HEIGHT: f32 = 0.4;
/// Segments used for bent edges and loops
pub const CURVE_SEGMENTS: usize = 8;
/// Height of a bent edge's arc relative to the edge length
pub const BEND: f32 = 0.25;

const EPS: f32 = 1e-6;

pub fn to_vec3(p: Position) -> Vec3 {
    Vec3::new(p[0] as f32, p[1] as f32, p[2] as f32)
}

/// Render color for a graph color, clamped into the displayable range
pub fn to_color(c: Rgba) -> Color {
    let c = c.clamped();
    Color::srgba(c.r, c.g, c.b, c.a)
}

/// Rotation taking +Y onto `direction`
pub fn rotation_from_y(direction: Vec3) -> Quat {
    let direction = direction.normalize_or_zero();
    if direction == Vec3::ZERO || direction.abs_diff_eq(Vec3::Y, 0.001) {
        Quat::IDENTITY
    } else if direction.abs_diff_eq(Vec3::NEG_Y, 0.001) {
        Quat::from_rotation_x(std::f32::consts::PI)
    } else {
        Quat::from_rotation_arc(Vec3::Y, direction)
    }
}

/// Transform stretching a unit cylinder from `a` to `b`
pub fn segment_transform(a: Vec3, b: Vec3) -> Transform {
    let delta = b - a;
    Transform::from_translation((a + b) / 2.0)
        .with_rotation(rotation_from_y(delta))
        .with_scale(Vec3::new(1.0, delta.length().max(EPS), 1.0))
}

/// Polyline an edge is drawn along
///
/// A lone edge is a straight line. Edges sharing their endpoints with others
/// bow out along an arc whose plane is turned by `slot / count` of a full
/// turn around the edge axis, so parallel edges fan out evenly. A loop is a
/// circle above the node, turned the same way.
pub fn edge_path(p0: Vec3, p1: Vec3, slot: usize, count: usize, node_radius: f32) -> Vec<Vec3> {
    let delta = p1 - p0;
    let length = delta.length();
    let angle = TAU * slot as f32 / count.max(1) as f32;

    if length < EPS {
        let radius = node_radius * 1.5;
        let up = Quat::from_axis_angle(Vec3::X, angle) * Vec3::Z;
        let side = up.any_orthonormal_vector();
        let center = p0 + up * radius;
        return (0..=CURVE_SEGMENTS)
            .map(|i| {
                let t = TAU * i as f32 / CURVE_SEGMENTS as f32;
                center - up * radius * t.cos() + side * radius * t.sin()
            })
            .collect();
    }
    if count <= 1 {
        return vec![p0, p1];
    }

    let axis = delta / length;
    let normal = Quat::from_axis_angle(axis, angle) * axis.any_orthonormal_vector();
    // Quadratic Bezier whose apex sits BEND * length off the chord
    let control = (p0 + p1) / 2.0 + normal * (2.0 * BEND * length);
    (0..=CURVE_SEGMENTS)
        .map(|i| {
            let t = i as f32 / CURVE_SEGMENTS as f32;
            let u = 1.0 - t;
            p0 * (u * u) + control * (2.0 * u * t) + p1 * (t * t)
        })
        .collect()
}

/// Split a path into exactly `segments` pieces
///
/// Paths with a matching number of pieces are used as they are; anything
/// else falls back to even pieces of the chord from the first to the last
/// point.
pub fn segment_points(path: &[Vec3], segments: usize) -> Vec<(Vec3, Vec3)> {
    let segments = segments.max(1);
    if path.len() == segments + 1 {
        return path.windows(2).map(|w| (w[0], w[1])).collect();
    }
    let (Some(&first), Some(&last)) = (path.first(), path.last()) else {
        return Vec::new();
    };
    (0..segments)
        .map(|i| {
            let t0 = i as f32 / segments as f32;
            let t1 = (i + 1) as f32 / segments as f32;
            (first.lerp(last, t0), first.lerp(last, t1))
        })
        .collect()
}

/// Transform for the arrowhead cone at the end of a directed edge
///
/// The cone sits on the path just outside the target node's sphere, pointing
/// along the final segment.
pub fn arrow_transform(path: &[Vec3], target_radius: f32) -> Transform {
    let n = path.len();
    if n < 2 {
        return Transform::from_scale(Vec3::ZERO);
    }
    let tip = path[n - 1];
    let direction = (tip - path[n - 2]).normalize_or_zero();
    Transform::from_translation(tip - direction * (target_radius + ARROW_HEIGHT / 2.0))
        .with_rotation(rotation_from_y(direction))
}

/// Camera distance that fits a sphere of `radius` around `center` in view
pub fn framing_radius(center: Vec3, radius: f32, fov_radians: f32) -> f32 {
    let extent = center.length() + radius;
    (extent / fov_radians.tan() * 1.75).max(1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_segment_transform_maps_unit_cylinder_onto_segment() {
        let a = Vec3::new(1.0, 2.0, 3.0);
        let b = Vec3::new(1.0, 2.0, 7.0);
        let t = segment_transform(a, b);
        // The cylinder's +Y end lands on b, its -Y end on a
        assert!(t.transform_point(Vec3::new(0.0, 0.5, 0.0)).abs_diff_eq(b, 1e-4));
        assert!(t.transform_point(Vec3::new(0.0, -0.5, 0.0)).abs_diff_eq(a, 1e-4));
    }

    #[test]
    fn test_downward_segment() {
        let t = segment_transform(Vec3::Y, Vec3::NEG_Y);
        assert!(t.transform_point(Vec3::new(0.0, 0.5, 0.0)).abs_diff_eq(Vec3::NEG_Y, 1e-4));
    }

    #[test]
    fn test_lone_edge_is_straight() {
        let path = edge_path(Vec3::ZERO, Vec3::X, 0, 1, NODE_RADIUS);
        assert_eq!(path, vec![Vec3::ZERO, Vec3::X]);
    }

    #[test]
    fn test_parallel_edges_fan_out() {
        let p0 = Vec3::ZERO;
        let p1 = Vec3::new(4.0, 0.0, 0.0);
        let a = edge_path(p0, p1, 0, 2, NODE_RADIUS);
        let b = edge_path(p0, p1, 1, 2, NODE_RADIUS);
        assert_eq!(a.len(), CURVE_SEGMENTS + 1);
        assert!(a[0].abs_diff_eq(p0, 1e-5) && a[CURVE_SEGMENTS].abs_diff_eq(p1, 1e-5));

        let mid_a = a[CURVE_SEGMENTS / 2];
        let mid_b = b[CURVE_SEGMENTS / 2];
        // apex is BEND * length off the chord, on opposite sides for two edges
        let chord_mid = Vec3::new(2.0, 0.0, 0.0);
        assert!(((mid_a - chord_mid).length() - BEND * 4.0).abs() < 1e-4);
        assert!((mid_a + mid_b).abs_diff_eq(chord_mid * 2.0, 1e-4));
    }

    #[test]
    fn test_loop_returns_to_node() {
        let p = Vec3::new(1.0, 1.0, 1.0);
        let path = edge_path(p, p, 0, 1, NODE_RADIUS);
        assert!(path[0].abs_diff_eq(p, 1e-5));
        assert!(path[CURVE_SEGMENTS].abs_diff_eq(p, 1e-5));
        assert!(path[CURVE_SEGMENTS / 2].distance(p) > NODE_RADIUS);
    }

    #[test]
    fn test_segment_points_subdivides_straight_path() {
        let pieces = segment_points(&[Vec3::ZERO, Vec3::new(4.0, 0.0, 0.0)], 4);
        assert_eq!(pieces.len(), 4);
        assert!(pieces[1].0.abs_diff_eq(Vec3::X, 1e-6));
        assert!(pieces[3].1.abs_diff_eq(Vec3::new(4.0, 0.0, 0.0), 1e-6));

        let curve = edge_path(Vec3::ZERO, Vec3::X, 1, 3, NODE_RADIUS);
        let pieces = segment_points(&curve, CURVE_SEGMENTS);
        assert_eq!(pieces[2].1, curve[3]);
        assert!(segment_points(&[], 2).is_empty());
    }

    #[test]
    fn test_arrow_sits_outside_target() {
        let path = vec![Vec3::ZERO, Vec3::new(0.0, 0.0, 5.0)];
        let t = arrow_transform(&path, NODE_RADIUS);
        let expected = 5.0 - NODE_RADIUS - ARROW_HEIGHT / 2.0;
        assert!((t.translation.z - expected).abs() < 1e-5);
        assert!(t.rotation.mul_vec3(Vec3::Y).abs_diff_eq(Vec3::Z, 1e-5));
    }

    #[test]
    fn test_framing_radius_grows_with_extent() {
        let fov = 45f32.to_radians();
        let near = framing_radius(Vec3::ZERO, 2.0, fov);
        let far = framing_radius(Vec3::ZERO, 8.0, fov);
        assert!((near - 2.0 / fov.tan() * 1.75).abs() < 1e-4);
        assert!(far > near);
    }
}
