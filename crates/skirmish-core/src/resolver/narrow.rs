//! Narrow-phase overlap tests.

use glam::Vec2;

use crate::entity::Combatant;
use crate::spatial::sanitize_position;

/// Returns the point on segment `from..to` closest to `point`.
#[must_use]
pub fn closest_point_on_segment(from: Vec2, to: Vec2, point: Vec2) -> Vec2 {
    let seg = to - from;
    let len_sq = seg.length_squared();
    if len_sq <= f32::EPSILON {
        return from;
    }
    let t = ((point - from).dot(seg) / len_sq).clamp(0.0, 1.0);
    from + seg * t
}

/// Swept circle against a static circle.
///
/// A circle of `radius` moving from `from` to `to` touches a circle of
/// `target_radius` at `center` if the closest point of the path lies within
/// the summed radii. Touching counts as a hit.
#[must_use]
pub fn swept_circle_hit(from: Vec2, to: Vec2, radius: f32, center: Vec2, target_radius: f32) -> bool {
    if !center.is_finite() {
        return false;
    }
    let reach = radius + target_radius;
    if !reach.is_finite() || reach < 0.0 {
        return false;
    }
    let closest = closest_point_on_segment(from, to, center);
    closest.distance_squared(center) <= reach * reach
}

/// Circle against circle.
#[must_use]
pub fn circles_overlap(a: Vec2, a_radius: f32, b: Vec2, b_radius: f32) -> bool {
    swept_circle_hit(a, a, a_radius, b, b_radius)
}

/// Returns the collision circle of a combatant with non-finite values
/// replaced the same way the spatial grid replaces them.
#[must_use]
pub fn combatant_body(combatant: &Combatant) -> (Vec2, f32) {
    let size = if combatant.size.is_finite() {
        combatant.size.max(0.0)
    } else {
        0.0
    };
    (sanitize_position(combatant.position), size)
}
