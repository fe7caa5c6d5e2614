//! Corner-based anchoring of a bubble panel above its target.
//!
//! Corners use a fixed winding: bottom-left, top-left, top-right, bottom-right.
use bevy::prelude::*;

use super::config::PlacementConfig;

pub const BOTTOM_LEFT: usize = 0;
pub const TOP_LEFT: usize = 1;
pub const TOP_RIGHT: usize = 2;
pub const BOTTOM_RIGHT: usize = 3;

/// World-space corners of a centred `size` rectangle lying in the local XY plane.
pub fn world_corners(size: Vec2, transform: &Transform) -> [Vec3; 4] {
    let half = size / 2.0;
    let mut corners = [Vec3::ZERO; 4];
    corners[BOTTOM_LEFT] = Vec3::new(-half.x, -half.y, 0.0);
    corners[TOP_LEFT] = Vec3::new(-half.x, half.y, 0.0);
    corners[TOP_RIGHT] = Vec3::new(half.x, half.y, 0.0);
    corners[BOTTOM_RIGHT] = Vec3::new(half.x, -half.y, 0.0);
    corners.map(|corner| transform.transform_point(corner))
}

/// Position for the panel root so that its corner (or, when centre-justified,
/// its horizontal centre) sits on top of the target.
pub fn compute_anchor_position(
    corners: &[Vec3; 4],
    target_position: Vec3,
    target_height: f32,
    manual_offset: Vec3,
    center_justify: bool,
) -> Vec3 {
    let bottom_right = corners[BOTTOM_RIGHT];

    // Half edges, both measured from the bottom-right corner.
    let bottom_offset = (corners[BOTTOM_LEFT] - bottom_right) / 2.0;
    let right_offset = (corners[TOP_RIGHT] - bottom_right) / 2.0;
    let height_offset = Vec3::new(0.0, target_height / 2.0, 0.0);

    if center_justify {
        target_position + right_offset + height_offset + manual_offset
    } else {
        let corner_offset = bottom_offset + right_offset;
        target_position + corner_offset + height_offset + manual_offset
    }
}

/// Moves `transform` to the anchor computed from its own current corners.
pub fn anchor_panel(
    transform: &mut Transform,
    panel_size: Vec2,
    target_position: Vec3,
    target_height: f32,
    placement: &PlacementConfig,
) {
    let corners = world_corners(panel_size, transform);
    transform.translation = compute_anchor_position(
        &corners,
        target_position,
        target_height,
        placement.offset,
        placement.center_justify,
    );
}

#[cfg(test)]
mod tests {
    use std::f32::consts::FRAC_PI_2;

    use super::*;

    fn skewed_corners() -> [Vec3; 4] {
        [
            Vec3::new(-1.3, 0.2, 0.7),
            Vec3::new(-1.1, 2.9, 0.4),
            Vec3::new(2.4, 3.1, -0.6),
            Vec3::new(2.2, 0.4, -0.3),
        ]
    }

    #[test]
    fn corner_anchor_matches_formula() {
        let corners = skewed_corners();
        let target = Vec3::new(5.0, 1.0, -2.0);
        let offset = Vec3::new(0.25, 0.5, 0.0);

        let expected = target
            + ((corners[0] - corners[3]) / 2.0 + (corners[2] - corners[3]) / 2.0)
            + Vec3::new(0.0, 1.8 / 2.0, 0.0)
            + offset;

        let first = compute_anchor_position(&corners, target, 1.8, offset, false);
        let second = compute_anchor_position(&corners, target, 1.8, offset, false);
        assert_eq!(first, expected);
        assert_eq!(first, second);
    }

    #[test]
    fn center_justify_uses_only_right_half_edge() {
        let corners = skewed_corners();
        let target = Vec3::new(-3.0, 0.0, 4.0);

        let expected =
            target + (corners[2] - corners[3]) / 2.0 + Vec3::new(0.0, 1.0, 0.0) + Vec3::ZERO;
        assert_eq!(
            compute_anchor_position(&corners, target, 2.0, Vec3::ZERO, true),
            expected
        );
    }

    #[test]
    fn axis_aligned_panel_lands_up_and_left_of_target() {
        let transform = Transform::from_xyz(10.0, -4.0, 3.0);
        let corners = world_corners(Vec2::new(2.0, 1.0), &transform);
        assert_eq!(corners[BOTTOM_LEFT], Vec3::new(9.0, -4.5, 3.0));
        assert_eq!(corners[TOP_LEFT], Vec3::new(9.0, -3.5, 3.0));
        assert_eq!(corners[TOP_RIGHT], Vec3::new(11.0, -3.5, 3.0));
        assert_eq!(corners[BOTTOM_RIGHT], Vec3::new(11.0, -4.5, 3.0));

        let anchored = compute_anchor_position(&corners, Vec3::ZERO, 2.0, Vec3::ZERO, false);
        assert_eq!(anchored, Vec3::new(-1.0, 1.5, 0.0));
    }

    #[test]
    fn anchoring_ignores_current_translation_but_follows_rotation() {
        let placement = PlacementConfig::default();
        let size = Vec2::new(2.0, 1.0);

        let mut near = Transform::from_xyz(0.0, 0.0, 0.0);
        let mut far = Transform::from_xyz(40.0, 12.0, -8.0);
        anchor_panel(&mut near, size, Vec3::ONE, 1.0, &placement);
        anchor_panel(&mut far, size, Vec3::ONE, 1.0, &placement);
        assert!(near.translation.abs_diff_eq(far.translation, 1e-5));

        let mut turned = Transform::from_rotation(Quat::from_rotation_y(FRAC_PI_2));
        anchor_panel(&mut turned, size, Vec3::ONE, 1.0, &placement);
        // Rotated a quarter turn about Y, the bottom edge now runs along Z.
        assert!(turned
            .translation
            .abs_diff_eq(Vec3::new(1.0, 2.0, 2.0), 1e-5));
    }
}
