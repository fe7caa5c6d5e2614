//! Smooth turning of a bubble panel relative to a reference point.
use bevy::prelude::*;

use super::errors::BubbleError;

/// Below this separation the look direction is too short to normalise.
pub const MIN_FACING_DISTANCE: f32 = 1e-4;

/// Look direction for the panel's forward (-Z) axis.
///
/// Not reversed, the panel looks from the reference through itself, so its
/// visible +Z face points back at the reference.
pub fn facing_direction(self_position: Vec3, reference_position: Vec3, reversed: bool) -> Vec3 {
    if reversed {
        reference_position - self_position
    } else {
        self_position - reference_position
    }
}

/// Orientation looking along `direction` with +Y up.
pub fn look_rotation(direction: Vec3) -> Result<Quat, BubbleError> {
    let distance = direction.length();
    if !(distance > MIN_FACING_DISTANCE) {
        return Err(BubbleError::DegenerateGeometry { distance });
    }
    let Ok(direction) = Dir3::new(direction) else {
        return Err(BubbleError::DegenerateGeometry { distance });
    };
    Ok(Transform::IDENTITY.looking_to(direction, Vec3::Y).rotation)
}

/// One tick of turning: slerp from `current` towards the look rotation by
/// `turn_rate * delta_seconds`, clamped to `[0, 1]`.
pub fn compute_next_orientation(
    current: Quat,
    self_position: Vec3,
    reference_position: Vec3,
    turn_rate: f32,
    reversed: bool,
    delta_seconds: f32,
) -> Result<Quat, BubbleError> {
    let target = look_rotation(facing_direction(self_position, reference_position, reversed))?;

    let step = turn_rate * delta_seconds;
    let step = if step.is_finite() {
        step.clamp(0.0, 1.0)
    } else {
        0.0
    };

    Ok(if step >= 1.0 {
        target
    } else if step <= 0.0 {
        current
    } else {
        current.slerp(target, step).normalize()
    })
}
