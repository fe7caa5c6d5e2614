//! Components used by the world module.
use bevy::prelude::*;

/// Camera that circles the village centre; bubbles turn to face it.
#[derive(Component, Debug)]
pub struct ObserverCamera {
    pub focus: Vec3,
    pub radius: f32,
    pub height: f32,
    /// Radians per second of scaled simulation time.
    pub angular_speed: f32,
    pub angle: f32,
}

impl ObserverCamera {
    pub fn new(focus: Vec3, radius: f32, height: f32, angular_speed: f32) -> Self {
        Self {
            focus,
            radius,
            height,
            angular_speed,
            angle: 0.0,
        }
    }

    /// Eye position for the current orbit angle.
    pub fn eye(&self) -> Vec3 {
        self.focus
            + Vec3::new(
                self.radius * self.angle.cos(),
                self.height,
                self.radius * self.angle.sin(),
            )
    }
}

/// Marker component identifying the main directional light (the "sun").
#[derive(Component, Default)]
pub struct PrimarySun;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn eye_sits_on_orbit_circle() {
        let mut camera = ObserverCamera::new(Vec3::new(1.0, 0.0, 1.0), 10.0, 6.0, 0.5);
        assert!(camera.eye().abs_diff_eq(Vec3::new(11.0, 6.0, 1.0), 1e-5));

        camera.angle = std::f32::consts::FRAC_PI_2;
        assert!(camera.eye().abs_diff_eq(Vec3::new(1.0, 6.0, 11.0), 1e-5));
    }
}
