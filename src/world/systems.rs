//! Systems for the world module.
use std::f32::consts::TAU;

use bevy::{math::primitives::Plane3d, prelude::*};

use crate::{
    core::plugin::SimulationClock, ui::speech_bubble::components::BubbleFacingReference,
    world::components::{ObserverCamera, PrimarySun},
};

const GROUND_SCALE: f32 = 60.0;
const ORBIT_FOCUS: Vec3 = Vec3::new(4.0, 1.0, -1.0);
const ORBIT_RADIUS: f32 = 16.0;
const ORBIT_HEIGHT: f32 = 7.0;
const ORBIT_SPEED: f32 = 0.12;

/// Spawns the initial scene: ground plane, light, and the orbiting observer camera.
pub fn spawn_world_environment(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    commands.spawn((
        Mesh3d(meshes.add(Mesh::from(Plane3d::default()))),
        MeshMaterial3d(materials.add(StandardMaterial {
            base_color: Color::srgb_u8(90, 140, 90),
            perceptual_roughness: 0.9,
            metallic: 0.0,
            ..default()
        })),
        Transform::from_scale(Vec3::splat(GROUND_SCALE)),
    ));

    commands.spawn((
        DirectionalLight {
            illuminance: 15_000.0,
            shadows_enabled: true,
            ..default()
        },
        Transform::from_xyz(16.0, 32.0, 16.0).looking_at(Vec3::ZERO, Vec3::Y),
        PrimarySun,
    ));

    let observer = ObserverCamera::new(ORBIT_FOCUS, ORBIT_RADIUS, ORBIT_HEIGHT, ORBIT_SPEED);
    let transform = Transform::from_translation(observer.eye()).looking_at(ORBIT_FOCUS, Vec3::Y);

    commands.spawn((
        Name::new("Observer camera"),
        Camera3d::default(),
        transform,
        observer,
        BubbleFacingReference,
    ));
}

/// Moves the observer camera along its orbit, always looking at the focus.
pub fn orbit_observer_camera(
    clock: Res<SimulationClock>,
    mut query: Query<(&mut ObserverCamera, &mut Transform)>,
) {
    let delta = clock.last_scaled_delta().as_secs_f32();
    if delta <= 0.0 {
        return;
    }

    for (mut observer, mut transform) in query.iter_mut() {
        observer.angle = (observer.angle + observer.angular_speed * delta).rem_euclid(TAU);
        *transform = Transform::from_translation(observer.eye()).looking_at(observer.focus, Vec3::Y);
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[test]
    fn observer_advances_with_scaled_time() {
        let mut app = App::new();
        app.insert_resource(SimulationClock::new(2.0))
            .add_systems(Update, orbit_observer_camera);

        let observer = ObserverCamera::new(Vec3::ZERO, 5.0, 2.0, 0.5);
        let camera = app
            .world_mut()
            .spawn((observer, Transform::default()))
            .id();

        app.world_mut()
            .resource_mut::<SimulationClock>()
            .tick(Duration::from_secs(1));
        app.update();

        let observer = app.world().get::<ObserverCamera>(camera).unwrap();
        assert!((observer.angle - 1.0).abs() < 1e-5);
        let transform = app.world().get::<Transform>(camera).unwrap();
        assert!(transform.translation.abs_diff_eq(observer.eye(), 1e-5));
    }
}
