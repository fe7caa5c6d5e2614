//! WorldPlugin sets up the demo scene and moves the observer camera.
use bevy::prelude::*;

use crate::world::systems::{orbit_observer_camera, spawn_world_environment};

pub struct WorldPlugin;

impl Plugin for WorldPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, spawn_world_environment)
            .add_systems(Update, orbit_observer_camera);
    }
}
