use bevy::prelude::*;

mod core;
mod npc;
mod ui;
mod world;

use crate::{core::CorePlugin, npc::NpcPlugin, ui::UiPlugin, world::WorldPlugin};

fn main() {
    App::new()
        .add_plugins((
            DefaultPlugins,
            CorePlugin::default(),
            WorldPlugin,
            NpcPlugin,
            UiPlugin,
        ))
        .run();
}
