//! NPC plugin wiring identities, wandering and chatter.
use bevy::prelude::*;

use crate::{
    npc::{
        components::NpcIdGenerator,
        systems::{npc_chatter, react_to_bubble_signals, spawn_debug_npcs, wander_npcs},
    },
    ui::speech_bubble::systems::advance_bubble_lifecycles,
    world::systems::spawn_world_environment,
};

pub struct NpcPlugin;

impl Plugin for NpcPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<NpcIdGenerator>()
            .add_systems(Startup, spawn_debug_npcs.after(spawn_world_environment))
            .add_systems(
                Update,
                (wander_npcs, react_to_bubble_signals, npc_chatter)
                    .chain()
                    .before(advance_bubble_lifecycles),
            );
    }
}
