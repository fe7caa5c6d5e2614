//! Systems related to NPC spawning, wandering and chatter.
use bevy::{math::primitives::Capsule3d, prelude::*};

use crate::{
    core::plugin::SimulationClock,
    npc::components::{Chatter, ChatterAction, Identity, NpcIdGenerator, Wander},
    ui::speech_bubble::{
        components::{BoundsHeight, SpeechBubbleTracker},
        config::SpeechBubbleSettings,
        events::{BubbleSignal, BubbleSignalEvent, DismissSpeechBubble, ShowSpeechBubble},
        lifecycle::BubbleLifecycle,
    },
};

const CAPSULE_RADIUS: f32 = 0.3;
const CAPSULE_LENGTH: f32 = 1.0;
/// How long a herald's never-ending bubble stays up before being dismissed.
const HERALD_HOLD_SECS: f32 = 6.0;

/// Spawns a handful of debug NPCs with unique identities.
pub fn spawn_debug_npcs(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    mut id_generator: ResMut<NpcIdGenerator>,
) {
    let prototypes = [
        (
            "Alric",
            Color::srgb_u8(200, 90, 90),
            Vec3::new(4.0, 1.0, 2.0),
            1.5,
            Chatter::new(
                &["Fine day for the fields.", "Has anyone seen my hoe?"],
                4.0,
                false,
            ),
        ),
        (
            "Bryn",
            Color::srgb_u8(90, 150, 210),
            Vec3::new(6.5, 1.0, -1.5),
            0.0,
            Chatter::new(&["Hear ye! Market opens at noon!"], 2.0, true),
        ),
        (
            "Cedric",
            Color::srgb_u8(140, 200, 120),
            Vec3::new(3.0, 1.0, -4.0),
            2.5,
            Chatter::new(&["Patrol's quiet.", "Watch yourself after dark."], 7.0, false),
        ),
    ];

    let height = CAPSULE_LENGTH + CAPSULE_RADIUS * 2.0;

    for (name, color, home, radius, chatter) in prototypes {
        let id = id_generator.next_id();
        let wander = Wander::new(home, radius, 0.4);

        commands.spawn((
            Mesh3d(meshes.add(Mesh::from(Capsule3d::new(CAPSULE_RADIUS, CAPSULE_LENGTH)))),
            MeshMaterial3d(materials.add(StandardMaterial {
                base_color: color,
                ..default()
            })),
            Transform::from_translation(wander.position()),
            BoundsHeight(height),
            Identity::new(id, name),
            wander,
            chatter,
            Name::new(format!("{} ({})", name, id)),
        ));
    }
}

/// Moves wandering NPCs along their circles.
pub fn wander_npcs(clock: Res<SimulationClock>, mut query: Query<(&mut Wander, &mut Transform)>) {
    let delta = clock.last_scaled_delta().as_secs_f32();
    if delta <= 0.0 {
        return;
    }

    for (mut wander, mut transform) in query.iter_mut() {
        if wander.radius <= 0.0 {
            continue;
        }
        transform.translation = wander.advance(delta);
    }
}

/// Lets the bubble plugin's signals drive each NPC's chatter state.
pub fn react_to_bubble_signals(
    mut signals: MessageReader<BubbleSignalEvent>,
    mut query: Query<(&Identity, &mut Chatter)>,
) {
    for event in signals.read() {
        let Ok((identity, mut chatter)) = query.get_mut(event.target) else {
            continue;
        };

        match event.signal {
            BubbleSignal::HeldForever => {
                info!(
                    "{} keeps talking; dismissing in {:.1}s",
                    identity.display_name, HERALD_HOLD_SECS
                );
                chatter.schedule_dismiss(HERALD_HOLD_SECS);
            }
            BubbleSignal::FadeOutFinished => {
                debug!("{} finished speaking", identity.display_name);
                chatter.finish_speaking();
            }
        }
    }
}

/// Turns elapsed chatter cooldowns into bubble requests and dismissals.
#[allow(clippy::too_many_arguments)] // System function requires all arguments
pub fn npc_chatter(
    clock: Res<SimulationClock>,
    settings: Res<SpeechBubbleSettings>,
    tracker: Res<SpeechBubbleTracker>,
    mut show: MessageWriter<ShowSpeechBubble>,
    mut dismiss: MessageWriter<DismissSpeechBubble>,
    lifecycles: Query<&BubbleLifecycle>,
    mut query: Query<(Entity, &Identity, &mut Chatter)>,
) {
    let delta = clock.last_scaled_delta();

    for (entity, identity, mut chatter) in query.iter_mut() {
        // Bubbles that finish without a signal either leave the tracker or
        // linger in `Done` when finished bubbles are kept around.
        let bubble_live = tracker
            .by_target
            .get(&entity)
            .and_then(|&bubble| lifecycles.get(bubble).ok())
            .is_some_and(|lifecycle| !lifecycle.is_done());
        if chatter.is_speaking() && !bubble_live {
            chatter.finish_speaking();
        }

        match chatter.tick(delta) {
            Some(ChatterAction::Speak(line)) => {
                info!("{} says: \"{}\"", identity.display_name, line);
                let mut config = settings.defaults;
                config.timing.never_end = chatter.is_persistent();
                show.write(ShowSpeechBubble::new(entity, line).with_config(config));
            }
            Some(ChatterAction::Dismiss) => {
                dismiss.write(DismissSpeechBubble {
                    target: entity,
                    fade_out: true,
                });
            }
            None => {}
        }
    }
}
