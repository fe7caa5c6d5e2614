// src/ui/speech_bubble/systems.rs
//
// Systems for spawning, timing, placing, turning and despawning world-space
// speech bubbles.

use std::collections::HashMap;

use bevy::{ecs::entity::Entities, prelude::*};

use crate::core::plugin::SimulationClock;

use super::components::{
    BoundsHeight, BubbleContent, BubbleFacingReference, BubbleLabel, BubblePanel, BubbleRect,
    SpeechBubble, SpeechBubbleTracker,
};
use super::config::SpeechBubbleSettings;
use super::errors::{BubbleError, BubbleRole};
use super::events::{BubbleSignalEvent, DismissSpeechBubble, ShowSpeechBubble};
use super::facing::compute_next_orientation;
use super::lifecycle::BubbleLifecycle;
use super::placement::compute_anchor_position;

const LABEL_MAX_WIDTH_PX: f32 = 220.0;
const LABEL_Z_INDEX: i32 = 101;

/// Advance every bubble's lifecycle by the scaled tick delta and publish the
/// signals it raises.
pub fn advance_bubble_lifecycles(
    clock: Res<SimulationClock>,
    mut signals: MessageWriter<BubbleSignalEvent>,
    mut bubbles: Query<(
        Entity,
        &SpeechBubble,
        &mut BubbleLifecycle,
        &mut BubblePanel,
    )>,
) {
    let delta = clock.last_scaled_delta().as_secs_f32();

    for (entity, bubble, mut lifecycle, mut panel) in bubbles.iter_mut() {
        let before = lifecycle.state();
        let mut next = *panel;
        let signal = lifecycle.tick(delta, &mut next);
        panel.set_if_neq(next);

        if lifecycle.state() != before {
            debug!(
                "Speech bubble {:?}: {} -> {}",
                entity,
                before.label(),
                lifecycle.state().label()
            );
        }

        if let Some(signal) = signal {
            info!("Speech bubble {:?} signalled {:?}", entity, signal);
            signals.write(BubbleSignalEvent {
                bubble: entity,
                target: bubble.target(),
                signal,
            });
        }
    }
}

/// Handle external dismissal: fade out, or tear the bubble down without a signal.
pub fn dismiss_speech_bubbles(
    mut commands: Commands,
    mut tracker: ResMut<SpeechBubbleTracker>,
    mut requests: MessageReader<DismissSpeechBubble>,
    mut signals: MessageWriter<BubbleSignalEvent>,
    mut bubbles: Query<(&SpeechBubble, &mut BubbleLifecycle, &mut BubblePanel)>,
) {
    for request in requests.read() {
        let Some(&bubble_entity) = tracker.by_target.get(&request.target) else {
            debug!("No speech bubble to dismiss for {:?}", request.target);
            continue;
        };

        if !request.fade_out {
            tracker.by_target.remove(&request.target);
            commands.entity(bubble_entity).despawn();
            continue;
        }

        let Ok((bubble, mut lifecycle, mut panel)) = bubbles.get_mut(bubble_entity) else {
            tracker.by_target.remove(&request.target);
            continue;
        };

        let mut next = *panel;
        let signal = lifecycle.dismiss(&mut next);
        panel.set_if_neq(next);

        if let Some(signal) = signal {
            signals.write(BubbleSignalEvent {
                bubble: bubble_entity,
                target: bubble.target(),
                signal,
            });
        }
    }
}

/// Spawn a bubble per requested target, or restart the one it already has.
#[allow(clippy::too_many_arguments)] // System function requires all arguments
pub fn spawn_speech_bubbles(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    settings: Res<SpeechBubbleSettings>,
    mut tracker: ResMut<SpeechBubbleTracker>,
    mut requests: MessageReader<ShowSpeechBubble>,
    mut signals: MessageWriter<BubbleSignalEvent>,
    targets: Query<&GlobalTransform>,
    references: Query<Entity, With<BubbleFacingReference>>,
    mut bubbles: Query<(&mut SpeechBubble, &mut BubbleLifecycle, &mut BubblePanel)>,
) {
    // Last request per target wins; a target only ever gets one bubble.
    let latest: HashMap<Entity, &ShowSpeechBubble> = requests
        .read()
        .map(|request| (request.target, request))
        .collect();

    for (target, request) in latest {
        if targets.get(target).is_err() {
            warn!(
                "Cannot show speech bubble for {:?}: {}",
                target,
                BubbleError::missing(BubbleRole::Target)
            );
            continue;
        }

        let config = request.config.unwrap_or(settings.defaults);
        let reference = request.reference.or_else(|| references.iter().next());

        if let Some(&existing) = tracker.by_target.get(&target) {
            if let Ok((mut bubble, mut lifecycle, mut panel)) = bubbles.get_mut(existing) {
                info!("Restarting speech bubble for {:?}: \"{}\"", target, request.line);
                bubble.restart(request.line.clone(), reference, &config);
                *lifecycle = BubbleLifecycle::new(config.timing);

                let mut next = *panel;
                let signal = lifecycle.start(&mut next);
                panel.set_if_neq(next);
                if let Some(signal) = signal {
                    signals.write(BubbleSignalEvent {
                        bubble: existing,
                        target,
                        signal,
                    });
                }
                continue;
            }
            tracker.by_target.remove(&target);
        }

        info!("Spawning speech bubble for {:?}: \"{}\"", target, request.line);

        let content = commands
            .spawn((
                BubbleContent,
                Mesh3d(meshes.add(Rectangle::from_size(settings.panel_size))),
                MeshMaterial3d(materials.add(StandardMaterial {
                    base_color: settings.panel_color.with_alpha(0.0),
                    alpha_mode: AlphaMode::Blend,
                    unlit: true,
                    double_sided: true,
                    cull_mode: None,
                    ..default()
                })),
                Transform::default(),
                Visibility::Hidden,
            ))
            .id();

        let mut panel = BubblePanel::default();
        let mut lifecycle = BubbleLifecycle::new(config.timing);

        let bubble_entity = commands
            .spawn((
                Name::new(format!("Speech bubble ({:?})", target)),
                SpeechBubble::new(target, reference, content, request.line.clone(), &config),
                BubbleRect::new(settings.panel_size),
                Transform::default(),
                Visibility::default(),
            ))
            .add_child(content)
            .id();

        if let Some(signal) = lifecycle.start(&mut panel) {
            signals.write(BubbleSignalEvent {
                bubble: bubble_entity,
                target,
                signal,
            });
        }

        commands.entity(bubble_entity).insert((lifecycle, panel));
        tracker.by_target.insert(target, bubble_entity);

        commands.spawn((
            Node {
                position_type: PositionType::Absolute,
                max_width: Val::Px(LABEL_MAX_WIDTH_PX),
                display: Display::None, // Shown by project_bubble_labels
                ..default()
            },
            Text::new(request.line.clone()),
            TextFont {
                font_size: settings.font_size,
                ..default()
            },
            TextColor(settings.text_color.with_alpha(0.0)),
            ZIndex(LABEL_Z_INDEX),
            BubbleLabel {
                bubble: bubble_entity,
            },
        ));
    }
}

/// Anchor each bubble above its target and turn it relative to its reference.
///
/// Continuous bubbles update every tick while visible; the others update once
/// per (re)start.
pub fn track_speech_bubbles(
    clock: Res<SimulationClock>,
    objects: Query<(&GlobalTransform, Option<&BoundsHeight>)>,
    mut bubbles: Query<(
        Entity,
        &mut SpeechBubble,
        &BubblePanel,
        &BubbleRect,
        &mut Transform,
    )>,
) {
    let delta = clock.last_scaled_delta().as_secs_f32();

    for (entity, mut bubble, panel, rect, mut transform) in bubbles.iter_mut() {
        if !bubble.wants_tracking(panel.is_active()) {
            continue;
        }

        let anchor = anchor_position(&bubble, rect, &transform, &objects);
        if let Some(translation) = bubble.placement_status.report(entity, "placement", anchor) {
            transform.translation = translation;
        }

        if bubble.rotation().enabled {
            let facing = next_orientation(&bubble, &transform, &objects, delta);
            if let Some(rotation) = bubble.facing_status.report(entity, "facing", facing) {
                transform.rotation = rotation;
            }
        }

        bubble.mark_tracked();
    }
}

fn anchor_position(
    bubble: &SpeechBubble,
    rect: &BubbleRect,
    transform: &Transform,
    objects: &Query<(&GlobalTransform, Option<&BoundsHeight>)>,
) -> Result<Vec3, BubbleError> {
    let (target_transform, bounds) = objects
        .get(bubble.target())
        .map_err(|_| BubbleError::missing(BubbleRole::Target))?;
    let height = bounds.map(|bounds| bounds.0).unwrap_or(0.0);

    Ok(compute_anchor_position(
        &rect.world_corners(transform),
        target_transform.translation(),
        height,
        bubble.placement().offset,
        bubble.placement().center_justify,
    ))
}

fn next_orientation(
    bubble: &SpeechBubble,
    transform: &Transform,
    objects: &Query<(&GlobalTransform, Option<&BoundsHeight>)>,
    delta_seconds: f32,
) -> Result<Quat, BubbleError> {
    let (reference_transform, _) = bubble
        .reference()
        .and_then(|reference| objects.get(reference).ok())
        .ok_or(BubbleError::missing(BubbleRole::Reference))?;

    let rotation = bubble.rotation();
    compute_next_orientation(
        transform.rotation,
        transform.translation,
        reference_transform.translation(),
        rotation.turn_speed,
        rotation.reversed,
        delta_seconds,
    )
}

/// Push panel state onto the content entity: visibility and material alpha.
///
/// The material alpha is the configured panel alpha scaled by the lifecycle opacity.
pub fn apply_bubble_visuals(
    settings: Res<SpeechBubbleSettings>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    bubbles: Query<(Entity, &SpeechBubble, &BubblePanel), Changed<BubblePanel>>,
    mut contents: Query<
        (&mut Visibility, &MeshMaterial3d<StandardMaterial>),
        With<BubbleContent>,
    >,
) {
    for (entity, bubble, panel) in bubbles.iter() {
        let Ok((mut visibility, material)) = contents.get_mut(bubble.content()) else {
            warn!(
                "Speech bubble {:?}: {}",
                entity,
                BubbleError::missing(BubbleRole::Content)
            );
            continue;
        };

        visibility.set_if_neq(if panel.is_active() {
            Visibility::Inherited
        } else {
            Visibility::Hidden
        });

        if let Some(material) = materials.get_mut(&material.0) {
            material.base_color = material
                .base_color
                .with_alpha(settings.panel_color.alpha() * panel.opacity());
        }
    }
}

/// Remove bubbles whose lifecycle finished (if the settings ask for it) and
/// bubbles whose target no longer exists. Neither path emits a signal.
pub fn despawn_finished_bubbles(
    mut commands: Commands,
    settings: Res<SpeechBubbleSettings>,
    mut tracker: ResMut<SpeechBubbleTracker>,
    entities: &Entities,
    bubbles: Query<(Entity, &SpeechBubble, &BubbleLifecycle)>,
) {
    for (entity, bubble, lifecycle) in bubbles.iter() {
        let orphaned = !entities.contains(bubble.target());
        let finished = settings.despawn_when_done && lifecycle.is_done();
        if !orphaned && !finished {
            continue;
        }
        if orphaned {
            debug!(
                "Speech bubble {:?}: target {:?} is gone, despawning",
                entity,
                bubble.target()
            );
        }
        if tracker.by_target.get(&bubble.target()) == Some(&entity) {
            tracker.by_target.remove(&bubble.target());
        }
        commands.entity(entity).despawn();
    }
}

/// Keep each bubble's screen-space label on top of its panel, showing its
/// current line at the panel's opacity.
pub fn project_bubble_labels(
    mut commands: Commands,
    settings: Res<SpeechBubbleSettings>,
    cameras: Query<(&Camera, &GlobalTransform), With<Camera3d>>,
    bubbles: Query<(&SpeechBubble, &BubblePanel, &Transform)>,
    mut labels: Query<(Entity, &BubbleLabel, &mut Node, &mut Text, &mut TextColor)>,
) {
    let camera = cameras.single().ok();

    for (entity, label, mut node, mut text, mut color) in labels.iter_mut() {
        let Ok((bubble, panel, transform)) = bubbles.get(label.bubble) else {
            commands.entity(entity).despawn();
            continue;
        };

        if text.0 != bubble.line() {
            text.0 = bubble.line().to_string();
        }

        // Hidden panels, missing cameras and off-screen panels hide the label.
        let viewport = camera.filter(|_| panel.is_active()).and_then(|(camera, camera_transform)| {
            camera
                .world_to_viewport(camera_transform, transform.translation)
                .ok()
        });
        let Some(position) = viewport else {
            node.display = Display::None;
            continue;
        };

        node.display = Display::Flex;
        node.left = Val::Px(position.x);
        node.top = Val::Px(position.y);
        color.0 = settings
            .text_color
            .with_alpha(settings.text_color.alpha() * panel.opacity());
    }
}
