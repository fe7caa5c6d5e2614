// src/ui/speech_bubble/plugin.rs
//
// Plugin registration for speech bubble systems.

use bevy::prelude::*;

use super::components::SpeechBubbleTracker;
use super::config::SpeechBubbleSettings;
use super::events::{BubbleSignalEvent, DismissSpeechBubble, ShowSpeechBubble};
use super::systems::{
    advance_bubble_lifecycles, apply_bubble_visuals, despawn_finished_bubbles,
    dismiss_speech_bubbles, project_bubble_labels, spawn_speech_bubbles, track_speech_bubbles,
};

/// Plugin providing world-space speech bubbles anchored above targets.
///
/// # System Ordering
///
/// All systems run chained in `Update`:
///
/// 1. `advance_bubble_lifecycles` - delay / fade-in / hold / fade-out, emits `BubbleSignalEvent`
/// 2. `dismiss_speech_bubbles` - handles `DismissSpeechBubble`
/// 3. `spawn_speech_bubbles` - handles `ShowSpeechBubble`; new bubbles start ticking next frame
/// 4. `track_speech_bubbles` - corner anchoring and facing
/// 5. `apply_bubble_visuals` - visibility and material alpha from `BubblePanel`
/// 6. `despawn_finished_bubbles` - finished bubbles and bubbles whose target is gone
/// 7. `project_bubble_labels` - screen-space text over each panel
///
/// # Dependencies
///
/// - `CorePlugin` must be registered (provides `SimulationClock`)
pub struct SpeechBubblePlugin;

impl Plugin for SpeechBubblePlugin {
    fn build(&self, app: &mut App) {
        let settings = SpeechBubbleSettings::load_or_default();
        info!(
            "Speech bubbles configured: delay {:.2}s, hold {:.2}s, every frame: {}",
            settings.defaults.timing.onset_delay,
            settings.defaults.timing.hold_duration,
            settings.defaults.continuous_tracking
        );

        app.insert_resource(settings)
            .init_resource::<SpeechBubbleTracker>()
            .add_message::<ShowSpeechBubble>()
            .add_message::<DismissSpeechBubble>()
            .add_message::<BubbleSignalEvent>()
            .add_systems(
                Update,
                (
                    advance_bubble_lifecycles,
                    dismiss_speech_bubbles,
                    spawn_speech_bubbles,
                    track_speech_bubbles,
                    apply_bubble_visuals,
                    despawn_finished_bubbles,
                    project_bubble_labels,
                )
                    .chain(),
            );

        info!("SpeechBubblePlugin registered");
    }
}
