// src/ui/speech_bubble/mod.rs
//
// World-space speech bubbles anchored above a target object:
// - Spawned or restarted from ShowSpeechBubble, one bubble per target
// - Corner-based placement above the target's bounds, once or every tick
// - Optional smooth turning to face (or face away from) a reference object
// - Delay, fade-in, hold or hold-forever, fade-out, with completion signals

pub mod components;
pub mod config;
pub mod errors;
pub mod events;
pub mod facing;
pub mod lifecycle;
pub mod placement;
pub mod plugin;
pub mod systems;

pub use plugin::SpeechBubblePlugin;
