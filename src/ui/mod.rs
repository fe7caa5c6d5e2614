// src/ui/mod.rs
//
// UI module for overlays that live in the 3D world.
//
// Current features:
// - Speech bubbles anchored above NPCs

pub mod speech_bubble;

pub use speech_bubble::SpeechBubblePlugin as UiPlugin;
