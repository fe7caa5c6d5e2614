//! NPC module: the targets speech bubbles hang above.
pub mod components;
pub mod plugin;
pub mod systems;

pub use plugin::NpcPlugin;
