//! World module housing the demo scene and observer camera.
pub mod components;
pub mod plugin;
pub mod systems;

pub use plugin::WorldPlugin;
