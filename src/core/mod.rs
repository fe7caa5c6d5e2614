//! Core module exposing the simulation clock.
pub mod plugin;

pub use plugin::CorePlugin;
