// src/ui/speech_bubble/components.rs
//
// Components and resources describing a world-space speech bubble.

use std::collections::HashMap;

use bevy::prelude::*;

use super::config::{BubbleConfig, PlacementConfig, RotationConfig};
use super::errors::ErrorLatch;
use super::placement::world_corners;

/// Root of a speech bubble panel.
///
/// The root entity owns the panel `Transform` (placed and turned every tick or
/// once, see `continuous_tracking`). Bubble roots are never parented, so their
/// local transform is their world transform.
#[derive(Component, Debug)]
pub struct SpeechBubble {
    target: Entity,
    reference: Option<Entity>,
    content: Entity,
    line: String,
    placement: PlacementConfig,
    rotation: RotationConfig,
    continuous_tracking: bool,
    placed_once: bool,
    pub(crate) placement_status: ErrorLatch,
    pub(crate) facing_status: ErrorLatch,
}

impl SpeechBubble {
    pub fn new(
        target: Entity,
        reference: Option<Entity>,
        content: Entity,
        line: impl Into<String>,
        config: &BubbleConfig,
    ) -> Self {
        Self {
            target,
            reference,
            content,
            line: line.into(),
            placement: config.placement,
            rotation: config.rotation,
            continuous_tracking: config.continuous_tracking,
            placed_once: false,
            placement_status: ErrorLatch::default(),
            facing_status: ErrorLatch::default(),
        }
    }

    pub fn target(&self) -> Entity {
        self.target
    }

    pub fn reference(&self) -> Option<Entity> {
        self.reference
    }

    /// Child entity toggled visible/hidden and faded.
    pub fn content(&self) -> Entity {
        self.content
    }

    pub fn line(&self) -> &str {
        &self.line
    }

    pub fn placement(&self) -> &PlacementConfig {
        &self.placement
    }

    pub fn rotation(&self) -> &RotationConfig {
        &self.rotation
    }

    /// Swap in a new line and config, scheduling a fresh one-shot placement.
    pub fn restart(&mut self, line: impl Into<String>, reference: Option<Entity>, config: &BubbleConfig) {
        self.line = line.into();
        self.reference = reference;
        self.placement = config.placement;
        self.rotation = config.rotation;
        self.continuous_tracking = config.continuous_tracking;
        self.placed_once = false;
    }

    /// Whether the tracking pass should run this tick.
    pub fn wants_tracking(&self, panel_active: bool) -> bool {
        if self.continuous_tracking {
            panel_active
        } else {
            !self.placed_once
        }
    }

    pub fn mark_tracked(&mut self) {
        self.placed_once = true;
    }

    #[cfg(test)]
    pub fn placement_error(&self) -> Option<&super::errors::BubbleError> {
        self.placement_status.last()
    }

    #[cfg(test)]
    pub fn facing_error(&self) -> Option<&super::errors::BubbleError> {
        self.facing_status.last()
    }
}

/// Visibility state the lifecycle drives: an active flag and a group opacity.
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct BubblePanel {
    active: bool,
    opacity: f32,
}

impl Default for BubblePanel {
    fn default() -> Self {
        Self {
            active: false,
            opacity: 0.0,
        }
    }
}

impl BubblePanel {
    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn set_active(&mut self, active: bool) {
        self.active = active;
    }

    pub fn opacity(&self) -> f32 {
        self.opacity
    }

    /// Opacity is always kept inside `[0, 1]`; NaN becomes 0.
    pub fn set_opacity(&mut self, opacity: f32) {
        self.opacity = if opacity.is_nan() {
            0.0
        } else {
            opacity.clamp(0.0, 1.0)
        };
    }
}

/// Size of the bubble's rectangular panel in world units.
#[derive(Component, Debug, Clone, Copy)]
pub struct BubbleRect {
    pub size: Vec2,
}

impl BubbleRect {
    pub fn new(size: Vec2) -> Self {
        Self { size }
    }

    pub fn world_corners(&self, transform: &Transform) -> [Vec3; 4] {
        world_corners(self.size, transform)
    }
}

/// Marker for the child entity that is shown, hidden and faded.
#[derive(Component, Debug, Default)]
pub struct BubbleContent;

/// Screen-space text node showing a bubble's line, following its panel.
/// Despawned once `bubble` no longer exists.
#[derive(Component, Debug, Clone, Copy)]
pub struct BubbleLabel {
    pub bubble: Entity,
}

/// Vertical extent of a bubble target (its collider height).
#[derive(Component, Debug, Clone, Copy)]
pub struct BoundsHeight(pub f32);

/// Marks the object bubbles turn towards when a request names none,
/// usually the camera.
#[derive(Component, Debug, Default)]
pub struct BubbleFacingReference;

/// One bubble per target: maps the target entity to its bubble root.
#[derive(Resource, Debug, Default)]
pub struct SpeechBubbleTracker {
    pub by_target: HashMap<Entity, Entity>,
}
