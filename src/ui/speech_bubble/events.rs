//! Messages flowing into and out of the speech bubble plugin.
use bevy::prelude::{Entity, Message};

use super::config::BubbleConfig;

/// Request a bubble above `target`. Re-requesting for the same target restarts
/// its existing bubble with the new line.
#[derive(Message, Debug, Clone)]
pub struct ShowSpeechBubble {
    pub target: Entity,
    pub line: String,
    /// Object to turn towards; `None` falls back to the `BubbleFacingReference` entity.
    pub reference: Option<Entity>,
    /// Per-request override of `SpeechBubbleSettings::defaults`.
    pub config: Option<BubbleConfig>,
}

impl ShowSpeechBubble {
    pub fn new(target: Entity, line: impl Into<String>) -> Self {
        Self {
            target,
            line: line.into(),
            reference: None,
            config: None,
        }
    }

    pub fn with_config(mut self, config: BubbleConfig) -> Self {
        self.config = Some(config);
        self
    }
}

/// Ask for the bubble above `target` to go away.
///
/// With `fade_out` the bubble runs its fade-out and signals completion;
/// without it the bubble is torn down immediately and signals nothing.
#[derive(Message, Debug, Clone, Copy)]
pub struct DismissSpeechBubble {
    pub target: Entity,
    pub fade_out: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BubbleSignal {
    /// The interpolated fade-out reached zero and the panel was hidden.
    FadeOutFinished,
    /// The bubble finished fading in and will stay until dismissed.
    HeldForever,
}

/// Fire-and-forget notification for whatever logic requested the bubble.
#[derive(Message, Debug, Clone, Copy)]
pub struct BubbleSignalEvent {
    pub bubble: Entity,
    pub target: Entity,
    pub signal: BubbleSignal,
}
