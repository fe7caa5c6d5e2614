//! NPC-specific components and supporting resources.
use std::{fmt, time::Duration};

use bevy::prelude::*;

/// Unique identifier for an NPC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Component)]
pub struct NpcId(u64);

impl NpcId {
    pub fn new(value: u64) -> Self {
        Self(value)
    }
}

impl fmt::Display for NpcId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NPC-{:04}", self.0)
    }
}

#[derive(Component, Debug, Clone)]
pub struct Identity {
    pub id: NpcId,
    pub display_name: String,
}

impl Identity {
    pub fn new(id: NpcId, display_name: impl Into<String>) -> Self {
        Self {
            id,
            display_name: display_name.into(),
        }
    }
}

/// Resource that issues monotonically increasing NPC ids.
#[derive(Resource, Default)]
pub struct NpcIdGenerator {
    next: u64,
}

impl NpcIdGenerator {
    pub fn next_id(&mut self) -> NpcId {
        let id = self.next;
        self.next += 1;
        NpcId::new(id)
    }
}

/// Slow circular stroll around a home position.
#[derive(Component, Debug, Clone)]
pub struct Wander {
    pub home: Vec3,
    pub radius: f32,
    /// Radians per second.
    pub angular_speed: f32,
    pub phase: f32,
}

impl Wander {
    pub fn new(home: Vec3, radius: f32, angular_speed: f32) -> Self {
        Self {
            home,
            radius,
            angular_speed,
            phase: 0.0,
        }
    }

    pub fn advance(&mut self, delta_seconds: f32) -> Vec3 {
        self.phase = (self.phase + self.angular_speed * delta_seconds).rem_euclid(std::f32::consts::TAU);
        self.position()
    }

    pub fn position(&self) -> Vec3 {
        self.home + Vec3::new(self.phase.cos(), 0.0, self.phase.sin()) * self.radius
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatterAction {
    Speak(String),
    Dismiss,
}

/// Lines an NPC says out loud, one bubble at a time.
#[derive(Component, Debug)]
pub struct Chatter {
    lines: Vec<String>,
    next_line: usize,
    cooldown: Timer,
    /// Bubbles stay up until this NPC dismisses them.
    persistent: bool,
    speaking: bool,
    dismiss_timer: Option<Timer>,
}

impl Chatter {
    pub fn new(lines: &[&str], cooldown_secs: f32, persistent: bool) -> Self {
        Self {
            lines: lines.iter().map(|line| line.to_string()).collect(),
            next_line: 0,
            cooldown: Timer::from_seconds(cooldown_secs, TimerMode::Once),
            persistent,
            speaking: false,
            dismiss_timer: None,
        }
    }

    pub fn is_persistent(&self) -> bool {
        self.persistent
    }

    pub fn is_speaking(&self) -> bool {
        self.speaking
    }

    /// The bubble went away; start waiting for the next line.
    pub fn finish_speaking(&mut self) {
        self.speaking = false;
        self.dismiss_timer = None;
        self.cooldown.reset();
    }

    pub fn schedule_dismiss(&mut self, after_secs: f32) {
        self.dismiss_timer = Some(Timer::from_seconds(after_secs, TimerMode::Once));
    }

    pub fn tick(&mut self, delta: Duration) -> Option<ChatterAction> {
        if let Some(timer) = self.dismiss_timer.as_mut() {
            if timer.tick(delta).just_finished() {
                self.dismiss_timer = None;
                return Some(ChatterAction::Dismiss);
            }
            return None;
        }

        if self.speaking || self.lines.is_empty() {
            return None;
        }

        if !self.cooldown.tick(delta).just_finished() {
            return None;
        }

        let line = self.lines[self.next_line].clone();
        self.next_line = (self.next_line + 1) % self.lines.len();
        self.speaking = true;
        Some(ChatterAction::Speak(line))
    }
}
