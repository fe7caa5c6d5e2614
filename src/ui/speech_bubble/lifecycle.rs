//! Timed show/hide sequence for a single bubble: delay, fade in, hold (or hold
//! forever), fade out, done.
//!
//! The sequence is advanced explicitly once per tick. A state entered on a
//! tick only starts consuming time on the following tick, and zero-length
//! phases fall straight through to the next state within the same call.
use bevy::prelude::*;

use super::components::BubblePanel;
use super::config::TimingConfig;
use super::events::BubbleSignal;

/// Opacity the panel shows on the first fade-in tick.
pub const FADE_IN_START_OPACITY: f32 = 0.1;

/// Opacities this close to a fade's end value snap onto it, so accumulated
/// rounding never costs an extra tick.
const OPACITY_SNAP: f32 = 1e-4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LifecycleState {
    #[default]
    Idle,
    Delaying,
    FadingIn,
    Holding,
    FadingOut,
    HeldForever,
    Done,
}

impl LifecycleState {
    pub fn label(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Delaying => "delaying",
            Self::FadingIn => "fading in",
            Self::Holding => "holding",
            Self::FadingOut => "fading out",
            Self::HeldForever => "held forever",
            Self::Done => "done",
        }
    }
}

#[derive(Component, Debug, Clone)]
pub struct BubbleLifecycle {
    timing: TimingConfig,
    state: LifecycleState,
    elapsed: f32,
}

impl BubbleLifecycle {
    pub fn new(timing: TimingConfig) -> Self {
        Self {
            timing: timing.sanitized(),
            state: LifecycleState::Idle,
            elapsed: 0.0,
        }
    }

    pub fn state(&self) -> LifecycleState {
        self.state
    }

    pub fn is_done(&self) -> bool {
        self.state == LifecycleState::Done
    }

    /// Leaves `Idle`. Calling it again on a running lifecycle does nothing.
    pub fn start(&mut self, panel: &mut BubblePanel) -> Option<BubbleSignal> {
        if self.state != LifecycleState::Idle {
            return None;
        }
        self.enter_delaying(panel)
    }

    /// Advances the sequence by `delta_seconds`, mutating `panel` and returning
    /// the signal raised on this tick, if any.
    pub fn tick(&mut self, delta_seconds: f32, panel: &mut BubblePanel) -> Option<BubbleSignal> {
        let delta = if delta_seconds.is_finite() {
            delta_seconds.max(0.0)
        } else {
            0.0
        };

        match self.state {
            LifecycleState::Idle | LifecycleState::HeldForever | LifecycleState::Done => None,
            LifecycleState::Delaying => {
                self.elapsed += delta;
                if self.elapsed >= self.timing.onset_delay {
                    self.enter_fading_in(panel)
                } else {
                    None
                }
            }
            LifecycleState::FadingIn => {
                let mut opacity = panel.opacity() + delta / self.timing.fade_in_duration;
                if opacity >= 1.0 - OPACITY_SNAP {
                    opacity = 1.0;
                }
                panel.set_opacity(opacity);
                if panel.opacity() >= 1.0 {
                    self.finish_fading_in(panel)
                } else {
                    None
                }
            }
            LifecycleState::Holding => {
                self.elapsed += delta;
                if self.elapsed >= self.timing.hold_duration {
                    self.enter_fading_out(panel)
                } else {
                    None
                }
            }
            LifecycleState::FadingOut => {
                let mut opacity = panel.opacity() - delta / self.timing.fade_out_duration;
                if opacity <= OPACITY_SNAP {
                    opacity = 0.0;
                }
                panel.set_opacity(opacity);
                if panel.opacity() <= 0.0 {
                    self.finish_fading_out(panel)
                } else {
                    None
                }
            }
        }
    }

    /// Cuts the sequence short through the fade-out path.
    ///
    /// A bubble that never became visible is simply finished.
    pub fn dismiss(&mut self, panel: &mut BubblePanel) -> Option<BubbleSignal> {
        match self.state {
            LifecycleState::Idle | LifecycleState::Delaying => {
                panel.set_active(false);
                self.state = LifecycleState::Done;
                None
            }
            LifecycleState::FadingIn | LifecycleState::Holding | LifecycleState::HeldForever => {
                self.enter_fading_out(panel)
            }
            LifecycleState::FadingOut | LifecycleState::Done => None,
        }
    }

    fn enter_delaying(&mut self, panel: &mut BubblePanel) -> Option<BubbleSignal> {
        panel.set_active(false);
        self.state = LifecycleState::Delaying;
        self.elapsed = 0.0;
        if self.timing.onset_delay <= 0.0 {
            return self.enter_fading_in(panel);
        }
        None
    }

    fn enter_fading_in(&mut self, panel: &mut BubblePanel) -> Option<BubbleSignal> {
        panel.set_active(true);
        if !self.timing.enable_fade_in || self.timing.fade_in_duration <= 0.0 {
            return self.finish_fading_in(panel);
        }
        panel.set_opacity(FADE_IN_START_OPACITY);
        self.state = LifecycleState::FadingIn;
        None
    }

    fn finish_fading_in(&mut self, panel: &mut BubblePanel) -> Option<BubbleSignal> {
        panel.set_opacity(1.0);
        if self.timing.never_end {
            self.state = LifecycleState::HeldForever;
            return Some(BubbleSignal::HeldForever);
        }
        self.state = LifecycleState::Holding;
        self.elapsed = 0.0;
        if self.timing.hold_duration <= 0.0 {
            return self.enter_fading_out(panel);
        }
        None
    }

    fn enter_fading_out(&mut self, panel: &mut BubblePanel) -> Option<BubbleSignal> {
        if !self.timing.enable_fade_out {
            // Hidden as-is: opacity untouched, no completion signal.
            panel.set_active(false);
            self.state = LifecycleState::Done;
            return None;
        }
        if self.timing.fade_out_duration <= 0.0 {
            return self.finish_fading_out(panel);
        }
        self.state = LifecycleState::FadingOut;
        None
    }

    fn finish_fading_out(&mut self, panel: &mut BubblePanel) -> Option<BubbleSignal> {
        panel.set_opacity(0.0);
        panel.set_active(false);
        self.state = LifecycleState::Done;
        Some(BubbleSignal::FadeOutFinished)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn timing() -> TimingConfig {
        TimingConfig {
            onset_delay: 0.0,
            hold_duration: 2.0,
            fade_in_duration: 1.0,
            fade_out_duration: 1.0,
            enable_fade_in: true,
            enable_fade_out: true,
            never_end: false,
        }
    }

    #[test]
    fn full_sequence_at_half_second_ticks() {
        let mut lifecycle = BubbleLifecycle::new(timing());
        let mut panel = BubblePanel::default();

        assert_eq!(lifecycle.start(&mut panel), None);
        assert_eq!(lifecycle.state(), LifecycleState::FadingIn);
        assert!(panel.is_active());
        assert_eq!(panel.opacity(), FADE_IN_START_OPACITY);

        let mut opacities = Vec::new();
        let mut signals = Vec::new();
        let mut completed_at = None;
        for tick in 1..=10 {
            if let Some(signal) = lifecycle.tick(0.5, &mut panel) {
                signals.push(signal);
                completed_at.get_or_insert(tick as f32 * 0.5);
            }
            opacities.push(panel.opacity());
        }

        // 2 fade-in ticks, 4 holding ticks, 2 fade-out ticks.
        assert!((opacities[0] - 0.6).abs() < 1e-6);
        assert_eq!(&opacities[1..6], &[1.0; 5]);
        assert!((opacities[6] - 0.5).abs() < 1e-6);
        assert_eq!(opacities[7], 0.0);

        assert_eq!(signals, vec![BubbleSignal::FadeOutFinished]);
        assert_eq!(completed_at, Some(4.0));
        assert!(!panel.is_active());
        assert!(lifecycle.is_done());
    }

    #[test]
    fn onset_delay_keeps_panel_hidden() {
        let mut lifecycle = BubbleLifecycle::new(TimingConfig {
            onset_delay: 1.0,
            ..timing()
        });
        let mut panel = BubblePanel::default();
        lifecycle.start(&mut panel);

        lifecycle.tick(0.4, &mut panel);
        lifecycle.tick(0.4, &mut panel);
        assert_eq!(lifecycle.state(), LifecycleState::Delaying);
        assert!(!panel.is_active());

        lifecycle.tick(0.4, &mut panel);
        assert_eq!(lifecycle.state(), LifecycleState::FadingIn);
        assert!(panel.is_active());
        assert_eq!(panel.opacity(), FADE_IN_START_OPACITY);
    }

    #[test]
    fn fade_in_is_monotonic_and_bounded_in_ticks() {
        let fade_in = 0.7;
        let dt = 0.05;
        let mut lifecycle = BubbleLifecycle::new(TimingConfig {
            fade_in_duration: fade_in,
            ..timing()
        });
        let mut panel = BubblePanel::default();
        lifecycle.start(&mut panel);

        let bound = (fade_in / dt).ceil() as usize;
        let mut previous = panel.opacity();
        assert!(previous >= FADE_IN_START_OPACITY);
        for _ in 0..bound {
            lifecycle.tick(dt, &mut panel);
            assert!(panel.opacity() >= previous);
            previous = panel.opacity();
        }
        assert_eq!(panel.opacity(), 1.0);
        assert_eq!(lifecycle.state(), LifecycleState::Holding);
    }

    #[test]
    fn fade_out_is_monotonic_and_bounded_in_ticks() {
        let fade_out = 1.0;
        let dt = 0.1;
        let mut lifecycle = BubbleLifecycle::new(TimingConfig {
            hold_duration: 0.0,
            enable_fade_in: false,
            fade_out_duration: fade_out,
            ..timing()
        });
        let mut panel = BubblePanel::default();
        lifecycle.start(&mut panel);
        assert_eq!(lifecycle.state(), LifecycleState::FadingOut);
        assert_eq!(panel.opacity(), 1.0);

        let bound = (fade_out / dt).ceil() as usize;
        let mut previous = panel.opacity();
        let mut signal = None;
        for _ in 0..bound {
            signal = signal.or(lifecycle.tick(dt, &mut panel));
            assert!(panel.opacity() <= previous);
            previous = panel.opacity();
        }
        assert_eq!(panel.opacity(), 0.0);
        assert_eq!(signal, Some(BubbleSignal::FadeOutFinished));
    }

    #[test]
    fn zero_fade_in_shows_fully_on_first_tick() {
        let mut lifecycle = BubbleLifecycle::new(TimingConfig {
            onset_delay: 0.5,
            fade_in_duration: 0.0,
            ..timing()
        });
        let mut panel = BubblePanel::default();
        lifecycle.start(&mut panel);

        lifecycle.tick(0.5, &mut panel);
        assert!(panel.is_active());
        assert_eq!(panel.opacity(), 1.0);
        assert_eq!(lifecycle.state(), LifecycleState::Holding);
    }

    #[test]
    fn never_end_signals_once_and_never_fades() {
        let mut lifecycle = BubbleLifecycle::new(TimingConfig {
            never_end: true,
            ..timing()
        });
        let mut panel = BubblePanel::default();
        lifecycle.start(&mut panel);

        let signals: Vec<_> = (0..40)
            .filter_map(|_| lifecycle.tick(0.5, &mut panel))
            .collect();
        assert_eq!(signals, vec![BubbleSignal::HeldForever]);
        assert_eq!(lifecycle.state(), LifecycleState::HeldForever);
        assert!(panel.is_active());
        assert_eq!(panel.opacity(), 1.0);
    }

    #[test]
    fn disabled_fade_out_hides_without_signal() {
        let mut lifecycle = BubbleLifecycle::new(TimingConfig {
            enable_fade_in: false,
            enable_fade_out: false,
            hold_duration: 1.0,
            ..timing()
        });
        let mut panel = BubblePanel::default();
        lifecycle.start(&mut panel);
        assert_eq!(panel.opacity(), 1.0);

        assert_eq!(lifecycle.tick(0.5, &mut panel), None);
        assert!(panel.is_active());
        assert_eq!(lifecycle.tick(0.5, &mut panel), None);
        assert!(!panel.is_active());
        assert_eq!(panel.opacity(), 1.0);
        assert!(lifecycle.is_done());
    }

    #[test]
    fn all_zero_durations_complete_on_start() {
        let mut lifecycle = BubbleLifecycle::new(TimingConfig {
            onset_delay: 0.0,
            hold_duration: 0.0,
            fade_in_duration: 0.0,
            fade_out_duration: 0.0,
            ..timing()
        });
        let mut panel = BubblePanel::default();

        assert_eq!(
            lifecycle.start(&mut panel),
            Some(BubbleSignal::FadeOutFinished)
        );
        assert!(lifecycle.is_done());
        assert!(!panel.is_active());
    }

    #[test]
    fn negative_durations_behave_as_zero() {
        let mut lifecycle = BubbleLifecycle::new(TimingConfig {
            onset_delay: -3.0,
            fade_in_duration: -1.0,
            ..timing()
        });
        let mut panel = BubblePanel::default();
        lifecycle.start(&mut panel);

        assert_eq!(lifecycle.timing.onset_delay, 0.0);
        assert_eq!(lifecycle.state(), LifecycleState::Holding);
        assert_eq!(panel.opacity(), 1.0);
    }

    #[test]
    fn dismiss_fades_out_held_bubble() {
        let mut lifecycle = BubbleLifecycle::new(TimingConfig {
            never_end: true,
            enable_fade_in: false,
            ..timing()
        });
        let mut panel = BubblePanel::default();
        assert_eq!(lifecycle.start(&mut panel), Some(BubbleSignal::HeldForever));

        assert_eq!(lifecycle.dismiss(&mut panel), None);
        assert_eq!(lifecycle.state(), LifecycleState::FadingOut);
        assert_eq!(lifecycle.tick(0.5, &mut panel), None);
        assert_eq!(
            lifecycle.tick(0.5, &mut panel),
            Some(BubbleSignal::FadeOutFinished)
        );
    }

    #[test]
    fn dismiss_before_showing_finishes_silently() {
        let mut lifecycle = BubbleLifecycle::new(TimingConfig {
            onset_delay: 2.0,
            ..timing()
        });
        let mut panel = BubblePanel::default();
        lifecycle.start(&mut panel);

        assert_eq!(lifecycle.dismiss(&mut panel), None);
        assert!(lifecycle.is_done());
        assert!(!panel.is_active());
        assert_eq!(lifecycle.tick(5.0, &mut panel), None);
    }

    #[test]
    fn idle_lifecycle_ignores_ticks() {
        let mut lifecycle = BubbleLifecycle::new(timing());
        let mut panel = BubblePanel::default();
        assert_eq!(lifecycle.tick(1.0, &mut panel), None);
        assert_eq!(lifecycle.state(), LifecycleState::Idle);
        assert_eq!(lifecycle.state().label(), "idle");
        assert!(!panel.is_active());
    }
}
