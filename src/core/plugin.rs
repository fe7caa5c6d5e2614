//! CorePlugin owns the simulation clock every bubble and demo system ticks from.
use bevy::prelude::*;
#[cfg(feature = "core_debug")]
use bevy::time::TimerMode;
use std::time::Duration;

const DEFAULT_TIME_SCALE: f32 = 1.0;
const MIN_TIME_SCALE: f32 = 0.001;
const MAX_TIME_SCALE: f32 = 8.0;

#[cfg(feature = "core_debug")]
#[derive(Resource)]
struct ClockReportTimer(Timer);

#[cfg(feature = "core_debug")]
impl Default for ClockReportTimer {
    fn default() -> Self {
        Self(Timer::from_seconds(1.0, TimerMode::Repeating))
    }
}

/// Scaled, pausable tick source derived from real frame deltas.
#[derive(Resource, Debug)]
pub struct SimulationClock {
    time_scale: f32,
    paused: bool,
    last_real_delta: Duration,
    last_scaled_delta: Duration,
    elapsed: Duration,
}

impl SimulationClock {
    pub fn new(time_scale: f32) -> Self {
        Self {
            time_scale: sanitize_time_scale(time_scale),
            paused: false,
            last_real_delta: Duration::ZERO,
            last_scaled_delta: Duration::ZERO,
            elapsed: Duration::ZERO,
        }
    }

    pub fn set_time_scale(&mut self, scale: f32) {
        self.time_scale = sanitize_time_scale(scale);
    }

    pub fn time_scale(&self) -> f32 {
        self.time_scale
    }

    pub fn set_paused(&mut self, paused: bool) {
        self.paused = paused;
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    #[cfg_attr(not(feature = "core_debug"), allow(dead_code))]
    pub fn last_real_delta(&self) -> Duration {
        self.last_real_delta
    }

    /// Time elapsed since the previous tick, after scaling and pausing.
    pub fn last_scaled_delta(&self) -> Duration {
        self.last_scaled_delta
    }

    /// Total scaled time since the clock was created.
    #[cfg_attr(not(feature = "core_debug"), allow(dead_code))]
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    pub fn tick(&mut self, real_delta: Duration) {
        self.last_real_delta = real_delta;
        self.last_scaled_delta = if self.paused {
            Duration::ZERO
        } else {
            real_delta.mul_f32(self.time_scale)
        };
        self.elapsed += self.last_scaled_delta;
    }
}

impl Default for SimulationClock {
    fn default() -> Self {
        Self::new(DEFAULT_TIME_SCALE)
    }
}

fn sanitize_time_scale(scale: f32) -> f32 {
    if scale.is_finite() {
        scale.clamp(MIN_TIME_SCALE, MAX_TIME_SCALE)
    } else {
        DEFAULT_TIME_SCALE
    }
}

/// Registers the simulation clock and keeps it in step with Bevy's `Time`.
#[derive(Debug, Clone, Copy)]
pub struct CorePlugin {
    time_scale: f32,
}

impl Default for CorePlugin {
    fn default() -> Self {
        Self {
            time_scale: DEFAULT_TIME_SCALE,
        }
    }
}

impl Plugin for CorePlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(SimulationClock::new(self.time_scale))
            .add_systems(Startup, log_clock_configuration)
            .add_systems(
                PreUpdate,
                (control_simulation_clock, update_simulation_clock).chain(),
            );

        #[cfg(feature = "core_debug")]
        {
            app.init_resource::<ClockReportTimer>()
                .add_systems(PostUpdate, report_clock_state);
        }
    }
}

/// Feeds the frame delta from `Time` into the clock. `Time` advances in `First`.
pub fn update_simulation_clock(mut clock: ResMut<SimulationClock>, time: Res<Time>) {
    clock.tick(time.delta());
}

/// Space toggles pause; `[` and `]` halve and double the time scale.
pub fn control_simulation_clock(
    keyboard: Res<ButtonInput<KeyCode>>,
    mut clock: ResMut<SimulationClock>,
) {
    if keyboard.just_pressed(KeyCode::Space) {
        let paused = !clock.is_paused();
        clock.set_paused(paused);
        info!("Simulation {}", if paused { "paused" } else { "resumed" });
    }

    let factor = if keyboard.just_pressed(KeyCode::BracketLeft) {
        0.5
    } else if keyboard.just_pressed(KeyCode::BracketRight) {
        2.0
    } else {
        return;
    };

    let scale = clock.time_scale() * factor;
    clock.set_time_scale(scale);
    info!("Time scale set to {:.3}", clock.time_scale());
}

fn log_clock_configuration(clock: Res<SimulationClock>) {
    info!(
        "CorePlugin ready: time scale {:.3}{}",
        clock.time_scale(),
        if clock.is_paused() { " (paused)" } else { "" }
    );
}

#[cfg(feature = "core_debug")]
fn report_clock_state(mut timer: ResMut<ClockReportTimer>, clock: Res<SimulationClock>) {
    if timer.0.tick(clock.last_real_delta()).just_finished() {
        info!(
            target: "core_debug",
            "Clock elapsed: {:.2}s | scale: {:.3} | real dt: {:.4}s | scaled dt: {:.4}s",
            clock.elapsed().as_secs_f32(),
            clock.time_scale(),
            clock.last_real_delta().as_secs_f32(),
            clock.last_scaled_delta().as_secs_f32(),
        );
    }
}
