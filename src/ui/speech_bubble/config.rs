//! Speech bubble configuration loaded from `config/speech_bubble.toml`.
use std::{fs, path::Path};

use bevy::prelude::*;
use serde::Deserialize;

use super::errors::BubbleError;

const CONFIG_PATH: &str = "config/speech_bubble.toml";
const MIN_PANEL_EXTENT: f32 = 0.01;
const MIN_FONT_SIZE: f32 = 4.0;

#[derive(Debug, Clone, Deserialize, Default)]
struct RawSpeechBubbleConfig {
    #[serde(default)]
    placement: RawPlacement,
    #[serde(default)]
    timing: RawTiming,
    #[serde(default)]
    rotation: RawRotation,
    #[serde(default)]
    tracking: RawTracking,
    #[serde(default)]
    display: RawDisplay,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawPlacement {
    offset: [f32; 3],
    center_justify: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
struct RawTiming {
    onset_delay_seconds: f32,
    display_seconds: f32,
    never_end: bool,
    fade_in: bool,
    fade_out: bool,
    fade_in_seconds: f32,
    fade_out_seconds: f32,
}

impl Default for RawTiming {
    fn default() -> Self {
        Self {
            onset_delay_seconds: 1.0,
            display_seconds: 10.0,
            never_end: false,
            fade_in: true,
            fade_out: true,
            fade_in_seconds: 1.0,
            fade_out_seconds: 1.0,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
struct RawRotation {
    enabled: bool,
    turn_speed: f32,
    reverse: bool,
}

impl Default for RawRotation {
    fn default() -> Self {
        Self {
            enabled: true,
            turn_speed: 5.0,
            reverse: false,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawTracking {
    every_frame: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
struct RawDisplay {
    panel_width: f32,
    panel_height: f32,
    color: [f32; 4],
    font_size: f32,
    text_color: [f32; 4],
    despawn_when_done: bool,
}

impl Default for RawDisplay {
    fn default() -> Self {
        Self {
            panel_width: 1.6,
            panel_height: 0.6,
            color: [0.96, 0.96, 0.92, 1.0],
            font_size: 16.0,
            text_color: [0.08, 0.08, 0.1, 1.0],
            despawn_when_done: true,
        }
    }
}

/// Where the panel sits relative to its target.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PlacementConfig {
    pub offset: Vec3,
    /// Anchor with the right half-edge only, centring the panel over the target.
    pub center_justify: bool,
}

/// Durations are in seconds. `hold_duration` is ignored when `never_end` is set.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimingConfig {
    pub onset_delay: f32,
    pub hold_duration: f32,
    pub fade_in_duration: f32,
    pub fade_out_duration: f32,
    pub enable_fade_in: bool,
    pub enable_fade_out: bool,
    pub never_end: bool,
}

impl Default for TimingConfig {
    fn default() -> Self {
        RawTiming::default().into()
    }
}

impl TimingConfig {
    /// Clamps negative or non-finite durations to zero, warning once per field.
    pub fn sanitized(self) -> Self {
        Self {
            onset_delay: clamp_duration("onset_delay", self.onset_delay),
            hold_duration: clamp_duration("hold_duration", self.hold_duration),
            fade_in_duration: clamp_duration("fade_in_duration", self.fade_in_duration),
            fade_out_duration: clamp_duration("fade_out_duration", self.fade_out_duration),
            ..self
        }
    }
}

fn clamp_duration(field: &'static str, value: f32) -> f32 {
    if value.is_finite() && value >= 0.0 {
        return value;
    }
    warn!("{}", BubbleError::InvalidDuration { field, value });
    0.0
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RotationConfig {
    pub enabled: bool,
    /// Interpolation rate per second towards the facing orientation.
    pub turn_speed: f32,
    /// Face towards the reference instead of away from it.
    pub reversed: bool,
}

impl Default for RotationConfig {
    fn default() -> Self {
        RawRotation::default().into()
    }
}

/// Everything a single bubble instance needs to place, turn and time itself.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BubbleConfig {
    pub placement: PlacementConfig,
    pub timing: TimingConfig,
    pub rotation: RotationConfig,
    /// Recompute placement and facing every tick instead of once at start.
    pub continuous_tracking: bool,
}

/// Runtime settings shared by every bubble spawned through the plugin.
#[derive(Resource, Debug, Clone)]
pub struct SpeechBubbleSettings {
    pub defaults: BubbleConfig,
    pub panel_size: Vec2,
    /// Its alpha scales the lifecycle opacity.
    pub panel_color: Color,
    pub font_size: f32,
    pub text_color: Color,
    /// Despawn bubbles whose lifecycle reached `Done`.
    pub despawn_when_done: bool,
}

impl Default for SpeechBubbleSettings {
    fn default() -> Self {
        RawSpeechBubbleConfig::default().into()
    }
}

impl SpeechBubbleSettings {
    pub fn load_or_default() -> Self {
        let path = Path::new(CONFIG_PATH);
        match fs::read_to_string(path) {
            Ok(raw) => Self::from_toml_str(&raw).unwrap_or_else(|err| {
                warn!(
                    "Failed to parse {} ({}). Falling back to defaults.",
                    CONFIG_PATH, err
                );
                Self::default()
            }),
            Err(err) => {
                warn!(
                    "Failed to read {} ({}). Falling back to defaults.",
                    CONFIG_PATH, err
                );
                Self::default()
            }
        }
    }

    pub fn from_toml_str(raw: &str) -> Result<Self, toml::de::Error> {
        toml::from_str::<RawSpeechBubbleConfig>(raw).map(Into::into)
    }
}

impl From<RawTiming> for TimingConfig {
    fn from(value: RawTiming) -> Self {
        Self {
            onset_delay: value.onset_delay_seconds,
            hold_duration: value.display_seconds,
            fade_in_duration: value.fade_in_seconds,
            fade_out_duration: value.fade_out_seconds,
            enable_fade_in: value.fade_in,
            enable_fade_out: value.fade_out,
            never_end: value.never_end,
        }
        .sanitized()
    }
}

impl From<RawRotation> for RotationConfig {
    fn from(value: RawRotation) -> Self {
        Self {
            enabled: value.enabled,
            turn_speed: if value.turn_speed.is_finite() {
                value.turn_speed.max(0.0)
            } else {
                0.0
            },
            reversed: value.reverse,
        }
    }
}

impl From<RawSpeechBubbleConfig> for SpeechBubbleSettings {
    fn from(value: RawSpeechBubbleConfig) -> Self {
        let placement = PlacementConfig {
            offset: Vec3::from_array(value.placement.offset),
            center_justify: value.placement.center_justify,
        };

        let defaults = BubbleConfig {
            placement,
            timing: value.timing.into(),
            rotation: value.rotation.into(),
            continuous_tracking: value.tracking.every_frame,
        };

        let [r, g, b, a] = value.display.color;
        let [tr, tg, tb, ta] = value.display.text_color;

        Self {
            defaults,
            panel_size: Vec2::new(
                value.display.panel_width.max(MIN_PANEL_EXTENT),
                value.display.panel_height.max(MIN_PANEL_EXTENT),
            ),
            panel_color: Color::srgba(r, g, b, a.clamp(0.0, 1.0)),
            font_size: value.display.font_size.max(MIN_FONT_SIZE),
            text_color: Color::srgba(tr, tg, tb, ta.clamp(0.0, 1.0)),
            despawn_when_done: value.display.despawn_when_done,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_reset_values() {
        let settings = SpeechBubbleSettings::default();
        let timing = settings.defaults.timing;

        assert_eq!(timing.onset_delay, 1.0);
        assert_eq!(timing.hold_duration, 10.0);
        assert!(timing.enable_fade_in && timing.enable_fade_out);
        assert!(!timing.never_end);
        assert!(settings.defaults.rotation.enabled);
        assert!(!settings.defaults.rotation.reversed);
        assert!(!settings.defaults.placement.center_justify);
        assert!(!settings.defaults.continuous_tracking);
        assert_eq!(settings.defaults.placement.offset, Vec3::ZERO);
    }

    #[test]
    fn parses_partial_toml_and_keeps_other_defaults() {
        let settings = SpeechBubbleSettings::from_toml_str(
            r#"
            [placement]
            offset = [0.0, 0.5, 0.0]
            center_justify = true

            [timing]
            never_end = true

            [tracking]
            every_frame = true
            "#,
        )
        .expect("valid toml");

        assert_eq!(settings.defaults.placement.offset, Vec3::new(0.0, 0.5, 0.0));
        assert!(settings.defaults.placement.center_justify);
        assert!(settings.defaults.timing.never_end);
        assert_eq!(settings.defaults.timing.fade_in_duration, 1.0);
        assert!(settings.defaults.continuous_tracking);
    }

    #[test]
    fn negative_durations_clamp_to_zero() {
        let settings = SpeechBubbleSettings::from_toml_str(
            r#"
            [timing]
            onset_delay_seconds = -1.0
            fade_out_seconds = -0.5

            [rotation]
            turn_speed = -4.0
            "#,
        )
        .expect("valid toml");

        assert_eq!(settings.defaults.timing.onset_delay, 0.0);
        assert_eq!(settings.defaults.timing.fade_out_duration, 0.0);
        assert_eq!(settings.defaults.rotation.turn_speed, 0.0);
    }

    #[test]
    fn display_section_keeps_panel_alpha() {
        let settings = SpeechBubbleSettings::from_toml_str(
            r#"
            [display]
            color = [1.0, 1.0, 1.0, 0.5]
            font_size = 1.0
            "#,
        )
        .expect("valid toml");

        assert_eq!(settings.panel_color.alpha(), 0.5);
        assert_eq!(settings.font_size, MIN_FONT_SIZE);
        assert_eq!(settings.text_color.alpha(), 1.0);
    }

    #[test]
    fn malformed_toml_is_an_error() {
        assert!(SpeechBubbleSettings::from_toml_str("[timing\nnever_end = ").is_err());
    }
}
