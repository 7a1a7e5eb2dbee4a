//! Timing and scaling constants
//!
//! All tunables live here so the ramp and hold behaviors never hard-code a
//! duration. Durations are stored in milliseconds like the rest of the config.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::ConfigError;

/// Tunable timing constants
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct Timing {
    /// Highest program a program-change slider reaches
    #[serde(default = "default_program_change_slider_max")]
    pub program_change_slider_max: u8,

    /// Hold duration that turns a tap into a long-press
    #[serde(default = "default_long_press_ms")]
    pub long_press_ms: u64,

    /// Interval at which a held button polls for its release
    #[serde(default = "default_hold_sample_ms")]
    pub hold_sample_ms: u64,

    /// Velocity at which the ramp reaches its fastest rate
    #[serde(default = "default_max_pressure")]
    pub max_pressure: u8,

    /// Ramp rate scaling in steps per second
    #[serde(default = "default_speed")]
    pub speed: f64,

    /// Value sent by buttons
    #[serde(default = "default_button_value")]
    pub button_value: u8,

    /// Fixed step interval of program-change sliders
    #[serde(default = "default_program_step_ms")]
    pub program_step_ms: u64,
}

impl Timing {
    pub fn long_press(&self) -> Duration {
        Duration::from_millis(self.long_press_ms)
    }

    pub fn hold_sample(&self) -> Duration {
        Duration::from_millis(self.hold_sample_ms)
    }

    pub fn program_step(&self) -> Duration {
        Duration::from_millis(self.program_step_ms)
    }

    /// Number of samples in one long-press window (1500ms / 50ms = 30)
    ///
    /// Saturates for windows `validate` would reject.
    pub fn hold_samples(&self) -> u32 {
        u32::try_from(self.long_press_ms.div_ceil(self.hold_sample_ms.max(1))).unwrap_or(u32::MAX)
    }

    /// Step interval of a continuous ramp for the given velocity
    ///
    /// `(max_pressure - velocity) / speed` seconds, floored to one `1 / speed`
    /// tick once the velocity reaches `max_pressure`. Saturates at
    /// `Duration::MAX` for a speed `validate` would reject.
    pub fn ramp_interval(&self, velocity: u8) -> Duration {
        self.try_ramp_interval(velocity).unwrap_or(Duration::MAX)
    }

    fn try_ramp_interval(&self, velocity: u8) -> Option<Duration> {
        let secs = (f64::from(self.max_pressure) - f64::from(velocity)) / self.speed;
        let secs = if secs > 0.0 { secs } else { 1.0 / self.speed };
        Duration::try_from_secs_f64(secs).ok()
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.speed.is_finite() && self.speed > 0.0) {
            return Err(ConfigError::InvalidTiming(format!(
                "speed must be positive, got {}",
                self.speed
            )));
        }
        // Velocity 0 gives the longest interval, 127 the floor tick
        if self.try_ramp_interval(0).is_none() || self.try_ramp_interval(127).is_none() {
            return Err(ConfigError::InvalidTiming(format!(
                "speed {} is too small, ramp interval does not fit a duration",
                self.speed
            )));
        }
        if self.hold_sample_ms == 0 {
            return Err(ConfigError::InvalidTiming(
                "hold_sample_ms must be greater than 0".to_string(),
            ));
        }
        if u32::try_from(self.long_press_ms.div_ceil(self.hold_sample_ms)).is_err() {
            return Err(ConfigError::InvalidTiming(format!(
                "long_press_ms ({}) spans too many samples of {}ms",
                self.long_press_ms, self.hold_sample_ms
            )));
        }
        if self.long_press_ms < self.hold_sample_ms {
            return Err(ConfigError::InvalidTiming(format!(
                "long_press_ms ({}) must be at least hold_sample_ms ({})",
                self.long_press_ms, self.hold_sample_ms
            )));
        }
        if self.program_step_ms == 0 {
            return Err(ConfigError::InvalidTiming(
                "program_step_ms must be greater than 0".to_string(),
            ));
        }
        if self.program_change_slider_max > 127 {
            return Err(ConfigError::InvalidTiming(format!(
                "program_change_slider_max {} is out of range (must be 0-127)",
                self.program_change_slider_max
            )));
        }
        if self.button_value > 127 {
            return Err(ConfigError::InvalidTiming(format!(
                "button_value {} is out of range (must be 0-127)",
                self.button_value
            )));
        }
        Ok(())
    }
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            program_change_slider_max: default_program_change_slider_max(),
            long_press_ms: default_long_press_ms(),
            hold_sample_ms: default_hold_sample_ms(),
            max_pressure: default_max_pressure(),
            speed: default_speed(),
            button_value: default_button_value(),
            program_step_ms: default_program_step_ms(),
        }
    }
}

fn default_program_change_slider_max() -> u8 { 15 }
fn default_long_press_ms() -> u64 { 1500 }
fn default_hold_sample_ms() -> u64 { 50 }
fn default_max_pressure() -> u8 { 50 }
fn default_speed() -> f64 { 70.0 }
fn default_button_value() -> u8 { 0 }
fn default_program_step_ms() -> u64 { 1000 }
