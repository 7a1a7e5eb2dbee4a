//! icontrol gateway
//!
//! Turns controllers that only have momentary switches into something that
//! behaves like knobs and long-press buttons: held switches ramp controller
//! or program values at a velocity-dependent rate, paired sliders move in
//! opposite directions, and buttons tell a tap from a hold.

pub mod config;
pub mod engine;
pub mod error;
pub mod midi;
pub mod transport;

pub use error::{ConfigError, Error, Result};
