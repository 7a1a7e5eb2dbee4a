//! Button behavior - tap versus long-press
//!
//! A button without a paired target fires immediately. With a paired target
//! it starts a `Hold` that counts down fixed samples; a release seen at any
//! sample is a tap, running out of samples is a long-press.

use std::time::Duration;

use super::emitter::OutputMessage;
use crate::config::{Timing, TriggerConfig};

/// What a button press turns into
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ButtonPress {
    /// Pure momentary button, send now
    Momentary(OutputMessage),
    /// Long-press capable button, wait for the hold to resolve
    Hold(Hold),
}

impl ButtonPress {
    pub fn start(config: &TriggerConfig, timing: &Timing) -> Self {
        let tap = OutputMessage::ControlChange {
            channel: config.channel,
            controller: config.target,
            value: timing.button_value,
        };

        match config.paired_target() {
            None => ButtonPress::Momentary(tap),
            Some(paired) => ButtonPress::Hold(Hold {
                remaining: timing.hold_samples(),
                sample: timing.hold_sample(),
                tap,
                long_press: OutputMessage::ControlChange {
                    channel: config.channel,
                    controller: paired,
                    value: timing.button_value,
                },
            }),
        }
    }
}

/// Hold timer of one long-press capable button
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hold {
    remaining: u32,
    sample: Duration,
    tap: OutputMessage,
    long_press: OutputMessage,
}

impl Hold {
    pub fn sample_interval(&self) -> Duration {
        self.sample
    }

    /// Samples left before the hold counts as a long-press
    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    /// Message for a release seen before the window ran out
    pub fn tap(&self) -> OutputMessage {
        self.tap
    }

    /// Account for one sample that saw no release
    ///
    /// Returns the long-press message once the window is used up.
    pub fn tick(&mut self) -> Option<OutputMessage> {
        self.remaining = self.remaining.saturating_sub(1);
        (self.remaining == 0).then_some(self.long_press)
    }
}
