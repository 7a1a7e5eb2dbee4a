//! Slider behavior - ramp an output while its switch is held
//!
//! A `Ramp` is the pending operation of one slider press: it knows its
//! direction, step interval and ceiling. The engine drives it by sleeping
//! `interval()` between calls to `step()`.

use std::time::Duration;

use super::emitter::OutputMessage;
use super::store::OutputStore;
use crate::config::{Timing, TriggerConfig};

/// In-progress ramp of one trigger
#[derive(Debug, Clone)]
pub struct Ramp {
    target: u8,
    channel: u8,
    paired: Option<u8>,
    delta: i16,
    interval: Duration,
    max: u8,
    /// Program sliders move one program per press
    single_step: bool,
}

/// Result of advancing a ramp by one step
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RampStep {
    /// Value stored for the primary target
    pub value: u8,
    /// Messages in send order (reciprocal first)
    pub messages: Vec<OutputMessage>,
    /// The value reached the bound in the ramp direction
    pub at_bound: bool,
}

impl Ramp {
    /// Start a ramp for a slider press
    ///
    /// Program-change sliders ignore velocity, wait the fixed program step and
    /// move exactly once.
    pub fn start(config: &TriggerConfig, velocity: u8, timing: &Timing, store: &OutputStore) -> Self {
        let interval = if config.is_program_change() {
            timing.program_step()
        } else {
            timing.ramp_interval(velocity)
        };

        Self {
            target: config.target,
            channel: config.channel,
            paired: config.paired_target(),
            delta: config.mode.delta(),
            interval,
            max: store.max_for(config.target),
            single_step: config.is_program_change(),
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn max(&self) -> u8 {
        self.max
    }

    pub fn is_single_step(&self) -> bool {
        self.single_step
    }

    /// Move the stored value one step and build the messages to send
    pub fn step(&self, store: &OutputStore) -> RampStep {
        let value = store.adjust(self.target, self.delta);
        let at_bound = if self.delta < 0 {
            value == 0
        } else {
            value == self.max
        };

        let mut messages = Vec::with_capacity(2);
        if let Some(paired) = self.paired {
            messages.push(OutputMessage::ControlChange {
                channel: self.channel,
                controller: paired,
                value: self.max - value,
            });
        }
        messages.push(OutputMessage::for_target(self.channel, self.target, value));

        RampStep {
            value,
            messages,
            at_bound,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Mode;
    use proptest::prelude::*;

    fn slider(trigger: u8, target: u8, channel: u8, mode: Mode, paired: u8) -> TriggerConfig {
        TriggerConfig {
            trigger,
            target,
            channel,
            mode,
            paired,
        }
    }

    #[test]
    fn test_up_decrements_until_zero() {
        let store = OutputStore::new([26], 15);
        let ramp = Ramp::start(&slider(36, 26, 0, Mode::RampUp, 0), 127, &Timing::default(), &store);

        assert_eq!(ramp.interval(), Duration::from_secs_f64(1.0 / 70.0));
        assert!(!ramp.is_single_step());

        let mut steps = 0;
        loop {
            let step = ramp.step(&store);
            steps += 1;
            assert_eq!(step.messages.len(), 1);
            if step.at_bound {
                assert_eq!(step.value, 0);
                break;
            }
        }
        assert_eq!(steps, 64);
    }

    #[test]
    fn test_up_at_zero_stops_on_first_step() {
        let store = OutputStore::new([26], 15);
        store.set(26, 0);
        let ramp = Ramp::start(&slider(36, 26, 0, Mode::RampUp, 0), 127, &Timing::default(), &store);

        let step = ramp.step(&store);
        assert!(step.at_bound);
        assert_eq!(
            step.messages,
            vec![OutputMessage::ControlChange { channel: 0, controller: 26, value: 0 }]
        );
    }

    #[test]
    fn test_down_stops_at_ceiling() {
        let store = OutputStore::new([26], 15);
        store.set(26, 126);
        let ramp = Ramp::start(&slider(37, 26, 0, Mode::RampDown, 0), 100, &Timing::default(), &store);

        let step = ramp.step(&store);
        assert_eq!(step.value, 127);
        assert!(step.at_bound);
    }

    #[test]
    fn test_program_slider_uses_fixed_step() {
        let store = OutputStore::new([1], 15);
        store.set(1, 5);
        let ramp = Ramp::start(&slider(44, 1, 1, Mode::RampUp, 0), 10, &Timing::default(), &store);

        assert_eq!(ramp.interval(), Duration::from_secs(1));
        assert_eq!(ramp.max(), 15);
        assert!(ramp.is_single_step());

        let step = ramp.step(&store);
        assert_eq!(
            step.messages,
            vec![OutputMessage::ProgramChange { channel: 1, program: 4 }]
        );
        assert!(!step.at_bound);
    }

    #[test]
    fn test_program_slider_ceiling() {
        let store = OutputStore::new([0], 15);
        store.set(0, 14);
        let ramp = Ramp::start(&slider(43, 0, 0, Mode::RampDown, 0), 10, &Timing::default(), &store);

        let step = ramp.step(&store);
        assert_eq!(step.value, 15);
        assert!(step.at_bound);
    }

    #[test]
    fn test_reciprocal_sent_first() {
        let store = OutputStore::new([28], 15);
        let ramp = Ramp::start(&slider(41, 28, 0, Mode::RampDown, 29), 40, &Timing::default(), &store);

        let step = ramp.step(&store);
        assert_eq!(
            step.messages,
            vec![
                OutputMessage::ControlChange { channel: 0, controller: 29, value: 62 },
                OutputMessage::ControlChange { channel: 0, controller: 28, value: 65 },
            ]
        );
    }

    proptest! {
        #[test]
        fn prop_reciprocal_sums_to_max(
            start in 0i32..=127,
            up in any::<bool>(),
            steps in 1usize..200,
        ) {
            let store = OutputStore::new([28], 15);
            store.set(28, start);
            let mode = if up { Mode::RampUp } else { Mode::RampDown };
            let ramp = Ramp::start(&slider(40, 28, 0, mode, 29), 127, &Timing::default(), &store);

            for _ in 0..steps {
                let step = ramp.step(&store);
                let values: Vec<u8> = step
                    .messages
                    .iter()
                    .map(|message| match *message {
                        OutputMessage::ControlChange { value, .. } => value,
                        OutputMessage::ProgramChange { program, .. } => program,
                    })
                    .collect();
                prop_assert_eq!(values.len(), 2);
                prop_assert_eq!(u16::from(values[0]) + u16::from(values[1]), 127);
                if step.at_bound {
                    break;
                }
            }
        }
    }
}
