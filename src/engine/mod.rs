//! Translation engine - switch presses in, knob and button messages out
//!
//! The `Engine` is the single entry point for input. It waits for the next
//! event while idle, looks the trigger up and runs exactly one behavior at a
//! time: a slider `Ramp` or a button `Hold`. While a behavior runs, the engine
//! only sees input through non-blocking polls between its timed steps, and the
//! configured `ReleasePolicy` decides which polled events end it.
//!
//! Per trigger the lifecycle is `Idle -> Active(ramping | holding) -> Idle`,
//! returning to idle on a bound hit, hold expiry or release.

pub mod button;
pub mod emitter;
pub mod release;
pub mod slider;
pub mod source;
pub mod store;


use std::collections::VecDeque;
use tokio::time::sleep;
use tracing::{debug, info, trace};

use crate::config::{Mode, Timing, TriggerConfig, TriggerTable};
use crate::error::Result;

pub use button::{ButtonPress, Hold};
pub use emitter::OutputMessage;
pub use release::{policy_for, AnyActivity, ExplicitRelease, PollVerdict, ReleasePolicy};
pub use slider::{Ramp, RampStep};
pub use source::{ChannelInput, InputEvent, InputSource, OutputSink, Phase};
pub use store::OutputStore;

/// How a ramp came to an end
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RampEnd {
    /// The value reached 0 or the target's ceiling
    Bound,
    /// A polled event ended the ramp
    Released,
    /// Program slider took its one step
    SingleStep,
}

/// What the dispatcher did with an event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    /// Releases are only meaningful to an active behavior
    Ignored,
    /// No trigger row for this id
    Unmapped,
    Ramp { steps: u32, end: RampEnd },
    Momentary,
    Tap,
    LongPress,
}

/// Cooperative translation engine
pub struct Engine<I, O> {
    table: TriggerTable,
    timing: Timing,
    store: OutputStore,
    policy: Box<dyn ReleasePolicy>,
    input: I,
    output: O,
    /// Events polled during a behavior that did not end it
    deferred: VecDeque<InputEvent>,
}

impl<I: InputSource, O: OutputSink> Engine<I, O> {
    /// Create an engine with a freshly initialized output store
    pub fn new(
        table: TriggerTable,
        timing: Timing,
        policy: Box<dyn ReleasePolicy>,
        input: I,
        output: O,
    ) -> Self {
        let store = OutputStore::new(table.output_targets(), timing.program_change_slider_max);

        Self {
            table,
            timing,
            store,
            policy,
            input,
            output,
            deferred: VecDeque::new(),
        }
    }

    pub fn store(&self) -> &OutputStore {
        &self.store
    }

    pub fn output(&self) -> &O {
        &self.output
    }

    /// Process events until the input ends
    ///
    /// Returns `Ok(())` when the input source is exhausted and an error as
    /// soon as the input or output fails.
    pub async fn run(&mut self) -> Result<()> {
        info!(
            "Translation engine running with {} triggers, release policy {:?}",
            self.table.len(),
            self.policy
        );

        loop {
            let event = match self.deferred.pop_front() {
                Some(event) => event,
                None => match self.input.next_event().await? {
                    Some(event) => event,
                    None => {
                        info!("Input ended, stopping translation engine");
                        return Ok(());
                    }
                },
            };

            self.dispatch(event).await?;
        }
    }

    /// Route one event to its behavior and run that behavior to completion
    pub async fn dispatch(&mut self, event: InputEvent) -> Result<Dispatch> {
        if !event.is_press() {
            trace!("Ignoring release of trigger {} while idle", event.trigger);
            return Ok(Dispatch::Ignored);
        }

        let Some(config) = self.table.lookup(event.trigger).copied() else {
            debug!("Unmapped trigger {} (velocity {})", event.trigger, event.velocity);
            return Ok(Dispatch::Unmapped);
        };

        match config.mode {
            Mode::RampUp | Mode::RampDown => self.run_ramp(&config, event.velocity).await,
            Mode::Single => self.run_button(&config).await,
        }
    }

    async fn run_ramp(&mut self, config: &TriggerConfig, velocity: u8) -> Result<Dispatch> {
        let ramp = Ramp::start(config, velocity, &self.timing, &self.store);
        debug!(
            "Trigger {} ramping output {} {} every {:?} (velocity {})",
            config.trigger,
            config.target,
            config.mode,
            ramp.interval(),
            velocity
        );

        let mut steps = 0;
        loop {
            sleep(ramp.interval()).await;

            let step = ramp.step(&self.store);
            steps += 1;
            for message in &step.messages {
                self.emit(message)?;
            }

            if step.at_bound {
                debug!("Trigger {} ramp hit bound at {}", config.trigger, step.value);
                return Ok(Dispatch::Ramp {
                    steps,
                    end: RampEnd::Bound,
                });
            }

            if ramp.is_single_step() {
                debug!("Trigger {} moved program to {}", config.trigger, step.value);
                return Ok(Dispatch::Ramp {
                    steps,
                    end: RampEnd::SingleStep,
                });
            }

            if self.poll_release(config.trigger) {
                debug!("Trigger {} ramp released at {}", config.trigger, step.value);
                return Ok(Dispatch::Ramp {
                    steps,
                    end: RampEnd::Released,
                });
            }
        }
    }

    async fn run_button(&mut self, config: &TriggerConfig) -> Result<Dispatch> {
        let mut hold = match ButtonPress::start(config, &self.timing) {
            ButtonPress::Momentary(message) => {
                self.emit(&message)?;
                return Ok(Dispatch::Momentary);
            }
            ButtonPress::Hold(hold) => hold,
        };

        debug!(
            "Trigger {} holding for {} samples of {:?}",
            config.trigger,
            hold.remaining(),
            hold.sample_interval()
        );

        loop {
            sleep(hold.sample_interval()).await;

            if self.poll_release(config.trigger) {
                debug!("Trigger {} tapped", config.trigger);
                self.emit(&hold.tap())?;
                return Ok(Dispatch::Tap);
            }

            if let Some(message) = hold.tick() {
                debug!("Trigger {} long-pressed", config.trigger);
                self.emit(&message)?;
                return Ok(Dispatch::LongPress);
            }
        }
    }

    /// Check whether the active trigger has been released
    ///
    /// Deferred events are consulted before new input. Events the policy does
    /// not accept as a release are queued for dispatch after the behavior.
    fn poll_release(&mut self, trigger: u8) -> bool {
        let policy = &self.policy;
        if let Some(pos) = self
            .deferred
            .iter()
            .position(|event| policy.classify(trigger, event) == PollVerdict::Released)
        {
            self.deferred.remove(pos);
            return true;
        }

        while let Some(event) = self.input.poll() {
            match self.policy.classify(trigger, &event) {
                PollVerdict::Released => {
                    trace!("Trigger {} released by {:?}", trigger, event);
                    return true;
                }
                PollVerdict::Deferred => {
                    trace!("Deferring {:?} while trigger {} is active", event, trigger);
                    self.deferred.push_back(event);
                }
            }
        }

        false
    }

    fn emit(&mut self, message: &OutputMessage) -> Result<()> {
        debug!("→ {}", message);
        self.output.send(message)
    }
}
