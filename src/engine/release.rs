//! Release detection policies
//!
//! While a ramp or hold is running, every polled event is shown to the
//! active `ReleasePolicy`, which decides whether it ends the behavior or has
//! to wait until the behavior is over.

use std::fmt::Debug;

use super::source::InputEvent;
use crate::config::ReleaseMode;

/// Verdict on an event polled during an active behavior
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollVerdict {
    /// The switch counts as released; the event is consumed
    Released,
    /// Unrelated event, dispatch it after the active behavior ends
    Deferred,
}

/// Decides which polled events end the active behavior
pub trait ReleasePolicy: Send + Sync + Debug {
    fn classify(&self, active_trigger: u8, event: &InputEvent) -> PollVerdict;
}

/// Any input activity ends the active behavior
///
/// For controllers that only report presses, or whose releases cannot be
/// told apart. Traffic from other switches also ends the behavior and is
/// consumed with it.
#[derive(Debug, Clone, Copy, Default)]
pub struct AnyActivity;

impl ReleasePolicy for AnyActivity {
    fn classify(&self, _active_trigger: u8, _event: &InputEvent) -> PollVerdict {
        PollVerdict::Released
    }
}

/// Only the active switch's own release (or a re-press) ends the behavior
#[derive(Debug, Clone, Copy, Default)]
pub struct ExplicitRelease;

impl ReleasePolicy for ExplicitRelease {
    fn classify(&self, active_trigger: u8, event: &InputEvent) -> PollVerdict {
        if event.trigger == active_trigger {
            PollVerdict::Released
        } else {
            PollVerdict::Deferred
        }
    }
}

/// Policy for the configured release mode
pub fn policy_for(mode: ReleaseMode) -> Box<dyn ReleasePolicy> {
    match mode {
        ReleaseMode::AnyEvent => Box::new(AnyActivity),
        ReleaseMode::Explicit => Box::new(ExplicitRelease),
    }
}
