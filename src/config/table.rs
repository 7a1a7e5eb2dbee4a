//! Trigger table - which physical switch drives which output
//!
//! Rows are looked up by exact trigger id. The table is built once from the
//! configuration and is read-only afterwards.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

use crate::error::ConfigError;

/// Output targets below this value are program-change sliders, not controllers
pub const PROGRAM_CHANGE_TARGETS: u8 = 2;

/// Check whether an output target is a program-change slider
pub fn is_program_change(target: u8) -> bool {
    target < PROGRAM_CHANGE_TARGETS
}

/// Behavior of a trigger
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Hash)]
pub enum Mode {
    /// Ramp the value down while held
    #[serde(rename = "up")]
    RampUp,
    /// Ramp the value up while held
    #[serde(rename = "down")]
    RampDown,
    /// Momentary or long-press button
    #[serde(rename = "single")]
    Single,
}

impl Mode {
    pub fn is_ramp(self) -> bool {
        matches!(self, Mode::RampUp | Mode::RampDown)
    }

    /// Value change applied per ramp step
    pub fn delta(self) -> i16 {
        match self {
            Mode::RampUp => -1,
            Mode::RampDown => 1,
            Mode::Single => 0,
        }
    }
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Mode::RampUp => write!(f, "up"),
            Mode::RampDown => write!(f, "down"),
            Mode::Single => write!(f, "single"),
        }
    }
}

/// One row of the trigger table
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq)]
pub struct TriggerConfig {
    /// Note (or CC) number of the physical switch
    pub trigger: u8,
    /// Primary output controller; 0 and 1 are program-change sliders
    pub target: u8,
    /// Output channel (0-15)
    pub channel: u8,
    pub mode: Mode,
    /// Reciprocal slider or long-press controller, 0 for none
    #[serde(default)]
    pub paired: u8,
}

impl TriggerConfig {
    pub fn paired_target(&self) -> Option<u8> {
        (self.paired != 0).then_some(self.paired)
    }

    pub fn is_program_change(&self) -> bool {
        is_program_change(self.target)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.channel > 15 {
            return Err(ConfigError::ChannelOutOfRange {
                trigger: self.trigger,
                channel: self.channel,
            });
        }

        for (field, value) in [
            ("trigger", self.trigger),
            ("target", self.target),
            ("paired", self.paired),
        ] {
            if value > 127 {
                return Err(ConfigError::NumberOutOfRange {
                    trigger: self.trigger,
                    field,
                    value,
                });
            }
        }

        if let Some(paired) = self.paired_target() {
            if self.mode.is_ramp() && self.is_program_change() {
                return Err(ConfigError::InvalidPairing {
                    trigger: self.trigger,
                    reason: "program-change sliders cannot have a reciprocal target",
                });
            }
            if self.mode.is_ramp() && paired == self.target {
                return Err(ConfigError::InvalidPairing {
                    trigger: self.trigger,
                    reason: "reciprocal target must differ from the primary target",
                });
            }
        }

        Ok(())
    }
}

/// Immutable trigger lookup table
#[derive(Debug, Clone, Default)]
pub struct TriggerTable {
    entries: HashMap<u8, TriggerConfig>,
}

impl TriggerTable {
    /// Build the table, rejecting malformed or duplicate rows
    pub fn build(rows: &[TriggerConfig]) -> Result<Self, ConfigError> {
        let mut entries = HashMap::with_capacity(rows.len());

        for row in rows {
            row.validate()?;
            if entries.insert(row.trigger, *row).is_some() {
                return Err(ConfigError::DuplicateTrigger(row.trigger));
            }
        }

        Ok(Self { entries })
    }

    pub fn lookup(&self, trigger: u8) -> Option<&TriggerConfig> {
        self.entries.get(&trigger)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Rows ordered by trigger id
    pub fn rows(&self) -> Vec<&TriggerConfig> {
        let mut rows: Vec<_> = self.entries.values().collect();
        rows.sort_by_key(|row| row.trigger);
        rows
    }

    /// Distinct primary output targets, used to seed the output store
    pub fn output_targets(&self) -> BTreeSet<u8> {
        self.entries.values().map(|row| row.target).collect()
    }
}
