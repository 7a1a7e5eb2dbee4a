//! Output state store - current value of every output target
//!
//! Values are kept per target in a `DashMap`, so a read-modify-write on one
//! target holds only that target's shard lock. The handle is cheap to clone
//! and every clone sees the same values.

use dashmap::DashMap;
use std::sync::Arc;
use tracing::trace;

use crate::config::is_program_change;

/// Starting value of program-change sliders
pub const PROGRAM_DEFAULT: u8 = 0;
/// Starting value of continuous sliders (centered)
pub const CONTROLLER_DEFAULT: u8 = 64;
/// Ceiling of continuous controllers
pub const CONTROLLER_MAX: u8 = 127;

/// Shared handle to the output values
#[derive(Debug, Clone)]
pub struct OutputStore {
    values: Arc<DashMap<u8, u8>>,
    program_max: u8,
}

impl OutputStore {
    /// Create a store seeded with the default value of every target
    ///
    /// # Arguments
    /// * `targets` - Output targets to initialize
    /// * `program_max` - Ceiling of program-change sliders
    pub fn new(targets: impl IntoIterator<Item = u8>, program_max: u8) -> Self {
        let store = Self {
            values: Arc::new(DashMap::new()),
            program_max,
        };

        for target in targets {
            store.values.insert(target, store.default_for(target));
        }

        store
    }

    /// Highest value a target may hold
    pub fn max_for(&self, target: u8) -> u8 {
        if is_program_change(target) {
            self.program_max
        } else {
            CONTROLLER_MAX
        }
    }

    /// Value a target holds before it is first changed
    pub fn default_for(&self, target: u8) -> u8 {
        if is_program_change(target) {
            PROGRAM_DEFAULT
        } else {
            CONTROLLER_DEFAULT
        }
    }

    pub fn get(&self, target: u8) -> u8 {
        self.values
            .get(&target)
            .map(|value| *value)
            .unwrap_or_else(|| self.default_for(target))
    }

    /// Clamp and store a value, returning what was stored
    pub fn set(&self, target: u8, value: i32) -> u8 {
        let clamped = self.clamp(target, value);
        self.values.insert(target, clamped);
        trace!("Output {} set to {}", target, clamped);
        clamped
    }

    /// Atomically add `delta` to a target, returning the clamped result
    pub fn adjust(&self, target: u8, delta: i16) -> u8 {
        let default = self.default_for(target);
        let mut entry = self.values.entry(target).or_insert(default);
        let clamped = self.clamp(target, i32::from(*entry) + i32::from(delta));
        *entry = clamped;
        trace!("Output {} adjusted by {} to {}", target, delta, clamped);
        clamped
    }

    /// Current values ordered by target
    pub fn snapshot(&self) -> Vec<(u8, u8)> {
        let mut values: Vec<(u8, u8)> = self
            .values
            .iter()
            .map(|entry| (*entry.key(), *entry.value()))
            .collect();
        values.sort_unstable();
        values
    }

    fn clamp(&self, target: u8, value: i32) -> u8 {
        value.clamp(0, i32::from(self.max_for(target))) as u8
    }
}
