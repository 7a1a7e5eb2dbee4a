//! Output emitter - computed values to transport-ready messages
//!
//! Pure conversion, no state. Values are clamped by the store before they
//! get here, so the emitter trusts its inputs.

use std::fmt;

use crate::config::is_program_change;
use crate::midi::MidiMessage;

/// Message produced by the translation engine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMessage {
    ProgramChange { channel: u8, program: u8 },
    ControlChange { channel: u8, controller: u8, value: u8 },
}

impl OutputMessage {
    /// Slider message for an output target
    ///
    /// Targets 0 and 1 send a program change, everything else a controller.
    pub fn for_target(channel: u8, target: u8, value: u8) -> Self {
        if is_program_change(target) {
            OutputMessage::ProgramChange {
                channel,
                program: value,
            }
        } else {
            OutputMessage::ControlChange {
                channel,
                controller: target,
                value,
            }
        }
    }

    /// Encode to raw MIDI bytes
    pub fn encode(&self) -> Vec<u8> {
        MidiMessage::from(*self).encode()
    }
}

impl From<OutputMessage> for MidiMessage {
    fn from(message: OutputMessage) -> Self {
        match message {
            OutputMessage::ProgramChange { channel, program } => {
                MidiMessage::ProgramChange { channel, program }
            }
            OutputMessage::ControlChange {
                channel,
                controller,
                value,
            } => MidiMessage::ControlChange {
                channel,
                cc: controller,
                value,
            },
        }
    }
}

impl fmt::Display for OutputMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&MidiMessage::from(*self), f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_program_targets() {
        assert_eq!(
            OutputMessage::for_target(1, 1, 4),
            OutputMessage::ProgramChange { channel: 1, program: 4 }
        );
        assert_eq!(
            OutputMessage::for_target(0, 0, 0),
            OutputMessage::ProgramChange { channel: 0, program: 0 }
        );
    }

    #[test]
    fn test_controller_targets() {
        assert_eq!(
            OutputMessage::for_target(0, 26, 63),
            OutputMessage::ControlChange { channel: 0, controller: 26, value: 63 }
        );
    }

    #[test]
    fn test_encode() {
        assert_eq!(OutputMessage::for_target(1, 1, 4).encode(), vec![0xC1, 4]);
        assert_eq!(OutputMessage::for_target(0, 31, 0).encode(), vec![0xB0, 31, 0]);
    }
}
