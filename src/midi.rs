//! MIDI utilities and message types
//!
//! Parses the channel messages the gateway listens for and encodes the ones
//! it sends. Everything else on the wire is dropped by `parse`.

use std::fmt;

/// MIDI channel messages handled by the gateway
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MidiMessage {
    /// Note Off: channel (0-15), note (0-127), velocity (0-127)
    NoteOff { channel: u8, note: u8, velocity: u8 },

    /// Note On: channel (0-15), note (0-127), velocity (0-127)
    NoteOn { channel: u8, note: u8, velocity: u8 },

    /// Control Change: channel (0-15), cc (0-127), value (0-127)
    ControlChange { channel: u8, cc: u8, value: u8 },

    /// Program Change: channel (0-15), program (0-127)
    ProgramChange { channel: u8, program: u8 },
}

impl MidiMessage {
    /// Parse a MIDI message from raw bytes
    pub fn parse(data: &[u8]) -> Option<Self> {
        let (&status, rest) = data.split_first()?;

        // Running status and system messages are not handled
        if !(0x80..0xF0).contains(&status) {
            return None;
        }

        let channel = status & 0x0F;

        match status & 0xF0 {
            0x80 => {
                let &[note, velocity, ..] = rest else { return None };
                Some(MidiMessage::NoteOff {
                    channel,
                    note: note & 0x7F,
                    velocity: velocity & 0x7F,
                })
            }
            0x90 => {
                let &[note, velocity, ..] = rest else { return None };
                let note = note & 0x7F;
                let velocity = velocity & 0x7F;

                // Note On with velocity 0 is a Note Off
                if velocity == 0 {
                    Some(MidiMessage::NoteOff { channel, note, velocity: 0 })
                } else {
                    Some(MidiMessage::NoteOn { channel, note, velocity })
                }
            }
            0xB0 => {
                let &[cc, value, ..] = rest else { return None };
                Some(MidiMessage::ControlChange {
                    channel,
                    cc: cc & 0x7F,
                    value: value & 0x7F,
                })
            }
            0xC0 => {
                let &[program, ..] = rest else { return None };
                Some(MidiMessage::ProgramChange {
                    channel,
                    program: program & 0x7F,
                })
            }
            _ => None,
        }
    }

    /// Encode the message to MIDI bytes
    pub fn encode(&self) -> Vec<u8> {
        match *self {
            MidiMessage::NoteOff { channel, note, velocity } => {
                vec![0x80 | (channel & 0x0F), note & 0x7F, velocity & 0x7F]
            }
            MidiMessage::NoteOn { channel, note, velocity } => {
                vec![0x90 | (channel & 0x0F), note & 0x7F, velocity & 0x7F]
            }
            MidiMessage::ControlChange { channel, cc, value } => {
                vec![0xB0 | (channel & 0x0F), cc & 0x7F, value & 0x7F]
            }
            MidiMessage::ProgramChange { channel, program } => {
                vec![0xC0 | (channel & 0x0F), program & 0x7F]
            }
        }
    }

    pub fn channel(&self) -> u8 {
        match *self {
            MidiMessage::NoteOff { channel, .. }
            | MidiMessage::NoteOn { channel, .. }
            | MidiMessage::ControlChange { channel, .. }
            | MidiMessage::ProgramChange { channel, .. } => channel,
        }
    }
}

impl fmt::Display for MidiMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            MidiMessage::NoteOff { channel, note, velocity } => {
                write!(f, "NoteOff ch:{} n:{} v:{}", channel + 1, note, velocity)
            }
            MidiMessage::NoteOn { channel, note, velocity } => {
                write!(f, "NoteOn ch:{} n:{} v:{}", channel + 1, note, velocity)
            }
            MidiMessage::ControlChange { channel, cc, value } => {
                write!(f, "CC ch:{} cc:{} v:{}", channel + 1, cc, value)
            }
            MidiMessage::ProgramChange { channel, program } => {
                write!(f, "ProgramChange ch:{} p:{}", channel + 1, program)
            }
        }
    }
}

/// Format MIDI bytes as hex string for debugging
pub fn format_hex(data: &[u8]) -> String {
    data.iter()
        .map(|b| format!("{:02X}", b))
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_note_on_parsing() {
        let data = vec![0x90, 36, 100]; // Note On, ch 1, note 36, velocity 100
        let msg = MidiMessage::parse(&data).unwrap();

        assert_eq!(msg, MidiMessage::NoteOn {
            channel: 0,
            note: 36,
            velocity: 100,
        });
    }

    #[test]
    fn test_note_on_velocity_zero() {
        let data = vec![0x90, 36, 0]; // Note On with velocity 0 = Note Off
        let msg = MidiMessage::parse(&data).unwrap();

        assert_eq!(msg, MidiMessage::NoteOff {
            channel: 0,
            note: 36,
            velocity: 0,
        });
    }

    #[test]
    fn test_control_change() {
        let data = vec![0xB2, 7, 100]; // CC ch 3, volume, value 100
        let msg = MidiMessage::parse(&data).unwrap();

        assert_eq!(msg, MidiMessage::ControlChange {
            channel: 2,
            cc: 7,
            value: 100,
        });
        assert_eq!(msg.channel(), 2);
    }

    #[test]
    fn test_truncated_and_unsupported() {
        assert_eq!(MidiMessage::parse(&[]), None);
        assert_eq!(MidiMessage::parse(&[0x90, 36]), None);
        assert_eq!(MidiMessage::parse(&[0xC0]), None);
        assert_eq!(MidiMessage::parse(&[0xE0, 0x00, 0x40]), None); // Pitch bend
        assert_eq!(MidiMessage::parse(&[0xF8]), None); // Clock
        assert_eq!(MidiMessage::parse(&[36, 100]), None); // Running status
    }

    #[test]
    fn test_encode_program_change() {
        let msg = MidiMessage::ProgramChange { channel: 1, program: 4 };
        assert_eq!(msg.encode(), vec![0xC1, 4]);
    }

    #[test]
    fn test_encode_control_change() {
        let msg = MidiMessage::ControlChange { channel: 0, cc: 31, value: 0 };
        assert_eq!(msg.encode(), vec![0xB0, 31, 0]);
    }

    #[test]
    fn test_format_hex() {
        assert_eq!(format_hex(&[0xB0, 0x1F, 0x00]), "B0 1F 00");
    }
}
