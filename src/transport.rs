//! MIDI transport
//!
//! Opens the input and output ports with midir, decodes incoming switch
//! messages into `InputEvent`s and sends translated messages out. Ports are
//! either created as virtual ports or found by substring match.

use colored::*;
use midir::{MidiInput, MidiInputConnection, MidiOutput, MidiOutputConnection};
use tokio::sync::mpsc;
use tracing::{debug, info, trace, warn};

use crate::config::{InputConfig, InputKind, MidiConfig};
use crate::engine::{ChannelInput, InputEvent, OutputMessage, OutputSink};
use crate::error::{Error, Result};
use crate::midi::{format_hex, MidiMessage};

/// Capacity of the queue between the MIDI callback and the engine
const EVENT_QUEUE: usize = 1000;

/// Turn a parsed MIDI message into a trigger event
///
/// Returns `None` for messages on a filtered channel or of the wrong family.
pub fn decode_input(message: &MidiMessage, input: &InputConfig) -> Option<InputEvent> {
    if let Some(channel) = input.channel {
        if message.channel() != channel {
            return None;
        }
    }

    match (input.kind, *message) {
        (InputKind::Note, MidiMessage::NoteOn { note, velocity, .. }) => {
            Some(InputEvent::press(note, velocity))
        }
        (InputKind::Note, MidiMessage::NoteOff { note, .. }) => Some(InputEvent::release(note)),
        (InputKind::Cc, MidiMessage::ControlChange { cc, value, .. }) => {
            if value > 0 {
                Some(InputEvent::press(cc, input.static_velocity))
            } else {
                Some(InputEvent::release(cc))
            }
        }
        _ => None,
    }
}

/// Open MIDI connections
///
/// Dropping the transport closes both ports.
pub struct MidiTransport {
    input_conn: Option<MidiInputConnection<()>>,
    input_port_name: String,
    output_port_name: String,
}

impl MidiTransport {
    /// Open the configured ports
    ///
    /// Returns the transport (which keeps the input alive), the engine's input
    /// source and its output sink.
    pub fn connect(
        midi: &MidiConfig,
        input: &InputConfig,
    ) -> Result<(Self, ChannelInput, MidiOutputSink)> {
        let (event_tx, event_rx) = mpsc::channel(EVENT_QUEUE);
        let input_cfg = input.clone();

        let callback = move |_timestamp: u64, data: &[u8], _: &mut ()| {
            let Some(message) = MidiMessage::parse(data) else {
                trace!("Skipping MIDI: {}", format_hex(data));
                return;
            };

            match decode_input(&message, &input_cfg) {
                Some(event) => {
                    trace!("MIDI in: {} => {:?}", message, event);
                    // Never block the MIDI thread
                    if let Err(e) = event_tx.try_send(event) {
                        warn!("Dropping input event {:?}: {}", event, e);
                    }
                }
                None => trace!("Ignoring MIDI: {}", message),
            }
        };

        let midi_in = MidiInput::new(&format!("{}-input", midi.client_name))?;
        let midi_out = MidiOutput::new(&format!("{}-output", midi.client_name))?;

        let (input_conn, output_conn) = if midi.virtual_ports {
            info!(
                "Creating virtual ports - Input: '{}', Output: '{}'",
                midi.input_port, midi.output_port
            );
            (
                create_virtual_input(midi_in, &midi.input_port, callback)?,
                create_virtual_output(midi_out, &midi.output_port)?,
            )
        } else {
            info!(
                "Connecting to ports - Input: '{}', Output: '{}'",
                midi.input_port, midi.output_port
            );
            let (in_port, in_name) = find_input_port(&midi_in, &midi.input_port)
                .ok_or_else(|| Error::Transport(format!("Input port '{}' not found", midi.input_port)))?;
            let (out_port, out_name) = find_output_port(&midi_out, &midi.output_port)
                .ok_or_else(|| Error::Transport(format!("Output port '{}' not found", midi.output_port)))?;

            info!("Connecting to input port: {}", in_name);
            let input_conn = midi_in.connect(&in_port, &midi.client_name, callback, ())?;

            info!("Connecting to output port: {}", out_name);
            let output_conn = midi_out.connect(&out_port, &midi.client_name)?;

            (input_conn, output_conn)
        };

        let transport = Self {
            input_conn: Some(input_conn),
            input_port_name: midi.input_port.clone(),
            output_port_name: midi.output_port.clone(),
        };

        Ok((
            transport,
            ChannelInput::new(event_rx),
            MidiOutputSink { conn: output_conn },
        ))
    }

    /// Close the input port; the engine's input ends once it drains
    pub fn disconnect(&mut self) {
        if self.input_conn.take().is_some() {
            info!(
                "MIDI input '{}' closed (output '{}')",
                self.input_port_name, self.output_port_name
            );
        }
    }
}

/// Output sink writing to a midir connection
pub struct MidiOutputSink {
    conn: MidiOutputConnection,
}

impl OutputSink for MidiOutputSink {
    fn send(&mut self, message: &OutputMessage) -> Result<()> {
        let bytes = message.encode();
        debug!("MIDI out: {}", format_hex(&bytes));
        self.conn.send(&bytes)?;
        Ok(())
    }
}

#[cfg(unix)]
fn create_virtual_input<F>(midi_in: MidiInput, name: &str, callback: F) -> Result<MidiInputConnection<()>>
where
    F: FnMut(u64, &[u8], &mut ()) + Send + 'static,
{
    use midir::os::unix::VirtualInput;
    Ok(midi_in.create_virtual(name, callback, ())?)
}

#[cfg(not(unix))]
fn create_virtual_input<F>(_midi_in: MidiInput, name: &str, _callback: F) -> Result<MidiInputConnection<()>>
where
    F: FnMut(u64, &[u8], &mut ()) + Send + 'static,
{
    Err(Error::Transport(format!(
        "virtual port '{}' is not supported on this platform",
        name
    )))
}

#[cfg(unix)]
fn create_virtual_output(midi_out: MidiOutput, name: &str) -> Result<MidiOutputConnection> {
    use midir::os::unix::VirtualOutput;
    Ok(midi_out.create_virtual(name)?)
}

#[cfg(not(unix))]
fn create_virtual_output(_midi_out: MidiOutput, name: &str) -> Result<MidiOutputConnection> {
    Err(Error::Transport(format!(
        "virtual port '{}' is not supported on this platform",
        name
    )))
}

/// Find an input port by case-insensitive substring match
fn find_input_port(midi_in: &MidiInput, pattern: &str) -> Option<(midir::MidiInputPort, String)> {
    let pattern = pattern.to_lowercase();
    midi_in.ports().into_iter().find_map(|port| {
        let name = midi_in.port_name(&port).ok()?;
        if name.to_lowercase().contains(&pattern) {
            debug!("Found port '{}' matching pattern '{}'", name, pattern);
            Some((port, name))
        } else {
            None
        }
    })
}

/// Find an output port by case-insensitive substring match
fn find_output_port(midi_out: &MidiOutput, pattern: &str) -> Option<(midir::MidiOutputPort, String)> {
    let pattern = pattern.to_lowercase();
    midi_out.ports().into_iter().find_map(|port| {
        let name = midi_out.port_name(&port).ok()?;
        if name.to_lowercase().contains(&pattern) {
            debug!("Found port '{}' matching pattern '{}'", name, pattern);
            Some((port, name))
        } else {
            None
        }
    })
}

/// List available MIDI input ports
pub fn list_input_ports() -> Result<Vec<String>> {
    let midi_in = MidiInput::new("icontrol-scanner")?;
    Ok(midi_in
        .ports()
        .iter()
        .filter_map(|port| midi_in.port_name(port).ok())
        .collect())
}

/// List available MIDI output ports
pub fn list_output_ports() -> Result<Vec<String>> {
    let midi_out = MidiOutput::new("icontrol-scanner")?;
    Ok(midi_out
        .ports()
        .iter()
        .filter_map(|port| midi_out.port_name(port).ok())
        .collect())
}

/// Print available ports for `--list-ports`
pub fn print_ports() -> Result<()> {
    println!("\n{}", "=== MIDI Ports ===".bold().cyan());

    println!("\n{}", "Inputs:".bold());
    for (idx, name) in list_input_ports()?.iter().enumerate() {
        println!("  [{}] {}", idx.to_string().yellow(), name.green());
    }

    println!("\n{}", "Outputs:".bold());
    for (idx, name) in list_output_ports()?.iter().enumerate() {
        println!("  [{}] {}", idx.to_string().yellow(), name.green());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ReleaseMode;

    fn note_input() -> InputConfig {
        InputConfig {
            kind: InputKind::Note,
            channel: None,
            static_velocity: 100,
            release: ReleaseMode::AnyEvent,
        }
    }

    #[test]
    fn test_decode_notes() {
        let input = note_input();

        let press = MidiMessage::parse(&[0x90, 36, 90]).unwrap();
        assert_eq!(decode_input(&press, &input), Some(InputEvent::press(36, 90)));

        let release = MidiMessage::parse(&[0x90, 36, 0]).unwrap();
        assert_eq!(decode_input(&release, &input), Some(InputEvent::release(36)));

        let cc = MidiMessage::parse(&[0xB0, 36, 90]).unwrap();
        assert_eq!(decode_input(&cc, &input), None);
    }

    #[test]
    fn test_decode_cc_uses_static_velocity() {
        let input = InputConfig {
            kind: InputKind::Cc,
            static_velocity: 20,
            ..note_input()
        };

        let press = MidiMessage::parse(&[0xB0, 64, 127]).unwrap();
        assert_eq!(decode_input(&press, &input), Some(InputEvent::press(64, 20)));

        let release = MidiMessage::parse(&[0xB0, 64, 0]).unwrap();
        assert_eq!(decode_input(&release, &input), Some(InputEvent::release(64)));

        let note = MidiMessage::parse(&[0x90, 64, 100]).unwrap();
        assert_eq!(decode_input(&note, &input), None);
    }

    #[test]
    fn test_decode_channel_filter() {
        let input = InputConfig {
            channel: Some(9),
            ..note_input()
        };

        let other = MidiMessage::parse(&[0x90, 36, 90]).unwrap();
        assert_eq!(decode_input(&other, &input), None);

        let drums = MidiMessage::parse(&[0x99, 36, 90]).unwrap();
        assert_eq!(decode_input(&drums, &input), Some(InputEvent::press(36, 90)));
    }
}
