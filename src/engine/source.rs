//! Input and output seams of the engine
//!
//! The engine never touches MIDI ports. It pulls `InputEvent`s from an
//! `InputSource` and pushes `OutputMessage`s into an `OutputSink`.

use async_trait::async_trait;
use tokio::sync::mpsc;

use super::emitter::OutputMessage;
use crate::error::Result;

/// Whether a switch went down or came up
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Press,
    Release,
}

/// Abstract trigger event decoded by the transport
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InputEvent {
    pub trigger: u8,
    pub velocity: u8,
    pub phase: Phase,
}

impl InputEvent {
    pub fn press(trigger: u8, velocity: u8) -> Self {
        Self {
            trigger,
            velocity,
            phase: Phase::Press,
        }
    }

    pub fn release(trigger: u8) -> Self {
        Self {
            trigger,
            velocity: 0,
            phase: Phase::Release,
        }
    }

    pub fn is_press(&self) -> bool {
        self.phase == Phase::Press
    }
}

/// Source of trigger events
#[async_trait]
pub trait InputSource: Send {
    /// Wait for the next event; `Ok(None)` once the input has ended
    async fn next_event(&mut self) -> Result<Option<InputEvent>>;

    /// Take an already-arrived event without waiting
    fn poll(&mut self) -> Option<InputEvent>;
}

/// Destination of translated messages
pub trait OutputSink {
    fn send(&mut self, message: &OutputMessage) -> Result<()>;
}

/// Collects messages in memory
impl OutputSink for Vec<OutputMessage> {
    fn send(&mut self, message: &OutputMessage) -> Result<()> {
        self.push(*message);
        Ok(())
    }
}

/// Input fed through a tokio channel, e.g. from a MIDI callback thread
pub struct ChannelInput {
    rx: mpsc::Receiver<InputEvent>,
}

impl ChannelInput {
    pub fn new(rx: mpsc::Receiver<InputEvent>) -> Self {
        Self { rx }
    }
}

#[async_trait]
impl InputSource for ChannelInput {
    async fn next_event(&mut self) -> Result<Option<InputEvent>> {
        Ok(self.rx.recv().await)
    }

    fn poll(&mut self) -> Option<InputEvent> {
        self.rx.try_recv().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_channel_input_poll_and_wait() {
        let (tx, rx) = mpsc::channel(8);
        let mut input = ChannelInput::new(rx);

        assert_eq!(input.poll(), None);

        tx.send(InputEvent::press(36, 90)).await.unwrap();
        assert_eq!(input.poll(), Some(InputEvent::press(36, 90)));

        tx.send(InputEvent::release(36)).await.unwrap();
        assert_eq!(input.next_event().await.unwrap(), Some(InputEvent::release(36)));

        drop(tx);
        assert_eq!(input.next_event().await.unwrap(), None);
        assert_eq!(input.poll(), None);
    }

    #[test]
    fn test_vec_sink_collects() {
        let mut sink: Vec<OutputMessage> = Vec::new();
        let message = OutputMessage::ProgramChange { channel: 1, program: 4 };

        sink.send(&message).unwrap();
        assert_eq!(sink, vec![message]);
    }
}
