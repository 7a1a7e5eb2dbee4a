//! Error types for the gateway
//!
//! Configuration problems are fatal at startup, transport problems are fatal
//! to the caller. Nothing inside the translation core retries.

use thiserror::Error;

/// Malformed configuration detected while loading or validating
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse YAML config: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("trigger {0} is defined more than once")]
    DuplicateTrigger(u8),

    #[error("trigger {trigger}: channel {channel} is out of range (must be 0-15)")]
    ChannelOutOfRange { trigger: u8, channel: u8 },

    #[error("trigger {trigger}: {field} {value} is out of range (must be 0-127)")]
    NumberOutOfRange {
        trigger: u8,
        field: &'static str,
        value: u8,
    },

    #[error("trigger {trigger}: {reason}")]
    InvalidPairing { trigger: u8, reason: &'static str },

    #[error("invalid timing: {0}")]
    InvalidTiming(String),

    #[error("invalid input settings: {0}")]
    InvalidInput(String),
}

/// Errors surfaced by the gateway library
#[derive(Error, Debug)]
pub enum Error {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    #[error("transport error: {0}")]
    Transport(String),
}

impl From<midir::InitError> for Error {
    fn from(e: midir::InitError) -> Self {
        Error::Transport(e.to_string())
    }
}

impl From<midir::SendError> for Error {
    fn from(e: midir::SendError) -> Self {
        Error::Transport(e.to_string())
    }
}

impl From<midir::ConnectError<midir::MidiOutput>> for Error {
    fn from(e: midir::ConnectError<midir::MidiOutput>) -> Self {
        Error::Transport(e.to_string())
    }
}

impl From<midir::ConnectError<midir::MidiInput>> for Error {
    fn from(e: midir::ConnectError<midir::MidiInput>) -> Self {
        Error::Transport(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
