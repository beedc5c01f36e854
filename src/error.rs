// src/error.rs
use std::{io, path::PathBuf};

use thiserror::Error;

pub type Result<T> = std::result::Result<T, FanError>;

/// Every failure the controller can hit. All of them are fatal.
#[derive(Error, Debug)]
pub enum FanError {
    #[error("Failed to read temperature from {}: {source}", path.display())]
    SensorRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("No usable temperature reading in {}: {reason}", path.display())]
    SensorParse { path: PathBuf, reason: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to set up GPIO {port}: {reason}")]
    HardwareInit { port: u8, reason: String },

    #[error("Fan actuation failed: {0}")]
    Actuation(String),

    #[error("Fan controller already stopped")]
    Stopped,

    #[error("Failed to install signal handler: {0}")]
    Signal(#[from] ctrlc::Error),
}
