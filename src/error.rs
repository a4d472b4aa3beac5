//! Error types for the coordinator.
//!
//! Engine outcomes such as "no candidate" or "project not found" are never
//! errors; they travel inside result structs. Only storage, configuration and
//! serialization failures end up here.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid {kind} status '{value}'. Valid values: {valid}")]
    InvalidStatus {
        kind: &'static str,
        value: String,
        valid: String,
    },

    #[error("Pilot {0} not found.")]
    PilotNotFound(String),

    #[error("Drone {0} not found.")]
    DroneNotFound(String),

    #[error("{0} not found.")]
    FileNotFound(String),
}
