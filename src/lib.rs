//! Drone operations coordination: pilot and drone matching, urgent
//! reassignment and conflict detection over roster, fleet and mission data.

pub mod agent;
pub mod config;
pub mod conflicts;
pub mod domain;
pub mod engine;
pub mod error;
pub mod store;

pub use error::{Error, Result};
