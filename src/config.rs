use std::env;
use std::path::PathBuf;

use crate::error::{Error, Result};

const DEFAULT_DATA_DIR: &str = "data";
const DEFAULT_MAINTENANCE_HORIZON_DAYS: i64 = 7;

const DATA_DIR: &str = "DRONE_OPS_DATA_DIR";
const USE_LEDGER: &str = "DRONE_OPS_USE_LEDGER";
const HORIZON_DAYS: &str = "DRONE_OPS_MAINTENANCE_HORIZON_DAYS";

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Directory holding the roster, fleet, mission and assignment CSVs.
    pub data_dir: PathBuf,
    /// Read `assignments.csv` as the authoritative ledger.
    pub use_ledger: bool,
    /// Fleet listings flag drones due for maintenance within this many days.
    pub maintenance_horizon_days: i64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            use_ledger: true,
            maintenance_horizon_days: DEFAULT_MAINTENANCE_HORIZON_DAYS,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from any key lookup; unset keys keep their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        if let Some(dir) = lookup(DATA_DIR).filter(|d| !d.trim().is_empty()) {
            config.data_dir = PathBuf::from(dir.trim());
        }
        if let Some(raw) = lookup(USE_LEDGER) {
            config.use_ledger = parse_bool(USE_LEDGER, &raw)?;
        }
        if let Some(raw) = lookup(HORIZON_DAYS) {
            config.maintenance_horizon_days = parse_days(HORIZON_DAYS, &raw)?;
        }
        Ok(config)
    }
}

fn parse_days(key: &str, raw: &str) -> Result<i64> {
    match raw.trim().parse::<i64>() {
        Ok(days) if days >= 0 => Ok(days),
        _ => Err(Error::Config(format!("{} must be a non-negative integer, got '{}'", key, raw))),
    }
}

fn parse_bool(key: &str, raw: &str) -> Result<bool> {
    match raw.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(Error::Config(format!("{} must be true or false, got '{}'", key, other))),
    }
}
