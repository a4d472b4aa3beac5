use csv::{Reader, ReaderBuilder, Trim, Writer};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use super::{book_drone, book_pilot, drone_mut, pilot_mut, RosterStore};
use crate::domain::{Assignment, Drone, DroneStatus, Mission, Pilot, PilotStatus};
use crate::error::{Error, Result};

pub const PILOTS_FILE: &str = "pilot_roster.csv";
pub const DRONES_FILE: &str = "drone_fleet.csv";
pub const MISSIONS_FILE: &str = "missions.csv";
pub const ASSIGNMENTS_FILE: &str = "assignments.csv";

/// Tabular files in one directory. A missing file reads as an empty
/// collection and a row that does not parse is skipped with a warning.
/// Every mutation rewrites the whole file, so the last writer wins.
#[derive(Debug, Clone)]
pub struct CsvStore {
    dir: PathBuf,
}

impl CsvStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn read<T: DeserializeOwned>(&self, file: &str) -> Result<Vec<T>> {
        let path = self.dir.join(file);
        if !path.exists() {
            debug!(path = %path.display(), "No file, empty collection");
            return Ok(Vec::new());
        }
        let mut reader = open(&path)?;
        let mut rows = Vec::new();
        for row in reader.deserialize() {
            match row {
                Ok(row) => rows.push(row),
                Err(e) if e.is_io_error() => return Err(e.into()),
                Err(e) => {
                    let line = e.position().map_or(0, |p| p.line());
                    warn!(path = %path.display(), line, error = %e, "Skipping unreadable row");
                }
            }
        }
        debug!(path = %path.display(), rows = rows.len(), "Loaded");
        Ok(rows)
    }

    /// Read for mutation. The file has to exist and every row has to parse,
    /// since all of it is written back.
    fn read_existing<T: DeserializeOwned>(&self, file: &str) -> Result<Vec<T>> {
        let path = self.dir.join(file);
        if !path.exists() {
            return Err(Error::FileNotFound(file.to_string()));
        }
        let mut reader = open(&path)?;
        let rows = reader.deserialize().collect::<csv::Result<Vec<T>>>()?;
        Ok(rows)
    }

    fn write<T: Serialize>(&self, file: &str, rows: &[T]) -> Result<()> {
        let path = self.dir.join(file);
        let mut writer = Writer::from_path(&path)?;
        for row in rows {
            writer.serialize(row)?;
        }
        writer.flush()?;
        info!(path = %path.display(), rows = rows.len(), "Saved");
        Ok(())
    }

    fn update_pilots<F>(&self, pilot_id: &str, apply: F) -> Result<String>
    where
        F: FnOnce(&mut Pilot) -> String,
    {
        let mut pilots: Vec<Pilot> = self.read_existing(PILOTS_FILE)?;
        let message = apply(pilot_mut(&mut pilots, pilot_id)?);
        self.write(PILOTS_FILE, &pilots)?;
        Ok(format!("{} (saved to CSV)", message))
    }

    fn update_drones<F>(&self, drone_id: &str, apply: F) -> Result<String>
    where
        F: FnOnce(&mut Drone) -> String,
    {
        let mut drones: Vec<Drone> = self.read_existing(DRONES_FILE)?;
        let message = apply(drone_mut(&mut drones, drone_id)?);
        self.write(DRONES_FILE, &drones)?;
        Ok(format!("{} (saved to CSV)", message))
    }
}

fn open(path: &Path) -> Result<Reader<File>> {
    Ok(ReaderBuilder::new().trim(Trim::All).from_path(path)?)
}

impl RosterStore for CsvStore {
    fn load_pilots(&self) -> Result<Vec<Pilot>> {
        self.read(PILOTS_FILE)
    }

    fn load_drones(&self) -> Result<Vec<Drone>> {
        self.read(DRONES_FILE)
    }

    fn load_missions(&self) -> Result<Vec<Mission>> {
        self.read(MISSIONS_FILE)
    }

    fn load_assignments(&self) -> Result<Vec<Assignment>> {
        self.read(ASSIGNMENTS_FILE)
    }

    fn set_pilot_status(&mut self, pilot_id: &str, status: PilotStatus) -> Result<String> {
        self.update_pilots(pilot_id, |p| {
            p.status = status;
            format!("Pilot {} status set to {}.", p.pilot_id.trim(), status)
        })
    }

    fn set_pilot_assignment(&mut self, pilot_id: &str, project_id: Option<&str>) -> Result<String> {
        self.update_pilots(pilot_id, |p| book_pilot(p, project_id))
    }

    fn set_drone_status(&mut self, drone_id: &str, status: DroneStatus) -> Result<String> {
        self.update_drones(drone_id, |d| {
            d.status = status;
            format!("Drone {} status set to {}.", d.drone_id.trim(), status)
        })
    }

    fn set_drone_assignment(&mut self, drone_id: &str, project_id: Option<&str>) -> Result<String> {
        self.update_drones(drone_id, |d| book_drone(d, project_id))
    }
}
