//! Storage collaborators.
//!
//! The engine never reads or writes storage itself. A [`RosterStore`] hands
//! out fresh collections and applies the status/assignment mutations callers
//! request; the engine only ever sees the resulting [`Snapshot`].

use std::fmt;
use tracing::info;

use crate::domain::{
    normalize_booking, Assignment, Drone, DroneStatus, Mission, Pilot, PilotStatus, UNASSIGNED,
};
use crate::engine::resolve_assignments;
use crate::error::{Error, Result};

mod files;

pub use files::CsvStore;

pub trait RosterStore {
    fn load_pilots(&self) -> Result<Vec<Pilot>>;
    fn load_drones(&self) -> Result<Vec<Drone>>;
    fn load_missions(&self) -> Result<Vec<Mission>>;
    /// The explicit assignment ledger; empty when none is kept.
    fn load_assignments(&self) -> Result<Vec<Assignment>>;

    /// Returns the confirmation message shown to the user.
    fn set_pilot_status(&mut self, pilot_id: &str, status: PilotStatus) -> Result<String>;
    /// `None` or a blank id frees the pilot (status `Available`); a project id
    /// books them (status `Assigned`).
    fn set_pilot_assignment(&mut self, pilot_id: &str, project_id: Option<&str>) -> Result<String>;
    fn set_drone_status(&mut self, drone_id: &str, status: DroneStatus) -> Result<String>;
    fn set_drone_assignment(&mut self, drone_id: &str, project_id: Option<&str>) -> Result<String>;
}

fn book_pilot(pilot: &mut Pilot, project_id: Option<&str>) -> String {
    pilot.current_assignment = normalize_booking(project_id);
    pilot.status = if pilot.current_assignment.is_some() {
        PilotStatus::Assigned
    } else {
        PilotStatus::Available
    };
    info!(
        pilot = %pilot.pilot_id,
        assignment = ?pilot.current_assignment,
        status = %pilot.status,
        "Pilot booking updated"
    );
    format!(
        "Pilot {} assignment set to {}.",
        pilot.pilot_id.trim(),
        pilot.current_assignment.as_deref().unwrap_or(UNASSIGNED)
    )
}

fn book_drone(drone: &mut Drone, project_id: Option<&str>) -> String {
    drone.current_assignment = normalize_booking(project_id);
    drone.status = if drone.current_assignment.is_some() {
        DroneStatus::Assigned
    } else {
        DroneStatus::Available
    };
    info!(
        drone = %drone.drone_id,
        assignment = ?drone.current_assignment,
        status = %drone.status,
        "Drone booking updated"
    );
    format!(
        "Drone {} assignment set to {}.",
        drone.drone_id.trim(),
        drone.current_assignment.as_deref().unwrap_or(UNASSIGNED)
    )
}

fn pilot_mut<'a>(pilots: &'a mut [Pilot], pilot_id: &str) -> Result<&'a mut Pilot> {
    let id = pilot_id.trim();
    pilots
        .iter_mut()
        .find(|p| p.pilot_id.trim() == id)
        .ok_or_else(|| Error::PilotNotFound(id.to_string()))
}

fn drone_mut<'a>(drones: &'a mut [Drone], drone_id: &str) -> Result<&'a mut Drone> {
    let id = drone_id.trim();
    drones
        .iter_mut()
        .find(|d| d.drone_id.trim() == id)
        .ok_or_else(|| Error::DroneNotFound(id.to_string()))
}

/// In-memory store, used for the demo and in tests.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    pub pilots: Vec<Pilot>,
    pub drones: Vec<Drone>,
    pub missions: Vec<Mission>,
    pub assignments: Vec<Assignment>,
}

impl MemoryStore {
    pub fn new(pilots: Vec<Pilot>, drones: Vec<Drone>, missions: Vec<Mission>) -> Self {
        Self {
            pilots,
            drones,
            missions,
            assignments: Vec::new(),
        }
    }
}

impl RosterStore for MemoryStore {
    fn load_pilots(&self) -> Result<Vec<Pilot>> {
        Ok(self.pilots.clone())
    }

    fn load_drones(&self) -> Result<Vec<Drone>> {
        Ok(self.drones.clone())
    }

    fn load_missions(&self) -> Result<Vec<Mission>> {
        Ok(self.missions.clone())
    }

    fn load_assignments(&self) -> Result<Vec<Assignment>> {
        Ok(self.assignments.clone())
    }

    fn set_pilot_status(&mut self, pilot_id: &str, status: PilotStatus) -> Result<String> {
        let pilot = pilot_mut(&mut self.pilots, pilot_id)?;
        pilot.status = status;
        let id = pilot.pilot_id.trim();
        Ok(format!("Pilot {} status set to {}.", id, status))
    }

    fn set_pilot_assignment(&mut self, pilot_id: &str, project_id: Option<&str>) -> Result<String> {
        Ok(book_pilot(pilot_mut(&mut self.pilots, pilot_id)?, project_id))
    }

    fn set_drone_status(&mut self, drone_id: &str, status: DroneStatus) -> Result<String> {
        let drone = drone_mut(&mut self.drones, drone_id)?;
        drone.status = status;
        let id = drone.drone_id.trim();
        Ok(format!("Drone {} status set to {}.", id, status))
    }

    fn set_drone_assignment(&mut self, drone_id: &str, project_id: Option<&str>) -> Result<String> {
        Ok(book_drone(drone_mut(&mut self.drones, drone_id)?, project_id))
    }
}

/// The four collections read together for one engine invocation.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    pub pilots: Vec<Pilot>,
    pub drones: Vec<Drone>,
    pub missions: Vec<Mission>,
    /// Explicit ledger; `None` when not kept or empty, so bookings are derived.
    pub ledger: Option<Vec<Assignment>>,
}

impl Snapshot {
    pub fn load<S: RosterStore + ?Sized>(store: &S, use_ledger: bool) -> Result<Self> {
        let ledger = if use_ledger {
            Some(store.load_assignments()?).filter(|l| !l.is_empty())
        } else {
            None
        };
        let snapshot = Self {
            pilots: store.load_pilots()?,
            drones: store.load_drones()?,
            missions: store.load_missions()?,
            ledger,
        };
        info!(
            pilots = snapshot.pilots.len(),
            drones = snapshot.drones.len(),
            missions = snapshot.missions.len(),
            ledger = snapshot.ledger.is_some(),
            "Snapshot loaded"
        );
        Ok(snapshot)
    }

    /// Ledger or roster-derived bookings, with fleet bookings merged in.
    pub fn assignments(&self) -> Vec<Assignment> {
        resolve_assignments(
            self.ledger.as_deref(),
            &self.pilots,
            &self.drones,
            &self.missions,
        )
    }

    pub fn stats(&self) -> SnapshotStats {
        SnapshotStats {
            total_pilots: self.pilots.len(),
            available_pilots: self
                .pilots
                .iter()
                .filter(|p| p.status == PilotStatus::Available)
                .count(),
            total_drones: self.drones.len(),
            available_drones: self
                .drones
                .iter()
                .filter(|d| d.status == DroneStatus::Available)
                .count(),
            drones_in_maintenance: self.drones.iter().filter(|d| d.in_maintenance()).count(),
            missions: self.missions.len(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SnapshotStats {
    pub total_pilots: usize,
    pub available_pilots: usize,
    pub total_drones: usize,
    pub available_drones: usize,
    pub drones_in_maintenance: usize,
    pub missions: usize,
}

impl fmt::Display for SnapshotStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Pilots: {}/{} available | Drones: {}/{} available ({} in maintenance) | Missions: {}",
            self.available_pilots,
            self.total_pilots,
            self.available_drones,
            self.total_drones,
            self.drones_in_maintenance,
            self.missions
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::fixtures::*;

    fn store() -> MemoryStore {
        MemoryStore::new(
            vec![
                pilot("P1", "Mapping", "DGCA", "BLR", "Available"),
                pilot("P2", "Mapping", "DGCA", "BLR", "Assigned").on("PRJ1"),
            ],
            vec![drone("D1", "RGB", "BLR", "Maintenance")],
            vec![mission("PRJ1", "BLR", "Mapping", "DGCA", (1, 5))],
        )
    }

    #[test]
    fn booking_sets_status() {
        let mut s = store();
        let msg = s.set_pilot_assignment("P1", Some(" PRJ1 ")).unwrap();
        assert_eq!(msg, "Pilot P1 assignment set to PRJ1.");
        assert_eq!(s.pilots[0].status, PilotStatus::Assigned);
        assert_eq!(s.pilots[0].current_assignment.as_deref(), Some("PRJ1"));

        s.set_pilot_assignment("P2", None).unwrap();
        assert_eq!(s.pilots[1].status, PilotStatus::Available);
        assert_eq!(s.pilots[1].current_assignment, None);

        s.set_drone_assignment("D1", Some("–")).unwrap();
        assert_eq!(s.drones[0].status, DroneStatus::Available);
        s.set_drone_assignment("D1", Some("PRJ1")).unwrap();
        assert_eq!(s.drones[0].status, DroneStatus::Assigned);
    }

    #[test]
    fn unknown_ids_are_errors() {
        let mut s = store();
        let err = s.set_pilot_status("P9", PilotStatus::OnLeave).unwrap_err();
        assert_eq!(err.to_string(), "Pilot P9 not found.");
        assert!(matches!(
            s.set_drone_status("D9", DroneStatus::Available),
            Err(Error::DroneNotFound(_))
        ));
    }

    #[test]
    fn status_update_message() {
        let mut s = store();
        let msg = s.set_pilot_status("P1", PilotStatus::OnLeave).unwrap();
        assert_eq!(msg, "Pilot P1 status set to On Leave.");
        assert_eq!(s.pilots[0].status, PilotStatus::OnLeave);
    }

    #[test]
    fn snapshot_derives_without_ledger() {
        let mut s = store();
        let snap = Snapshot::load(&s, true).unwrap();
        assert!(snap.ledger.is_none());
        assert_eq!(snap.assignments().len(), 1);

        s.assignments.push(pilot_booking("PRJ1", "P1", (1, 5)));
        let snap = Snapshot::load(&s, true).unwrap();
        assert_eq!(snap.assignments()[0].pilot(), Some("P1"));
        let snap = Snapshot::load(&s, false).unwrap();
        assert_eq!(snap.assignments()[0].pilot(), Some("P2"));
    }

    #[test]
    fn stats_line() {
        let snap = Snapshot::load(&store(), true).unwrap();
        assert_eq!(
            snap.stats().to_string(),
            "Pilots: 1/2 available | Drones: 0/1 available (1 in maintenance) | Missions: 1"
        );
    }
}
