//! Conflict detection over the full assignment set.
//!
//! Every check runs independently and every finding is reported; nothing is
//! merged or deduplicated, so one record can appear in several conflicts.

use serde::Serialize;
use std::fmt;
use tracing::{info, warn};

use crate::domain::{
    find_drone, find_mission, find_pilot, same_location, Assignment, Drone, Mission, Pilot,
};
use crate::engine::assignments::resolve_assignments;
use crate::engine::dates::{dates_overlap, range_is_valid};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Low => write!(f, "low"),
            Self::Medium => write!(f, "medium"),
            Self::High => write!(f, "high"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictKind {
    DoubleBookingPilot,
    DoubleBookingDrone,
    SkillMismatch,
    CertificationMismatch,
    DroneMaintenanceAssigned,
    PilotLocationMismatch,
    DroneLocationMismatch,
    /// A row whose dates do not parse and so escape the overlap checks.
    UnparseableDates,
}

impl ConflictKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DoubleBookingPilot => "double_booking_pilot",
            Self::DoubleBookingDrone => "double_booking_drone",
            Self::SkillMismatch => "skill_mismatch",
            Self::CertificationMismatch => "certification_mismatch",
            Self::DroneMaintenanceAssigned => "drone_maintenance_assigned",
            Self::PilotLocationMismatch => "pilot_location_mismatch",
            Self::DroneLocationMismatch => "drone_location_mismatch",
            Self::UnparseableDates => "unparseable_dates",
        }
    }

    pub fn severity(&self) -> Severity {
        match self {
            Self::PilotLocationMismatch | Self::DroneLocationMismatch => Severity::Medium,
            Self::UnparseableDates => Severity::Low,
            _ => Severity::High,
        }
    }
}

impl fmt::Display for ConflictKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Conflict {
    #[serde(rename = "type")]
    pub kind: ConflictKind,
    pub severity: Severity,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pilot_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub drone_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,
    /// Second mission of a double booking.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub related_project_id: Option<String>,
}

impl Conflict {
    fn new(kind: ConflictKind, message: String) -> Self {
        Self {
            kind,
            severity: kind.severity(),
            message,
            pilot_id: None,
            drone_id: None,
            project_id: None,
            related_project_id: None,
        }
    }

    fn pilot(mut self, id: &str) -> Self {
        self.pilot_id = Some(id.to_string());
        self
    }

    fn drone(mut self, id: &str) -> Self {
        self.drone_id = Some(id.to_string());
        self
    }

    fn project(mut self, id: &str) -> Self {
        self.project_id = Some(id.to_string());
        self
    }

    fn related(mut self, id: &str) -> Self {
        self.related_project_id = Some(id.to_string());
        self
    }
}

impl fmt::Display for Conflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.severity, self.message)
    }
}

/// Run every check over the resolved assignment set.
///
/// With `assignments` absent, pilot bookings are derived from the roster;
/// drone bookings on the fleet are merged in either way.
pub fn detect_all_conflicts(
    pilots: &[Pilot],
    drones: &[Drone],
    missions: &[Mission],
    assignments: Option<&[Assignment]>,
) -> Vec<Conflict> {
    let rows = resolve_assignments(assignments, pilots, drones, missions);

    let mut out = Vec::new();
    out.extend(double_booking_pilot(&rows));
    out.extend(double_booking_drone(&rows));
    out.extend(skill_cert_mismatch(pilots, missions, &rows));
    out.extend(drone_maintenance_assigned(drones, &rows));
    out.extend(location_mismatch(pilots, drones, missions, &rows));
    out.extend(unparseable_dates(&rows));

    if out.is_empty() {
        info!(rows = rows.len(), "No conflicts");
    } else {
        warn!(
            rows = rows.len(),
            conflicts = out.len(),
            "Conflicts detected"
        );
    }
    out
}

/// Key shared by two overlapping rows, then the rows in input order.
type Pair<'a> = (&'a str, &'a Assignment, &'a Assignment);

fn overlapping_pairs<'a, F>(rows: &'a [Assignment], key: F) -> Vec<Pair<'a>>
where
    F: Fn(&'a Assignment) -> Option<&'a str>,
{
    let keyed: Vec<(&str, &Assignment)> = rows.iter().filter_map(|a| Some((key(a)?, a))).collect();
    let mut pairs = Vec::new();
    for (i, (k1, a1)) in keyed.iter().enumerate() {
        for (k2, a2) in &keyed[i + 1..] {
            if k1 != k2 {
                continue;
            }
            if dates_overlap(&a1.start_date, &a1.end_date, &a2.start_date, &a2.end_date) {
                pairs.push((*k1, *a1, *a2));
            }
        }
    }
    pairs
}

fn double_booking_pilot(rows: &[Assignment]) -> Vec<Conflict> {
    overlapping_pairs(rows, Assignment::pilot)
        .into_iter()
        .map(|(pilot, a1, a2)| {
            Conflict::new(
                ConflictKind::DoubleBookingPilot,
                format!(
                    "Pilot {} has overlapping assignments: {} and {}.",
                    pilot,
                    a1.project(),
                    a2.project()
                ),
            )
            .pilot(pilot)
            .project(a1.project())
            .related(a2.project())
        })
        .collect()
}

fn double_booking_drone(rows: &[Assignment]) -> Vec<Conflict> {
    overlapping_pairs(rows, Assignment::drone)
        .into_iter()
        .map(|(drone, a1, a2)| {
            Conflict::new(
                ConflictKind::DoubleBookingDrone,
                format!(
                    "Drone {} has overlapping assignments: {} and {}.",
                    drone,
                    a1.project(),
                    a2.project()
                ),
            )
            .drone(drone)
            .project(a1.project())
            .related(a2.project())
        })
        .collect()
}

fn skill_cert_mismatch(
    pilots: &[Pilot],
    missions: &[Mission],
    rows: &[Assignment],
) -> Vec<Conflict> {
    let mut out = Vec::new();
    for a in rows {
        let Some(pid) = a.pilot() else { continue };
        let mission = find_mission(missions, a.project());
        let (Some(mission), Some(pilot)) = (mission, find_pilot(pilots, pid)) else {
            continue;
        };
        for skill in pilot.skills.missing(&mission.required_skills) {
            out.push(
                Conflict::new(
                    ConflictKind::SkillMismatch,
                    format!(
                        "Pilot {} ({}) lacks required skill '{}' for {}.",
                        pid,
                        pilot.name,
                        skill,
                        a.project()
                    ),
                )
                .pilot(pid)
                .project(a.project()),
            );
        }
        for cert in pilot.certifications.missing(&mission.required_certs) {
            out.push(
                Conflict::new(
                    ConflictKind::CertificationMismatch,
                    format!(
                        "Pilot {} ({}) lacks required certification '{}' for {}.",
                        pid,
                        pilot.name,
                        cert,
                        a.project()
                    ),
                )
                .pilot(pid)
                .project(a.project()),
            );
        }
    }
    out
}

fn drone_maintenance_assigned(drones: &[Drone], rows: &[Assignment]) -> Vec<Conflict> {
    let mut out = Vec::new();
    for d in drones.iter().filter(|d| d.in_maintenance()) {
        let did = d.drone_id.trim();
        for a in rows.iter().filter(|a| a.drone() == Some(did)) {
            out.push(
                Conflict::new(
                    ConflictKind::DroneMaintenanceAssigned,
                    format!(
                        "Drone {} is in maintenance but assigned to {}.",
                        did,
                        a.project()
                    ),
                )
                .drone(did)
                .project(a.project()),
            );
        }
    }
    out
}

fn location_mismatch(
    pilots: &[Pilot],
    drones: &[Drone],
    missions: &[Mission],
    rows: &[Assignment],
) -> Vec<Conflict> {
    let mut out = Vec::new();
    for a in rows {
        let Some(mission) = find_mission(missions, a.project()) else {
            continue;
        };
        let Some(site) = mission.location() else {
            continue;
        };

        if let Some(pilot) = a.pilot().and_then(|id| find_pilot(pilots, id)) {
            if !same_location(&pilot.location, site) {
                out.push(
                    Conflict::new(
                        ConflictKind::PilotLocationMismatch,
                        format!(
                            "Pilot {} is in {} but project {} is in {}.",
                            pilot.pilot_id.trim(),
                            known_or_unknown(&pilot.location),
                            a.project(),
                            site
                        ),
                    )
                    .pilot(pilot.pilot_id.trim())
                    .project(a.project()),
                );
            }
        }
        if let Some(drone) = a.drone().and_then(|id| find_drone(drones, id)) {
            if !same_location(&drone.location, site) {
                out.push(
                    Conflict::new(
                        ConflictKind::DroneLocationMismatch,
                        format!(
                            "Drone {} is in {} but project {} is in {}.",
                            drone.drone_id.trim(),
                            known_or_unknown(&drone.location),
                            a.project(),
                            site
                        ),
                    )
                    .drone(drone.drone_id.trim())
                    .project(a.project()),
                );
            }
        }
    }
    out
}

fn unparseable_dates(rows: &[Assignment]) -> Vec<Conflict> {
    rows.iter()
        .filter(|a| !range_is_valid(&a.start_date, &a.end_date))
        .map(|a| {
            let mut c = Conflict::new(
                ConflictKind::UnparseableDates,
                format!(
                    "Assignment {} has unparseable dates ('{}' to '{}'); overlap checks skip it.",
                    a,
                    a.start_date.trim(),
                    a.end_date.trim()
                ),
            )
            .project(a.project());
            c.pilot_id = a.pilot().map(String::from);
            c.drone_id = a.drone().map(String::from);
            c
        })
        .collect()
}

fn known_or_unknown(location: &str) -> &str {
    let l = location.trim();
    if l.is_empty() {
        "unknown"
    } else {
        l
    }
}
