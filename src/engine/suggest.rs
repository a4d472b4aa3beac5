//! Picking one pilot and one drone for a mission.
//!
//! Both entry points rank the matching engine's output with the named
//! comparators below, so tie-break policy can be tested on its own:
//!
//! - [`by_availability`]: `Available` pilots before everyone else, original
//!   order otherwise.
//! - [`by_release_date`]: pilots whose current booking ends soonest first;
//!   pilots with no dated booking last.

use chrono::NaiveDate;
use serde::Serialize;
use std::cmp::Ordering;
use tracing::{info, warn};

use super::dates::parse_date;
use super::matching::{match_drones, match_pilots, pilot_busy, qualified_pilots};
use super::query::{query_drones, query_pilots, DroneFilter, PilotFilter};
use crate::domain::{find_mission, Assignment, Drone, Mission, Pilot, PilotStatus, UNASSIGNED};

const URGENT_EXPANDED: &str = "Urgent: expanded to assigned pilots for possible reassignment.";
const NO_DRONE: &str =
    "No suitable drone available at location; check maintenance or assign manually.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// A pilot was selected; the drone may still be missing (see notes).
    Proposed,
    NoCandidate,
    ProjectNotFound,
}

#[derive(Debug, Clone, Serialize)]
pub struct Suggestion<'a> {
    pub project_id: String,
    pub outcome: Outcome,
    pub pilot: Option<&'a Pilot>,
    pub drone: Option<&'a Drone>,
    /// Rationale and warnings, in the order they were raised.
    pub notes: Vec<String>,
}

impl<'a> Suggestion<'a> {
    fn not_found(project_id: &str) -> Self {
        warn!(project = project_id, "Project not found");
        Self {
            project_id: project_id.trim().to_string(),
            outcome: Outcome::ProjectNotFound,
            pilot: None,
            drone: None,
            notes: vec![format!("Project {} not found.", project_id.trim())],
        }
    }

    pub fn success(&self) -> bool {
        self.outcome == Outcome::Proposed
    }
}

impl std::fmt::Display for Suggestion<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let pilot = self.pilot.map_or("-".to_string(), |p| p.pilot_id.clone());
        let drone = self.drone.map_or("-".to_string(), |d| d.drone_id.clone());
        write!(
            f,
            "{} -> pilot {} / drone {} ({:?})",
            self.project_id, pilot, drone, self.outcome
        )
    }
}

/// Orders `Available` pilots ahead of every other status.
pub fn by_availability(a: &Pilot, b: &Pilot) -> Ordering {
    availability_rank(a).cmp(&availability_rank(b))
}

fn availability_rank(p: &Pilot) -> u8 {
    if p.status == PilotStatus::Available {
        0
    } else {
        1
    }
}

/// End date of the pilot's current booking, `NaiveDate::MAX` when there is
/// none or it does not parse.
///
/// The booking row for the pilot's `current_assignment` wins; otherwise the
/// first row naming the pilot on any mission other than `target_project`.
pub fn release_date(pilot: &Pilot, assignments: &[Assignment], target_project: &str) -> NaiveDate {
    let id = pilot.pilot_id.trim();
    let rows = || assignments.iter().filter(move |a| a.pilot() == Some(id));
    let current = pilot
        .current_assignment
        .as_deref()
        .and_then(|cur| rows().find(|a| a.project() == cur.trim()));
    current
        .or_else(|| rows().find(|a| a.project() != target_project.trim()))
        .and_then(|a| parse_date(&a.end_date))
        .unwrap_or(NaiveDate::MAX)
}

/// Orders pilots by how soon they are released from their current booking.
pub fn by_release_date(
    a: &Pilot,
    b: &Pilot,
    assignments: &[Assignment],
    target_project: &str,
) -> Ordering {
    let release = |p: &Pilot| release_date(p, assignments, target_project);
    release(a).cmp(&release(b))
}

/// Least-impact order for urgent reassignment: available pilots first in
/// their original order, then everyone else by [`by_release_date`]. The sort
/// is stable, so ties keep roster order.
pub fn rank_for_urgent<'a>(
    mut candidates: Vec<&'a Pilot>,
    assignments: &[Assignment],
    target_project: &str,
) -> Vec<&'a Pilot> {
    candidates.sort_by(|a, b| {
        by_availability(a, b).then_with(|| {
            if a.status == PilotStatus::Available {
                Ordering::Equal
            } else {
                by_release_date(a, b, assignments, target_project)
            }
        })
    });
    candidates
}

/// Recommend one pilot and one drone for `project_id`.
///
/// When `is_urgent` and no pilot matches, every pilot at the mission's
/// location is considered regardless of status or bookings. Never fails on an
/// empty result; an unknown project is reported through
/// [`Outcome::ProjectNotFound`].
pub fn suggest_assignment<'a>(
    pilots: &'a [Pilot],
    drones: &'a [Drone],
    missions: &[Mission],
    assignments: &[Assignment],
    project_id: &str,
    is_urgent: bool,
) -> Suggestion<'a> {
    let Some(mission) = find_mission(missions, project_id) else {
        return Suggestion::not_found(project_id);
    };
    let project = mission.project_id.trim().to_string();
    let mut notes = Vec::new();

    let mut pilot_pool = match_pilots(pilots, mission, assignments, &[]);
    let drone_pool = match_drones(drones, mission, assignments, &[]);

    let expanded = pilot_pool.is_empty() && is_urgent;
    if expanded {
        pilot_pool = query_pilots(
            pilots,
            &PilotFilter {
                location: mission.location(),
                ..PilotFilter::default()
            },
        );
        notes.push(URGENT_EXPANDED.to_string());
    }

    let best = pilot_pool.into_iter().min_by(|a, b| by_availability(a, b));
    let Some(pilot) = best else {
        warn!(project = %project, "No suitable pilot");
        return Suggestion {
            project_id: project,
            outcome: Outcome::NoCandidate,
            pilot: None,
            drone: None,
            notes: vec!["No suitable pilot found for this project.".to_string()],
        };
    };
    match pilot.status {
        PilotStatus::Available => {}
        PilotStatus::Assigned => notes.push(format!(
            "Pilot {} is currently assigned; urgent reassignment may be needed.",
            pilot.name
        )),
        other => notes.push(format!(
            "Pilot {} is {}; confirm availability before assigning.",
            pilot.name, other
        )),
    }
    if expanded {
        notes.extend(expansion_gaps(pilot, mission, assignments));
    }

    let drone = drone_pool.first().copied();
    match drone {
        None => notes.push(NO_DRONE.to_string()),
        Some(d) if d.in_maintenance() => notes.push(maintenance_warning(d)),
        Some(_) => {}
    }

    info!(
        project = %project,
        pilot = %pilot.pilot_id,
        drone = ?drone.map(|d| &d.drone_id),
        "Suggestion ready"
    );
    Suggestion {
        project_id: project,
        outcome: Outcome::Proposed,
        pilot: Some(pilot),
        drone,
        notes,
    }
}

/// Pick a pilot and drone for an urgent mission even if that means pulling a
/// pilot off another booking.
///
/// All qualified pilots at the location are eligible regardless of bookings;
/// they are ranked with [`rank_for_urgent`] so the least disruptive choice
/// comes first.
pub fn urgent_reassign<'a>(
    pilots: &'a [Pilot],
    drones: &'a [Drone],
    missions: &[Mission],
    assignments: &[Assignment],
    project_id: &str,
) -> Suggestion<'a> {
    let Some(mission) = find_mission(missions, project_id) else {
        return Suggestion::not_found(project_id);
    };
    let project = mission.project_id.trim().to_string();
    let place = mission.location().unwrap_or("any location");
    let mut notes = Vec::new();

    let ranked = rank_for_urgent(qualified_pilots(pilots, mission), assignments, &project);
    let pilot = ranked.first().copied();
    match pilot {
        Some(p) if p.status == PilotStatus::Assigned => {
            let from = p.current_assignment.as_deref().unwrap_or(UNASSIGNED);
            warn!(project = %project, pilot = %p.pilot_id, from, "Urgent override");
            notes.push(format!(
                "Urgent override: {} will be reassigned from {} to {}.",
                p.name, from, project
            ));
        }
        Some(p) if p.status != PilotStatus::Available => notes.push(format!(
            "Pilot {} is {}; confirm availability before assigning.",
            p.name, p.status
        )),
        Some(_) => {}
        None => notes.push(format!("No qualified pilot at {} for {}.", place, project)),
    }

    let mut drone = match_drones(drones, mission, assignments, &[])
        .first()
        .copied();
    if drone.is_none() {
        drone = query_drones(
            drones,
            &DroneFilter {
                location: mission.location(),
                ..DroneFilter::default()
            },
        )
        .first()
        .copied();
    }
    match drone {
        Some(d) if d.in_maintenance() => notes.push(maintenance_warning(d)),
        Some(_) => {}
        None => notes.push(format!("No drone at {} for {}.", place, project)),
    }

    let outcome = if pilot.is_some() {
        Outcome::Proposed
    } else {
        Outcome::NoCandidate
    };
    info!(
        project = %project,
        pilot = ?pilot.map(|p| &p.pilot_id),
        drone = ?drone.map(|d| &d.drone_id),
        "Urgent reassignment ready"
    );
    Suggestion {
        project_id: project,
        outcome,
        pilot,
        drone,
        notes,
    }
}

/// What a pilot picked from the urgency-expanded pool does not satisfy.
fn expansion_gaps(pilot: &Pilot, mission: &Mission, assignments: &[Assignment]) -> Vec<String> {
    let mut gaps = Vec::new();
    let skills = pilot.skills.missing(&mission.required_skills).join(", ");
    if !skills.is_empty() {
        gaps.push(format!("Pilot {} lacks required skill(s): {}.", pilot.name, skills));
    }
    let certs = pilot.certifications.missing(&mission.required_certs);
    if !certs.is_empty() {
        gaps.push(format!(
            "Pilot {} lacks certification(s): {}.",
            pilot.name,
            certs.join(", ")
        ));
    }
    if pilot_busy(&pilot.pilot_id, mission, assignments) {
        gaps.push(format!("Pilot {} is booked on overlapping dates.", pilot.name));
    }
    gaps
}

fn maintenance_warning(drone: &Drone) -> String {
    format!(
        "Warning: drone {} is in maintenance; verify before use.",
        drone.drone_id
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::fixtures::*;

    fn missions() -> Vec<Mission> {
        vec![
            mission("PRJ1", "BLR", "Mapping", "DGCA", (6, 8)),
            mission("PRJ2", "BLR", "Mapping", "DGCA", (1, 7)),
            mission("PRJ3", "BLR", "Mapping", "DGCA", (1, 20)),
        ]
    }

    #[test]
    fn unknown_project_is_reported_not_raised() {
        let s = suggest_assignment(&[], &[], &missions(), &[], "PRJ404", false);
        assert_eq!(s.outcome, Outcome::ProjectNotFound);
        assert!(s.pilot.is_none() && s.drone.is_none());
        assert!(s.notes[0].contains("not found"));

        let u = urgent_reassign(&[], &[], &missions(), &[], "PRJ404");
        assert_eq!(u.outcome, Outcome::ProjectNotFound);
        assert!(u.notes[0].contains("not found"));
    }

    #[test]
    fn suggests_available_pilot_and_first_drone() {
        let pilots = vec![
            pilot("P1", "Mapping", "DGCA", "BLR", "Available"),
            pilot("P2", "Mapping", "DGCA", "BLR", "Available"),
        ];
        let drones = vec![
            drone("D1", "RGB", "Mumbai", "Available"),
            drone("D2", "Mapping", "BLR", "Available"),
        ];
        let s = suggest_assignment(&pilots, &drones, &missions(), &[], "PRJ1", false);
        assert!(s.success());
        assert_eq!(s.pilot.unwrap().pilot_id, "P1");
        assert_eq!(s.drone.unwrap().drone_id, "D2");
        assert!(s.notes.is_empty());
    }

    #[test]
    fn assigned_pilot_suggestion_carries_a_note() {
        let pilots = vec![pilot("P1", "Mapping", "DGCA", "BLR", "Assigned").on("PRJ9")];
        let s = suggest_assignment(&pilots, &[], &missions(), &[], "PRJ1", false);
        assert_eq!(s.pilot.unwrap().pilot_id, "P1");
        assert!(s.notes.iter().any(|n| n.contains("currently assigned")));
        assert!(s.notes.iter().any(|n| n.contains("No suitable drone")));
    }

    #[test]
    fn no_pilot_without_urgency() {
        let pilots = vec![pilot("P1", "Mapping", "DGCA", "BLR", "On Leave")];
        let drones = vec![drone("D1", "Mapping", "BLR", "Available")];
        let s = suggest_assignment(&pilots, &drones, &missions(), &[], "PRJ1", false);
        assert_eq!(s.outcome, Outcome::NoCandidate);
        assert!(s.pilot.is_none() && s.drone.is_none());
        assert!(s.notes[0].contains("No suitable pilot"));
    }

    #[test]
    fn urgency_expands_to_everyone_at_location() {
        let pilots = vec![
            pilot("P1", "Inspection", "", "BLR", "On Leave"),
            pilot("P2", "Mapping", "DGCA", "Mumbai", "Available"),
        ];
        let s = suggest_assignment(&pilots, &[], &missions(), &[], "PRJ1", true);
        assert!(s.success());
        assert_eq!(s.pilot.unwrap().pilot_id, "P1");
        assert!(s.notes[0].starts_with("Urgent: expanded"));
    }

    #[test]
    fn urgent_expansion_notes_what_the_pilot_lacks() {
        let pilots = vec![pilot("P1", "Inspection", "", "BLR", "Available")];
        let bookings = vec![pilot_booking("PRJ2", "P1", (1, 7))];
        let s = suggest_assignment(&pilots, &[], &missions(), &bookings, "PRJ1", true);
        assert_eq!(s.pilot.unwrap().pilot_id, "P1");
        let noted = |text: &str| s.notes.iter().any(|n| n.contains(text));
        assert!(noted("P1 lacks required skill(s): Mapping."));
        assert!(noted("P1 lacks certification(s): DGCA."));
        assert!(noted("is booked on overlapping dates"));
        assert!(noted("No suitable drone"));

        let qualified = vec![pilot("P2", "Mapping", "DGCA", "BLR", "Available")];
        let s = suggest_assignment(&qualified, &[], &missions(), &[], "PRJ1", true);
        assert!(!s.notes.iter().any(|n| n.contains("lacks")));
    }

    #[test]
    fn availability_comparator_keeps_original_order() {
        let a = pilot("A", "", "", "", "Assigned");
        let b = pilot("B", "", "", "", "Available");
        let c = pilot("C", "", "", "", "Available");
        assert_eq!(by_availability(&a, &b), Ordering::Greater);
        let pool = [&a, &b, &c];
        let first = pool.into_iter().min_by(|x, y| by_availability(x, y));
        assert_eq!(first.unwrap().pilot_id, "B");
    }

    #[test]
    fn release_date_prefers_current_booking() {
        let p = pilot("P1", "", "", "", "Assigned").on("PRJ3");
        let bookings = vec![
            pilot_booking("PRJ2", "P1", (1, 7)),
            pilot_booking("PRJ3", "P1", (1, 20)),
        ];
        let feb_20 = NaiveDate::from_ymd_opt(2026, 2, 20).unwrap();
        assert_eq!(release_date(&p, &bookings, "PRJ1"), feb_20);

        let free = pilot("P2", "", "", "", "Assigned");
        assert_eq!(release_date(&free, &bookings, "PRJ1"), NaiveDate::MAX);
    }

    #[test]
    fn urgent_picks_pilot_released_soonest() {
        let pilots = vec![
            pilot("P1", "Mapping", "DGCA", "BLR", "Assigned").on("PRJ3"),
            pilot("P2", "Mapping", "DGCA", "BLR", "Assigned").on("PRJ2"),
            pilot("P3", "Mapping", "DGCA", "BLR", "Assigned"),
        ];
        let bookings = vec![
            pilot_booking("PRJ3", "P1", (1, 20)),
            pilot_booking("PRJ2", "P2", (1, 7)),
        ];
        let ranked = rank_for_urgent(pilots.iter().collect(), &bookings, "PRJ1");
        assert_eq!(pilot_ids(&ranked), vec!["P2", "P1", "P3"]);

        let u = urgent_reassign(&pilots, &[], &missions(), &bookings, "PRJ1");
        assert_eq!(u.pilot.unwrap().pilot_id, "P2");
        assert!(u.notes[0].contains("reassigned from PRJ2 to PRJ1"));
    }

    #[test]
    fn urgent_prefers_available_pilots() {
        let pilots = vec![
            pilot("P1", "Mapping", "DGCA", "BLR", "Assigned").on("PRJ2"),
            pilot("P2", "Mapping", "DGCA", "BLR", "Available"),
        ];
        let bookings = vec![pilot_booking("PRJ2", "P1", (1, 2))];
        let u = urgent_reassign(&pilots, &[], &missions(), &bookings, "PRJ1");
        assert_eq!(u.pilot.unwrap().pilot_id, "P2");
        assert!(!u.notes.iter().any(|n| n.contains("Urgent override")));
    }

    #[test]
    fn urgent_warns_about_maintenance_drone() {
        let pilots = vec![pilot("P1", "Mapping", "DGCA", "BLR", "Available")];
        let drones = vec![drone("D1", "Mapping", "BLR", "Maintenance")];
        let u = urgent_reassign(&pilots, &drones, &missions(), &[], "PRJ1");
        assert_eq!(u.drone.unwrap().drone_id, "D1");
        assert!(u.notes.iter().any(|n| n.contains("in maintenance")));
    }

    #[test]
    fn urgent_without_qualified_pilot_still_reports_drone() {
        let pilots = vec![pilot("P1", "Survey", "", "BLR", "Available")];
        let drones = vec![drone("D1", "Mapping", "BLR", "Available")];
        let u = urgent_reassign(&pilots, &drones, &missions(), &[], "PRJ1");
        assert_eq!(u.outcome, Outcome::NoCandidate);
        assert!(u.pilot.is_none());
        assert_eq!(u.drone.unwrap().drone_id, "D1");
    }
}
