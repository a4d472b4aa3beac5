use std::collections::HashSet;
use tracing::debug;

use crate::domain::{find_mission, Assignment, Drone, Mission, Pilot};

/// Derive pilot-side assignment rows from each pilot's `current_assignment`
/// and the referenced mission's dates. Pilots pointing at an unknown mission
/// are skipped.
pub fn build_assignments(pilots: &[Pilot], missions: &[Mission]) -> Vec<Assignment> {
    pilots
        .iter()
        .filter_map(|p| {
            let project = p.current_assignment.as_deref()?;
            let mission = find_mission(missions, project)?;
            Some(Assignment::for_pilot(mission, &p.pilot_id))
        })
        .collect()
}

/// Single merge point for the two assignment sources.
///
/// An explicit ledger, when supplied, is authoritative; otherwise pilot-side
/// rows are derived from the roster. Drone bookings recorded on the fleet are
/// then merged in, skipping unknown missions and any `(drone_id, project_id)`
/// pair already present.
pub fn resolve_assignments(
    explicit: Option<&[Assignment]>,
    pilots: &[Pilot],
    drones: &[Drone],
    missions: &[Mission],
) -> Vec<Assignment> {
    let mut out = match explicit {
        Some(ledger) => ledger.to_vec(),
        None => build_assignments(pilots, missions),
    };
    let mut seen: HashSet<(String, String)> = out
        .iter()
        .filter_map(|a| Some((a.drone()?.to_string(), a.project().to_string())))
        .collect();

    let base = out.len();
    for d in drones {
        let Some(project) = d.current_assignment.as_deref() else {
            continue;
        };
        let Some(mission) = find_mission(missions, project) else {
            continue;
        };
        let drone_id = d.drone_id.trim();
        if drone_id.is_empty() {
            continue;
        }
        let key = (drone_id.to_string(), mission.project_id.trim().to_string());
        if seen.insert(key) {
            out.push(Assignment::for_drone(mission, drone_id));
        }
    }
    debug!(
        ledger = explicit.is_some(),
        rows = base,
        drone_rows = out.len() - base,
        "Assignments resolved"
    );
    out
}
