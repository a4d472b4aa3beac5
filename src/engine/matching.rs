use tracing::{debug, warn};

use super::dates::dates_overlap;
use super::query::{query_drones, query_pilots, DroneFilter, PilotFilter};
use crate::domain::{Assignment, Drone, DroneStatus, Mission, Pilot, PilotStatus};

/// Pilots at the mission's location holding every required skill and
/// certification. No availability or calendar pruning.
pub fn qualified_pilots<'a>(pilots: &'a [Pilot], mission: &Mission) -> Vec<&'a Pilot> {
    let filter = PilotFilter {
        location: mission.location(),
        ..PilotFilter::default()
    };
    query_pilots(pilots, &filter)
        .into_iter()
        .filter(|p| is_qualified(p, mission))
        .collect()
}

fn is_qualified(pilot: &Pilot, mission: &Mission) -> bool {
    let skills = pilot.skills.missing(&mission.required_skills);
    let certs = pilot.certifications.missing(&mission.required_certs);
    skills.is_empty() && certs.is_empty()
}

/// Pilot candidates for a mission, in roster order.
///
/// Available pilots are preferred; only when none qualify does the pool widen
/// to already-assigned pilots. Excluded ids and pilots booked on another
/// mission whose dates overlap this one are dropped. Bookings on this same
/// mission are ignored so a mission can be re-matched.
pub fn match_pilots<'a>(
    pilots: &'a [Pilot],
    mission: &Mission,
    assignments: &[Assignment],
    exclude: &[&str],
) -> Vec<&'a Pilot> {
    let qualified = qualified_pilots(pilots, mission);
    let available: Vec<&Pilot> = qualified
        .iter()
        .copied()
        .filter(|p| p.status == PilotStatus::Available)
        .collect();
    let pool = if available.is_empty() {
        qualified
            .into_iter()
            .filter(|p| on_duty(p))
            .collect()
    } else {
        available
    };

    let out: Vec<&Pilot> = pool
        .into_iter()
        .filter(|p| !is_excluded(exclude, &p.pilot_id))
        .filter(|p| !pilot_busy(&p.pilot_id, mission, assignments))
        .collect();
    debug!(project = %mission.project_id, candidates = out.len(), "Pilot candidates");
    out
}

/// Drone candidates for a mission, in fleet order.
///
/// Missions carry no capability column, so `required_skills` stands in for
/// it and a drone qualifies with ANY listed token. The pool degrades instead
/// of coming back empty: without a capable drone the location's available
/// drones are used, and without those every drone at the location, including
/// ones in maintenance. Callers must check maintenance status on the result.
pub fn match_drones<'a>(
    drones: &'a [Drone],
    mission: &Mission,
    assignments: &[Assignment],
    exclude: &[&str],
) -> Vec<&'a Drone> {
    let location = mission.location();
    let mut pool = query_drones(
        drones,
        &DroneFilter {
            location,
            status: Some(DroneStatus::Available),
            exclude_maintenance: true,
            ..DroneFilter::default()
        },
    );

    if !mission.required_skills.is_empty() {
        let capable: Vec<&Drone> = pool
            .iter()
            .copied()
            .filter(|d| d.capabilities.contains_any(&mission.required_skills))
            .collect();
        if !capable.is_empty() {
            pool = capable;
        }
    }

    if pool.is_empty() {
        pool = query_drones(
            drones,
            &DroneFilter {
                location,
                ..DroneFilter::default()
            },
        );
        warn!(
            project = %mission.project_id,
            fallback = pool.len(),
            "No available drone, using location-only pool"
        );
    }

    let out: Vec<&Drone> = pool
        .into_iter()
        .filter(|d| !is_excluded(exclude, &d.drone_id))
        .filter(|d| !drone_busy(&d.drone_id, mission, assignments))
        .collect();
    debug!(project = %mission.project_id, candidates = out.len(), "Drone candidates");
    out
}

fn on_duty(pilot: &Pilot) -> bool {
    matches!(pilot.status, PilotStatus::Available | PilotStatus::Assigned)
}

fn is_excluded(exclude: &[&str], id: &str) -> bool {
    let id = id.trim();
    exclude.iter().any(|e| e.trim() == id)
}

/// True when the pilot holds a booking on another mission overlapping this one.
pub(crate) fn pilot_busy(pilot_id: &str, mission: &Mission, assignments: &[Assignment]) -> bool {
    let id = pilot_id.trim();
    assignments
        .iter()
        .filter(|a| a.pilot() == Some(id))
        .any(|a| clashes(a, mission))
}

fn drone_busy(drone_id: &str, mission: &Mission, assignments: &[Assignment]) -> bool {
    let id = drone_id.trim();
    assignments
        .iter()
        .filter(|a| a.drone() == Some(id))
        .any(|a| clashes(a, mission))
}

fn clashes(a: &Assignment, mission: &Mission) -> bool {
    a.project() != mission.project_id.trim()
        && dates_overlap(
            &a.start_date,
            &a.end_date,
            &mission.start_date,
            &mission.end_date,
        )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::fixtures::*;

    fn prj1() -> Mission {
        mission("PRJ1", "BLR", "Mapping, Survey", "DGCA", (6, 8))
    }

    #[test]
    fn pilots_need_every_skill_and_cert() {
        let pilots = vec![
            pilot("P1", "Mapping", "DGCA", "BLR", "Available"),
            pilot("P2", "mapping, survey", "dgca", "BLR", "Available"),
            pilot("P3", "Mapping, Survey", "", "BLR", "Available"),
        ];
        let found = match_pilots(&pilots, &prj1(), &[], &[]);
        assert_eq!(pilot_ids(&found), vec!["P2"]);
    }

    #[test]
    fn never_returns_pilots_from_another_location() {
        let pilots = vec![
            pilot("P1", "Mapping, Survey", "DGCA", "Mumbai", "Available"),
            pilot("P2", "Mapping, Survey", "DGCA", " blr", "Available"),
            pilot("P3", "Mapping, Survey", "DGCA", "Delhi", "Assigned"),
        ];
        let m = prj1();
        let found = match_pilots(&pilots, &m, &[], &[]);
        for p in &found {
            assert!(crate::domain::same_location(&p.location, &m.location));
        }
        assert_eq!(found.len(), 1);
    }

    #[test]
    fn missing_mission_location_skips_location_filter() {
        let pilots = vec![
            pilot("P1", "Mapping", "", "Mumbai", "Available"),
            pilot("P2", "Mapping", "", "Delhi", "Available"),
        ];
        let m = mission("PRJ1", "", "Mapping", "", (6, 8));
        assert_eq!(match_pilots(&pilots, &m, &[], &[]).len(), 2);
    }

    #[test]
    fn assigned_pilots_are_a_secondary_pool() {
        let mut pilots = vec![
            pilot("P1", "Mapping, Survey", "DGCA", "BLR", "Assigned"),
            pilot("P2", "Mapping, Survey", "DGCA", "BLR", "On Leave"),
        ];
        let found = match_pilots(&pilots, &prj1(), &[], &[]);
        assert_eq!(pilot_ids(&found), vec!["P1"]);

        pilots.push(pilot("P3", "Mapping, Survey", "DGCA", "BLR", "Available"));
        let found = match_pilots(&pilots, &prj1(), &[], &[]);
        assert_eq!(pilot_ids(&found), vec!["P3"]);
    }

    #[test]
    fn overlapping_bookings_and_exclusions_drop_pilots() {
        let pilots = vec![
            pilot("P1", "Mapping, Survey", "DGCA", "BLR", "Available"),
            pilot("P2", "Mapping, Survey", "DGCA", "BLR", "Available"),
            pilot("P3", "Mapping, Survey", "DGCA", "BLR", "Available"),
        ];
        let bookings = vec![
            pilot_booking("PRJ7", "P1", (8, 9)),
            pilot_booking("PRJ1", "P2", (6, 8)),
            pilot_booking("PRJ8", "P3", (10, 12)),
        ];
        let found = match_pilots(&pilots, &prj1(), &bookings, &[]);
        assert_eq!(pilot_ids(&found), vec!["P2", "P3"]);

        let found = match_pilots(&pilots, &prj1(), &bookings, &["P3"]);
        assert_eq!(pilot_ids(&found), vec!["P2"]);
    }

    #[test]
    fn busy_ignores_bookings_on_the_same_mission() {
        let bookings = vec![
            pilot_booking("PRJ1", "P1", (6, 8)),
            pilot_booking("PRJ9", "P2", (8, 8)),
        ];
        assert!(!pilot_busy("P1", &prj1(), &bookings));
        assert!(pilot_busy(" P2 ", &prj1(), &bookings));
        assert!(!pilot_busy("P3", &prj1(), &bookings));
    }

    #[test]
    fn drones_match_any_capability() {
        let drones = vec![
            drone("D1", "RGB", "BLR", "Available"),
            drone("D2", "Thermal, Survey", "BLR", "Available"),
            drone("D3", "LiDAR, mapping", "BLR", "Available"),
        ];
        let found = match_drones(&drones, &prj1(), &[], &[]);
        assert_eq!(drone_ids(&found), vec!["D2", "D3"]);
    }

    #[test]
    fn drones_fall_back_to_location_pool_without_capability() {
        let drones = vec![
            drone("D1", "RGB", "BLR", "Available"),
            drone("D2", "Thermal", "Mumbai", "Available"),
            drone("D3", "Thermal", "BLR", "Maintenance"),
        ];
        let found = match_drones(&drones, &prj1(), &[], &[]);
        assert_eq!(drone_ids(&found), vec!["D1"]);
    }

    #[test]
    fn drones_fall_back_to_maintenance_when_nothing_available() {
        let drones = vec![
            drone("D1", "RGB", "BLR", "Maintenance"),
            drone("D2", "RGB", "BLR", "Assigned"),
            drone("D3", "RGB", "Mumbai", "Available"),
        ];
        let found = match_drones(&drones, &prj1(), &[], &[]);
        assert_eq!(drone_ids(&found), vec!["D1", "D2"]);
    }

    #[test]
    fn booked_drones_are_dropped() {
        let drones = vec![
            drone("D1", "Mapping", "BLR", "Available"),
            drone("D2", "Mapping", "BLR", "Available"),
        ];
        let bookings = vec![drone_booking("PRJ5", "D1", (1, 6))];
        let found = match_drones(&drones, &prj1(), &bookings, &[]);
        assert_eq!(drone_ids(&found), vec!["D2"]);
        let rest = match_drones(&drones, &prj1(), &bookings, &["D2"]);
        assert!(rest.is_empty());
    }
}
