//! Roster and fleet queries.
//!
//! Filters compose with AND semantics; an unset field does not filter. Text
//! comparisons are case-insensitive and trimmed.

use chrono::NaiveDate;

use super::dates::parse_date;
use crate::domain::{same_location, Drone, DroneStatus, Pilot, PilotStatus, TagSet};

#[derive(Debug, Clone, Default)]
pub struct PilotFilter<'q> {
    pub skill: Option<&'q str>,
    pub certification: Option<&'q str>,
    pub location: Option<&'q str>,
    pub status: Option<PilotStatus>,
}

impl PilotFilter<'_> {
    fn accepts(&self, p: &Pilot) -> bool {
        has_tag(&p.skills, self.skill)
            && has_tag(&p.certifications, self.certification)
            && is_at(&p.location, self.location)
            && self.status.map_or(true, |s| p.status == s)
    }
}

fn has_tag(held: &TagSet, wanted: Option<&str>) -> bool {
    wanted.map_or(true, |t| held.contains(t))
}

fn is_at(location: &str, wanted: Option<&str>) -> bool {
    wanted.map_or(true, |l| same_location(location, l))
}

pub fn query_pilots<'a>(pilots: &'a [Pilot], filter: &PilotFilter<'_>) -> Vec<&'a Pilot> {
    pilots.iter().filter(|p| filter.accepts(p)).collect()
}

#[derive(Debug, Clone, Default)]
pub struct DroneFilter<'q> {
    pub capability: Option<&'q str>,
    pub status: Option<DroneStatus>,
    pub location: Option<&'q str>,
    pub exclude_maintenance: bool,
    /// Keep only drones whose maintenance falls due on or before this date.
    pub maintenance_due_before: Option<NaiveDate>,
}

impl DroneFilter<'_> {
    fn accepts(&self, d: &Drone) -> bool {
        let due_by = self.maintenance_due_before;
        has_tag(&d.capabilities, self.capability)
            && self.status.map_or(true, |s| d.status == s)
            && is_at(&d.location, self.location)
            && !(self.exclude_maintenance && d.in_maintenance())
            && due_by.map_or(true, |by| maintenance_flagged(d, by))
    }
}

pub fn query_drones<'a>(drones: &'a [Drone], filter: &DroneFilter<'_>) -> Vec<&'a Drone> {
    drones.iter().filter(|d| filter.accepts(d)).collect()
}

/// True when the drone's maintenance date parses and is on or before
/// `reference`. Missing or malformed due dates are never flagged.
pub fn maintenance_flagged(drone: &Drone, reference: NaiveDate) -> bool {
    parse_date(&drone.maintenance_due).map_or(false, |due| due <= reference)
}
