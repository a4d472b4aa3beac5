//! Record builders shared by the engine and detector tests.
//!
//! Statuses are given the way they appear in the CSV files and dates as days
//! of February 2026.

use crate::domain::*;

pub fn feb(day: u32) -> String {
    format!("2026-02-{:02}", day)
}

pub fn pilot(id: &str, skills: &str, certs: &str, location: &str, status: &str) -> Pilot {
    Pilot {
        pilot_id: id.into(),
        name: format!("Pilot {}", id),
        skills: TagSet::parse(skills),
        certifications: TagSet::parse(certs),
        location: location.into(),
        status: status.parse().unwrap(),
        current_assignment: None,
    }
}

pub fn drone(id: &str, caps: &str, location: &str, status: &str) -> Drone {
    Drone {
        drone_id: id.into(),
        model: "DJI M300".into(),
        capabilities: TagSet::parse(caps),
        status: status.parse().unwrap(),
        location: location.into(),
        current_assignment: None,
        maintenance_due: "2026-06-01".into(),
    }
}

pub fn mission(id: &str, location: &str, skills: &str, certs: &str, days: (u32, u32)) -> Mission {
    Mission {
        project_id: id.into(),
        client: "Client".into(),
        location: location.into(),
        required_skills: TagSet::parse(skills),
        required_certs: TagSet::parse(certs),
        start_date: feb(days.0),
        end_date: feb(days.1),
        priority: Priority::Normal,
    }
}

pub fn pilot_booking(project: &str, pilot_id: &str, days: (u32, u32)) -> Assignment {
    Assignment {
        project_id: project.into(),
        pilot_id: Some(pilot_id.into()),
        drone_id: None,
        start_date: feb(days.0),
        end_date: feb(days.1),
    }
}

pub fn drone_booking(project: &str, drone_id: &str, days: (u32, u32)) -> Assignment {
    Assignment {
        project_id: project.into(),
        pilot_id: None,
        drone_id: Some(drone_id.into()),
        start_date: feb(days.0),
        end_date: feb(days.1),
    }
}

/// Sets `current_assignment` on a built record.
pub trait OnProject {
    fn on(self, project: &str) -> Self;
}

impl OnProject for Pilot {
    fn on(mut self, project: &str) -> Self {
        self.current_assignment = Some(project.into());
        self
    }
}

impl OnProject for Drone {
    fn on(mut self, project: &str) -> Self {
        self.current_assignment = Some(project.into());
        self
    }
}

pub fn pilot_ids(pilots: &[&Pilot]) -> Vec<String> {
    pilots.iter().map(|p| p.pilot_id.clone()).collect()
}

pub fn drone_ids(drones: &[&Drone]) -> Vec<String> {
    drones.iter().map(|d| d.drone_id.clone()).collect()
}
