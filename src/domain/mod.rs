use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::Error;

mod tags;

pub use tags::TagSet;

/// Marker written to `current_assignment` when a resource is free.
pub const UNASSIGNED: &str = "–";

/// `""`, `"–"` and `"-"` all mean "no current assignment".
pub fn is_unassigned(value: &str) -> bool {
    matches!(value.trim(), "" | "–" | "-")
}

/// Trim a raw booking cell, mapping sentinels to `None`.
pub fn normalize_booking(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !is_unassigned(v))
        .map(str::to_string)
}

/// Case-insensitive, trimmed location equality.
pub fn same_location(a: &str, b: &str) -> bool {
    a.trim().to_lowercase() == b.trim().to_lowercase()
}

mod booking {
    use super::{normalize_booking, UNASSIGNED};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Option<String>, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(value.as_deref().unwrap_or(UNASSIGNED))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
        let raw: Option<String> = Option::deserialize(d)?;
        Ok(normalize_booking(raw.as_deref()))
    }
}

fn status_key(raw: &str) -> String {
    raw.trim().to_lowercase().replace(['_', '-'], " ")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum PilotStatus {
    Available,
    OnLeave,
    Unavailable,
    Assigned,
}

impl PilotStatus {
    pub const ALL: [PilotStatus; 4] = [
        Self::Available,
        Self::OnLeave,
        Self::Unavailable,
        Self::Assigned,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Available => "Available",
            Self::OnLeave => "On Leave",
            Self::Unavailable => "Unavailable",
            Self::Assigned => "Assigned",
        }
    }
}

impl FromStr for PilotStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = status_key(s);
        Self::ALL
            .into_iter()
            .find(|st| st.as_str().to_lowercase() == key)
            .ok_or_else(|| Error::InvalidStatus {
                kind: "pilot",
                value: s.trim().to_string(),
                valid: Self::ALL.map(|st| st.as_str()).join(", "),
            })
    }
}

impl TryFrom<String> for PilotStatus {
    type Error = Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<PilotStatus> for String {
    fn from(status: PilotStatus) -> Self {
        status.as_str().to_string()
    }
}

impl fmt::Display for PilotStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum DroneStatus {
    Available,
    Maintenance,
    Assigned,
    Unavailable,
}

impl DroneStatus {
    pub const ALL: [DroneStatus; 4] = [
        Self::Available,
        Self::Maintenance,
        Self::Assigned,
        Self::Unavailable,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Available => "Available",
            Self::Maintenance => "Maintenance",
            Self::Assigned => "Assigned",
            Self::Unavailable => "Unavailable",
        }
    }
}

impl FromStr for DroneStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = status_key(s);
        Self::ALL
            .into_iter()
            .find(|st| st.as_str().to_lowercase() == key)
            .ok_or_else(|| Error::InvalidStatus {
                kind: "drone",
                value: s.trim().to_string(),
                valid: Self::ALL.map(|st| st.as_str()).join(", "),
            })
    }
}

impl TryFrom<String> for DroneStatus {
    type Error = Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<DroneStatus> for String {
    fn from(status: DroneStatus) -> Self {
        status.as_str().to_string()
    }
}

impl fmt::Display for DroneStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Mission priority. Values other than Normal/Urgent are kept verbatim.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Priority {
    #[default]
    Normal,
    Urgent,
    Other(String),
}

impl Priority {
    pub fn is_urgent(&self) -> bool {
        matches!(self, Self::Urgent)
    }
}

impl From<String> for Priority {
    fn from(raw: String) -> Self {
        match raw.trim().to_lowercase().as_str() {
            "" | "normal" => Self::Normal,
            "urgent" => Self::Urgent,
            _ => Self::Other(raw.trim().to_string()),
        }
    }
}

impl From<Priority> for String {
    fn from(p: Priority) -> Self {
        p.to_string()
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Normal => write!(f, "Normal"),
            Self::Urgent => write!(f, "Urgent"),
            Self::Other(s) => write!(f, "{}", s),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pilot {
    pub pilot_id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub skills: TagSet,
    #[serde(default)]
    pub certifications: TagSet,
    #[serde(default)]
    pub location: String,
    pub status: PilotStatus,
    #[serde(default, with = "booking")]
    pub current_assignment: Option<String>,
}

impl fmt::Display for Pilot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({}) | {} | {} | Skills: {} | Certs: {} | Assignment: {}",
            self.name,
            self.pilot_id,
            self.status,
            self.location,
            self.skills,
            self.certifications,
            self.current_assignment.as_deref().unwrap_or(UNASSIGNED)
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Drone {
    pub drone_id: String,
    #[serde(default)]
    pub model: String,
    #[serde(default)]
    pub capabilities: TagSet,
    pub status: DroneStatus,
    #[serde(default)]
    pub location: String,
    #[serde(default, with = "booking")]
    pub current_assignment: Option<String>,
    #[serde(default)]
    pub maintenance_due: String,
}

impl Drone {
    pub fn in_maintenance(&self) -> bool {
        self.status == DroneStatus::Maintenance
    }
}

impl fmt::Display for Drone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} | {} | {} | {} | Assignment: {}",
            self.drone_id,
            self.model,
            self.status,
            self.location,
            self.capabilities,
            self.current_assignment.as_deref().unwrap_or(UNASSIGNED)
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mission {
    pub project_id: String,
    #[serde(default)]
    pub client: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub required_skills: TagSet,
    #[serde(default)]
    pub required_certs: TagSet,
    #[serde(default)]
    pub start_date: String,
    #[serde(default)]
    pub end_date: String,
    #[serde(default)]
    pub priority: Priority,
}

impl Mission {
    /// Trimmed location, `None` when the mission does not name one.
    pub fn location(&self) -> Option<&str> {
        Some(self.location.trim()).filter(|l| !l.is_empty())
    }
}

impl fmt::Display for Mission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} | {} | {}–{} | Priority: {}",
            self.project_id,
            self.client,
            self.location,
            self.start_date,
            self.end_date,
            self.priority
        )
    }
}

/// One resource booked to one mission for a date range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assignment {
    pub project_id: String,
    #[serde(default)]
    pub pilot_id: Option<String>,
    #[serde(default)]
    pub drone_id: Option<String>,
    #[serde(default)]
    pub start_date: String,
    #[serde(default)]
    pub end_date: String,
}

impl Assignment {
    pub fn for_pilot(mission: &Mission, pilot_id: &str) -> Self {
        Self {
            project_id: mission.project_id.trim().to_string(),
            pilot_id: Some(pilot_id.trim().to_string()),
            drone_id: None,
            start_date: mission.start_date.clone(),
            end_date: mission.end_date.clone(),
        }
    }

    pub fn for_drone(mission: &Mission, drone_id: &str) -> Self {
        Self {
            project_id: mission.project_id.trim().to_string(),
            pilot_id: None,
            drone_id: Some(drone_id.trim().to_string()),
            start_date: mission.start_date.clone(),
            end_date: mission.end_date.clone(),
        }
    }

    pub fn project(&self) -> &str {
        self.project_id.trim()
    }

    /// Booked pilot id, ignoring blank cells.
    pub fn pilot(&self) -> Option<&str> {
        self.pilot_id
            .as_deref()
            .map(str::trim)
            .filter(|p| !p.is_empty())
    }

    /// Booked drone id, ignoring blank cells.
    pub fn drone(&self) -> Option<&str> {
        self.drone_id
            .as_deref()
            .map(str::trim)
            .filter(|d| !d.is_empty())
    }
}

impl fmt::Display for Assignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let who = match (self.pilot(), self.drone()) {
            (Some(p), Some(d)) => format!("{} + {}", p, d),
            (Some(p), None) => p.to_string(),
            (None, Some(d)) => d.to_string(),
            (None, None) => "(nobody)".to_string(),
        };
        write!(
            f,
            "{} <- {} ({} - {})",
            self.project_id, who, self.start_date, self.end_date
        )
    }
}

pub fn find_pilot<'a>(pilots: &'a [Pilot], pilot_id: &str) -> Option<&'a Pilot> {
    let id = pilot_id.trim();
    pilots.iter().find(|p| p.pilot_id.trim() == id)
}

pub fn find_drone<'a>(drones: &'a [Drone], drone_id: &str) -> Option<&'a Drone> {
    let id = drone_id.trim();
    drones.iter().find(|d| d.drone_id.trim() == id)
}

pub fn find_mission<'a>(missions: &'a [Mission], project_id: &str) -> Option<&'a Mission> {
    let id = project_id.trim();
    missions.iter().find(|m| m.project_id.trim() == id)
}
