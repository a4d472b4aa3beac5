//! Thin keyword front-end over the engine.
//!
//! Each message loads a fresh [`Snapshot`] from the store, is routed by
//! [`intent::classify`], and produces a [`Reply`] with markdown text and
//! optional structured data for a UI.

use chrono::{Duration, Local, NaiveDate};
use serde_json::{json, Value};
use std::collections::BTreeSet;
use tracing::{info, warn};

use crate::config::Config;
use crate::conflicts::detect_all_conflicts;
use crate::domain::{find_mission, DroneStatus, PilotStatus, UNASSIGNED};
use crate::engine::{
    maintenance_flagged, query_drones, query_pilots, suggest_assignment, urgent_reassign,
    DroneFilter, PilotFilter, Suggestion,
};
use crate::error::Result;
use crate::store::{RosterStore, Snapshot};

pub mod intent;

use intent::{classify, drone_id, pilot_id, project_id, words, Intent};

const GREETING: &str = "Hi! I'm the Drone Operations Coordinator. I can help you with:
- **Roster**: Query pilots by skill, certification, location, or status
- **Assignments**: Match pilots and drones to projects, suggest assignments
- **Fleet**: Query drones by capability, availability, location, maintenance
- **Conflicts**: Detect double-booking, skill mismatch, maintenance/location issues
- **Urgent reassignments**: Priority-based reassignment with conflict explanation
- **Updates**: Set pilot or drone status (saved to the data store)

Try: *Who is available in Bangalore?* or *Check conflicts* or *Suggest assignment for PRJ002*";

const HELP: &str = "**Commands you can try:**
- *List available pilots in Mumbai*
- *Pilots with DGCA certification*
- *Drones available in Bangalore*
- *Suggest assignment for PRJ001*
- *Urgent reassignment for PRJ002*
- *Check conflicts*
- *Set pilot P001 status to On Leave*
- *Set drone D002 status to Available*
- *Confirm reassignment PRJ002 to P002 and D003*";

const LOAD_FAILED: &str =
    "**Could not load data.** Please check the data directory and CSV files.";

const FALLBACK: &str = "I didn't quite get that. You can ask me about **pilots**, **drones**, \
**assignments**, **conflicts**, or **urgent reassignments**. Type *help* for examples.";

#[derive(Debug, Clone, PartialEq)]
pub struct Reply {
    pub text: String,
    pub data: Option<Value>,
}

impl Reply {
    fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            data: None,
        }
    }

    fn with_data(text: impl Into<String>, data: Value) -> Self {
        Self {
            text: text.into(),
            data: Some(data),
        }
    }
}

pub struct Coordinator<S: RosterStore> {
    store: S,
    config: Config,
    reference_date: Option<NaiveDate>,
}

impl<S: RosterStore> Coordinator<S> {
    pub fn new(store: S, config: Config) -> Self {
        Self {
            store,
            config,
            reference_date: None,
        }
    }

    /// Pin "today" for maintenance flags instead of reading the clock.
    pub fn with_reference_date(mut self, date: NaiveDate) -> Self {
        self.reference_date = Some(date);
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn snapshot(&self) -> Result<Snapshot> {
        Snapshot::load(&self.store, self.config.use_ledger)
    }

    /// Answer one message. Storage read failures become an explanatory reply;
    /// only serialization of structured data can fail.
    pub fn respond(&mut self, message: &str) -> Result<Reply> {
        let intent = classify(message);
        info!(?intent, "Message routed");

        match intent {
            Intent::Greeting => return Ok(Reply::text(GREETING)),
            Intent::Help => return Ok(Reply::text(HELP)),
            Intent::Unknown => return Ok(Reply::text(FALLBACK)),
            Intent::StatusUpdate => return Ok(self.status_update(message)),
            Intent::ConfirmReassign => return Ok(self.confirm_reassign(message)),
            _ => {}
        }

        let snapshot = match self.snapshot() {
            Ok(s) => s,
            Err(e) => {
                warn!(error = %e, "Could not load data");
                return Ok(Reply::text(format!("{}\n\nError: {}", LOAD_FAILED, e)));
            }
        };

        match intent {
            Intent::Conflicts => self.conflicts(&snapshot),
            Intent::UrgentReassign => self.urgent(&snapshot, message),
            Intent::Assignment => self.assignment(&snapshot, message),
            Intent::Roster => self.roster(&snapshot, message),
            Intent::Fleet => self.fleet(&snapshot, message),
            Intent::Missions => self.missions(&snapshot),
            _ => Ok(Reply::text(FALLBACK)),
        }
    }

    fn conflicts(&self, snap: &Snapshot) -> Result<Reply> {
        let conflicts = detect_all_conflicts(
            &snap.pilots,
            &snap.drones,
            &snap.missions,
            snap.ledger.as_deref(),
        );
        if conflicts.is_empty() {
            return Ok(Reply::text(
                "No conflicts detected. Roster, assignments, and fleet are consistent.",
            ));
        }
        let mut lines = vec!["**Conflicts detected:**\n".to_string()];
        lines.extend(conflicts.iter().map(|c| format!("- {}", c)));
        Ok(Reply::with_data(
            lines.join("\n"),
            json!({ "conflicts": serde_json::to_value(&conflicts)? }),
        ))
    }

    fn urgent(&self, snap: &Snapshot, message: &str) -> Result<Reply> {
        let Some(project) = project_id(message) else {
            return Ok(Reply::text(
                "Please specify a project ID for urgent reassignment \
                 (e.g. *Urgent reassignment for PRJ002*).",
            ));
        };
        let assignments = snap.assignments();
        let s = urgent_reassign(
            &snap.pilots,
            &snap.drones,
            &snap.missions,
            &assignments,
            &project,
        );
        let Some(pilot) = s.pilot else {
            let reason = s.notes.first().map_or("", String::as_str);
            let text = format!(
                "Could not find a suitable pilot for urgent reassignment. {}",
                reason
            );
            return Ok(Reply::text(text.trim_end()));
        };

        let mut lines = vec![format!("**Urgent reassignment for {}:**", s.project_id)];
        lines.extend(selection_lines(&s));
        lines.extend(s.notes.iter().map(|n| format!("- _Note:_ {}", n)));
        let also = match s.drone {
            Some(d) => format!(" and {}", d.drone_id),
            None => String::new(),
        };
        lines.push(format!(
            "\nSay *Confirm reassignment {} to {}{}* to apply.",
            s.project_id, pilot.pilot_id, also
        ));
        Ok(Reply::with_data(
            lines.join("\n"),
            json!({ "urgent": serde_json::to_value(&s)? }),
        ))
    }

    fn assignment(&self, snap: &Snapshot, message: &str) -> Result<Reply> {
        let Some(project) = project_id(message) else {
            return Ok(Reply::text(
                "Which project? Please include a project ID (e.g. PRJ001, PRJ002).",
            ));
        };
        let mission = find_mission(&snap.missions, &project);
        let is_urgent = words(message).contains("urgent")
            || mission.map_or(false, |m| m.priority.is_urgent());
        let assignments = snap.assignments();
        let s = suggest_assignment(
            &snap.pilots,
            &snap.drones,
            &snap.missions,
            &assignments,
            &project,
            is_urgent,
        );
        if s.pilot.is_none() {
            let reason = s.notes.first().map_or("No suggestion.", String::as_str);
            return Ok(Reply::text(reason));
        }
        let mut lines = vec![format!("**Suggested assignment for {}:**", s.project_id)];
        lines.extend(selection_lines(&s));
        lines.extend(s.notes.iter().map(|n| format!("- {}", n)));
        Ok(Reply::with_data(
            lines.join("\n"),
            json!({ "suggestion": serde_json::to_value(&s)? }),
        ))
    }

    fn roster(&self, snap: &Snapshot, message: &str) -> Result<Reply> {
        let w = words(message);
        let status = if w.contains("leave") {
            Some(PilotStatus::OnLeave)
        } else if w.contains("unavailable") {
            Some(PilotStatus::Unavailable)
        } else if w.contains("assigned") {
            Some(PilotStatus::Assigned)
        } else if w.contains("available") {
            Some(PilotStatus::Available)
        } else {
            None
        };
        let locations = snap
            .pilots
            .iter()
            .map(|p| p.location.as_str())
            .chain(snap.missions.iter().map(|m| m.location.as_str()));
        let location = mentioned(message, locations);
        let certs = snap.pilots.iter().flat_map(|p| p.certifications.iter());
        let certification = mentioned(message, certs);
        let skills = snap.pilots.iter().flat_map(|p| p.skills.iter());
        let skill = mentioned(message, skills);

        let filter = PilotFilter {
            skill: skill.as_deref(),
            certification: certification.as_deref(),
            location: location.as_deref(),
            status,
        };
        let result = query_pilots(&snap.pilots, &filter);
        if result.is_empty() {
            return Ok(Reply::text("No pilots match your criteria."));
        }
        let mut lines = vec!["**Pilots:**\n".to_string()];
        lines.extend(result.iter().map(|p| format!("- {}", p)));
        Ok(Reply::with_data(
            lines.join("\n"),
            json!({ "pilots": serde_json::to_value(&result)? }),
        ))
    }

    fn fleet(&self, snap: &Snapshot, message: &str) -> Result<Reply> {
        let w = words(message);
        let status = if w.contains("maintenance") {
            Some(DroneStatus::Maintenance)
        } else if w.contains("available") {
            Some(DroneStatus::Available)
        } else {
            None
        };
        let locations = snap
            .drones
            .iter()
            .map(|d| d.location.as_str())
            .chain(snap.missions.iter().map(|m| m.location.as_str()));
        let location = mentioned(message, locations);
        let capabilities = snap.drones.iter().flat_map(|d| d.capabilities.iter());
        let capability = mentioned(message, capabilities);

        let filter = DroneFilter {
            capability: capability.as_deref(),
            status,
            location: location.as_deref(),
            ..DroneFilter::default()
        };
        let result = query_drones(&snap.drones, &filter);
        if result.is_empty() {
            return Ok(Reply::text("No drones match your criteria."));
        }
        let horizon = self.today() + Duration::days(self.config.maintenance_horizon_days);
        let mut lines = vec!["**Drone fleet:**\n".to_string()];
        for d in &result {
            let mut flags = String::new();
            if d.in_maintenance() {
                flags.push_str(" ⚠ Maintenance");
            }
            if maintenance_flagged(d, horizon) {
                flags.push_str(&format!(" (maintenance due {})", d.maintenance_due.trim()));
            }
            lines.push(format!("- {}{}", d, flags));
        }
        Ok(Reply::with_data(
            lines.join("\n"),
            json!({ "drones": serde_json::to_value(&result)? }),
        ))
    }

    fn missions(&self, snap: &Snapshot) -> Result<Reply> {
        if snap.missions.is_empty() {
            return Ok(Reply::text("No missions loaded."));
        }
        let mut lines = vec!["**Missions:**\n".to_string()];
        lines.extend(snap.missions.iter().map(|m| format!("- {}", m)));
        lines.push(format!("\n{}", snap.stats()));
        Ok(Reply::with_data(
            lines.join("\n"),
            json!({ "missions": serde_json::to_value(&snap.missions)? }),
        ))
    }

    fn status_update(&mut self, message: &str) -> Reply {
        let lower = message.to_lowercase();
        let w = words(message);
        let requested = if lower.contains("on leave") || w.contains("leave") {
            Some("On Leave")
        } else if w.contains("unavailable") {
            Some("Unavailable")
        } else if w.contains("maintenance") {
            Some("Maintenance")
        } else if w.contains("assigned") {
            Some("Assigned")
        } else if w.contains("available") {
            Some("Available")
        } else {
            None
        };

        let outcome = match (pilot_id(message), drone_id(message), requested) {
            (Some(id), _, Some(status)) => status
                .parse::<PilotStatus>()
                .and_then(|s| self.store.set_pilot_status(&id, s)),
            (None, Some(id), Some(status)) => status
                .parse::<DroneStatus>()
                .and_then(|s| self.store.set_drone_status(&id, s)),
            _ => {
                return Reply::text(
                    "Please specify pilot (e.g. P001) or drone (e.g. D002) and the new \
                     status, e.g. *Set pilot P001 status to On Leave* or *Set drone D002 \
                     to Available*.",
                );
            }
        };
        match outcome {
            Ok(msg) => Reply::text(msg),
            Err(e) => {
                warn!(error = %e, "Status update rejected");
                Reply::text(format!("Error: {}", e))
            }
        }
    }

    fn confirm_reassign(&mut self, message: &str) -> Reply {
        let Some(project) = project_id(message) else {
            return Reply::text("Please specify project ID (e.g. PRJ002).");
        };
        let mut lines = Vec::new();
        if let Some(id) = pilot_id(message) {
            lines.push(match self.store.set_pilot_assignment(&id, Some(project.as_str())) {
                Ok(msg) => msg,
                Err(e) => format!("Pilot: Error: {}", e),
            });
        }
        if let Some(id) = drone_id(message) {
            lines.push(match self.store.set_drone_assignment(&id, Some(project.as_str())) {
                Ok(msg) => msg,
                Err(e) => format!("Drone: Error: {}", e),
            });
        }
        if lines.is_empty() {
            return Reply::text("Specify at least pilot (P001) or drone (D001) to assign.");
        }
        Reply::text(format!("**Reassignment applied:**\n{}", lines.join("\n")))
    }

    fn today(&self) -> NaiveDate {
        self.reference_date
            .unwrap_or_else(|| Local::now().date_naive())
    }
}

fn selection_lines(s: &Suggestion<'_>) -> Vec<String> {
    let mut lines = Vec::new();
    if let Some(p) = s.pilot {
        lines.push(format!(
            "- **Pilot:** {} ({}) – {} [{}]",
            p.name,
            p.pilot_id,
            p.location,
            p.current_assignment.as_deref().unwrap_or(UNASSIGNED)
        ));
    }
    if let Some(d) = s.drone {
        lines.push(format!(
            "- **Drone:** {} – {} – {} ({})",
            d.drone_id, d.model, d.location, d.status
        ));
    }
    lines
}

/// Longest known value appearing in the message, case-insensitive.
fn mentioned<'a>(message: &str, known: impl Iterator<Item = &'a str>) -> Option<String> {
    let haystack = message.to_lowercase();
    let candidates: BTreeSet<&str> = known.map(str::trim).filter(|k| !k.is_empty()).collect();
    candidates
        .into_iter()
        .filter(|k| haystack.contains(&k.to_lowercase()))
        .max_by_key(|k| k.len())
        .map(str::to_string)
}
