//! Matching and reassignment engine.
//!
//! Every function here is pure over the snapshots it is handed: nothing is
//! cached between calls and nothing is mutated. Callers fetch fresh roster,
//! fleet, mission and assignment collections before each call.

pub mod assignments;
pub mod dates;
pub mod matching;
pub mod query;
pub mod suggest;

#[cfg(test)]
pub(crate) mod fixtures;

pub use assignments::{build_assignments, resolve_assignments};
pub use dates::{dates_overlap, parse_date};
pub use matching::{match_drones, match_pilots, qualified_pilots};
pub use query::{maintenance_flagged, query_drones, query_pilots, DroneFilter, PilotFilter};
pub use suggest::{
    by_availability, by_release_date, rank_for_urgent, release_date, suggest_assignment,
    urgent_reassign, Outcome, Suggestion,
};
