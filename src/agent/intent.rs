use std::collections::HashSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    Greeting,
    Help,
    ConfirmReassign,
    UrgentReassign,
    Conflicts,
    Assignment,
    StatusUpdate,
    Roster,
    Fleet,
    Missions,
    Unknown,
}

const URGENT_WORDS: &[&str] = &["urgent", "emergency", "asap", "reassign", "reassignment"];
const CONFLICT_WORDS: &[&str] = &[
    "conflict", "conflicts", "double", "overlap", "mismatch", "issue", "issues", "problem",
    "problems", "warning", "warnings",
];
const ASSIGN_WORDS: &[&str] = &[
    "assign", "assignment", "match", "suggest", "who", "which", "pilot", "drone", "for",
];
const UPDATE_WORDS: &[&str] = &["set", "update", "change", "mark"];
const PILOT_NOUNS: &[&str] = &["pilot", "pilots", "roster"];
const ROSTER_WORDS: &[&str] = &[
    "pilot", "pilots", "roster", "availability", "available", "leave", "certification",
    "certifications", "certified", "skill", "skills",
];
const FLEET_WORDS: &[&str] = &[
    "drone", "drones", "fleet", "inventory", "maintenance", "deploy", "deployed",
];
const MISSION_WORDS: &[&str] = &["mission", "missions", "project", "projects"];

/// Lowercased word tokens (letters, digits, underscore).
pub fn words(message: &str) -> HashSet<String> {
    message
        .split(|c: char| !(c.is_alphanumeric() || c == '_'))
        .filter(|w| !w.is_empty())
        .map(str::to_lowercase)
        .collect()
}

fn any_of(words: &HashSet<String>, list: &[&str]) -> bool {
    list.iter().any(|w| words.contains(*w))
}

/// First word token shaped like `<prefix><digits>`, uppercased.
pub fn find_id(message: &str, prefix: &str) -> Option<String> {
    message
        .split(|c: char| !c.is_alphanumeric())
        .map(str::to_uppercase)
        .find(|token| token.strip_prefix(prefix).map_or(false, is_digits))
}

fn is_digits(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_digit())
}

pub fn project_id(message: &str) -> Option<String> {
    find_id(message, "PRJ")
}

pub fn pilot_id(message: &str) -> Option<String> {
    find_id(message, "P")
}

pub fn drone_id(message: &str) -> Option<String> {
    find_id(message, "D")
}

/// Keyword routing, first match wins.
///
/// Confirmation is checked before urgency because a confirmation repeats the
/// word "reassignment"; a status change naming a pilot or drone id is checked
/// before the roster and fleet listings that share its nouns.
pub fn classify(message: &str) -> Intent {
    let msg = message.trim().to_lowercase();
    let w = words(&msg);

    if msg.is_empty() || matches!(msg.as_str(), "hi" | "hello" | "hey") {
        return Intent::Greeting;
    }
    if w.contains("confirm") && any_of(&w, &["reassign", "reassignment", "assign", "assignment"]) {
        return Intent::ConfirmReassign;
    }
    if any_of(&w, URGENT_WORDS) {
        return Intent::UrgentReassign;
    }
    if any_of(&w, CONFLICT_WORDS) {
        return Intent::Conflicts;
    }
    if (project_id(&msg).is_some() || w.contains("project")) && any_of(&w, ASSIGN_WORDS) {
        return Intent::Assignment;
    }
    let names_resource = pilot_id(&msg).is_some() || drone_id(&msg).is_some();
    if any_of(&w, UPDATE_WORDS) && names_resource {
        return Intent::StatusUpdate;
    }
    if any_of(&w, FLEET_WORDS) && !any_of(&w, PILOT_NOUNS) {
        return Intent::Fleet;
    }
    if any_of(&w, ROSTER_WORDS) {
        return Intent::Roster;
    }
    if any_of(&w, FLEET_WORDS) {
        return Intent::Fleet;
    }
    if any_of(&w, UPDATE_WORDS) || w.contains("status") {
        return Intent::StatusUpdate;
    }
    if any_of(&w, &["help", "how"]) {
        return Intent::Help;
    }
    if any_of(&w, MISSION_WORDS) && (msg.len() < 50 || any_of(&w, &["list", "show", "all"])) {
        return Intent::Missions;
    }
    Intent::Unknown
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn routes_common_requests() {
        let cases = [
            ("hello", Intent::Greeting),
            ("", Intent::Greeting),
            ("help", Intent::Help),
            ("Who is available in Bangalore?", Intent::Roster),
            ("Pilots with DGCA certification", Intent::Roster),
            ("Drones available in Bangalore", Intent::Fleet),
            ("Which drones are in maintenance?", Intent::Fleet),
            ("Suggest assignment for PRJ001", Intent::Assignment),
            ("Urgent reassignment for PRJ002", Intent::UrgentReassign),
            ("Check conflicts", Intent::Conflicts),
            ("Set pilot P001 status to On Leave", Intent::StatusUpdate),
            ("Set drone D002 to Available", Intent::StatusUpdate),
            ("Confirm reassignment PRJ002 to P002 and D003", Intent::ConfirmReassign),
            ("List all projects", Intent::Missions),
            ("what is the weather", Intent::Unknown),
        ];
        for (msg, want) in cases {
            assert_eq!(classify(msg), want, "{}", msg);
        }
    }

    #[test]
    fn extracts_ids_by_prefix() {
        let msg = "Confirm reassignment prj002 to p002 and D003.";
        assert_eq!(project_id(msg).as_deref(), Some("PRJ002"));
        assert_eq!(pilot_id(msg).as_deref(), Some("P002"));
        assert_eq!(drone_id(msg).as_deref(), Some("D003"));
        assert_eq!(pilot_id("Suggest for PRJ001"), None);
        assert_eq!(drone_id("Drones in Delhi"), None);
    }

    #[test]
    fn tokenizes_words() {
        let w = words("Who's on-leave? PRJ_1");
        assert!(w.contains("who") && w.contains("leave"));
        assert!(w.contains("prj_1"));
    }
}
