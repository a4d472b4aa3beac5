use chrono::NaiveDate;
use tracing::debug;

/// Accepted layouts, tried in order. Ambiguous values such as `03/04/2026`
/// resolve as day-first.
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d/%m/%Y", "%m/%d/%Y"];

/// Parse a flexible date string, looking at the first 10 characters only so
/// timestamps like `2026-02-06 09:00` still resolve to their date.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    let head: String = trimmed.chars().take(10).collect();
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(&head, fmt).ok())
}

/// Closed-interval overlap of `[s1, e1]` and `[s2, e2]`; touching endpoints
/// overlap.
///
/// Fails closed: if any bound does not parse the ranges are reported as
/// disjoint. Malformed rows are surfaced separately by the conflict
/// detector's date diagnostics.
pub fn dates_overlap(s1: &str, e1: &str, s2: &str, e2: &str) -> bool {
    match [s1, e1, s2, e2].map(parse_date) {
        [Some(a), Some(b), Some(c), Some(d)] => !(b < c || d < a),
        _ => {
            debug!(s1, e1, s2, e2, "Unparseable range, no overlap");
            false
        }
    }
}

/// True when both bounds of a range parse.
pub fn range_is_valid(start: &str, end: &str) -> bool {
    parse_date(start).is_some() && parse_date(end).is_some()
}
