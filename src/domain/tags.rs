use serde::{Deserialize, Serialize};
use std::fmt;

/// A comma-separated tag field (skills, certifications, capabilities) held as
/// a set. Membership is case-insensitive and whitespace-trimmed; insertion
/// order is kept for display and for iterating required tokens.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct TagSet {
    tags: Vec<String>,
}

fn normalize(token: &str) -> String {
    token.trim().to_lowercase()
}

impl TagSet {
    pub fn parse(raw: &str) -> Self {
        let mut tags: Vec<String> = Vec::new();
        for token in raw.split(',').map(str::trim).filter(|t| !t.is_empty()) {
            let key = normalize(token);
            if !tags.iter().any(|t| normalize(t) == key) {
                tags.push(token.to_string());
            }
        }
        Self { tags }
    }

    pub fn contains(&self, token: &str) -> bool {
        let key = normalize(token);
        !key.is_empty() && self.tags.iter().any(|t| normalize(t) == key)
    }

    /// True if at least one token of `other` is held.
    pub fn contains_any(&self, other: &TagSet) -> bool {
        other.iter().any(|t| self.contains(t))
    }

    /// Tokens of `required` not held by this set, in `required` order.
    pub fn missing<'a>(&self, required: &'a TagSet) -> Vec<&'a str> {
        required.iter().filter(|t| !self.contains(t)).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.tags.iter().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }
}

impl From<&str> for TagSet {
    fn from(raw: &str) -> Self {
        Self::parse(raw)
    }
}

impl From<String> for TagSet {
    fn from(raw: String) -> Self {
        Self::parse(&raw)
    }
}

impl From<TagSet> for String {
    fn from(set: TagSet) -> Self {
        set.to_string()
    }
}

impl fmt::Display for TagSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.tags.join(", "))
    }
}
