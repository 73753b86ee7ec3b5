use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One description → category mapping. `description_normalized` (lowercased,
/// whitespace-trimmed) is the dictionary's lookup key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryMapping {
    pub description_normalized: String,
    pub category: String,
    pub confidence: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub usage_count: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_description: Option<String>,
}

impl CategoryMapping {
    pub fn new(description_normalized: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            description_normalized: description_normalized.into(),
            category: category.into(),
            confidence: 1.0,
            created_at: None,
            usage_count: 0,
            notes: None,
            original_description: None,
        }
    }
}

/// Normalizes a description into the dictionary's lookup key: lowercase,
/// whitespace-trimmed, internal runs of whitespace collapsed to one space.
pub fn normalize_description(description: &str) -> String {
    description
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// The closed set of pretty-labeled categories line items may be assigned.
pub const PRETTY_CATEGORIES: &[&str] = &[
    "General Costs",
    "Site Costs",
    "Civil Works",
    "Earth Movement",
    "Roads",
    "OEM Building",
    "Electrical Works",
    "Solar Cables",
    "LV Cables",
    "MV Cables",
    "Trenching",
    "PV Mod. Installation",
    "Cleaning and Cabling of PV Mod.",
    "Tracker Inst.",
    "Other",
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_whitespace_and_case() {
        assert_eq!(
            normalize_description("  Concrete   Foundation \t"),
            "concrete foundation"
        );
    }
}
