//! Header text normalization shared by the header locator and column mapper.

use std::collections::HashMap;

/// Lowercases, strips characters other than alphanumerics/whitespace/dash/dot,
/// collapses whitespace, then replaces any whole-token match against the
/// abbreviation table with its canonical form (§4.3).
pub fn normalize_header(raw: &str, abbreviations: &HashMap<String, String>) -> String {
    let lowered = raw.to_lowercase();
    let stripped: String = lowered
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c.is_whitespace() || c == '-' || c == '.' {
                c
            } else {
                ' '
            }
        })
        .collect();

    let collapsed = stripped.split_whitespace().collect::<Vec<_>>().join(" ");

    if let Some(canonical) = abbreviations.get(collapsed.as_str()) {
        return canonical.clone();
    }

    collapsed
        .split(' ')
        .map(|token| abbreviations.get(token).cloned().unwrap_or_else(|| token.to_string()))
        .collect::<Vec<_>>()
        .join(" ")
}
