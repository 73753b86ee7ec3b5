use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HeaderMethod {
    Keyword,
    DataPattern,
    Positional,
    Merged,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeaderInfo {
    pub row_index: usize,
    pub confidence: f64,
    pub method: HeaderMethod,
    pub reasoning: Vec<String>,
    pub headers: Vec<String>,
    pub is_merged: bool,
}

impl HeaderInfo {
    /// Synthetic fallback used when no candidate row clears any detector's
    /// threshold: the first non-empty row, confidence pinned at 0.1.
    pub fn synthetic(row_index: usize, headers: Vec<String>) -> Self {
        Self {
            row_index,
            confidence: 0.1,
            method: HeaderMethod::Positional,
            reasoning: vec!["no detector reached its acceptance threshold; falling back to first non-empty row".to_string()],
            headers,
            is_merged: false,
        }
    }
}
