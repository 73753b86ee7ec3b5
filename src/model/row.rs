use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RowType {
    Header,
    PrimaryLineItem,
    InvalidLineItem,
    Subtotal,
    Total,
    HeaderSectionBreak,
    NotesComments,
    Blank,
    Info,
}

impl RowType {
    /// Weight used by the aggregator's weighted-mean row confidence.
    pub fn importance(self) -> f64 {
        match self {
            RowType::PrimaryLineItem => 1.0,
            RowType::Subtotal | RowType::Total => 0.8,
            RowType::Header | RowType::HeaderSectionBreak => 0.6,
            RowType::InvalidLineItem | RowType::NotesComments | RowType::Blank | RowType::Info => {
                0.3
            }
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RowClassification {
    pub row_index: usize,
    pub row_type: RowType,
    pub confidence: f64,
    pub completeness: f64,
    pub hierarchical_level: Option<u32>,
    pub section_title: Option<String>,
    pub validation_errors: Vec<String>,
    pub reasoning: Vec<String>,
}
