use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationKind {
    Mathematical,
    DataType,
    BusinessRule,
    Consistency,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationIssue {
    pub row_index: usize,
    pub column_index: Option<usize>,
    pub kind: ValidationKind,
    pub severity: Severity,
    pub message: String,
    pub expected: Option<String>,
    pub actual: Option<String>,
    pub suggestion: Option<String>,
}

impl ValidationIssue {
    pub fn new(
        row_index: usize,
        kind: ValidationKind,
        severity: Severity,
        message: impl Into<String>,
    ) -> Self {
        Self {
            row_index,
            column_index: None,
            kind,
            severity,
            message: message.into(),
            expected: None,
            actual: None,
            suggestion: None,
        }
    }

    pub fn with_column(mut self, column_index: usize) -> Self {
        self.column_index = Some(column_index);
        self
    }

    pub fn with_expected_actual(mut self, expected: impl Into<String>, actual: impl Into<String>) -> Self {
        self.expected = Some(expected.into());
        self.actual = Some(actual.into());
        self
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }
}
