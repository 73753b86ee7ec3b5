use serde::{Deserialize, Serialize};

/// Closed enum of semantic column roles. The first six are "required roles"
/// per the uniqueness invariant (at most one column per sheet per role).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnRole {
    Description,
    Quantity,
    UnitPrice,
    TotalPrice,
    Unit,
    Code,
    Remarks,
    Ignore,
}

impl ColumnRole {
    pub const REQUIRED: [ColumnRole; 6] = [
        ColumnRole::Description,
        ColumnRole::Quantity,
        ColumnRole::UnitPrice,
        ColumnRole::TotalPrice,
        ColumnRole::Unit,
        ColumnRole::Code,
    ];

    pub fn is_required(self) -> bool {
        Self::REQUIRED.contains(&self)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ColumnRole::Description => "description",
            ColumnRole::Quantity => "quantity",
            ColumnRole::UnitPrice => "unit_price",
            ColumnRole::TotalPrice => "total_price",
            ColumnRole::Unit => "unit",
            ColumnRole::Code => "code",
            ColumnRole::Remarks => "remarks",
            ColumnRole::Ignore => "ignore",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnMapping {
    pub column_index: usize,
    pub original_header: String,
    pub normalized_header: String,
    pub role: ColumnRole,
    pub confidence: f64,
    /// Ordered (role, score) alternatives, best first.
    pub alternatives: Vec<(ColumnRole, f64)>,
    pub reasoning: Vec<String>,
    pub is_required: bool,
    pub user_edited: bool,
}

impl ColumnMapping {
    pub fn new(column_index: usize, original_header: impl Into<String>, normalized_header: impl Into<String>) -> Self {
        Self {
            column_index,
            original_header: original_header.into(),
            normalized_header: normalized_header.into(),
            role: ColumnRole::Ignore,
            confidence: 0.0,
            alternatives: Vec::new(),
            reasoning: Vec::new(),
            is_required: false,
            user_edited: false,
        }
    }

    /// Demotes this column to its best alternative scoring at least 0.3, or
    /// to `remarks` with score 0 when no alternative clears the bar.
    pub fn demote(&mut self, reason: impl Into<String>) {
        let fallback = self
            .alternatives
            .iter()
            .find(|(role, score)| *role != self.role && *score >= 0.3)
            .copied();
        let (role, score) = fallback.unwrap_or((ColumnRole::Remarks, 0.0));
        self.role = role;
        self.confidence = score;
        self.is_required = role.is_required();
        self.reasoning.push(reason.into());
    }
}
