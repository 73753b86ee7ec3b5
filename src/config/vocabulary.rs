//! Keyword sets and canonical aliases driving header/column/sheet scoring.
//!
//! These are data, not logic: every weight here is a [`Config`](super::Config)
//! field a deployment can override, never a hard-coded constant inside the
//! scoring functions themselves.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::model::ColumnRole;

/// Keyword → weight pairs scored against a normalized column header.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoleKeywords {
    pub role: ColumnRole,
    pub weight: f64,
    pub keywords: Vec<String>,
}

/// The full column-role vocabulary, plus sheet-classification and
/// row-classification keyword sets, plus abbreviation normalization rules.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Vocabulary {
    pub roles: Vec<RoleKeywords>,
    /// Abbreviation → canonical token, applied during header normalization
    /// (e.g. "qty" → "quantity").
    pub abbreviations: HashMap<String, String>,
    /// Canonical alias table: exact normalized header variant → role, score 1.0.
    pub canonical_aliases: HashMap<String, ColumnRole>,
    pub subtotal_tokens: Vec<String>,
    pub total_tokens: Vec<String>,
    pub section_tokens: Vec<String>,
    pub unit_tokens: Vec<String>,
    pub sheet_type_keywords: HashMap<String, Vec<String>>,
    pub financial_aggregator_tokens: Vec<String>,
    pub info_key_tokens: Vec<String>,
}

impl Vocabulary {
    pub fn role_weight(&self, role: ColumnRole) -> f64 {
        self.roles
            .iter()
            .find(|r| r.role == role)
            .map(|r| r.weight)
            .unwrap_or(1.0)
    }

    pub fn role_keywords(&self, role: ColumnRole) -> &[String] {
        self.roles
            .iter()
            .find(|r| r.role == role)
            .map(|r| r.keywords.as_slice())
            .unwrap_or(&[])
    }
}

impl Default for Vocabulary {
    fn default() -> Self {
        let roles = vec![
            RoleKeywords {
                role: ColumnRole::Description,
                weight: 1.0,
                keywords: vec![
                    "description", "item", "work", "particulars", "activity", "scope",
                ]
                .into_iter()
                .map(String::from)
                .collect(),
            },
            RoleKeywords {
                role: ColumnRole::Quantity,
                weight: 1.0,
                keywords: vec!["quantity", "qty", "qnty", "volume", "count"]
                    .into_iter()
                    .map(String::from)
                    .collect(),
            },
            RoleKeywords {
                role: ColumnRole::UnitPrice,
                weight: 1.0,
                keywords: vec!["unit price", "rate", "unitprice", "price per unit", "unit rate"]
                    .into_iter()
                    .map(String::from)
                    .collect(),
            },
            RoleKeywords {
                role: ColumnRole::TotalPrice,
                weight: 1.0,
                keywords: vec!["total", "amount", "total price", "total amount", "sum", "value"]
                    .into_iter()
                    .map(String::from)
                    .collect(),
            },
            RoleKeywords {
                role: ColumnRole::Unit,
                weight: 0.8,
                keywords: vec!["unit", "uom", "units", "measure"]
                    .into_iter()
                    .map(String::from)
                    .collect(),
            },
            RoleKeywords {
                role: ColumnRole::Code,
                weight: 0.8,
                keywords: vec!["code", "item code", "item no", "no", "ref", "reference"]
                    .into_iter()
                    .map(String::from)
                    .collect(),
            },
            RoleKeywords {
                role: ColumnRole::Remarks,
                weight: 0.4,
                keywords: vec!["remarks", "notes", "comment", "comments"]
                    .into_iter()
                    .map(String::from)
                    .collect(),
            },
        ];

        let abbreviations = [
            ("qty", "quantity"),
            ("qnty", "quantity"),
            ("uom", "unit"),
            ("amt", "amount"),
            ("desc", "description"),
            ("no", "number"),
            ("ref", "reference"),
            ("u/p", "unit price"),
            ("unit rate", "unit price"),
        ]
        .into_iter()
        .map(|(a, b)| (a.to_string(), b.to_string()))
        .collect();

        let canonical_aliases = [
            ("item code", ColumnRole::Code),
            ("item no", ColumnRole::Code),
            ("description", ColumnRole::Description),
            ("unit", ColumnRole::Unit),
            ("quantity", ColumnRole::Quantity),
            ("unit price", ColumnRole::UnitPrice),
            ("total amount", ColumnRole::TotalPrice),
            ("total price", ColumnRole::TotalPrice),
            ("amount", ColumnRole::TotalPrice),
        ]
        .into_iter()
        .map(|(a, b)| (a.to_string(), b))
        .collect();

        let sheet_type_keywords = [
            (
                "boq_main",
                vec!["boq", "bill of quantities", "schedule of rates", "works"],
            ),
            ("summary", vec!["summary", "recap", "grand total"]),
            (
                "preliminaries",
                vec!["preliminaries", "general requirements", "prelims"],
            ),
            ("reference", vec!["reference", "index", "notes", "legend"]),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.into_iter().map(String::from).collect()))
        .collect();

        Self {
            roles,
            abbreviations,
            canonical_aliases,
            subtotal_tokens: vec!["subtotal", "sub-total", "sub total", "carried forward", "c/f"]
                .into_iter()
                .map(String::from)
                .collect(),
            total_tokens: vec!["total", "grand total", "overall total"]
                .into_iter()
                .map(String::from)
                .collect(),
            section_tokens: vec!["section", "part", "division", "chapter"]
                .into_iter()
                .map(String::from)
                .collect(),
            unit_tokens: vec![
                "m2", "m²", "sq.m", "m3", "m³", "cu.m", "kg", "ton", "l", "gal", "pcs", "nos",
                "units", "m", "lm", "no",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
            sheet_type_keywords,
            financial_aggregator_tokens: vec!["subtotal", "total", "contingency", "tax", "vat"]
                .into_iter()
                .map(String::from)
                .collect(),
            info_key_tokens: vec!["project:", "date:", "client:", "location:", "contractor:"]
                .into_iter()
                .map(String::from)
                .collect(),
        }
    }
}
