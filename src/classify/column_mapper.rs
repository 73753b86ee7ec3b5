//! C5 — Column Mapper (§4.3).
//!
//! Scores every (column, role) pair, resolves canonical/fuzzy aliases first,
//! then enforces the uniqueness invariant over required roles.

use crate::config::Config;
use crate::model::{ColumnMapping, ColumnRole, HeaderInfo};
use crate::similarity::lcs_ratio;
use crate::text::normalize_header;

const SCORABLE_ROLES: [ColumnRole; 6] = [
    ColumnRole::Description,
    ColumnRole::Quantity,
    ColumnRole::UnitPrice,
    ColumnRole::TotalPrice,
    ColumnRole::Unit,
    ColumnRole::Code,
];

fn positional_bonus(role: ColumnRole, position: f64, cap: f64) -> f64 {
    // position is column_index / (width - 1), 0.0 = leftmost, 1.0 = rightmost.
    let affinity = match role {
        ColumnRole::Description | ColumnRole::Code => 1.0 - position,
        ColumnRole::TotalPrice => position,
        ColumnRole::Quantity | ColumnRole::UnitPrice => 1.0 - (position - 0.5).abs() * 2.0,
        ColumnRole::Unit => 1.0 - (position - 0.5).abs() * 2.0,
        _ => 0.0,
    };
    (affinity.max(0.0)) * cap
}

fn context_bonus(
    role: ColumnRole,
    column_index: usize,
    normalized_headers: &[String],
    desc_keywords: &[String],
    price_keywords: &[String],
    cap: f64,
) -> f64 {
    match role {
        ColumnRole::Quantity => {
            if column_index > 0
                && desc_keywords
                    .iter()
                    .any(|k| normalized_headers[column_index - 1].contains(k.as_str()))
            {
                cap
            } else {
                0.0
            }
        }
        ColumnRole::TotalPrice => {
            if column_index > 0
                && price_keywords
                    .iter()
                    .any(|k| normalized_headers[column_index - 1].contains(k.as_str()))
            {
                cap
            } else {
                0.0
            }
        }
        _ => 0.0,
    }
}

fn score_role(
    role: ColumnRole,
    normalized: &str,
    column_index: usize,
    width: usize,
    normalized_headers: &[String],
    config: &Config,
) -> f64 {
    let keywords = config.vocabulary.role_keywords(role);
    let keyword_hit = keywords.iter().any(|k| normalized.contains(k.as_str()));
    let base = if keyword_hit {
        (config.column_mapper.keyword_base_multiplier * config.vocabulary.role_weight(role))
            .min(config.column_mapper.keyword_base_cap)
    } else {
        0.0
    };

    let position = if width > 1 {
        column_index as f64 / (width - 1) as f64
    } else {
        0.0
    };
    let positional = positional_bonus(role, position, config.column_mapper.positional_bonus_cap);

    let desc_keywords = config.vocabulary.role_keywords(ColumnRole::Description);
    let price_keywords = config.vocabulary.role_keywords(ColumnRole::UnitPrice);
    let context = context_bonus(
        role,
        column_index,
        normalized_headers,
        desc_keywords,
        price_keywords,
        config.column_mapper.context_bonus_cap,
    );

    (base + positional + context).min(1.0)
}

fn alias_match(normalized: &str, config: &Config) -> Option<ColumnRole> {
    if let Some(role) = config.vocabulary.canonical_aliases.get(normalized) {
        return Some(*role);
    }
    config
        .vocabulary
        .canonical_aliases
        .iter()
        .find(|(alias, _)| lcs_ratio(normalized, &alias.to_lowercase()) >= config.column_mapper.fuzzy_alias_similarity)
        .map(|(_, role)| *role)
}

/// Pass 1: score every column independently.
pub fn map_columns(header: &HeaderInfo, config: &Config) -> Vec<ColumnMapping> {
    let width = header.headers.len();
    let normalized_headers: Vec<String> = header
        .headers
        .iter()
        .map(|h| normalize_header(h, &config.vocabulary.abbreviations))
        .collect();

    let mut mappings: Vec<ColumnMapping> = header
        .headers
        .iter()
        .enumerate()
        .map(|(i, original)| {
            let normalized = &normalized_headers[i];
            let mut mapping = ColumnMapping::new(i, original.clone(), normalized.clone());

            if let Some(role) = alias_match(normalized, config) {
                mapping.role = role;
                mapping.confidence = 1.0;
                mapping.is_required = role.is_required();
                mapping
                    .reasoning
                    .push("matched canonical alias table".to_string());
                return mapping;
            }

            let mut scored: Vec<(ColumnRole, f64)> = SCORABLE_ROLES
                .iter()
                .map(|&role| (role, score_role(role, normalized, i, width, &normalized_headers, config)))
                .collect();
            scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap());

            let (best_role, best_score) = scored.first().copied().unwrap_or((ColumnRole::Ignore, 0.0));
            if best_score <= 0.0 {
                mapping.role = ColumnRole::Remarks;
                mapping.confidence = 0.0;
                mapping.reasoning.push("no role scored above zero; defaulted to remarks".to_string());
            } else {
                mapping.role = best_role;
                mapping.confidence = best_score;
                mapping.reasoning.push(format!("highest-scoring role {} at {:.2}", best_role.as_str(), best_score));
            }
            mapping.is_required = mapping.role.is_required();
            mapping.alternatives = scored;
            mapping
        })
        .collect();

    enforce_uniqueness(&mut mappings, config);
    mappings
}

/// Pass 2: for each required role, keep only the highest-confidence column;
/// demote the rest to their best alternative (or `remarks`).
fn enforce_uniqueness(mappings: &mut [ColumnMapping], config: &Config) {
    for role in ColumnRole::REQUIRED {
        let mut holders: Vec<usize> = mappings
            .iter()
            .enumerate()
            .filter(|(_, m)| m.role == role)
            .map(|(i, _)| i)
            .collect();
        if holders.len() <= 1 {
            continue;
        }
        holders.sort_by(|&a, &b| {
            mappings[b]
                .confidence
                .partial_cmp(&mappings[a].confidence)
                .unwrap()
        });
        for &loser_idx in &holders[1..] {
            let floor = config.column_mapper.demotion_alternative_floor;
            let reason = format!(
                "demoted: column {} also scored for {} but column {} scored higher",
                loser_idx,
                role.as_str(),
                holders[0]
            );
            let mapping = &mut mappings[loser_idx];
            let fallback = mapping
                .alternatives
                .iter()
                .find(|(alt_role, score)| *alt_role != role && *score >= floor)
                .copied();
            let (new_role, new_score) = fallback.unwrap_or((ColumnRole::Remarks, 0.0));
            mapping.role = new_role;
            mapping.confidence = new_score;
            mapping.is_required = new_role.is_required();
            mapping.reasoning.push(reason);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::HeaderMethod;

    fn header(cols: &[&str]) -> HeaderInfo {
        HeaderInfo {
            row_index: 0,
            confidence: 0.9,
            method: HeaderMethod::Keyword,
            reasoning: vec![],
            headers: cols.iter().map(|s| s.to_string()).collect(),
            is_merged: false,
        }
    }

    #[test]
    fn clean_header_maps_to_expected_roles() {
        let config = Config::default();
        let h = header(&["Item Code", "Description", "Unit", "Quantity", "Unit Price", "Total Amount"]);
        let mappings = map_columns(&h, &config);
        assert_eq!(mappings[0].role, ColumnRole::Code);
        assert_eq!(mappings[1].role, ColumnRole::Description);
        assert_eq!(mappings[2].role, ColumnRole::Unit);
        assert_eq!(mappings[3].role, ColumnRole::Quantity);
        assert_eq!(mappings[4].role, ColumnRole::UnitPrice);
        assert_eq!(mappings[5].role, ColumnRole::TotalPrice);
    }

    #[test]
    fn uniqueness_pass_demotes_the_lower_scoring_duplicate() {
        let config = Config::default();
        let h = header(&["Description", "Details", "Qty", "Rate", "Amount", "Total"]);
        let mappings = map_columns(&h, &config);

        let total_price_holders: Vec<_> = mappings.iter().filter(|m| m.role == ColumnRole::TotalPrice).collect();
        assert_eq!(total_price_holders.len(), 1, "uniqueness invariant must hold for total_price");
    }

    #[test]
    fn no_required_role_is_assigned_to_more_than_one_column() {
        let config = Config::default();
        let h = header(&["Code", "Description", "Unit", "Qty", "Rate", "Amount", "Total", "Remarks"]);
        let mappings = map_columns(&h, &config);
        for role in ColumnRole::REQUIRED {
            let count = mappings.iter().filter(|m| m.role == role).count();
            assert!(count <= 1, "role {:?} assigned to {} columns", role, count);
        }
    }
}
