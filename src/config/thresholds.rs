use serde::{Deserialize, Serialize};

/// Weights and acceptance thresholds for §4.1's sheet classifier.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SheetClassifierThresholds {
    pub keyword_weight: f64,
    pub numeric_ratio_weight: f64,
    pub pattern_weight: f64,
    pub sheet_name_multiplier: f64,
    pub min_confidence: f64,
}

impl Default for SheetClassifierThresholds {
    fn default() -> Self {
        Self {
            keyword_weight: 0.3,
            numeric_ratio_weight: 0.4,
            pattern_weight: 0.3,
            sheet_name_multiplier: 2.0,
            min_confidence: 0.5,
        }
    }
}

/// Per-detector acceptance thresholds for §4.2's header locator.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct HeaderLocatorThresholds {
    pub search_rows: usize,
    pub max_search_rows: usize,
    pub keyword_accept: f64,
    pub data_pattern_accept: f64,
    pub positional_accept: f64,
    pub merged_accept: f64,
}

impl Default for HeaderLocatorThresholds {
    fn default() -> Self {
        Self {
            search_rows: 10,
            max_search_rows: 20,
            keyword_accept: 0.3,
            data_pattern_accept: 0.5,
            positional_accept: 0.4,
            merged_accept: 0.4,
        }
    }
}

/// §4.3 column-mapping scoring knobs.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ColumnMapperThresholds {
    pub keyword_base_multiplier: f64,
    pub keyword_base_cap: f64,
    pub positional_bonus_cap: f64,
    pub context_bonus_cap: f64,
    pub fuzzy_alias_similarity: f64,
    pub demotion_alternative_floor: f64,
    pub column_confidence_floor: f64,
}

impl Default for ColumnMapperThresholds {
    fn default() -> Self {
        Self {
            keyword_base_multiplier: 0.6,
            keyword_base_cap: 0.8,
            positional_bonus_cap: 0.15,
            context_bonus_cap: 0.05,
            fuzzy_alias_similarity: 0.85,
            demotion_alternative_floor: 0.3,
            column_confidence_floor: 0.5,
        }
    }
}

/// §4.5 validator tolerances and score penalties.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ValidatorThresholds {
    pub tolerance_pct: f64,
    pub tolerance_abs: f64,
    pub error_penalty: f64,
    pub warning_penalty: f64,
}

impl Default for ValidatorThresholds {
    fn default() -> Self {
        Self {
            tolerance_pct: 0.01,
            tolerance_abs: 0.005,
            error_penalty: 0.10,
            warning_penalty: 0.02,
        }
    }
}

/// §4.6 aggregation weights and review-flag thresholds.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct AggregatorThresholds {
    pub column_weight: f64,
    pub row_weight: f64,
    pub quality_weight: f64,
    pub low_confidence_threshold: f64,
    pub max_errors_for_flag: usize,
    pub ambiguous_alt_margin: f64,
    pub ambiguous_confidence_ceiling: f64,
    pub missing_data_completeness_floor: f64,
    pub success_min_overall: f64,
    pub partial_min_overall: f64,
    pub partial_max_errors: usize,
    pub failed_max_errors: usize,
    pub failed_max_overall: f64,
    pub export_ready_min_global: f64,
    pub global_overall_weight: f64,
    pub global_column_weight: f64,
    pub global_row_weight: f64,
    pub global_quality_weight: f64,
}

impl Default for AggregatorThresholds {
    fn default() -> Self {
        Self {
            column_weight: 0.4,
            row_weight: 0.3,
            quality_weight: 0.3,
            low_confidence_threshold: 0.6,
            max_errors_for_flag: 5,
            ambiguous_alt_margin: 0.1,
            ambiguous_confidence_ceiling: 0.7,
            missing_data_completeness_floor: 0.3,
            success_min_overall: 0.8,
            partial_min_overall: 0.6,
            partial_max_errors: 5,
            failed_max_errors: 10,
            failed_max_overall: 0.4,
            export_ready_min_global: 0.7,
            global_overall_weight: 0.4,
            global_column_weight: 0.3,
            global_row_weight: 0.2,
            global_quality_weight: 0.1,
        }
    }
}

/// Resource caps enforced before/during parse (§5).
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ProcessingLimits {
    pub max_file_size_mb: u64,
    pub max_sheets_per_file: usize,
    pub max_rows_per_sheet: usize,
    pub max_columns_per_sheet: usize,
}

impl Default for ProcessingLimits {
    fn default() -> Self {
        Self {
            max_file_size_mb: 50,
            max_sheets_per_file: 20,
            max_rows_per_sheet: 10_000,
            max_columns_per_sheet: 50,
        }
    }
}
