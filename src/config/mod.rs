//! C1 — Config & Vocabulary.
//!
//! A single explicit [`Config`] value threaded through every constructor;
//! no hidden mutable globals. Mirrors the shape of `debtmap::config`, scaled
//! down to this pipeline's knobs.

mod loader;
pub mod thresholds;
pub mod vocabulary;

pub use loader::{load_config, load_vocabulary};
pub use thresholds::{
    AggregatorThresholds, ColumnMapperThresholds, HeaderLocatorThresholds, ProcessingLimits,
    SheetClassifierThresholds, ValidatorThresholds,
};
pub use vocabulary::Vocabulary;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub sheet_classifier: SheetClassifierThresholds,
    #[serde(default)]
    pub header_locator: HeaderLocatorThresholds,
    #[serde(default)]
    pub column_mapper: ColumnMapperThresholds,
    #[serde(default)]
    pub validator: ValidatorThresholds,
    #[serde(default)]
    pub aggregator: AggregatorThresholds,
    #[serde(default)]
    pub limits: ProcessingLimits,
    #[serde(default = "Vocabulary::default")]
    pub vocabulary: Vocabulary,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            sheet_classifier: SheetClassifierThresholds::default(),
            header_locator: HeaderLocatorThresholds::default(),
            column_mapper: ColumnMapperThresholds::default(),
            validator: ValidatorThresholds::default(),
            aggregator: AggregatorThresholds::default(),
            limits: ProcessingLimits::default(),
            vocabulary: Vocabulary::default(),
        }
    }
}
