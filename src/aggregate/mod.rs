//! C8: rolls per-stage outputs up into sheet- and file-level confidences,
//! review flags, and processing status.

pub mod mapping_aggregator;

pub use mapping_aggregator::{aggregate_file, aggregate_sheet};
