//! C11 (supplemented): aligns an offer's line items against a master BoQ.

pub mod comparator;

pub use comparator::{compare, ComparableRow, ComparisonOp, ComparisonResult, FieldDelta};
