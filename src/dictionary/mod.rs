//! C9: the persisted description → category mapping table.

pub mod atomic_io;
pub mod category_dictionary;

pub use category_dictionary::{CategoryDictionary, MatchResult};
