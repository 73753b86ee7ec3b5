//! C10: drives the category dictionary through auto-categorize, review,
//! manual application, and learning.

pub mod categorization_orchestrator;

pub use categorization_orchestrator::{
    apply_manual, auto_categorize, collect_review_items, generate_review_artifact, learn,
    run_auto_pass, ApplyManualStats, AutoCategorizeStats, CategorizableRow, CategoryConflict,
    CategorizationOutcome, LearnStats, ReviewArtifactRow, UnmatchedDescription,
};
