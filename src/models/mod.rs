//! Entity types for the persisted store, matching the schema in SPEC_FULL §3.

mod action;
mod classification;
mod cover;
mod file;
mod rule;

pub use action::{ActionBatch, ActionLog, ActionType, ConflictResolution};
pub use classification::{Classification, Tier};
pub use cover::{CoverPage, CoverSimilarityGroup};
pub use file::FileRecord;
pub use rule::{CustomCategory, CustomExtension, Rule, RuleType};
