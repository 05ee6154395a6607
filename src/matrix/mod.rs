//! Cohort subsetting and the final sample-by-feature matrix.

pub mod merge;
pub mod subset;

pub use merge::{FeatureSetTable, UnifiedFeatureMatrix, merge};
pub use subset::subset_samples;
