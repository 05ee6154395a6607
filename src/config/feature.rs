//! Feature-set definitions as they appear under `features:` in the config.
//!
//! YAML shape:
//!
//! ```yaml
//! features:
//!   pathway_scores:
//!     generator: workflows/pathway_scores.smk
//!     depends_on: [rna]
//!     output: "{prefix}/features/pathway_scores.tsv"
//!     aggregate:
//!       annotations: "{prefix}/annot/gene_sets.tsv"
//!       measurements: "{prefix}/features/rna.tsv"
//!       column: pathway
//!       kinds: [sum, up_frac, down_frac]
//!   cnv:
//!     generator: workflows/cnv.smk
//!     output:
//!       gene: "{prefix}/features/cnv_gene.tsv"
//!       arm: "{prefix}/features/cnv_arm.tsv"
//! ```

use crate::aggregate::AggregationKind;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Raw feature-set body, before placeholder substitution.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawFeatureSet {
    /// Handle of the external build workflow. Never invoked here.
    #[serde(default)]
    pub generator: String,

    #[serde(default)]
    pub depends_on: Vec<String>,

    pub output: RawOutput,

    #[serde(default)]
    pub orientation: Orientation,

    #[serde(default)]
    pub aggregate: Option<RawAggregate>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawOutput {
    Single(String),
    Named(BTreeMap<String, String>),
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawAggregate {
    pub annotations: String,
    pub measurements: String,
    pub column: String,

    #[serde(default)]
    pub gene_column: Option<String>,

    #[serde(default)]
    pub separator: Option<char>,

    #[serde(default)]
    pub kinds: Vec<AggregationKind>,
}

/// Layout of a feature-set output table on disk.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Orientation {
    /// Rows are features, columns are samples.
    #[default]
    FeaturesBySample,
    /// Rows are samples, columns are features.
    SamplesByFeature,
}

/// Declared output location(s), placeholders resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Output {
    Single(PathBuf),
    Named(BTreeMap<String, PathBuf>),
}

impl Output {
    /// All paths in a stable order (named outputs sorted by name).
    pub fn paths(&self) -> Vec<&PathBuf> {
        match self {
            Output::Single(p) => vec![p],
            Output::Named(m) => m.values().collect(),
        }
    }
}

/// Inputs of an annotation-aggregation feature set, placeholders resolved.
#[derive(Debug, Clone)]
pub struct AggregateSpec {
    pub annotations: PathBuf,
    pub measurements: PathBuf,
    pub column: String,
    pub gene_column: Option<String>,
    /// Splits multi-valued annotation cells.
    pub separator: char,
    pub kinds: Vec<AggregationKind>,
}

/// Validated feature-set definition.
#[derive(Debug, Clone)]
pub struct FeatureSetSpec {
    pub label: String,
    pub generator: String,
    pub depends_on: Vec<String>,
    pub output: Output,
    pub orientation: Orientation,
    pub aggregate: Option<AggregateSpec>,
}

/// Default separator for multi-valued annotation cells.
pub const DEFAULT_SEPARATOR: char = ';';
