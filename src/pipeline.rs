//! Single forward pass over the activated feature sets:
//! resolve order -> (load -> align -> aggregate -> tag) per set -> subset & merge.
//!
//! Each feature set is computed from its own inputs only, so a failure aborts
//! the run without touching tables already written for earlier sets.

use crate::aggregate::{TagRegistry, aggregate};
use crate::config::{AggregateSpec, Config, FeatureSetSpec, Orientation, Output, SampleList, resolve_order};
use crate::error::Result;
use crate::matrix::{FeatureSetTable, UnifiedFeatureMatrix, merge};
use crate::table::{AnnotationTable, Table, align, read_numeric_table, read_string_table, write_table};
use log::info;

/// Load -> align -> aggregate -> tag for one annotation-aggregation spec.
pub fn aggregate_annotations(spec: &AggregateSpec) -> Result<Table> {
    let raw = read_string_table(&spec.annotations)?;
    let annotations = AnnotationTable::from_table(
        &raw,
        &spec.annotations,
        spec.gene_column.as_deref(),
        &spec.column,
        spec.separator,
    )?;
    let measurements = read_numeric_table(&spec.measurements)?;
    info!(
        "Aggregating {} genes x {} samples over '{}' ({} kinds)",
        measurements.n_rows(),
        measurements.n_cols(),
        spec.column,
        spec.kinds.len()
    );

    let frame = align(&annotations, &measurements);
    let scores = aggregate(&frame, &spec.column, &spec.kinds);
    TagRegistry::new().tag_all(scores)
}

/// Produce the table(s) of one feature set. Aggregate feature sets are
/// computed and written to their output path; all others are read from the
/// outputs their generator materialized.
pub fn build_feature_set(spec: &FeatureSetSpec) -> Result<Vec<FeatureSetTable>> {
    if let (Some(agg), Output::Single(path)) = (&spec.aggregate, &spec.output) {
        let table = aggregate_annotations(agg)?;
        write_table(&table, path)?;
        info!("'{}': {} aggregate features -> {}", spec.label, table.n_rows(), path.display());
        return Ok(vec![FeatureSetTable {
            label: spec.label.clone(),
            orientation: Orientation::FeaturesBySample,
            table,
        }]);
    }

    let labelled: Vec<(String, &std::path::PathBuf)> = match &spec.output {
        Output::Single(p) => vec![(spec.label.clone(), p)],
        Output::Named(m) => m.iter().map(|(name, p)| (format!("{}[{}]", spec.label, name), p)).collect(),
    };
    let mut out = Vec::with_capacity(labelled.len());
    for (label, path) in labelled {
        let table = read_numeric_table(path)?;
        info!("'{}': {} x {} from {}", label, table.n_rows(), table.n_cols(), path.display());
        out.push(FeatureSetTable {
            label,
            orientation: spec.orientation,
            table,
        });
    }
    Ok(out)
}

/// Run the whole composition for a validated config.
pub fn run(config: &Config) -> Result<UnifiedFeatureMatrix> {
    let order = resolve_order(config)?;
    info!("Build order: {}", order.join(" -> "));

    let samples = SampleList::from_path(&config.samples)?;

    let mut tables = Vec::new();
    for label in &order {
        // resolve_order only yields activated labels
        if let Some(spec) = config.features.get(label) {
            tables.extend(build_feature_set(spec)?);
        }
    }

    merge(&tables, &samples, config.missing_samples)
}
