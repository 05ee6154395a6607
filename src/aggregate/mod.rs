//! Annotation-level aggregation of gene-by-sample measurements.
//!
//! For each requested kind, one table with a row per annotation that has at
//! least one aligned gene and a column per sample. Every sample column is
//! reduced independently; there is no cross-sample normalization here.

pub mod kind;
pub mod tag;

pub use kind::{AggregationKind, SignFilter};
pub use tag::{TagRegistry, normalize_id};

use crate::table::{AlignedFrame, Table};
use log::debug;

/// Aggregate score table plus the kind that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregateScoreTable {
    pub kind: AggregationKind,
    /// Rows are raw annotation ids until tagged.
    pub table: Table,
}

/// Compute one table per kind, in the order requested.
pub fn aggregate(frame: &AlignedFrame, index_name: &str, kinds: &[AggregationKind]) -> Vec<AggregateScoreTable> {
    let rows: Vec<String> = frame.groups.keys().cloned().collect();

    kinds
        .iter()
        .map(|&kind| {
            let values = frame
                .groups
                .values()
                .map(|members| {
                    (0..frame.samples.len())
                        .map(|s| reduce(kind, members.iter().map(|&g| frame.values[g][s]), members.len()))
                        .collect()
                })
                .collect();
            debug!("{}: {} annotations x {} samples", kind, rows.len(), frame.samples.len());
            AggregateScoreTable {
                kind,
                table: Table {
                    index_name: index_name.to_string(),
                    rows: rows.clone(),
                    columns: frame.samples.clone(),
                    values,
                },
            }
        })
        .collect()
}

/// Reduce the member values of one annotation for one sample.
///
/// - sums: missing when no member has data, otherwise the sum over members
///   passing the sign filter (0 when none passes)
/// - means: missing when no member passes the filter
/// - fractions: filtered count over `membership`, the full member count of
///   the annotation regardless of which genes have data for this sample
/// - count: members with data
pub fn reduce(kind: AggregationKind, values: impl Iterator<Item = Option<f64>>, membership: usize) -> Option<f64> {
    let filter = kind.filter();
    let mut with_data = 0usize;
    let mut passed = 0usize;
    let mut total = 0.0f64;
    for v in values.flatten() {
        with_data += 1;
        if filter.accepts(v) {
            passed += 1;
            total += v;
        }
    }

    use AggregationKind::*;
    match kind {
        Sum | UpSum | DownSum => (with_data > 0).then_some(total),
        Mean | UpMean | DownMean => (passed > 0).then(|| total / passed as f64),
        UpFrac | DownFrac | ChangedFrac => (membership > 0).then(|| passed as f64 / membership as f64),
        Count => Some(with_data as f64),
    }
}
