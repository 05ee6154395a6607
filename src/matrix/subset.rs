use crate::config::{MissingSamplePolicy, SampleList};
use crate::error::{Error, Result};
use crate::table::Table;
use log::{debug, warn};

/// Restrict a features-by-sample table to exactly the cohort, in cohort order.
///
/// Extra sample columns are dropped. A cohort sample missing from the table
/// fails under `Fail` and becomes an all-missing column under `Fill`. A table
/// sharing no sample at all with the cohort always fails: that is an id
/// mismatch, not sparse coverage.
pub fn subset_samples(
    table: &Table,
    samples: &SampleList,
    policy: MissingSamplePolicy,
    feature_set: &str,
) -> Result<Table> {
    let index = table.column_index();

    let positions: Vec<Option<usize>> = samples.ids().iter().map(|s| index.get(s.as_str()).copied()).collect();

    if !samples.is_empty() && positions.iter().all(Option::is_none) {
        return Err(Error::MissingSample {
            feature_set: feature_set.to_string(),
            sample: samples.ids()[0].clone(),
        });
    }

    let absent: Vec<&str> = samples
        .ids()
        .iter()
        .zip(&positions)
        .filter(|(_, p)| p.is_none())
        .map(|(s, _)| s.as_str())
        .collect();
    if let Some(first) = absent.first() {
        match policy {
            MissingSamplePolicy::Fail => {
                return Err(Error::MissingSample {
                    feature_set: feature_set.to_string(),
                    sample: first.to_string(),
                });
            }
            MissingSamplePolicy::Fill => {
                warn!(
                    "{}: {} cohort samples absent, filled as missing: {}",
                    feature_set,
                    absent.len(),
                    absent.join(", ")
                );
            }
        }
    }

    let kept = positions.iter().filter(|p| p.is_some()).count();
    if kept < table.n_cols() {
        debug!("{}: dropped {} samples outside the cohort", feature_set, table.n_cols() - kept);
    }

    let values = table
        .values
        .iter()
        .map(|row| positions.iter().map(|p| p.and_then(|c| row[c])).collect())
        .collect();

    Ok(Table {
        index_name: table.index_name.clone(),
        rows: table.rows.clone(),
        columns: samples.ids().to_vec(),
        values,
    })
}
