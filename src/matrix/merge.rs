use crate::config::{MissingSamplePolicy, Orientation, SampleList};
use crate::error::{Error, Result};
use crate::matrix::subset_samples;
use crate::table::{Table, write_table};
use log::info;
use std::collections::HashMap;
use std::path::Path;

/// One loaded feature-set output, as read from disk.
#[derive(Debug, Clone)]
pub struct FeatureSetTable {
    pub label: String,
    pub orientation: Orientation,
    pub table: Table,
}

impl FeatureSetTable {
    /// The table with features as rows and samples as columns.
    pub fn features_by_sample(&self) -> Table {
        match self.orientation {
            Orientation::FeaturesBySample => self.table.clone(),
            Orientation::SamplesByFeature => self.table.transpose("feature"),
        }
    }
}

/// Sample-indexed matrix of named features. Rows are exactly the cohort,
/// in cohort order; feature columns follow the build order.
#[derive(Debug, Clone, PartialEq)]
pub struct UnifiedFeatureMatrix {
    pub samples: Vec<String>,
    pub features: Vec<String>,
    /// Feature set that contributed each column.
    pub sources: Vec<String>,
    /// `values[s][f]` for `samples[s]`, `features[f]`.
    pub values: Vec<Vec<Option<f64>>>,
}

impl UnifiedFeatureMatrix {
    pub fn get(&self, sample: &str, feature: &str) -> Option<f64> {
        let s = self.samples.iter().position(|x| x == sample)?;
        let f = self.features.iter().position(|x| x == feature)?;
        self.values[s][f]
    }

    pub fn to_table(&self) -> Table {
        Table {
            index_name: "sample_id".to_string(),
            rows: self.samples.clone(),
            columns: self.features.clone(),
            values: self.values.clone(),
        }
    }

    pub fn write(&self, path: &Path) -> Result<()> {
        write_table(&self.to_table(), path)?;
        info!(
            "Wrote {} samples x {} features to {}",
            self.samples.len(),
            self.features.len(),
            path.display()
        );
        Ok(())
    }
}

/// Subset every feature-set table to the cohort and concatenate their
/// features, in the given (dependency) order. Samples are matched by id.
///
/// A feature name produced by two feature sets is an error.
pub fn merge(
    tables: &[FeatureSetTable],
    samples: &SampleList,
    policy: MissingSamplePolicy,
) -> Result<UnifiedFeatureMatrix> {
    let mut features: Vec<String> = Vec::new();
    let mut sources: Vec<String> = Vec::new();
    let mut owner: HashMap<String, String> = HashMap::new();
    // features x samples, transposed at the end
    let mut columns: Vec<Vec<Option<f64>>> = Vec::new();

    for fs in tables {
        let t = subset_samples(&fs.features_by_sample(), samples, policy, &fs.label)?;
        for (feature, row) in t.rows.into_iter().zip(t.values) {
            if let Some(prev) = owner.insert(feature.clone(), fs.label.clone()) {
                return Err(Error::DuplicateFeature {
                    feature,
                    first: prev,
                    second: fs.label.clone(),
                });
            }
            features.push(feature);
            sources.push(fs.label.clone());
            columns.push(row);
        }
        info!("Merged feature set '{}'", fs.label);
    }

    let values = (0..samples.len())
        .map(|s| columns.iter().map(|col| col[s]).collect())
        .collect();

    Ok(UnifiedFeatureMatrix {
        samples: samples.ids().to_vec(),
        features,
        sources,
        values,
    })
}
