//! Config layer: declarative run description + validated in-memory structures.
//!
//! We keep two representations, as for the feature sets themselves:
//! - RawConfig: the JSON/YAML document (serde-friendly)
//! - Config: placeholders resolved, activation list checked
//!
//! Dependency ordering lives in `dag`, sample lists in `samples`.

pub mod dag;
pub mod feature;
pub mod samples;

pub use dag::resolve_order;
pub use feature::{AggregateSpec, FeatureSetSpec, Orientation, Output};
pub use samples::SampleList;

use crate::error::{Error, Result};
use feature::{DEFAULT_SEPARATOR, RawAggregate, RawFeatureSet, RawOutput};
use log::debug;
use regex::Regex;
use serde::Deserialize;
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};

/// How to treat a cohort sample that a feature-set output does not contain.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingSamplePolicy {
    #[default]
    Fail,
    Fill,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawConfig {
    #[serde(default)]
    pub prefix: String,

    pub features_to_use: Vec<String>,

    pub samples: String,

    #[serde(default)]
    pub features: BTreeMap<String, RawFeatureSet>,

    #[serde(default)]
    pub run_id: Option<String>,

    #[serde(default)]
    pub output: Option<String>,

    #[serde(default)]
    pub missing_samples: MissingSamplePolicy,
}

/// Validated run configuration. Immutable for the lifetime of a run.
#[derive(Debug, Clone)]
pub struct Config {
    pub prefix: String,
    /// Activated labels in declared order.
    pub features_to_use: Vec<String>,
    pub samples: PathBuf,
    /// Activated feature sets only.
    pub features: BTreeMap<String, FeatureSetSpec>,
    /// Labels defined under `features` but not activated.
    pub inactive: BTreeSet<String>,
    pub run_id: String,
    pub output: PathBuf,
    pub missing_samples: MissingSamplePolicy,
}

const DEFAULT_OUTPUT: &str = "{prefix}/runs/{run_id}/feature_matrix.tsv";

impl Config {
    /// Read a config file; `.yaml`/`.yml` is parsed as YAML, anything else as JSON.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Config> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        let raw: RawConfig = match path.extension().and_then(|e| e.to_str()) {
            Some("yaml") | Some("yml") => serde_yaml::from_str(&text)?,
            _ => serde_json::from_str(&text)?,
        };
        debug!("parsed config {}", path.display());
        raw.validate_and_build()
    }
}

impl RawConfig {
    /// Resolve `{prefix}` in every path template and check:
    /// - the activation list is non-empty and has no repeats
    /// - every activated label is defined
    /// - aggregate feature sets have a single output and no repeated kinds
    ///
    /// Dependency references and cycles are checked by `resolve_order`.
    pub fn validate_and_build(self) -> Result<Config> {
        if self.features_to_use.is_empty() {
            return Err(Error::Config("features_to_use must list at least 1 feature set".into()));
        }

        let templates = Templates::new(&self.prefix)?;

        let mut seen = BTreeSet::new();
        for label in &self.features_to_use {
            if !seen.insert(label.as_str()) {
                return Err(Error::Config(format!(
                    "feature set '{}' is activated more than once",
                    label
                )));
            }
            if !self.features.contains_key(label) {
                return Err(Error::UnknownFeatureSet(label.clone()));
            }
        }

        let mut features = BTreeMap::new();
        let mut inactive = BTreeSet::new();
        for (label, raw) in self.features {
            if !seen.contains(label.as_str()) {
                inactive.insert(label);
                continue;
            }
            let spec = build_feature_set(&templates, label.clone(), raw)?;
            features.insert(label, spec);
        }

        let samples = templates.resolve("samples", &self.samples, &[])?;
        let run_id = match self.run_id {
            Some(id) if !id.trim().is_empty() => id,
            _ => samples
                .file_stem()
                .and_then(|s| s.to_str())
                .map(str::to_string)
                .ok_or_else(|| {
                    Error::Config(format!("cannot derive run_id from {}", samples.display()))
                })?,
        };
        let output = templates.resolve(
            "output",
            self.output.as_deref().unwrap_or(DEFAULT_OUTPUT),
            &[("run_id", run_id.as_str())],
        )?;

        Ok(Config {
            prefix: self.prefix,
            features_to_use: self.features_to_use,
            samples,
            features,
            inactive,
            run_id,
            output,
            missing_samples: self.missing_samples,
        })
    }
}

fn build_feature_set(templates: &Templates, label: String, raw: RawFeatureSet) -> Result<FeatureSetSpec> {
    let output = match raw.output {
        RawOutput::Single(t) => Output::Single(templates.resolve(&label, &t, &[])?),
        RawOutput::Named(m) => {
            if m.is_empty() {
                return Err(Error::Config(format!("feature set '{}' declares no outputs", label)));
            }
            let mut out = BTreeMap::new();
            for (name, t) in m {
                out.insert(name, templates.resolve(&label, &t, &[])?);
            }
            Output::Named(out)
        }
    };

    let aggregate = match raw.aggregate {
        None => None,
        Some(agg) => {
            if !matches!(output, Output::Single(_)) {
                return Err(Error::Config(format!(
                    "feature set '{}' aggregates annotations and must declare a single output path",
                    label
                )));
            }
            if raw.orientation != Orientation::FeaturesBySample {
                return Err(Error::Config(format!(
                    "feature set '{}' aggregates annotations and is always written features_by_sample",
                    label
                )));
            }
            Some(build_aggregate(templates, &label, agg)?)
        }
    };

    Ok(FeatureSetSpec {
        label,
        generator: raw.generator,
        depends_on: raw.depends_on,
        output,
        orientation: raw.orientation,
        aggregate,
    })
}

fn build_aggregate(templates: &Templates, label: &str, raw: RawAggregate) -> Result<AggregateSpec> {
    let mut seen = BTreeSet::new();
    for kind in &raw.kinds {
        if !seen.insert(*kind) {
            return Err(Error::Config(format!(
                "feature set '{}' requests aggregation '{}' more than once",
                label, kind
            )));
        }
    }
    let kinds = if raw.kinds.is_empty() {
        crate::aggregate::AggregationKind::ALL.to_vec()
    } else {
        raw.kinds
    };

    Ok(AggregateSpec {
        annotations: templates.resolve(label, &raw.annotations, &[])?,
        measurements: templates.resolve(label, &raw.measurements, &[])?,
        column: raw.column,
        gene_column: raw.gene_column,
        separator: raw.separator.unwrap_or(DEFAULT_SEPARATOR),
        kinds,
    })
}

/// `{prefix}` substitution; leftover `{name}` placeholders are rejected.
struct Templates<'a> {
    prefix: &'a str,
    placeholder: Regex,
}

impl<'a> Templates<'a> {
    fn new(prefix: &'a str) -> Result<Self> {
        let placeholder = Regex::new(r"\{([A-Za-z_][A-Za-z0-9_]*)\}")
            .map_err(|e| Error::Config(e.to_string()))?;
        Ok(Self { prefix, placeholder })
    }

    fn resolve(&self, owner: &str, template: &str, extra: &[(&str, &str)]) -> Result<PathBuf> {
        let mut unknown = None;
        let resolved = self.placeholder.replace_all(template, |caps: &regex::Captures| {
            let name = &caps[1];
            if name == "prefix" {
                return self.prefix.to_string();
            }
            if let Some((_, v)) = extra.iter().find(|(k, _)| *k == name) {
                return v.to_string();
            }
            unknown.get_or_insert_with(|| name.to_string());
            caps[0].to_string()
        });
        if let Some(name) = unknown {
            return Err(Error::Config(format!(
                "unknown placeholder {{{}}} in '{}' path template {}",
                name, owner, template
            )));
        }
        Ok(PathBuf::from(resolved.into_owned()))
    }
}
