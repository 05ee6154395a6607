//! Error taxonomy for feature-set composition.
//!
//! Every variant carries the offending identifiers (feature-set label,
//! annotation id, sample id, path) so the caller can report them as-is.

use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("feature set '{0}' is activated but not defined under `features`")]
    UnknownFeatureSet(String),

    #[error("feature set '{label}' depends on '{dependency}', which is {status}")]
    UnknownDependency {
        label: String,
        dependency: String,
        status: &'static str,
    },

    #[error("dependency cycle between feature sets: {}", .path.join(" -> "))]
    Cycle { path: Vec<String> },

    #[error("tagged identifier '{tagged}' produced by both {first} and {second}")]
    TagCollision {
        tagged: String,
        first: String,
        second: String,
    },

    #[error("feature '{feature}' is produced by both '{first}' and '{second}'")]
    DuplicateFeature {
        feature: String,
        first: String,
        second: String,
    },

    #[error("sample '{sample}' is listed more than once in {}", .path.display())]
    DuplicateSample { sample: String, path: PathBuf },

    #[error("duplicate {what} '{id}' in {}", .path.display())]
    DuplicateRow {
        what: &'static str,
        id: String,
        path: PathBuf,
    },

    #[error("column '{column}' not found in {}", .path.display())]
    MissingColumn { column: String, path: PathBuf },

    #[error("sample '{sample}' is absent from the output of feature set '{feature_set}'")]
    MissingSample { feature_set: String, sample: String },

    #[error("{}:{line}: {message}", .path.display())]
    Parse {
        path: PathBuf,
        line: usize,
        message: String,
    },

    #[error("{}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }

    /// True for malformed, cyclic or colliding declarations: defects that are
    /// detectable before any table is read.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Error::Config(_)
                | Error::UnknownFeatureSet(_)
                | Error::UnknownDependency { .. }
                | Error::Cycle { .. }
                | Error::TagCollision { .. }
                | Error::DuplicateFeature { .. }
                | Error::DuplicateSample { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cycle_message_shows_full_path() {
        let e = Error::Cycle {
            path: vec!["A".into(), "B".into(), "A".into()],
        };
        assert_eq!(e.to_string(), "dependency cycle between feature sets: A -> B -> A");
        assert!(e.is_configuration());
    }

    #[test]
    fn unknown_dependency_distinguishes_inactive() {
        let e = Error::UnknownDependency {
            label: "B".into(),
            dependency: "A".into(),
            status: "defined but not activated",
        };
        assert!(e.to_string().ends_with("defined but not activated"));
        let e = Error::MissingSample {
            feature_set: "cnv".into(),
            sample: "S1".into(),
        };
        assert!(!e.is_configuration());
    }
}
