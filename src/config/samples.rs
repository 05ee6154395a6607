use crate::error::{Error, Result};
use log::info;
use std::collections::HashSet;
use std::fs;
use std::path::Path;

/// Ordered, duplicate-free cohort of sample ids.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampleList {
    ids: Vec<String>,
}

impl SampleList {
    /// Read a newline-delimited sample-id file. Blank lines are skipped; a
    /// repeated id is rejected.
    pub fn from_path(path: impl AsRef<Path>) -> Result<SampleList> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;

        let mut seen = HashSet::new();
        let mut ids = Vec::new();
        for line in text.lines() {
            let id = line.trim();
            if id.is_empty() {
                continue;
            }
            if !seen.insert(id) {
                return Err(Error::DuplicateSample {
                    sample: id.to_string(),
                    path: path.to_path_buf(),
                });
            }
            ids.push(id.to_string());
        }
        if ids.is_empty() {
            return Err(Error::Config(format!("sample list {} is empty", path.display())));
        }

        info!("Loaded {} samples from {}", ids.len(), path.display());
        Ok(SampleList { ids })
    }

    /// Build from ids already known to be unique (tests, programmatic use).
    pub fn new<I, S>(ids: I) -> Result<SampleList>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let ids: Vec<String> = ids.into_iter().map(Into::into).collect();
        let mut seen = HashSet::new();
        for id in &ids {
            if !seen.insert(id.as_str()) {
                return Err(Error::Config(format!("sample '{}' is listed more than once", id)));
            }
        }
        Ok(SampleList { ids })
    }

    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}
