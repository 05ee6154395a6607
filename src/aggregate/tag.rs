//! Feature names for aggregate rows: `normalize(annotation) + kind suffix`.
//!
//! Raw suffixing is injective on its own: every suffix is `_` followed by
//! lowercase letters only, so the last `_` of a tagged name is where the
//! suffix starts and both halves can be read back. Normalization can map distinct annotation ids to the same string, e.g.
//! `GO:0001` and `GO_0001`. The registry remembers the origin of every tagged
//! name and refuses a second origin instead of overwriting.

use crate::aggregate::{AggregateScoreTable, AggregationKind};
use crate::error::{Error, Result};
use crate::table::Table;
use std::collections::HashMap;

/// Replace every character outside `[A-Za-z0-9_.-]` (`:`, spaces, slashes)
/// with `_`.
pub fn normalize_id(id: &str) -> String {
    id.chars()
        .map(|c| match c {
            'A'..='Z' | 'a'..='z' | '0'..='9' | '_' | '.' | '-' => c,
            _ => '_',
        })
        .collect()
}

/// Tagged name -> (annotation id, kind) it was produced from.
#[derive(Debug, Default)]
pub struct TagRegistry {
    origins: HashMap<String, (String, AggregationKind)>,
}

impl TagRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rewrite the rows of `scores` into tagged feature names.
    pub fn tag(&mut self, scores: AggregateScoreTable) -> Result<Table> {
        let AggregateScoreTable { kind, mut table } = scores;
        let mut tagged = Vec::with_capacity(table.rows.len());
        for annotation in &table.rows {
            let name = format!("{}{}", normalize_id(annotation), kind.suffix());
            if let Some((prev, prev_kind)) = self.origins.get(&name) {
                if prev != annotation || *prev_kind != kind {
                    return Err(Error::TagCollision {
                        tagged: name,
                        first: format!("'{}' ({})", prev, prev_kind),
                        second: format!("'{}' ({})", annotation, kind),
                    });
                }
            }
            self.origins.insert(name.clone(), (annotation.clone(), kind));
            tagged.push(name);
        }
        table.rows = tagged;
        table.index_name = "feature".to_string();
        Ok(table)
    }

    /// Tag several aggregate tables and stack their rows into one table.
    pub fn tag_all(&mut self, scores: Vec<AggregateScoreTable>) -> Result<Table> {
        let mut out: Option<Table> = None;
        for s in scores {
            let t = self.tag(s)?;
            match out.as_mut() {
                None => out = Some(t),
                Some(acc) => {
                    acc.rows.extend(t.rows);
                    acc.values.extend(t.values);
                }
            }
        }
        Ok(out.unwrap_or_else(|| Table {
            index_name: "feature".to_string(),
            rows: Vec::new(),
            columns: Vec::new(),
            values: Vec::new(),
        }))
    }

    /// Original (annotation id, kind) behind a tagged name.
    pub fn origin(&self, tagged: &str) -> Option<&(String, AggregationKind)> {
        self.origins.get(tagged)
    }
}
