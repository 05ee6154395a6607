//! Gene annotations and their inner join with a gene-by-sample table.

use crate::error::{Error, Result};
use crate::table::Table;
use crate::table::parse::StringTable;
use log::{debug, info};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

/// Gene id -> annotation ids (many-to-many).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnnotationTable {
    pub genes: BTreeMap<String, BTreeSet<String>>,
}

impl AnnotationTable {
    /// Pick the gene and annotation columns out of a parsed annotation file.
    ///
    /// `gene_column` defaults to the first column. Cells of `column` holding
    /// several annotations are split on `separator`; a gene may also repeat
    /// over several rows. Blank annotations are ignored.
    pub fn from_table(
        raw: &StringTable,
        path: &Path,
        gene_column: Option<&str>,
        column: &str,
        separator: char,
    ) -> Result<AnnotationTable> {
        let missing = |c: &str| Error::MissingColumn {
            column: c.to_string(),
            path: path.to_path_buf(),
        };
        let gene_idx = match gene_column {
            Some(g) => raw.column(g).ok_or_else(|| missing(g))?,
            None => 0,
        };
        let annot_idx = raw.column(column).ok_or_else(|| missing(column))?;
        if annot_idx == gene_idx {
            return Err(Error::Config(format!(
                "annotation column '{}' is also the gene column in {}",
                column,
                path.display()
            )));
        }

        let mut genes: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
        for record in &raw.records {
            let gene = record.get(gene_idx).unwrap_or_default().trim();
            let cell = record.get(annot_idx).unwrap_or_default();
            if gene.is_empty() {
                continue;
            }
            for term in cell.split(separator).map(str::trim).filter(|t| !t.is_empty()) {
                genes.entry(gene.to_string()).or_default().insert(term.to_string());
            }
        }
        Ok(AnnotationTable { genes })
    }

    /// Build from (gene, annotation) pairs.
    pub fn from_pairs<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> AnnotationTable {
        let mut genes: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
        for (g, a) in pairs {
            genes.entry(g.to_string()).or_default().insert(a.to_string());
        }
        AnnotationTable { genes }
    }
}

/// Working frame after the inner join: aligned gene rows with their sample
/// measurements, plus each annotation's member rows.
#[derive(Debug, Clone)]
pub struct AlignedFrame {
    pub samples: Vec<String>,
    pub genes: Vec<String>,
    /// `values[g][s]` for `genes[g]`, `samples[s]`.
    pub values: Vec<Vec<Option<f64>>>,
    /// Annotation id -> indices into `genes`. Only annotations with at least
    /// one aligned gene appear.
    pub groups: BTreeMap<String, Vec<usize>>,
}

/// Inner join on gene id. Genes present in only one input are dropped.
pub fn align(annotations: &AnnotationTable, measurements: &Table) -> AlignedFrame {
    let mut genes = Vec::new();
    let mut values = Vec::new();
    let mut groups: BTreeMap<String, Vec<usize>> = BTreeMap::new();

    for (row, gene) in measurements.rows.iter().enumerate() {
        let Some(terms) = annotations.genes.get(gene) else {
            continue;
        };
        let g = genes.len();
        genes.push(gene.clone());
        values.push(measurements.values[row].clone());
        for t in terms {
            groups.entry(t.clone()).or_default().push(g);
        }
    }

    // a measurement table built by hand may repeat a gene row
    let unannotated = measurements.n_rows().saturating_sub(genes.len());
    let unmeasured = annotations.genes.len().saturating_sub(genes.len());
    debug!(
        "alignment dropped {} genes without annotation and {} annotated genes without measurements",
        unannotated, unmeasured
    );
    info!(
        "Aligned {} genes across {} samples into {} annotation groups",
        genes.len(),
        measurements.n_cols(),
        groups.len()
    );

    AlignedFrame {
        samples: measurements.columns.clone(),
        genes,
        values,
        groups,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::parse::TableFormat;
    use csv::ReaderBuilder;
    use pretty_assertions::assert_eq;

    fn string_table(text: &str) -> StringTable {
        let mut r = ReaderBuilder::new()
            .delimiter(TableFormat::TSV.delimiter)
            .from_reader(text.as_bytes());
        let headers = r.headers().unwrap().iter().map(str::to_string).collect();
        let records = r.records().map(|x| x.unwrap()).collect();
        StringTable { headers, records }
    }

    #[test]
    fn wide_and_long_annotations_merge() {
        let raw = string_table("gene\tpathway\ng1\tGO:1;GO:2\ng2\tGO:2\ng1\tGO:3\ng3\t\n");
        let a = AnnotationTable::from_table(&raw, Path::new("a.tsv"), None, "pathway", ';').unwrap();
        assert_eq!(
            a,
            AnnotationTable::from_pairs([("g1", "GO:1"), ("g1", "GO:2"), ("g1", "GO:3"), ("g2", "GO:2")])
        );
    }

    #[test]
    fn absent_annotation_column_is_missing_column() {
        let raw = string_table("gene\tpathway\ng1\tGO:1\n");
        match AnnotationTable::from_table(&raw, Path::new("a.tsv"), None, "term", ';') {
            Err(Error::MissingColumn { column, .. }) => assert_eq!(column, "term"),
            other => panic!("unexpected {:?}", other),
        }
        assert!(matches!(
            AnnotationTable::from_table(&raw, Path::new("a.tsv"), Some("symbol"), "pathway", ';'),
            Err(Error::MissingColumn { .. })
        ));
    }

    #[test]
    fn inner_join_drops_one_sided_genes() {
        let annot = AnnotationTable::from_pairs([("g1", "P"), ("g2", "P"), ("g9", "Q")]);
        let m = Table::new(
            "gene",
            vec!["g1".into(), "g2".into(), "g3".into()],
            vec!["A".into()],
            vec![vec![Some(1.0)], vec![Some(2.0)], vec![Some(3.0)]],
        )
        .unwrap();
        let f = align(&annot, &m);
        assert_eq!(f.genes, vec!["g1", "g2"]);
        assert_eq!(f.groups.len(), 1);
        assert_eq!(f.groups["P"], vec![0, 1]);
        assert!(!f.groups.contains_key("Q"));
    }

    #[test]
    fn repeated_gene_rows_do_not_break_alignment() {
        let annot = AnnotationTable::from_pairs([("g1", "P")]);
        let m = Table {
            index_name: "gene".into(),
            rows: vec!["g1".into(), "g1".into()],
            columns: vec!["A".into()],
            values: vec![vec![Some(1.0)], vec![Some(2.0)]],
        };
        let f = align(&annot, &m);
        assert_eq!(f.genes, vec!["g1", "g1"]);
        assert_eq!(f.groups["P"], vec![0, 1]);
    }
}
