use approx::assert_abs_diff_eq;
use pgx_features::config::Config;
use pgx_features::table::read_numeric_table;
use pgx_features::{Error, pipeline};
use pretty_assertions::assert_eq;
use std::fs;
use std::path::Path;

fn write(dir: &Path, rel: &str, text: &str) {
    let p = dir.join(rel);
    fs::create_dir_all(p.parent().unwrap()).unwrap();
    fs::write(p, text).unwrap();
}

fn fixture(dir: &Path, activated: &str) -> std::path::PathBuf {
    write(dir, "samples/cohort.txt", "A\nC\n");
    write(dir, "annot/go.tsv", "gene\tterm\n1\tGO:001\n2\tGO:001\n3\tGO:001;GO:002\n4\tGO:001\n9\tGO:009\n");
    write(
        dir,
        "features/rna.tsv",
        "gene\tA\tB\tC\n1\t-3\t0\t1\n2\t-1\t0\tNA\n3\t0\t0\t2\n4\t5\t0\t-1\n7\t1\t1\t1\n",
    );
    write(dir, "features/cnv_gene.tsv", "feature\tC\tB\tA\nTP53\t-1\t0\t1\n");
    write(dir, "features/cnv_arm.csv", "feature,A,C\n17p,0.5,NA\n");

    let config = format!(
        r#"
prefix: {prefix}
features_to_use: {activated}
samples: "{{prefix}}/samples/cohort.txt"
run_id: test_run
features:
  rna:
    generator: workflows/rna.smk
    output: "{{prefix}}/features/rna.tsv"
  go_scores:
    generator: workflows/go.smk
    depends_on: [rna]
    output: "{{prefix}}/features/go_scores.tsv"
    aggregate:
      annotations: "{{prefix}}/annot/go.tsv"
      measurements: "{{prefix}}/features/rna.tsv"
      column: term
      kinds: [sum, up_frac, down_mean]
  cnv:
    generator: workflows/cnv.smk
    output:
      gene: "{{prefix}}/features/cnv_gene.tsv"
      arm: "{{prefix}}/features/cnv_arm.csv"
"#,
        prefix = dir.display(),
        activated = activated,
    );
    let path = dir.join("config.yaml");
    fs::write(&path, config).unwrap();
    path
}

#[test]
fn builds_unified_matrix_in_dependency_order() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = Config::from_path(fixture(dir.path(), "[go_scores, cnv, rna]")).unwrap();
    assert_eq!(cfg.output, dir.path().join("runs/test_run/feature_matrix.tsv"));

    let m = pipeline::run(&cfg).unwrap();
    assert_eq!(m.samples, vec!["A", "C"]);
    assert_eq!(
        m.features,
        vec![
            "1", "2", "3", "4", "7",
            "GO_001_sum", "GO_002_sum", "GO_001_upfrac", "GO_002_upfrac", "GO_001_downmean", "GO_002_downmean",
            "17p", "TP53",
        ]
    );
    assert_eq!(m.sources[0], "rna");
    assert_eq!(m.sources[12], "cnv[gene]");

    assert_abs_diff_eq!(m.get("A", "GO_001_sum").unwrap(), 1.0);
    assert_abs_diff_eq!(m.get("A", "GO_001_upfrac").unwrap(), 0.25);
    assert_abs_diff_eq!(m.get("A", "GO_001_downmean").unwrap(), -2.0);
    // gene 2 has no value for C; the denominator is still 4
    assert_abs_diff_eq!(m.get("C", "GO_001_sum").unwrap(), 2.0);
    assert_abs_diff_eq!(m.get("C", "GO_001_upfrac").unwrap(), 0.5);
    assert_eq!(m.get("C", "GO_002_downmean"), None);
    assert_eq!(m.get("C", "TP53"), Some(-1.0));
    assert_eq!(m.get("C", "17p"), None);

    // the aggregate feature set is persisted, with every sample of its input
    let written = read_numeric_table(&dir.path().join("features/go_scores.tsv")).unwrap();
    assert_eq!(written.columns, vec!["A", "B", "C"]);
    assert!(!written.rows.iter().any(|r| r.starts_with("GO_009")));

    let out = dir.path().join("out/matrix.tsv");
    m.write(&out).unwrap();
    let back = read_numeric_table(&out).unwrap();
    assert_eq!(back.index_name, "sample_id");
    assert_eq!(back.rows, vec!["A", "C"]);
    assert_eq!(back.columns, m.features);
}

#[test]
fn cyclic_config_fails_before_any_table_is_read() {
    let dir = tempfile::tempdir().unwrap();
    let path = fixture(dir.path(), "[rna, go_scores]");
    let text = fs::read_to_string(&path)
        .unwrap()
        .replace("generator: workflows/rna.smk", "generator: workflows/rna.smk\n    depends_on: [go_scores]");
    fs::write(&path, text).unwrap();
    fs::remove_file(dir.path().join("features/rna.tsv")).unwrap();

    let cfg = Config::from_path(&path).unwrap();
    match pipeline::run(&cfg) {
        Err(Error::Cycle { path }) => assert_eq!(path, vec!["rna", "go_scores", "rna"]),
        other => panic!("unexpected {:?}", other),
    }
    assert!(!dir.path().join("features/go_scores.tsv").exists());
}

#[test]
fn missing_annotation_column_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let path = fixture(dir.path(), "[rna, go_scores]");
    let text = fs::read_to_string(&path).unwrap().replace("column: term", "column: pathway");
    fs::write(&path, text).unwrap();

    let cfg = Config::from_path(&path).unwrap();
    match pipeline::run(&cfg) {
        Err(Error::MissingColumn { column, path }) => {
            assert_eq!(column, "pathway");
            assert!(path.ends_with("annot/go.tsv"));
        }
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn inactive_dependency_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = Config::from_path(fixture(dir.path(), "[go_scores]")).unwrap();
    match pipeline::run(&cfg) {
        Err(Error::UnknownDependency { label, dependency, .. }) => {
            assert_eq!((label.as_str(), dependency.as_str()), ("go_scores", "rna"));
        }
        other => panic!("unexpected {:?}", other),
    }
}
