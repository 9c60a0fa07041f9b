use std::io::Write;

use contrib_pca::data::{loader, writer};
use contrib_pca::{run, run_with, AnalysisError, CellValue, PcaSummary, PipelineConfig, Table};

const TOL: f64 = 1e-6;

/// Four nights, three metrics:
///   deep_sleep = [1, 3, 1, 3], efficiency = [2, 6, 2, 6], latency = [1, 1, 3, 3]
///
/// Covariance (n - 1 = 3):
///   [[4/3, 8/3, 0], [8/3, 16/3, 0], [0, 0, 4/3]]
/// Eigenvalues 20/3, 4/3, 0 (sum 8), ratios 5/6, 1/6, 0.
/// First eigenvector (1, 2, 0)/√5, second (0, 0, 1), third (2, -1, 0)/√5.
const FIXTURE: &str = "id;contributors;day;score\n\
a1;\"{\"\"deep_sleep\"\": 1  \"\"efficiency\"\": 2 \"\"latency\"\": 1}\";2025-11-01;70\n\
a2;\"{\"\"deep_sleep\"\": 3  \"\"efficiency\"\": 6 \"\"latency\"\": 1}\";2025-11-02;81\n\
a3;\"{\"\"deep_sleep\"\": 1  \"\"efficiency\"\": 2 \"\"latency\"\": 3}\";2025-11-03;75\n\
a4;\"{\"\"deep_sleep\"\": 3  \"\"efficiency\"\": 6 \"\"latency\"\": 3}\";2025-11-04;88\n";

fn load_fixture(text: &str) -> Table {
    let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
    file.write_all(text.as_bytes()).unwrap();
    file.flush().unwrap();
    loader::load_file(file.path(), b';').unwrap()
}

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() < TOL
}

#[test]
fn loader_reads_semicolon_export() {
    let table = load_fixture(FIXTURE);
    assert_eq!(table.columns, vec!["id", "contributors", "day", "score"]);
    assert_eq!(table.len(), 4);
    assert_eq!(table.get(3, "score"), Some(&CellValue::Integer(88)));
    assert_eq!(
        table.get(0, "contributors"),
        Some(&CellValue::String(
            r#"{"deep_sleep": 1  "efficiency": 2 "latency": 1}"#.to_string()
        ))
    );
}

#[test]
fn hand_computed_fixture() {
    let table = load_fixture(FIXTURE);
    let out = run(&table, &PipelineConfig::default()).unwrap();

    assert!(out.warnings.is_empty());
    assert_eq!(
        out.flattened.table.columns,
        vec![
            "id",
            "day",
            "score",
            "contributors_deep_sleep",
            "contributors_efficiency",
            "contributors_latency"
        ]
    );

    let cov = &out.analysis.covariance;
    let expected_cov = [
        [4.0 / 3.0, 8.0 / 3.0, 0.0],
        [8.0 / 3.0, 16.0 / 3.0, 0.0],
        [0.0, 0.0, 4.0 / 3.0],
    ];
    for (i, row) in expected_cov.iter().enumerate() {
        for (j, &v) in row.iter().enumerate() {
            assert!(close(cov.get(i, j), v), "cov[{i}][{j}] = {}", cov.get(i, j));
        }
    }

    let eigenvalues = &out.summary.eigenvalues;
    assert!(close(eigenvalues[0], 20.0 / 3.0));
    assert!(close(eigenvalues[1], 4.0 / 3.0));
    assert!(close(eigenvalues[2], 0.0));

    let ratios = &out.summary.explained_variance_ratio;
    assert!(close(ratios[0], 5.0 / 6.0));
    assert!(close(ratios[1], 1.0 / 6.0));
    assert!(close(ratios[2], 0.0));
    assert!(close(ratios.iter().sum::<f64>(), 1.0));

    let inv_sqrt5 = 1.0 / 5f64.sqrt();
    let comps = &out.analysis.components;
    assert_eq!(comps.len(), 3);

    let first = &comps[0].top_features;
    assert_eq!(first[0].feature, "contributors_efficiency");
    assert!(close(first[0].loading, 2.0 * inv_sqrt5));
    assert_eq!(first[1].feature, "contributors_deep_sleep");
    assert!(close(first[1].loading, inv_sqrt5));
    assert!(close(first[2].loading, 0.0));

    let second = &comps[1].top_features;
    assert_eq!(second[0].feature, "contributors_latency");
    assert!(close(second[0].loading, 1.0));
    assert!(second[1..].iter().all(|f| close(f.loading, 0.0)));

    let third = &comps[2].top_features;
    assert_eq!(third[0].feature, "contributors_deep_sleep");
    assert!(close(third[0].loading, 2.0 * inv_sqrt5));
    assert_eq!(third[1].feature, "contributors_efficiency");
    assert!(close(third[1].loading, inv_sqrt5));
}

#[test]
fn summary_round_trips_through_json_file() {
    let table = load_fixture(FIXTURE);
    let out = run(&table, &PipelineConfig::default()).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("pca_summary.json");
    writer::write_summary_file(&out.summary, &path).unwrap();

    let text = std::fs::read_to_string(&path).unwrap();
    let read: PcaSummary = serde_json::from_str(&text).unwrap();
    assert_eq!(read.features, out.summary.features);
    assert_eq!(read.eigenvalues.len(), 3);
    assert!(text.contains("\n  \"eigenvalues\": ["));
}

#[test]
fn flattened_csv_drops_blob_and_appends_metrics() {
    let text = "id;contributors;day\n\
r1;\"{\"\"a\"\": 1}\";2025-11-01\n\
r2;\"{\"\"b\"\": 2.5}\";2025-11-02\n";
    let table = load_fixture(text);
    let flat = contrib_pca::flatten(&table, "contributors", "contributors_").unwrap();

    let mut buf = Vec::new();
    writer::write_csv(&flat.table.table, &mut buf, b',').unwrap();
    assert_eq!(
        String::from_utf8(buf).unwrap(),
        "id,day,contributors_a,contributors_b\nr1,2025-11-01,1,\nr2,2025-11-02,,2.5\n"
    );
}

#[test]
fn null_and_garbage_rows_are_dropped_not_fatal() {
    let mut text = FIXTURE.to_string();
    text.push_str("a5;;2025-11-05;60\n");
    text.push_str("a6;not a blob;2025-11-06;61\n");
    let table = load_fixture(&text);

    let out = run(&table, &PipelineConfig::default()).unwrap();
    // Only the unparseable row warns; the empty cell is a null.
    assert_eq!(out.warnings.len(), 1);
    assert_eq!(out.warnings[0].row, Some(5));
    assert_eq!(out.analysis.rows_used, 4);
    assert_eq!(out.analysis.dropped_rows, 2);
    assert!(close(out.summary.eigenvalues[0], 20.0 / 3.0));
}

#[test]
fn all_unparseable_blobs_are_insufficient_data() {
    let text = "id;contributors\nr1;oops\nr2;still nothing\nr3;{}\n";
    let table = load_fixture(text);
    let err = run(&table, &PipelineConfig::default()).unwrap_err();
    assert_eq!(err, AnalysisError::NoFeatureColumns);
    assert!(err.is_insufficient_data());
}

#[test]
fn single_complete_row_is_insufficient() {
    let text = "id;contributors\nr1;\"{\"\"a\"\": 1 \"\"b\"\": 2}\"\nr2;\"{\"\"a\"\": 3}\"\n";
    let table = load_fixture(text);
    let err = run(&table, &PipelineConfig::default()).unwrap_err();
    assert_eq!(
        err.to_string(),
        "insufficient rows after applying missing-value policy 'drop_row': need ≥2, got 1"
    );
}

#[test]
fn pandas_na_markers_are_null_blobs() {
    let mut text = FIXTURE.to_string();
    text.push_str("a5;n/a;2025-11-05;60\n");
    text.push_str("a6;#N/A;2025-11-06;61\n");
    text.push_str("a7;-nan;2025-11-07;62\n");
    let table = load_fixture(&text);

    let out = run(&table, &PipelineConfig::default()).unwrap();
    assert!(out.warnings.is_empty(), "unexpected warnings: {:?}", out.warnings);
    assert_eq!(out.analysis.dropped_rows, 3);
}

#[test]
fn prefixed_original_column_does_not_shadow_metric() {
    let text = "contributors_a;contributors\n\
100;\"{\"\"a\"\": 1 \"\"b\"\": 10}\"\n\
100;\"{\"\"a\"\": 2 \"\"b\"\": 20}\"\n\
100;\"{\"\"a\"\": 3 \"\"b\"\": 35}\"\n";
    let table = load_fixture(text);

    let out = run(&table, &PipelineConfig::default()).unwrap();
    assert_eq!(out.summary.features, vec!["contributors_a", "contributors_b"]);
    // Variance of the parsed `a` metric, not of the constant original column.
    assert!(close(out.analysis.covariance.get(0, 0), 1.0));
}

#[test]
fn inspect_hook_sees_flat_table_before_analysis_fails() {
    let text = "id;contributors\nr1;\"{\"\"a\"\": 1}\"\nr2;oops\n";
    let table = load_fixture(text);

    let mut seen = None;
    let err = run_with(&table, &PipelineConfig::default(), |flat| {
        seen = Some((flat.table.metric_columns.clone(), flat.warnings.len()));
    })
    .unwrap_err();

    assert!(err.is_insufficient_data());
    assert_eq!(seen, Some((vec!["contributors_a".to_string()], 1)));
}
