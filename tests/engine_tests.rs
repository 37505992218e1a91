use simplot::engine::Engine;
use simplot::model::{AsyncView, Dataset, RunConfig, ASYNC_FAMILIES};
use simplot::storage::read_gnuplot;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn write(root: &Path, rel: &str, content: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

fn run(root: &Path, dataset: Dataset) -> simplot::model::RunResult {
    Engine::new(RunConfig {
        root: root.to_path_buf(),
        dataset,
    })
    .run()
    .unwrap()
}

fn column(rows: &[Vec<f64>], i: usize) -> Vec<f64> {
    rows.iter().map(|r| r[i]).collect()
}

const CHURN_LOG: &str = "\
0 join 1 3 [1,2,9]
10 fail -1 1 [2]
20 join 1 2 [4,5]
30 leave -1 2 [1,9]
";

fn async_fixture() -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    let log: String = (1..=20).map(|t| format!("{} {}\n", t * 5, t % 2 + 1)).collect();
    for name in ASYNC_FAMILIES {
        write(dir.path(), &format!("async-plot/data/original/{name}.dat"), &log);
    }
    dir
}

#[test]
fn churn_totals_are_prefix_sums() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "churn-plot/churn.dat", CHURN_LOG);

    let result = run(dir.path(), Dataset::Churn);
    assert_eq!(result.outputs.len(), 1);

    let (caption, rows) =
        read_gnuplot(&dir.path().join("churn-plot/churn-transformed.dat")).unwrap();
    assert_eq!(caption, "Churn");
    assert_eq!(column(&rows, 0), vec![0.0, 10.0, 20.0, 30.0]);
    assert_eq!(column(&rows, 1), vec![3.0, 2.0, 4.0, 2.0]);
}

#[test]
fn churn_from_one_process_perspective() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "churn-plot/churn.dat", CHURN_LOG);

    run(dir.path(), Dataset::ChurnProcess { id: 9 });
    let path = dir.path().join("churn-plot/churn-transformed-process_perspective.dat");
    let (_, rows) = read_gnuplot(&path).unwrap();
    assert_eq!(column(&rows, 0), vec![0.0, 30.0]);
    assert_eq!(column(&rows, 1), vec![1.0, 0.0]);
}

#[test]
fn latency_cdfs_for_both_families() {
    let dir = tempfile::tempdir().unwrap();
    let constant = "50\n".repeat(10);
    let matrix: String = (1..=100).map(|v| format!("{v}\n")).collect();
    write(dir.path(), "network-plot/latency-constant.dat", &constant);
    write(dir.path(), "network-plot/latency-matrix.dat", &matrix);

    let result = run(dir.path(), Dataset::Latency);
    assert_eq!(result.outputs.len(), 2);

    let (caption, rows) =
        read_gnuplot(&dir.path().join("network-plot/latency-matrix-cdf.dat")).unwrap();
    assert_eq!(caption, "Matrix network latency");
    // 41 evaluation points, 40 frequency buckets: the export stops at the shorter
    assert_eq!(rows.len(), 40);
    assert_eq!(rows[0][0], 1.0);
    let freqs = column(&rows, 1);
    assert!(freqs.windows(2).all(|w| w[0] <= w[1]));
    assert_eq!(*freqs.last().unwrap(), 1.0);

    let (caption, _) =
        read_gnuplot(&dir.path().join("network-plot/latency-constant-cdf.dat")).unwrap();
    assert_eq!(caption, "Constant network latency");
}

#[test]
fn async_views_write_to_their_directories() {
    let dir = async_fixture();
    for (view, rel) in [
        (AsyncView::Cdf, "cdf/no-async.dat"),
        (AsyncView::Values, "values-cdf/uniform-async.dat"),
        (AsyncView::Delta, "delta/normal-async.dat"),
        (AsyncView::Process { id: 2 }, "cdf-process_perspective/weibull-async2.dat"),
    ] {
        let result = run(dir.path(), Dataset::Async(view));
        assert_eq!(result.outputs.len(), ASYNC_FAMILIES.len());
        let path = dir.path().join("async-plot/data").join(rel);
        let (caption, rows) = read_gnuplot(&path).unwrap();
        assert_eq!(caption, "Asynchrony");
        assert_eq!(rows.len(), 10, "{rel}");
    }
}

#[test]
fn async_precision_uses_library_default() {
    let dir = async_fixture();
    run(dir.path(), Dataset::Async(AsyncView::Precision));
    let (_, rows) =
        read_gnuplot(&dir.path().join("async-plot/data/1000precision/no-async.dat")).unwrap();
    assert_eq!(rows.len(), 1000);
}

#[test]
fn async_process_filter_keeps_only_that_process() {
    let dir = async_fixture();
    let result = run(dir.path(), Dataset::Async(AsyncView::Process { id: 1 }));
    // even times belong to process 1
    let summary = result.outputs[0].summary.unwrap();
    assert_eq!(summary.count, 10);
    assert_eq!(summary.min, 10.0);
    assert_eq!(summary.max, 100.0);
}

#[test]
fn async_delta_uses_gaps_per_process() {
    let dir = async_fixture();
    let result = run(dir.path(), Dataset::Async(AsyncView::Delta));
    // each process logs every 10 time units, starting at 5 and 10
    let summary = result.outputs[0].summary.unwrap();
    assert_eq!(summary.count, 20);
    assert_eq!(summary.min, 5.0);
    assert_eq!(summary.max, 10.0);
    assert_eq!(summary.median, 10.0);
}

#[test]
fn async_cdf_reads_single_column_logs() {
    let dir = tempfile::tempdir().unwrap();
    let log: String = (1..=20).map(|t| format!("{}\n", t * 5)).collect();
    for name in ASYNC_FAMILIES {
        write(dir.path(), &format!("async-plot/data/original/{name}.dat"), &log);
    }

    let result = run(dir.path(), Dataset::Async(AsyncView::Cdf));
    assert_eq!(result.outputs[0].summary.unwrap().count, 20);

    // the per-process views still need the process column
    assert!(Engine::new(RunConfig {
        root: dir.path().to_path_buf(),
        dataset: Dataset::Async(AsyncView::Delta),
    })
    .run()
    .is_err());
}

#[test]
fn churn_times_are_written_as_logged() {
    let dir = tempfile::tempdir().unwrap();
    write(
        dir.path(),
        "churn-plot/churn.dat",
        "9007199254740993 join 1 2 [1]\n9007199254740995 leave -1 1 [1]\n",
    );

    run(dir.path(), Dataset::Churn);
    let text = fs::read_to_string(dir.path().join("churn-plot/churn-transformed.dat")).unwrap();
    assert_eq!(text, "Churn\n9007199254740993\t2\n9007199254740995\t1\n");
}

#[test]
fn missing_input_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let err = Engine::new(RunConfig {
        root: dir.path().to_path_buf(),
        dataset: Dataset::Churn,
    })
    .run()
    .unwrap_err();
    assert!(format!("{err:#}").contains("churn.dat"));
}

#[test]
fn malformed_line_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "churn-plot/churn.dat", "0 join 1 three [1]\n");
    assert!(Engine::new(RunConfig {
        root: dir.path().to_path_buf(),
        dataset: Dataset::Churn,
    })
    .run()
    .is_err());
}

#[test]
fn latency_table_from_matrix_is_extended() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "matrix.dat", "0 10 20\n10 0 30\n20 30 0\n");

    let result = run(
        dir.path(),
        Dataset::LatencyTable {
            input: Some(dir.path().join("matrix.dat")),
            nodes: Some(4),
            default_latency: 100,
            seed: 3,
        },
    );
    assert_eq!(result.median_latency, Some(20));
    let out = &result.outputs[0];
    // 4 nodes, 12 links
    assert_eq!(out.summary.unwrap().count, 12);
    assert!(out.output.ends_with("network-plot/latency-table-cdf.dat"));
}

#[test]
fn latency_table_without_matrix_is_constant() {
    let dir = tempfile::tempdir().unwrap();
    let result = run(
        dir.path(),
        Dataset::LatencyTable {
            input: None,
            nodes: Some(3),
            default_latency: 75,
            seed: 0,
        },
    );
    assert_eq!(result.median_latency, Some(75));
    let summary = result.outputs[0].summary.unwrap();
    assert_eq!(summary.count, 6);
    assert_eq!(summary.min, 75.0);
    assert_eq!(summary.max, 75.0);
}

#[test]
fn summary_writes_percentile_table() {
    let dir = tempfile::tempdir().unwrap();
    let log: String = (0..=100).map(|v| format!("{v} 1\n")).collect();
    write(dir.path(), "samples.dat", &log);

    let result = run(
        dir.path(),
        Dataset::Summary {
            input: dir.path().join("samples.dat"),
        },
    );
    assert_eq!(result.outputs[0].percentiles.len(), 9);

    let (caption, rows) = read_gnuplot(&dir.path().join("samples-percentiles.dat")).unwrap();
    assert_eq!(caption, "Percentiles of samples");
    assert_eq!(column(&rows, 0), column(&rows, 1));
}

#[test]
fn average_of_ragged_runs_is_left_padded() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "run1.dat", "1\n2\n");
    write(dir.path(), "run2.dat", "1\n2\n3\n");
    let output = dir.path().join("avg/average.dat");

    let result = run(
        dir.path(),
        Dataset::Average {
            inputs: vec![dir.path().join("run1.dat"), dir.path().join("run2.dat")],
            output: output.clone(),
        },
    );
    assert_eq!(result.outputs[0].rows, 3);

    let (caption, rows) = read_gnuplot(&output).unwrap();
    assert_eq!(caption, "Average of 2 runs");
    assert_eq!(column(&rows, 0), vec![0.0, 1.0, 2.0]);
    assert_eq!(column(&rows, 1), vec![0.5, 1.5, 2.5]);
}
