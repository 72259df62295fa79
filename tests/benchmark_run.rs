/// End-to-end runs driven from command-line arguments against a mock session
use tpcds_runner::benchmark::{run_benchmark, AggregateMetric, RESULT_METRIC_NAME};
use tpcds_runner::config::{Args, BenchmarkConfig};
use tpcds_runner::query::mock::MockSession;
use tpcds_runner::{select_catalog, BenchError, CatalogTier};

fn config_from(argv: &[&str]) -> BenchmarkConfig {
    let args = <Args as clap::Parser>::try_parse_from(
        std::iter::once("tpcds-runner").chain(argv.iter().copied()),
    )
    .expect("arguments should parse");
    BenchmarkConfig::from_args(args).expect("config should be valid")
}

#[tokio::test]
async fn test_median_sum_over_cherry_picked_queries() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().to_string_lossy().into_owned();
    let config = config_from(&[
        "--format", "parquet",
        "--scale-in-gb", "1000",
        "--benchmark-path", &path,
        "--cherryPickedQueries", "3,39",
        "--no-save-results",
    ]);

    let mut session = MockSession::new()
        .with_durations("q3", &[100.0, 300.0, 200.0])
        .with_durations("q39a", &[50.0, 10.0, 30.0])
        .with_durations("q39b", &[400.0, 400.0, 400.0]);
    let mut reported: Vec<AggregateMetric> = Vec::new();

    let report = run_benchmark(&config, &mut session, &mut reported).await.unwrap();

    assert_eq!(report.tier, CatalogTier::V2_4);
    assert_eq!(report.database, "tpcds_sf1000_parquet");
    assert_eq!(session.database(), Some("tpcds_sf1000_parquet"));
    assert_eq!(reported.len(), 1);
    assert_eq!(reported[0].name, RESULT_METRIC_NAME);
    // 0.2 + 0.03 + 0.4
    assert!((reported[0].value - 0.63).abs() < 1e-9);
}

#[tokio::test]
async fn test_range_selection_with_skips() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().to_string_lossy().into_owned();
    let config = config_from(&[
        "--format", "csv",
        "--scale-in-gb", "10000",
        "--benchmark-path", &path,
        "--iterations", "1",
        "--queryOffset", "40",
        "--queryLimit", "15",
        "--skippedQueries", "43",
        "--no-save-results",
    ]);

    let mut session = MockSession::new();
    let mut reported: Vec<AggregateMetric> = Vec::new();
    let report = run_benchmark(&config, &mut session, &mut reported).await.unwrap();

    assert_eq!(report.tier, CatalogTier::V2_4Sf10000);
    let executed: Vec<&str> = session.executed().iter().map(|(n, _)| n.as_str()).collect();
    assert_eq!(executed, vec!["q42", "q52", "q55"]);
}

#[tokio::test]
async fn test_every_iteration_runs_the_same_queries() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().to_string_lossy().into_owned();
    let config = config_from(&[
        "--format", "parquet",
        "--scale-in-gb", "1",
        "--benchmark-path", &path,
        "--iterations", "4",
    ]);

    let mut session = MockSession::new();
    let mut reported: Vec<AggregateMetric> = Vec::new();
    let report = run_benchmark(&config, &mut session, &mut reported).await.unwrap();

    let catalog = select_catalog(1);
    assert_eq!(report.results.len(), catalog.len() * 4);
    for summary in &report.summaries {
        assert_eq!(summary.runs, 4, "{}", summary.name);
    }
    // Default mock duration is 100ms for every query
    assert!((reported[0].value - 0.1 * catalog.len() as f64).abs() < 1e-9);

    let saved = dir.path().join("results").join(report.file_name());
    let parsed: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(saved).unwrap()).unwrap();
    assert_eq!(parsed["iterations"], 4);
}

#[tokio::test]
async fn test_single_failure_suppresses_metric() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().to_string_lossy().into_owned();
    let config = config_from(&[
        "--format", "parquet",
        "--scale-in-gb", "1",
        "--benchmark-path", &path,
        "--no-save-results",
    ]);

    let mut session = MockSession::new().with_failure("q98", "Execution error: out of memory");
    let mut reported: Vec<AggregateMetric> = Vec::new();
    let report = run_benchmark(&config, &mut session, &mut reported).await.unwrap();

    assert!(reported.is_empty());
    assert!(report.metric.is_none());
    // Queries after the failing one still ran
    assert_eq!(report.results.len(), select_catalog(1).len() * 3);
}

#[test]
fn test_missing_format_is_rejected_before_running() {
    let err = BenchmarkConfig::builder()
        .scale_in_gb(1)
        .benchmark_path("/tmp")
        .build()
        .unwrap_err();
    assert!(matches!(err, BenchError::MissingOption("format")));
}
