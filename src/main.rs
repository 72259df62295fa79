//! TPC-DS benchmark driver entry point

use clap::Parser;
use tracing::info;

use tpcds_runner::benchmark::LogReporter;
use tpcds_runner::{run_benchmark, Args, BenchmarkConfig, DataFusionSession};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    init_logging(&args.log_level);

    let config = BenchmarkConfig::from_args(args)?;
    info!("Configuration loaded: {:?}", config);

    let mut session = DataFusionSession::from_config(&config)?;
    let mut reporter = LogReporter;

    let report = run_benchmark(&config, &mut session, &mut reporter).await?;

    match report.metric {
        Some(metric) => info!("{} = {:.3}", metric.name, metric.value),
        None => info!("Run {} finished without a result metric", report.run_id),
    }

    Ok(())
}

/// Initialize logging; RUST_LOG takes precedence over --log-level
fn init_logging(log_level: &str) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_line_number(true)
        .init();
}
