use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing::{debug, error, info, Level};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use datadict::config::RunConfig;
use datadict::pipeline::RunSummary;

#[derive(Parser, Debug)]
#[command(name = "datadict")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to .env file for connection config
    #[arg(long, default_value = "./.env")]
    env_file: PathBuf,

    /// Verbose output (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    if let Err(e) = run().await {
        error!(error = ?e, "Fatal error");
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();

    init_tracing(cli.verbose);

    info!("datadict v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let config = RunConfig::load(&cli.env_file).context("Failed to load configuration")?;
    debug!(connection = ?config.redacted_connection_string(), "Loaded configuration");
    info!(
        output = ?config.output_dir,
        databases = ?config.database_filter,
        pii_protection = config.pii_protection,
        "Starting data dictionary generation"
    );

    let summary = generate(&config).await?;

    if summary.tables_skipped > 0 || summary.databases_failed > 0 {
        info!(
            tables_skipped = summary.tables_skipped,
            databases_failed = summary.databases_failed,
            "Finished with per-table errors, see log above"
        );
    }

    Ok(())
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };

    // Honor RUST_LOG, but keep sqlx statement logging at warn
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::from_level(level).into())
        .from_env_lossy()
        .add_directive("sqlx=warn".parse().expect("Failed to parse log directive"));

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("Failed to set tracing subscriber");
}

#[cfg(feature = "mysql")]
async fn generate(config: &RunConfig) -> Result<RunSummary> {
    use datadict::pipeline::Pipeline;
    use datadict::MySqlCatalog;

    let mut catalog = MySqlCatalog::connect(config).await.with_context(|| {
        format!(
            "Failed to connect to MySQL at {}",
            config.redacted_connection_string()
        )
    })?;

    let result = Pipeline::new(config).run(&mut catalog).await;

    // Close on every path, including a failed enumeration
    if let Err(e) = catalog.close().await {
        error!(error = %e, "Failed to close connection");
    }

    result.context("Failed to enumerate databases")
}

#[cfg(not(feature = "mysql"))]
async fn generate(_config: &RunConfig) -> Result<RunSummary> {
    anyhow::bail!("MySQL support not enabled. Rebuild with --features mysql")
}
