//! Filer Share Exporter
//!
//! Polls the configured filers on an interval and serves per-volume metrics
//! labeled with the owning share and project.

use clap::Parser;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use filer_share_exporter::exporter::run_metrics_server;
use filer_share_exporter::{
    Collector, Error, ExporterConfig, PollSettings, Result, VolumeMetrics,
};

// =============================================================================
// CLI Arguments
// =============================================================================

/// Filer Share Exporter - per-volume capacity metrics correlated to shares
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path of the filer configuration file
    #[arg(long, env = "FILER_CONFIG", default_value = "filers.yaml")]
    config: String,

    /// Metrics server bind address
    #[arg(long, env = "LISTEN_ADDR", default_value = "0.0.0.0:9108")]
    listen: String,

    /// Poll interval in seconds
    #[arg(long, env = "POLL_INTERVAL", default_value = "300")]
    interval_secs: u64,

    /// Records requested per page
    #[arg(long, env = "PAGE_SIZE", default_value = "500")]
    page_size: u32,

    /// Page cap per filer (0 = unbounded)
    #[arg(long, env = "MAX_PAGES", default_value = "0", allow_negative_numbers = true)]
    max_pages: i64,

    /// Poll once, print records as JSON lines, and exit
    #[arg(long)]
    once: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    log_level: String,

    /// Output logs as JSON
    #[arg(long, env = "LOG_JSON")]
    log_json: bool,
}

// =============================================================================
// Main
// =============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(&args);

    info!("Starting Filer Share Exporter");
    info!("  Version: {}", filer_share_exporter::VERSION);
    info!("  Config: {}", args.config);
    info!("  Interval: {}s", args.interval_secs);

    let config = ExporterConfig::from_file(&args.config)?;
    info!("Loaded {} filer(s)", config.filers.len());

    let settings = PollSettings {
        page_size: args.page_size,
        max_pages: args.max_pages,
    };
    let metrics = Arc::new(VolumeMetrics::new()?);
    let collector = Collector::from_config(&config, settings, metrics.clone())?;

    if args.once {
        return print_once(&collector).await;
    }

    let listen = args.listen.clone();
    let server_metrics = metrics.clone();
    tokio::spawn(async move {
        if let Err(e) = run_metrics_server(&listen, server_metrics).await {
            error!("Metrics server error: {}", e);
        }
    });

    tokio::select! {
        _ = collector.run(Duration::from_secs(args.interval_secs)) => {}
        _ = tokio::signal::ctrl_c() => info!("Shutdown signal received"),
    }

    info!("Exporter shutdown complete");
    Ok(())
}

async fn print_once(collector: &Collector) -> Result<()> {
    let mut failed = 0;
    for poll in collector.poll_once().await {
        match poll.result {
            Ok(records) => {
                for record in records {
                    println!("{}", serde_json::to_string(&record)?);
                }
            }
            Err(_) => failed += 1,
        }
    }

    if failed > 0 {
        return Err(Error::Internal(format!("{} filer(s) could not be polled", failed)));
    }
    Ok(())
}

// =============================================================================
// Logging Setup
// =============================================================================

fn init_logging(args: &Args) {
    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let mut filter = EnvFilter::from_default_env().add_directive(level.into());
    for directive in ["hyper=warn", "reqwest=warn"] {
        if let Ok(directive) = directive.parse() {
            filter = filter.add_directive(directive);
        }
    }

    if args.log_json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_target(true))
            .init();
    }
}
