//! OceanStor Exporter
//!
//! Scrapes one Huawei OceanStor array and prints its metrics in Prometheus
//! exposition format, or serves them over HTTP with `--listen`.
//!
//! Exit status on failure: 2 configuration, 3 authentication, 4 transport,
//! 5 malformed response, 6 unknown status code, 70 internal, 74 I/O.

use clap::{ArgAction, Parser};
use std::io::Write;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, info_span, Instrument, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use oceanstor_exporter::{
    config::DEFAULT_TIMEOUT_SECS, render, server::run_metrics_server, CollectorRegistry,
    ConfigFile, Exporter, OceanStorClient, Pipeline, Result, Target,
};

// =============================================================================
// CLI Arguments
// =============================================================================

/// Huawei OceanStor storage exporter
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Target configuration file (YAML)
    #[arg(short, long, env = "OCEANSTOR_CONFIG")]
    config: PathBuf,

    /// Target to scrape, as named in the configuration file
    #[arg(short, long, env = "OCEANSTOR_TARGET")]
    target: String,

    /// Connection and request timeout in seconds
    #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECS, value_parser = clap::value_parser!(u64).range(1..))]
    timeout: u64,

    /// Serve metrics over HTTP on this address instead of printing once
    #[arg(short = 'a', long, env = "OCEANSTOR_LISTEN")]
    listen: Option<SocketAddr>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "LOG_LEVEL", default_value = "warn")]
    log_level: String,

    /// Output logs as JSON
    #[arg(long, env = "LOG_JSON")]
    log_json: bool,

    /// Raise the log level, once per occurrence
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

// =============================================================================
// Main
// =============================================================================

#[tokio::main]
async fn main() {
    let args = Args::parse();

    // Logs go to stderr; stdout carries only exposition text
    init_logging(&args);

    if let Err(e) = run(args).await {
        error!("{}", e);
        std::process::exit(e.exit_code());
    }
}

async fn run(args: Args) -> Result<()> {
    let registry = CollectorRegistry::new();
    let config = ConfigFile::load(&args.config)?;
    let target = config.target(&args.target, &registry, Duration::from_secs(args.timeout))?;

    info!("Starting OceanStor exporter");
    info!("  Version: {}", oceanstor_exporter::VERSION);
    info!("  Target: {} ({})", target.name, target.client.base_url());
    info!("  Modules: {}", target.modules.join(","));

    match args.listen {
        Some(addr) => {
            let exporter = Arc::new(Exporter::new(target, registry)?);
            run_metrics_server(addr, exporter).await
        }
        None => scrape_once(target, registry).await,
    }
}

/// Scrape the target once and print the result
async fn scrape_once(target: Target, registry: CollectorRegistry) -> Result<()> {
    let span = info_span!("target", host = %target.client.host);
    let records = async {
        let mut client = OceanStorClient::new(&target.client)?;
        Pipeline::new(registry, target.modules.clone())
            .scrape(&mut client)
            .await
    }
    .instrument(span)
    .await?;

    let mut stdout = std::io::stdout().lock();
    stdout.write_all(render(&records).as_bytes())?;
    stdout.flush()?;
    Ok(())
}

// =============================================================================
// Logging Setup
// =============================================================================

fn init_logging(args: &Args) {
    const LEVELS: [Level; 5] = [
        Level::ERROR,
        Level::WARN,
        Level::INFO,
        Level::DEBUG,
        Level::TRACE,
    ];

    let base = match args.log_level.to_lowercase().as_str() {
        "trace" => 4,
        "debug" => 3,
        "info" => 2,
        "error" => 0,
        _ => 1,
    };
    let level = LEVELS[(base + args.verbose as usize).min(LEVELS.len() - 1)];

    let mut filter = EnvFilter::from_default_env().add_directive(level.into());
    if level < Level::DEBUG {
        for directive in ["hyper=warn", "reqwest=warn"] {
            if let Ok(directive) = directive.parse() {
                filter = filter.add_directive(directive);
            }
        }
    }

    if args.log_json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
            .init();
    }
}
