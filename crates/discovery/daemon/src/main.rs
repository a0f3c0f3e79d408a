//! discoveryd - program discovery daemon
//!
//! Two modes:
//! - `serve`: HTTP API accepting discovery runs
//! - `run`: a single run from files, printing the best candidate as JSON

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use discovery_daemon::api::handlers::ProcessResponse;
use discovery_daemon::{DaemonConfig, DaemonError, DaemonResult, DiscoveryEngine, DiscoveryRequest, Server};
use discovery_oracle::OracleBackend;
use tokio::sync::watch;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// discoveryd CLI
#[derive(Parser)]
#[command(name = "discoveryd")]
#[command(about = "Evolves programs against an evaluator with an LLM oracle", long_about = None)]
#[command(version)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, env = "DISCOVERY_CONFIG", global = true)]
    config: Option<String>,

    /// Log level (overrides the configuration file)
    #[arg(long, env = "DISCOVERY_LOG_LEVEL", global = true)]
    log_level: Option<String>,

    /// Enable JSON logging
    #[arg(long, env = "DISCOVERY_LOG_JSON", global = true)]
    json: bool,

    /// Oracle backend: simulated or gemini
    #[arg(long, global = true)]
    oracle: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Serve the HTTP API
    Serve {
        /// Listen address
        #[arg(short, long, env = "DISCOVERY_LISTEN_ADDR")]
        listen: Option<String>,
    },

    /// Run one discovery from files and print the result
    Run {
        /// Initial program
        #[arg(long)]
        program: PathBuf,

        /// Initial guidance prompt
        #[arg(long)]
        prompt: PathBuf,

        /// Python source defining `evaluator(program, result)`
        #[arg(long)]
        evaluator: Option<PathBuf>,

        /// Number of generations
        #[arg(long)]
        generations: Option<usize>,

        /// Seed for parent sampling
        #[arg(long)]
        seed: Option<u64>,
    },
}

/// Log subscriber writing through `writer`, JSON or human-readable.
fn subscriber<W>(level: &str, json: bool, writer: W) -> Box<dyn tracing::Subscriber + Send + Sync>
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| level.to_string().into());
    let registry = tracing_subscriber::registry().with(env_filter);

    if json {
        Box::new(registry.with(tracing_subscriber::fmt::layer().json().with_writer(writer)))
    } else {
        Box::new(registry.with(tracing_subscriber::fmt::layer().with_writer(writer)))
    }
}

/// Logs go to stderr; stdout is reserved for `run` output.
fn init_tracing(level: &str, json: bool) {
    subscriber(level, json, std::io::stderr).init();
}

fn parse_backend(name: &str) -> DaemonResult<OracleBackend> {
    match name.to_lowercase().as_str() {
        "simulated" | "sim" => Ok(OracleBackend::Simulated),
        "gemini" => Ok(OracleBackend::Gemini),
        other => Err(DaemonError::Config(format!("Unknown oracle backend: {}", other))),
    }
}

#[tokio::main]
async fn main() -> DaemonResult<()> {
    let cli = Cli::parse();

    let mut config = DaemonConfig::load(cli.config.as_deref())?;

    // Override with CLI args
    if let Some(level) = &cli.log_level {
        config.logging.level = level.clone();
    }
    config.logging.json |= cli.json;
    if let Some(backend) = &cli.oracle {
        config.oracle.backend = parse_backend(backend)?;
    }

    init_tracing(&config.logging.level, config.logging.json);

    match cli.command {
        Command::Serve { listen } => {
            if let Some(listen) = listen {
                config.server.listen_addr = listen
                    .parse()
                    .map_err(|e| DaemonError::Config(format!("Invalid listen address: {}", e)))?;
            }
            Server::new(config)?.run().await
        }
        Command::Run {
            program,
            prompt,
            evaluator,
            generations,
            seed,
        } => {
            if seed.is_some() {
                config.population.seed = seed;
            }
            let request = DiscoveryRequest {
                evaluator_program: evaluator.map(std::fs::read_to_string).transpose()?,
                initial_program: std::fs::read_to_string(program)?,
                initial_base_prompt: std::fs::read_to_string(prompt)?,
                generations,
            };
            run_once(&config, request).await
        }
    }
}

async fn run_once(config: &DaemonConfig, request: DiscoveryRequest) -> DaemonResult<()> {
    let engine = DiscoveryEngine::from_config(config)?;

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Received Ctrl+C, cancelling run");
            let _ = shutdown_tx.send(true);
        }
    });

    let report = engine.run(&request, Some(shutdown_rx)).await?;
    let response = ProcessResponse {
        status: "completed".to_string(),
        result: report.best.clone(),
        report,
    };
    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(())
}
