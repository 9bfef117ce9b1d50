mod bars;
mod config;
mod error;
mod producer;

use clap::{Parser, Subcommand};
use config::Settings;
use error::RuntimeError;
use std::{net::SocketAddr, path::PathBuf};
use tickstream_bus::{InMemoryBus, Topic};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "tickstream", about = "Cryptocurrency trade ingestion and bar-construction pipeline")]
struct Cli {
    /// Path to the YAML configuration file.
    #[arg(long, env = "TICKSTREAM_CONFIG", default_value = "config.yaml")]
    config: PathBuf,

    /// Address the observability sidecar's Prometheus scrape endpoint listens on.
    #[arg(long, env = "TICKSTREAM_METRICS_ADDR", default_value = "127.0.0.1:9000")]
    metrics_addr: SocketAddr,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the Trade Producer only, against a fresh in-process bus.
    ///
    /// Useful for exercising adapter configuration in isolation; without a real broker
    /// implementation of `tickstream_bus::Producer`, trades published here are not visible to a
    /// separately launched `build-bars` process.
    Produce,

    /// Run the Bar Builder only, against a fresh (and therefore empty) in-process bus.
    BuildBars,

    /// Run the Trade Producer and Bar Builder together in one process, wired through a shared
    /// in-memory bus - the supported single-process deployment mode until a production broker
    /// client is substituted in behind the same `Producer`/`Consumer` traits.
    Run,
}

#[tokio::main]
async fn main() {
    std::process::exit(run().await);
}

async fn run() -> i32 {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .json()
        .init();

    let cli = Cli::parse();

    match execute(cli).await {
        Ok(()) => {
            info!("shutdown complete");
            0
        }
        Err(error) => {
            tracing::error!(%error, "fatal error, exiting");
            error.exit_code()
        }
    }
}

async fn execute(cli: Cli) -> Result<(), RuntimeError> {
    let settings = Settings::load(&cli.config)?;
    tickstream_metrics::install_sidecar(cli.metrics_addr)?;

    let bus = InMemoryBus::default();

    match cli.command {
        Command::Produce => producer::run(&settings, bus.producer()).await,
        Command::BuildBars => run_bar_builder(&settings, &bus).await,
        Command::Run => {
            let settings_for_producer = settings.clone();
            let bus_for_producer = bus.clone();

            let produce_task =
                tokio::spawn(async move { producer::run(&settings_for_producer, bus_for_producer.producer()).await });

            run_bar_builder(&settings, &bus).await?;
            let _ = produce_task.await;
            Ok(())
        }
    }
}

async fn run_bar_builder(settings: &Settings, bus: &InMemoryBus) -> Result<(), RuntimeError> {
    let trades_topic = Topic::new(settings.kafka.input_topic.clone());
    let group = bars::consumer_group(settings);
    let consumer = bus.consumer::<tickstream_instrument::trade::Trade>(trades_topic, group, bars::offset_store());

    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel();
    tokio::spawn(async move {
        let _ = tokio::signal::ctrl_c().await;
        let _ = shutdown_tx.send(());
    });

    bars::run(settings, consumer, bus.producer(), shutdown_rx).await
}
