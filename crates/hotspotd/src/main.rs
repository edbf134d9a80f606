//! hotspotd: the hotspot scheduling daemon.
//!
//! Single binary that assembles every hotspot subsystem:
//! - Forecast fetch loop (placement or autoscale mode)
//! - Window dispatcher + placement task queue
//! - Schedule host polling the region placement schedulers
//! - Read-only status API
//!
//! # Usage
//!
//! ```text
//! hotspotd run --config hotspot.toml --topology cluster.json --port 8590
//! hotspotd config > hotspot.toml
//! ```

mod daemon;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use hotspot_core::HotspotConfig;

#[derive(Parser)]
#[command(name = "hotspotd", about = "Predictive hot-region placement daemon")]
struct Cli {
    /// Emit logs as JSON lines.
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the daemon.
    Run {
        /// Path to hotspot.toml. Defaults apply when omitted.
        #[arg(long)]
        config: Option<PathBuf>,

        /// JSON cluster topology snapshot to schedule against.
        #[arg(long)]
        topology: Option<PathBuf>,

        /// Override the status API port.
        #[arg(long)]
        port: Option<u16>,
    },
    /// Print the default configuration as TOML.
    Config,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_json);

    match cli.command {
        Command::Run {
            config,
            topology,
            port,
        } => {
            let mut cfg = match &config {
                Some(path) => HotspotConfig::from_file(path)?,
                None => HotspotConfig::default(),
            };
            if let Some(port) = port {
                cfg.api.listen_addr.set_port(port);
            }
            daemon::run(cfg, topology).await
        }
        Command::Config => {
            print!("{}", HotspotConfig::default().to_toml_string()?);
            Ok(())
        }
    }
}

fn init_tracing(json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,hotspotd=debug,hotspot=debug"));

    if json {
        tracing_subscriber::fmt().json().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}
