//! Stackyard CLI - run and inspect the warehouse simulation.

mod commands;
mod config;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "stackyard")]
#[command(author, version, about = "Stackyard - cooperating robots stacking warehouse boxes", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file (default: stackyard.toml in this or a parent directory)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default stackyard.toml
    Init {
        /// Project directory (default: current directory)
        #[arg(short, long)]
        path: Option<String>,
    },

    /// Run the simulation until every robot is idle
    Run {
        /// Tick limit (default: run.max_ticks from the config)
        #[arg(short, long)]
        ticks: Option<u64>,

        /// Layout seed
        #[arg(short, long)]
        seed: Option<u64>,

        /// Print an ASCII frame after every tick
        #[arg(short, long)]
        render: bool,

        /// Write the final report as JSON
        #[arg(short, long)]
        json: Option<PathBuf>,
    },

    /// Print a single frame
    Snapshot {
        /// Layout seed
        #[arg(short, long)]
        seed: Option<u64>,

        /// Ticks to run before taking the frame
        #[arg(short, long, default_value = "0")]
        ticks: u64,

        /// Print the frame as JSON instead of ASCII
        #[arg(long)]
        json: bool,
    },
}

fn init_tracing(verbose: bool) {
    let fallback = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let config = cli.config.as_deref();

    match cli.command {
        Commands::Init { path } => commands::init::run(path),
        Commands::Run {
            ticks,
            seed,
            render,
            json,
        } => {
            commands::run::run(commands::run::RunOptions {
                config,
                ticks,
                seed,
                render,
                json,
                verbose: cli.verbose,
            })
            .await
        }
        Commands::Snapshot { seed, ticks, json } => {
            commands::snapshot::run(config, seed, ticks, json).await
        }
    }
}
