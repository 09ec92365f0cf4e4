//! # docsim CLI
//!
//! ```bash
//! docsim --config ./config/docsim.toml <command>
//! ```
//!
//! | Command | Description |
//! |---------|-------------|
//! | `docsim serve` | Start the HTTP server |
//! | `docsim compare <file1> <file2>` | Score two local documents |
//! | `docsim normalize <file>` | Print the normalized form of a document |
//!
//! Logging is controlled with `RUST_LOG` (default `info`); set
//! `RUST_LOG=docsim_core=debug` to see every chunk-pair similarity.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use docsim::{compare_cmd, config, server};

/// docsim — semantic similarity of two documents.
///
/// All commands accept a `--config` flag pointing to a TOML configuration
/// file. Built-in defaults are used when the file does not exist.
#[derive(Parser)]
#[command(
    name = "docsim",
    about = "docsim — score the semantic similarity of two documents",
    version
)]
struct Cli {
    /// Path to configuration file (TOML).
    #[arg(long, global = true, default_value = "./config/docsim.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server.
    ///
    /// Loads language resources and the embedding model, then binds to
    /// `[server].bind`.
    Serve,

    /// Score two local documents.
    Compare {
        file1: PathBuf,
        file2: PathBuf,

        /// Print the HTTP response shape as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Print the normalized form of a document.
    Normalize { file: PathBuf },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let cfg = config::load_config_or_default(&cli.config)?;

    match cli.command {
        Commands::Serve => {
            server::run_server(&cfg).await?;
        }
        Commands::Compare { file1, file2, json } => {
            compare_cmd::run_compare(&cfg, &file1, &file2, json).await?;
        }
        Commands::Normalize { file } => {
            compare_cmd::run_normalize(&cfg, &file)?;
        }
    }

    Ok(())
}
