//! streamgate binary entry point
//!
//! ```bash
//! streamgate streams tt1877830 --json
//! streamgate check <hash>…
//! streamgate resolve <hash> --store rd
//! ```
//!
//! Logging is controlled with STREAMGATE_LOG (tracing env-filter syntax).

// Allow dead code for exit codes reserved for future subcommands
#![allow(dead_code)]

mod cli;
mod commands;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Command};
use streamgate::Config;

#[tokio::main]
async fn main() -> std::process::ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env("STREAMGATE_LOG")
                .unwrap_or_else(|_| EnvFilter::new("streamgate=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = Config::load();

    let code = match cli.command {
        Command::Streams { id, cached_only } => {
            commands::cmd_streams(config, &id, cached_only, cli.json).await
        }
        Command::Check { hashes } => commands::cmd_check(config, &hashes, cli.json).await,
        Command::Resolve {
            hash,
            store,
            file_idx,
            file_name,
            sid,
            pattern,
        } => {
            commands::cmd_resolve(
                config, &hash, &store, file_idx, file_name, sid, pattern, cli.json,
            )
            .await
        }
    };

    code.into()
}
