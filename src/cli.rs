//! CLI - Command Line Interface for streamgate
//!
//! Every pipeline stage is scriptable. All output is JSON-parseable with
//! `--json`.
//!
//! # Examples
//!
//! ```bash
//! # Aggregate + cache-check streams for a movie
//! streamgate streams tt1877830 --json
//!
//! # Which backends have these hashes cached?
//! streamgate check e4f5d7a2f3dd6b7b1826bd77e316b6b5ba31eb72
//!
//! # Resolve one result to a playable URL
//! streamgate resolve e4f5d7a2… --store rd --sid tt0903747:1:2
//! ```

use clap::{Parser, Subcommand};

// =============================================================================
// Exit Codes
// =============================================================================

/// Exit codes for CLI operations (semantic for scripting)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    /// Success
    Success = 0,
    /// General error
    Error = 1,
    /// Invalid arguments
    InvalidArgs = 2,
    /// Network error
    NetworkError = 3,
    /// No streams available
    NoStreams = 4,
    /// Resolution ended in a terminal failure
    ResolveFailed = 5,
}

impl From<ExitCode> for std::process::ExitCode {
    fn from(code: ExitCode) -> std::process::ExitCode {
        std::process::ExitCode::from(code as u8)
    }
}

// =============================================================================
// Main CLI Structure
// =============================================================================

/// streamgate - aggregate, rank and resolve debrid-backed streams
#[derive(Parser, Debug)]
#[command(
    name = "streamgate",
    version,
    about = "Gateway between media-catalog clients and debrid backends",
    long_about = "Fans out to upstream Stremio addons, normalizes and ranks \
                  their results, checks backend cache status, and resolves \
                  playable URLs.\n\nConfigure upstreams and store bindings in \
                  ~/.config/streamgate/config.toml."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Output machine-readable JSON
    #[arg(long, global = true)]
    pub json: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Fetch, normalize, rank and cache-check streams for a media id
    Streams {
        /// Media id: tt1877830 or tt0903747:1:2
        id: String,

        /// Only keep results some backend already has cached
        #[arg(long)]
        cached_only: bool,
    },

    /// Check which backends have content hashes cached
    Check {
        /// 40-hex info hashes (or magnet URIs)
        #[arg(required = true)]
        hashes: Vec<String>,
    },

    /// Resolve one result into a playable URL
    Resolve {
        /// Content hash (or magnet URI)
        hash: String,

        /// Store code to resolve against (rd, ad, tb, …)
        #[arg(long)]
        store: String,

        /// Declared file index inside the torrent
        #[arg(long)]
        file_idx: Option<i64>,

        /// Declared file name inside the torrent
        #[arg(long)]
        file_name: Option<String>,

        /// Media id the request is for (drives episode file matching)
        #[arg(long)]
        sid: Option<String>,

        /// File-name pattern to match when nothing else does
        #[arg(long)]
        pattern: Option<String>,
    },
}
