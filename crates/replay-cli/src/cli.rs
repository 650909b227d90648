//! Command-line argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use replay_core::Metric;

/// Personal streaming-history statistics.
///
/// Points at a streaming-history export (a directory or ZIP archive of
/// JSON files) and reports the listening statistics derived from it.
/// Nothing is stored; every run processes the export from scratch.
#[derive(Debug, Parser)]
#[command(name = "replay", version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to config file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Overall listening summary.
    Summary {
        /// Export directory or ZIP archive.
        export: PathBuf,

        /// Emit JSON instead of the text report.
        #[arg(long)]
        json: bool,
    },

    /// Most-played tracks, artists, albums, or podcasts.
    Top {
        /// Export directory or ZIP archive.
        export: PathBuf,

        /// Which entity to rank.
        #[arg(long, value_enum, default_value = "tracks")]
        kind: Kind,

        /// Which measure to rank by.
        #[arg(long, value_enum, default_value = "streams")]
        by: By,

        /// How many rows to show (defaults to the configured limit).
        #[arg(short = 'n', long)]
        limit: Option<usize>,

        /// Emit JSON instead of the text report.
        #[arg(long)]
        json: bool,
    },

    /// Per-day listening breakdown.
    Days {
        /// Export directory or ZIP archive.
        export: PathBuf,

        /// Rank days by stream count instead of listing chronologically.
        #[arg(long)]
        best: bool,

        /// How many days to show (all when omitted).
        #[arg(short = 'n', long)]
        limit: Option<usize>,

        /// Emit JSON instead of the text report.
        #[arg(long)]
        json: bool,
    },

    /// Per-year listening breakdown.
    Years {
        /// Export directory or ZIP archive.
        export: PathBuf,

        /// Emit JSON instead of the text report.
        #[arg(long)]
        json: bool,
    },
}

/// Entity families the `top` command can rank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Kind {
    Tracks,
    Artists,
    Albums,
    Podcasts,
}

/// Measures the `top` command can rank by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum By {
    /// Stream or play counts.
    Streams,
    /// Variety: distinct tracks per artist, distinct days per track.
    Unique,
    /// Listening time.
    Hours,
}

impl From<By> for Metric {
    fn from(by: By) -> Self {
        match by {
            By::Streams => Self::Streams,
            By::Unique => Self::Unique,
            By::Hours => Self::Hours,
        }
    }
}
