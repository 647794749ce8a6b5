//! CLI module for transcript-harvest.

pub mod commands;
mod output;

pub use output::{format_duration, Output};

use crate::chunking::ChunkMode;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// transcript-harvest - bulk YouTube transcript collection
///
/// Downloads transcripts into 20-30 second chunks, one directory per video,
/// with batch splitting and merging for work spread over several machines.
#[derive(Parser, Debug)]
#[command(name = "harvest")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v for info, -vv for debug, -vvv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Split a master video list into batch files
    Split(SplitArgs),

    /// Download, chunk and store transcripts for one window of videos
    Download(DownloadArgs),

    /// Merge batch output directories into a single corpus
    Merge(MergeArgs),

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Args, Debug, Default)]
pub struct SplitArgs {
    /// Master CSV of videos (defaults to batching.input_csv)
    pub input: Option<PathBuf>,

    /// Directory for the batch files and manifests
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Videos per batch
    #[arg(short = 'n', long)]
    pub videos_per_batch: Option<usize>,

    /// File name prefix of the batch files
    #[arg(long)]
    pub prefix: Option<String>,
}

#[derive(Args, Debug, Default)]
pub struct DownloadArgs {
    /// CSV of videos to download (defaults to download.input_csv)
    pub input: Option<PathBuf>,

    /// Directory receiving one subdirectory per video
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Offset into the videos not downloaded yet
    #[arg(short, long)]
    pub start_index: Option<usize>,

    /// Number of videos to attempt in this run
    #[arg(short = 'n', long)]
    pub batch_size: Option<usize>,

    /// Transcript language code
    #[arg(short, long)]
    pub language: Option<String>,

    /// Chunking mode (smart_duration, fixed, full)
    #[arg(short, long)]
    pub mode: Option<ChunkMode>,

    /// Minimum chunk duration in seconds
    #[arg(long)]
    pub min_duration: Option<f64>,

    /// Maximum chunk duration in seconds
    #[arg(long)]
    pub max_duration: Option<f64>,

    /// Ignore progress recorded by earlier runs
    #[arg(long)]
    pub no_resume: bool,

    /// Seed for the chunk target draws, for reproducible chunking
    #[arg(long)]
    pub seed: Option<u64>,
}

#[derive(Args, Debug, Default)]
pub struct MergeArgs {
    /// Directory containing the batch output directories
    #[arg(short, long)]
    pub root: Option<PathBuf>,

    /// Merged corpus directory
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Summary CSV path
    #[arg(long)]
    pub summary: Option<PathBuf>,

    /// Statistics JSON path
    #[arg(long)]
    pub stats: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Open configuration file in editor
    Edit,

    /// Show configuration file path
    Path,
}
