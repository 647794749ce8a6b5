//! transcript-harvest - bulk YouTube transcript collection
//!
//! Downloads transcripts for a list of videos, splits each one into chunks of
//! roughly 20-30 seconds, and stores them as a per-video directory corpus.
//!
//! # Overview
//!
//! The work is meant to be spread over several machines:
//! - `split` partitions a master video list into batch files
//! - `download` processes one window of a batch, resumable across restarts
//! - `merge` combines the batch output directories into a single corpus
//!
//! # Architecture
//!
//! - `config` - Configuration management
//! - `input` - Reading video lists
//! - `transcription` - Transcript providers and the fetch failure taxonomy
//! - `chunking` - Segment chunking strategies
//! - `corpus` - Per-video directory layout and merging
//! - `batch` - Batch splitting and progress tracking
//! - `orchestrator` - Download pipeline
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use transcript_harvest::batch::ProgressStore;
//! use transcript_harvest::config::Settings;
//! use transcript_harvest::orchestrator::Harvester;
//! use transcript_harvest::transcription::YoutubeTranscriptProvider;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = Settings::load()?;
//!     let provider = Arc::new(YoutubeTranscriptProvider::new(settings.download.request_timeout())?);
//!     let mut harvester = Harvester::new(&settings, provider)?;
//!
//!     let mut store = ProgressStore::open(harvester.output_dir(), true, 5)?;
//!     let videos = vec!["dQw4w9WgXcQ".to_string()];
//!     let report = harvester.run_batch(&mut store, &videos, |_| {}).await?;
//!     println!("Downloaded {} transcripts", report.success_count());
//!
//!     Ok(())
//! }
//! ```

pub mod batch;
pub mod chunking;
pub mod cli;
pub mod config;
pub mod corpus;
pub mod error;
pub mod input;
pub mod orchestrator;
pub mod transcription;

pub use error::{HarvestError, Result};
