//! Download pipeline for transcript-harvest.
//!
//! Fetches, chunks and persists one video at a time, pausing between requests.

use crate::batch::ProgressStore;
use crate::chunking::{create_chunker, Chunker, ChunkingConfig, RandomTarget, TargetSampler};
use crate::config::Settings;
use crate::corpus::VideoTranscript;
use crate::error::Result;
use crate::transcription::{fetch_transcript, FetchFailure, TranscriptProvider};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, instrument, warn};

/// Outcome of one video: its persisted transcript, or why there is none.
pub type VideoTranscriptResult = std::result::Result<VideoTranscript, FetchFailure>;

/// Row of the per-run summary table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VideoRecord {
    pub video_id: String,
    pub success: bool,
    pub chunks: usize,
    pub avg_chunk_duration: f64,
    pub error: String,
}

impl VideoRecord {
    fn from_result(video_id: &str, result: &VideoTranscriptResult) -> Self {
        match result {
            Ok(transcript) => Self {
                video_id: video_id.to_string(),
                success: true,
                chunks: transcript.metadata.total_chunks,
                avg_chunk_duration: transcript.metadata.avg_chunk_duration,
                error: String::new(),
            },
            Err(failure) => Self {
                video_id: video_id.to_string(),
                success: false,
                chunks: 0,
                avg_chunk_duration: 0.0,
                error: failure.summary(),
            },
        }
    }
}

/// Summary of the per-video average chunk durations in a run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChunkDurationStats {
    pub average: f64,
    pub min: f64,
    pub max: f64,
}

/// Result of a download run.
#[derive(Debug, Clone, Default)]
pub struct BatchReport {
    /// One row per attempted video, in order. The rate-limited video is not included.
    pub records: Vec<VideoRecord>,
    /// Video at which the provider started throttling, if it did.
    pub rate_limited_at: Option<String>,
}

impl BatchReport {
    pub fn processed(&self) -> usize {
        self.records.len()
    }

    pub fn success_count(&self) -> usize {
        self.records.iter().filter(|r| r.success).count()
    }

    pub fn total_chunks(&self) -> usize {
        self.records.iter().map(|r| r.chunks).sum()
    }

    pub fn failures(&self) -> impl Iterator<Item = &VideoRecord> {
        self.records.iter().filter(|r| !r.success)
    }

    pub fn chunk_duration_stats(&self) -> Option<ChunkDurationStats> {
        let averages: Vec<f64> = self
            .records
            .iter()
            .filter(|r| r.success)
            .map(|r| r.avg_chunk_duration)
            .collect();

        if averages.is_empty() {
            return None;
        }

        Some(ChunkDurationStats {
            average: averages.iter().sum::<f64>() / averages.len() as f64,
            min: averages.iter().copied().fold(f64::INFINITY, f64::min),
            max: averages.iter().copied().fold(f64::NEG_INFINITY, f64::max),
        })
    }

    /// Write the summary table. Nothing is written for a run with no records.
    pub fn write_summary(&self, path: &Path) -> Result<bool> {
        if self.records.is_empty() {
            return Ok(false);
        }
        let mut writer = csv::Writer::from_path(path)?;
        for record in &self.records {
            writer.serialize(record)?;
        }
        writer.flush()?;
        Ok(true)
    }
}

/// The download pipeline.
pub struct Harvester {
    provider: Arc<dyn TranscriptProvider>,
    chunker: Box<dyn Chunker>,
    chunking: ChunkingConfig,
    sampler: Box<dyn TargetSampler + Send>,
    language: String,
    output_dir: PathBuf,
    wait_seconds: (f64, f64),
    delay_rng: StdRng,
}

impl Harvester {
    /// Create a harvester from settings.
    pub fn new(settings: &Settings, provider: Arc<dyn TranscriptProvider>) -> Result<Self> {
        settings.validate()?;
        let chunking = settings.chunking.to_config();

        Ok(Self {
            provider,
            chunker: create_chunker(&chunking),
            chunking,
            sampler: Box::new(RandomTarget::from_entropy()),
            language: settings.download.language.clone(),
            output_dir: Settings::expand_path(&settings.download.output_dir),
            wait_seconds: (
                settings.download.min_wait_seconds,
                settings.download.max_wait_seconds,
            ),
            delay_rng: StdRng::from_entropy(),
        })
    }

    /// Replace the chunk target sampler, e.g. with a seeded one.
    pub fn with_sampler(mut self, sampler: impl TargetSampler + Send + 'static) -> Self {
        self.sampler = Box::new(sampler);
        self
    }

    /// Override the pause between requests.
    pub fn with_wait(mut self, min_seconds: f64, max_seconds: f64) -> Self {
        self.wait_seconds = (min_seconds, max_seconds);
        self
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Fetch, chunk and persist one video.
    ///
    /// The outer error is a local failure (e.g. the disk); the inner one is the
    /// per-video failure taxonomy.
    #[instrument(skip(self))]
    pub async fn process_video(&mut self, video_id: &str) -> Result<VideoTranscriptResult> {
        let segments = match fetch_transcript(self.provider.as_ref(), video_id, &self.language).await {
            Ok(segments) => segments,
            Err(failure) => return Ok(Err(failure)),
        };

        let chunks = self.chunker.chunk(&segments, self.sampler.as_mut());
        let transcript =
            VideoTranscript::new(video_id, &self.language, &segments, chunks, &self.chunking);
        transcript.write(&self.output_dir)?;

        Ok(Ok(transcript))
    }

    /// Process `videos` in order, stopping early if the provider rate-limits us.
    ///
    /// Progress is checkpointed through `store` and flushed once more before
    /// returning, on every exit path.
    pub async fn run_batch(
        &mut self,
        store: &mut ProgressStore,
        videos: &[String],
        mut on_video: impl FnMut(&VideoRecord),
    ) -> Result<BatchReport> {
        let outcome = self.run_videos(store, videos, &mut on_video).await;
        let flushed = store.flush();
        let report = outcome?;
        flushed?;
        Ok(report)
    }

    async fn run_videos(
        &mut self,
        store: &mut ProgressStore,
        videos: &[String],
        on_video: &mut impl FnMut(&VideoRecord),
    ) -> Result<BatchReport> {
        let mut report = BatchReport::default();

        for (i, video_id) in videos.iter().enumerate() {
            let result = self.process_video(video_id).await?;

            match &result {
                Ok(transcript) => {
                    info!(
                        "{}: {} chunks, avg {:.1}s",
                        video_id, transcript.metadata.total_chunks, transcript.metadata.avg_chunk_duration
                    );
                    if store.record_success(video_id)? {
                        info!("Progress saved ({} total)", store.completed_count());
                    }
                }
                Err(failure) if failure.is_fatal() => {
                    warn!("Rate limited at {}; stopping this run", video_id);
                    report.rate_limited_at = Some(video_id.clone());
                    break;
                }
                Err(failure) => {
                    warn!("{}: {}", video_id, failure);
                }
            }

            let record = VideoRecord::from_result(video_id, &result);
            on_video(&record);
            report.records.push(record);

            if i + 1 < videos.len() {
                self.pause().await;
            }
        }

        Ok(report)
    }

    async fn pause(&mut self) {
        let (min, max) = self.wait_seconds;
        if max <= 0.0 {
            return;
        }
        let seconds = self.delay_rng.gen_range(min..=max);
        tokio::time::sleep(Duration::from_secs_f64(seconds)).await;
    }
}
