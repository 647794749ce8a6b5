//! Chunking strategies for turning transcript segments into bounded-duration chunks.
//!
//! Segments are never split: every chunk boundary is a segment boundary.

mod fixed;
mod full;
mod smart;

pub use fixed::FixedWindowChunker;
pub use full::FullTranscriptChunker;
pub use smart::SmartDurationChunker;

use crate::error::{HarvestError, Result};
use crate::transcription::Segment;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

/// A chunk of consecutive transcript segments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chunk {
    /// Position of this chunk in the video, starting at 0.
    pub chunk_id: usize,
    /// Start of the first segment, in seconds.
    pub start: f64,
    /// End of the last segment, in seconds.
    pub end: f64,
    /// `end - start`.
    pub duration: f64,
    /// Segment texts joined with a single space.
    pub text: String,
    /// Number of segments in this chunk.
    #[serde(rename = "segments")]
    pub segment_count: usize,
    /// Target duration drawn for this chunk.
    pub target_duration: f64,
}

impl Chunk {
    /// Build a chunk from a non-empty run of consecutive segments.
    fn from_segments(chunk_id: usize, segments: &[Segment], target_duration: f64) -> Self {
        let start = segments.first().map(|s| s.start).unwrap_or(0.0);
        let end = segments.last().map(Segment::end).unwrap_or(start);
        let text = segments
            .iter()
            .map(|s| s.text.as_str())
            .collect::<Vec<_>>()
            .join(" ");

        Self {
            chunk_id,
            start,
            end,
            duration: end - start,
            text,
            segment_count: segments.len(),
            target_duration,
        }
    }

    /// File stem used for this chunk on disk, e.g. `chunk_0007`.
    pub fn file_stem(&self) -> String {
        format!("chunk_{:04}", self.chunk_id)
    }
}

/// Chunking mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChunkMode {
    /// Random target duration per chunk within `[min, max]`.
    SmartDuration,
    /// Consecutive windows of a fixed duration.
    Fixed,
    /// The whole transcript as a single chunk.
    Full,
}

impl ChunkMode {
    /// Label written to `metadata.json`.
    pub fn label(&self) -> &'static str {
        match self {
            ChunkMode::SmartDuration => "smart_duration",
            ChunkMode::Fixed => "fixed",
            ChunkMode::Full => "full",
        }
    }
}

impl std::fmt::Display for ChunkMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl std::str::FromStr for ChunkMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "smart_duration" | "smart" => Ok(ChunkMode::SmartDuration),
            "fixed" => Ok(ChunkMode::Fixed),
            "full" => Ok(ChunkMode::Full),
            _ => Err(format!("Unknown chunk mode: {}", s)),
        }
    }
}

/// Configuration for chunking.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChunkingConfig {
    pub mode: ChunkMode,
    /// Minimum chunk duration in seconds.
    pub min_duration: f64,
    /// Maximum chunk duration in seconds.
    pub max_duration: f64,
    /// Window length in seconds for fixed mode.
    pub fixed_duration: f64,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            mode: ChunkMode::SmartDuration,
            min_duration: 20.0,
            max_duration: 30.0,
            fixed_duration: 30.0,
        }
    }
}

impl ChunkingConfig {
    /// Check that the duration bounds are usable.
    pub fn validate(&self) -> Result<()> {
        let positive = |v: f64| v.is_finite() && v > 0.0;

        if !positive(self.min_duration) || !positive(self.max_duration) {
            return Err(HarvestError::Config(format!(
                "chunk durations must be positive (min={}, max={})",
                self.min_duration, self.max_duration
            )));
        }
        if self.min_duration > self.max_duration {
            return Err(HarvestError::Config(format!(
                "min chunk duration {} exceeds max chunk duration {}",
                self.min_duration, self.max_duration
            )));
        }
        if self.mode == ChunkMode::Fixed && !positive(self.fixed_duration) {
            return Err(HarvestError::Config(format!(
                "fixed chunk duration must be positive (got {})",
                self.fixed_duration
            )));
        }
        Ok(())
    }
}

/// Source of per-chunk target durations.
pub trait TargetSampler {
    /// Draw a target duration in `[min, max]`.
    fn sample(&mut self, min: f64, max: f64) -> f64;
}

/// Uniform random targets from an injectable RNG.
pub struct RandomTarget<R: Rng = StdRng> {
    rng: R,
}

impl<R: Rng> RandomTarget<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl RandomTarget<StdRng> {
    /// Reproducible targets.
    pub fn seeded(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }

    pub fn from_entropy() -> Self {
        Self::new(StdRng::from_entropy())
    }
}

impl<R: Rng> TargetSampler for RandomTarget<R> {
    fn sample(&mut self, min: f64, max: f64) -> f64 {
        self.rng.gen_range(min..=max)
    }
}

/// Always returns the same target, clamped to the bounds.
#[derive(Debug, Clone, Copy)]
pub struct FixedTarget(pub f64);

impl TargetSampler for FixedTarget {
    fn sample(&mut self, min: f64, max: f64) -> f64 {
        self.0.clamp(min, max)
    }
}

/// Trait for chunking implementations.
pub trait Chunker: Send + Sync {
    /// Mode implemented by this chunker.
    fn mode(&self) -> ChunkMode;

    /// Split ordered segments into ordered chunks.
    fn chunk(&self, segments: &[Segment], sampler: &mut dyn TargetSampler) -> Vec<Chunk>;
}

/// Create a chunker for the configured mode.
pub fn create_chunker(config: &ChunkingConfig) -> Box<dyn Chunker> {
    match config.mode {
        ChunkMode::SmartDuration => Box::new(SmartDurationChunker::new(
            config.min_duration,
            config.max_duration,
        )),
        ChunkMode::Fixed => Box::new(FixedWindowChunker::new(config.fixed_duration)),
        ChunkMode::Full => Box::new(FullTranscriptChunker),
    }
}

/// Mean chunk duration, 0 for no chunks.
pub fn average_duration(chunks: &[Chunk]) -> f64 {
    if chunks.is_empty() {
        return 0.0;
    }
    chunks.iter().map(|c| c.duration).sum::<f64>() / chunks.len() as f64
}
