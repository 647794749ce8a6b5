//! Per-video directory layout.
//!
//! ```text
//! <output_dir>/<video_id>/
//! ├── metadata.json
//! ├── chunk_0000.json
//! ├── chunk_0000.txt
//! └── ...
//! ```

use crate::chunking::{average_duration, Chunk, ChunkingConfig};
use crate::error::Result;
use crate::transcription::{total_duration, video_url, Segment};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Metadata file name inside a video directory.
pub const METADATA_FILE: &str = "metadata.json";

/// Contents of `metadata.json`.
///
/// Missing fields fall back to defaults so that directories written by older
/// tooling can still be merged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VideoMetadata {
    pub video_id: String,
    pub url: String,
    pub total_chunks: usize,
    pub chunk_mode: String,
    pub min_chunk_duration: f64,
    pub max_chunk_duration: f64,
    pub avg_chunk_duration: f64,
    /// End time of the last segment, in seconds.
    pub total_duration: f64,
    pub total_segments: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
}

impl Default for VideoMetadata {
    fn default() -> Self {
        Self {
            video_id: String::new(),
            url: String::new(),
            total_chunks: 0,
            chunk_mode: "unknown".to_string(),
            min_chunk_duration: 0.0,
            max_chunk_duration: 0.0,
            avg_chunk_duration: 0.0,
            total_duration: 0.0,
            total_segments: 0,
            language: None,
        }
    }
}

/// A chunked transcript ready to be persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct VideoTranscript {
    pub metadata: VideoMetadata,
    pub chunks: Vec<Chunk>,
}

impl VideoTranscript {
    /// Assemble the transcript record for a video from its segments and chunks.
    pub fn new(
        video_id: &str,
        language: &str,
        segments: &[Segment],
        chunks: Vec<Chunk>,
        config: &ChunkingConfig,
    ) -> Self {
        let metadata = VideoMetadata {
            video_id: video_id.to_string(),
            url: video_url(video_id),
            total_chunks: chunks.len(),
            chunk_mode: config.mode.label().to_string(),
            min_chunk_duration: config.min_duration,
            max_chunk_duration: config.max_duration,
            avg_chunk_duration: average_duration(&chunks),
            total_duration: total_duration(segments),
            total_segments: segments.len(),
            language: Some(language.to_string()),
        };

        Self { metadata, chunks }
    }

    /// Write the video directory under `output_dir`, overwriting earlier files.
    pub fn write(&self, output_dir: &Path) -> Result<PathBuf> {
        let video_dir = output_dir.join(&self.metadata.video_id);
        std::fs::create_dir_all(&video_dir)?;

        std::fs::write(
            video_dir.join(METADATA_FILE),
            serde_json::to_string_pretty(&self.metadata)?,
        )?;

        for chunk in &self.chunks {
            let stem = chunk.file_stem();
            std::fs::write(
                video_dir.join(format!("{}.json", stem)),
                serde_json::to_string_pretty(chunk)?,
            )?;
            std::fs::write(video_dir.join(format!("{}.txt", stem)), &chunk.text)?;
        }

        debug!(
            "Wrote {} chunks to {}",
            self.chunks.len(),
            video_dir.display()
        );
        Ok(video_dir)
    }
}

/// Read `metadata.json` from a video directory, if present.
pub fn read_metadata(video_dir: &Path) -> Result<Option<VideoMetadata>> {
    let path = video_dir.join(METADATA_FILE);
    if !path.exists() {
        return Ok(None);
    }
    let content = std::fs::read_to_string(path)?;
    Ok(Some(serde_json::from_str(&content)?))
}
