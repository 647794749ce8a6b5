//! Whole-transcript chunking.

use super::{Chunk, ChunkMode, Chunker, TargetSampler};
use crate::transcription::Segment;

/// Emits the entire transcript as one chunk.
#[derive(Debug, Clone, Copy, Default)]
pub struct FullTranscriptChunker;

impl Chunker for FullTranscriptChunker {
    fn mode(&self) -> ChunkMode {
        ChunkMode::Full
    }

    fn chunk(&self, segments: &[Segment], _sampler: &mut dyn TargetSampler) -> Vec<Chunk> {
        if segments.is_empty() {
            return Vec::new();
        }

        let mut chunk = Chunk::from_segments(0, segments, 0.0);
        chunk.target_duration = chunk.duration;
        vec![chunk]
    }
}
