//! Fixed-window chunking.
//!
//! Collects whole segments until the window length is reached.

use super::{Chunk, ChunkMode, Chunker, TargetSampler};
use crate::transcription::Segment;

/// Fixed-duration chunker.
#[derive(Debug, Clone, Copy)]
pub struct FixedWindowChunker {
    window: f64,
}

impl FixedWindowChunker {
    pub fn new(window: f64) -> Self {
        Self { window }
    }
}

impl Chunker for FixedWindowChunker {
    fn mode(&self) -> ChunkMode {
        ChunkMode::Fixed
    }

    fn chunk(&self, segments: &[Segment], _sampler: &mut dyn TargetSampler) -> Vec<Chunk> {
        let mut chunks = Vec::new();
        let mut cursor = 0;

        while cursor < segments.len() {
            let first = cursor;
            let mut accumulated = segments[cursor].duration;
            cursor += 1;

            while cursor < segments.len() && accumulated < self.window {
                accumulated += segments[cursor].duration;
                cursor += 1;
            }

            chunks.push(Chunk::from_segments(
                chunks.len(),
                &segments[first..cursor],
                self.window,
            ));
        }

        chunks
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunking::FixedTarget;

    #[test]
    fn test_fixed_window_chunking() {
        let chunker = FixedWindowChunker::new(60.0);

        let segments = vec![
            Segment::new(0.0, 30.0, "First segment"),
            Segment::new(30.0, 30.0, "Second segment"),
            Segment::new(60.0, 30.0, "Third segment"),
            Segment::new(90.0, 30.0, "Fourth segment"),
            Segment::new(120.0, 10.0, "Tail"),
        ];

        let chunks = chunker.chunk(&segments, &mut FixedTarget(0.0));

        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0].text, "First segment Second segment");
        assert_eq!(chunks[1].text, "Third segment Fourth segment");
        assert_eq!(chunks[2].text, "Tail");
        assert_eq!(chunks[2].duration, 10.0);
        assert!(chunks.iter().all(|c| c.target_duration == 60.0));
    }

    #[test]
    fn test_fixed_window_never_splits_long_segment() {
        let chunker = FixedWindowChunker::new(10.0);
        let segments = vec![Segment::new(0.0, 25.0, "long"), Segment::new(25.0, 1.0, "short")];

        let chunks = chunker.chunk(&segments, &mut FixedTarget(0.0));

        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].segment_count, 1);
        assert_eq!(chunks[0].duration, 25.0);
    }
}
