//! Randomized-duration chunking.
//!
//! Each chunk gets its own target drawn from `[min, max]`. Segments are consumed
//! greedily in a single forward pass:
//!
//! - the first segment of a chunk is always taken, so chunks are never empty;
//! - below `min`, the next segment is taken unconditionally, even if that
//!   overshoots `max`;
//! - at or above `min`, the chunk closes once it reaches its target or when the
//!   next segment would push it past `max`.
//!
//! The last chunk of a video may end up shorter than `min`. It is kept as-is.

use super::{Chunk, ChunkMode, Chunker, TargetSampler};
use crate::transcription::Segment;

/// Chunker producing chunks of randomized target duration.
#[derive(Debug, Clone, Copy)]
pub struct SmartDurationChunker {
    min_duration: f64,
    max_duration: f64,
}

impl SmartDurationChunker {
    /// `min_duration <= max_duration`, both positive. See [`super::ChunkingConfig::validate`].
    pub fn new(min_duration: f64, max_duration: f64) -> Self {
        Self {
            min_duration,
            max_duration,
        }
    }
}

impl Chunker for SmartDurationChunker {
    fn mode(&self) -> ChunkMode {
        ChunkMode::SmartDuration
    }

    fn chunk(&self, segments: &[Segment], sampler: &mut dyn TargetSampler) -> Vec<Chunk> {
        let mut chunks = Vec::new();
        let mut cursor = 0;

        while cursor < segments.len() {
            let target = sampler.sample(self.min_duration, self.max_duration);

            let first = cursor;
            let mut accumulated = segments[cursor].duration;
            cursor += 1;

            while let Some(next) = segments.get(cursor) {
                if accumulated >= self.min_duration
                    && (accumulated >= target || accumulated + next.duration > self.max_duration)
                {
                    break;
                }
                accumulated += next.duration;
                cursor += 1;
            }

            chunks.push(Chunk::from_segments(
                chunks.len(),
                &segments[first..cursor],
                target,
            ));
        }

        chunks
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunking::{FixedTarget, RandomTarget};
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    const EPS: f64 = 1e-9;

    fn uniform_segments(count: usize, duration: f64) -> Vec<Segment> {
        (0..count)
            .map(|i| Segment::new(i as f64 * duration, duration, format!("s{}", i)))
            .collect()
    }

    /// Contiguous segments of random length, some longer than the chunk bounds.
    fn random_segments(rng: &mut StdRng, count: usize) -> Vec<Segment> {
        let mut start = rng.gen_range(0.0..5.0);
        (0..count)
            .map(|i| {
                let duration = if rng.gen_bool(0.05) {
                    rng.gen_range(25.0..50.0)
                } else {
                    rng.gen_range(0.2..8.0)
                };
                let seg = Segment::new(start, duration, format!("w{}", i));
                start += duration;
                seg
            })
            .collect()
    }

    #[test]
    fn test_empty_input() {
        let chunker = SmartDurationChunker::new(20.0, 30.0);
        assert!(chunker.chunk(&[], &mut RandomTarget::seeded(1)).is_empty());
    }

    #[test]
    fn test_ten_three_second_segments_fill_one_chunk() {
        let chunker = SmartDurationChunker::new(20.0, 30.0);
        let segments = uniform_segments(10, 3.0);

        let chunks = chunker.chunk(&segments, &mut FixedTarget(30.0));

        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].segment_count, 10);
        assert_eq!(chunks[0].start, 0.0);
        assert_eq!(chunks[0].duration, 30.0);
        assert_eq!(chunks[0].target_duration, 30.0);
    }

    #[test]
    fn test_low_target_leaves_short_trailing_chunk() {
        let chunker = SmartDurationChunker::new(20.0, 30.0);
        let segments = uniform_segments(10, 3.0);

        let chunks = chunker.chunk(&segments, &mut FixedTarget(20.0));

        // 7 segments reach 21s >= target; the remaining 9s are not merged back.
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].segment_count, 7);
        assert_eq!(chunks[0].duration, 21.0);
        assert_eq!(chunks[1].chunk_id, 1);
        assert_eq!(chunks[1].segment_count, 3);
        assert_eq!(chunks[1].start, 21.0);
        assert_eq!(chunks[1].end, 30.0);
    }

    #[test]
    fn test_single_oversized_segment() {
        let chunker = SmartDurationChunker::new(20.0, 30.0);
        let segments = vec![Segment::new(0.0, 45.0, "long")];

        let chunks = chunker.chunk(&segments, &mut FixedTarget(25.0));

        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].duration, 45.0);
        assert_eq!(chunks[0].segment_count, 1);
    }

    #[test]
    fn test_oversized_segment_stands_alone_after_min() {
        let chunker = SmartDurationChunker::new(20.0, 30.0);
        let segments = vec![
            Segment::new(0.0, 22.0, "a"),
            Segment::new(22.0, 40.0, "b"),
            Segment::new(62.0, 5.0, "c"),
        ];

        let chunks = chunker.chunk(&segments, &mut FixedTarget(30.0));

        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0].text, "a");
        assert_eq!(chunks[1].text, "b");
        assert_eq!(chunks[1].duration, 40.0);
        assert_eq!(chunks[2].text, "c");
    }

    #[test]
    fn test_catch_up_may_overshoot_max() {
        let chunker = SmartDurationChunker::new(20.0, 30.0);
        let segments = vec![
            Segment::new(0.0, 19.0, "a"),
            Segment::new(19.0, 12.0, "b"),
            Segment::new(31.0, 2.0, "c"),
        ];

        let chunks = chunker.chunk(&segments, &mut FixedTarget(20.0));

        assert_eq!(chunks[0].text, "a b");
        assert_eq!(chunks[0].duration, 31.0);
    }

    #[test]
    fn test_stops_before_exceeding_max() {
        let chunker = SmartDurationChunker::new(20.0, 30.0);
        let segments = vec![
            Segment::new(0.0, 21.0, "a"),
            Segment::new(21.0, 10.0, "b"),
        ];

        let chunks = chunker.chunk(&segments, &mut FixedTarget(30.0));

        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].duration, 21.0);
    }

    #[test]
    fn test_each_chunk_draws_its_own_target() {
        let chunker = SmartDurationChunker::new(20.0, 30.0);
        let segments = uniform_segments(200, 1.0);

        let chunks = chunker.chunk(&segments, &mut RandomTarget::seeded(99));

        let first = chunks[0].target_duration;
        assert!(chunks.iter().any(|c| c.target_duration != first));
        assert!(chunks
            .iter()
            .all(|c| (20.0..=30.0).contains(&c.target_duration)));
    }

    #[test]
    fn test_seeded_sampler_is_reproducible() {
        let chunker = SmartDurationChunker::new(20.0, 30.0);
        let mut rng = StdRng::seed_from_u64(5);
        let segments = random_segments(&mut rng, 300);

        let a = chunker.chunk(&segments, &mut RandomTarget::seeded(11));
        let b = chunker.chunk(&segments, &mut RandomTarget::seeded(11));

        assert_eq!(a, b);
    }

    #[test]
    fn test_chunk_properties_hold_for_random_transcripts() {
        let (min, max) = (20.0, 30.0);
        let chunker = SmartDurationChunker::new(min, max);

        for seed in 0..50 {
            let mut rng = StdRng::seed_from_u64(seed);
            let count = rng.gen_range(1..400);
            let segments = random_segments(&mut rng, count);

            let chunks = chunker.chunk(&segments, &mut RandomTarget::seeded(seed + 1000));

            // Lossless, order-preserving.
            let rebuilt: Vec<&str> = chunks.iter().flat_map(|c| c.text.split(' ')).collect();
            let expected: Vec<&str> = segments.iter().map(|s| s.text.as_str()).collect();
            assert_eq!(rebuilt, expected, "seed {}", seed);

            let total: usize = chunks.iter().map(|c| c.segment_count).sum();
            assert_eq!(total, segments.len());

            assert_eq!(chunks[0].start, segments[0].start);

            let mut consumed = 0;
            for (i, chunk) in chunks.iter().enumerate() {
                assert_eq!(chunk.chunk_id, i);
                assert!(chunk.segment_count >= 1);

                let members = &segments[consumed..consumed + chunk.segment_count];
                consumed += chunk.segment_count;
                let last = &members[members.len() - 1];

                assert_eq!(chunk.start, members[0].start);
                assert_eq!(chunk.end, last.end());

                let is_last = i == chunks.len() - 1;
                if !is_last {
                    assert!(
                        chunk.duration >= min - EPS || chunk.segment_count == 1,
                        "seed {} chunk {} too short: {}",
                        seed,
                        i,
                        chunk.duration
                    );
                }

                // Exceeding max only happens through a single oversized segment
                // or while still catching up to min.
                if chunk.duration > max + EPS {
                    assert!(
                        chunk.segment_count == 1 || chunk.duration - last.duration < min,
                        "seed {} chunk {} too long: {}",
                        seed,
                        i,
                        chunk.duration
                    );
                }

                if i > 0 {
                    assert!(chunk.start >= chunks[i - 1].start);
                    assert!(chunk.end >= chunks[i - 1].end);
                }
            }
        }
    }
}
