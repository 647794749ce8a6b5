//! Data models for fetched transcripts.

use serde::{Deserialize, Serialize};

/// A single time-stamped transcript segment as returned by a provider.
///
/// Segments are atomic: chunking never splits one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    /// Start time in seconds.
    pub start: f64,
    /// Duration in seconds.
    pub duration: f64,
    /// Caption text.
    pub text: String,
}

impl Segment {
    /// Create a new segment.
    pub fn new(start: f64, duration: f64, text: impl Into<String>) -> Self {
        Self {
            start,
            duration,
            text: text.into(),
        }
    }

    /// End time in seconds.
    pub fn end(&self) -> f64 {
        self.start + self.duration
    }

    /// Whether the timing fields are usable for chunking.
    pub fn is_well_formed(&self) -> bool {
        self.start.is_finite() && self.duration.is_finite() && self.duration >= 0.0
    }
}

/// Total span of a transcript: the end time of its last segment.
pub fn total_duration(segments: &[Segment]) -> f64 {
    segments.last().map(Segment::end).unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_segment_end() {
        let seg = Segment::new(12.5, 3.25, "hello");
        assert_eq!(seg.end(), 15.75);
    }

    #[test]
    fn test_total_duration() {
        let segments = vec![
            Segment::new(0.0, 5.0, "First"),
            Segment::new(5.0, 4.0, "Second"),
            Segment::new(10.0, 2.5, "Third"),
        ];
        assert_eq!(total_duration(&segments), 12.5);
        assert_eq!(total_duration(&[]), 0.0);
    }

    #[test]
    fn test_malformed_segments() {
        assert!(Segment::new(0.0, 0.0, "").is_well_formed());
        assert!(!Segment::new(0.0, -1.0, "x").is_well_formed());
        assert!(!Segment::new(f64::NAN, 1.0, "x").is_well_formed());
    }
}
