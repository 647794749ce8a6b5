//! Transcript retrieval for transcript-harvest.
//!
//! Providers return raw segments or an untyped error message. The message is
//! classified into [`FetchFailure`] by [`fetch_transcript`].

mod models;
mod youtube;

pub use models::{total_duration, Segment};
pub use youtube::{extract_video_id, video_url, YoutubeTranscriptProvider};

use async_trait::async_trait;
use thiserror::Error;
use tracing::debug;

/// Untyped error raised by a transcript provider.
///
/// Providers only give us a message; rate limiting has to be recognised from its text.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct ProviderError {
    pub message: String,
}

impl ProviderError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl From<reqwest::Error> for ProviderError {
    fn from(err: reqwest::Error) -> Self {
        Self::new(err.to_string())
    }
}

/// Why a single video produced no chunks.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchFailure {
    /// The video has no transcript content in the target language. Skip, never retry.
    #[error("No segments found")]
    NoTranscriptContent,

    /// The provider is throttling us. The run must stop issuing requests.
    #[error("RateLimited")]
    RateLimited,

    /// Any other provider failure. Logged and skipped.
    #[error("{0}")]
    Provider(String),
}

impl FetchFailure {
    /// Classify a raw provider error.
    pub fn classify(err: &ProviderError) -> Self {
        if is_rate_limit_message(&err.message) {
            FetchFailure::RateLimited
        } else {
            FetchFailure::Provider(err.message.clone())
        }
    }

    /// Whether this failure must halt the current run.
    pub fn is_fatal(&self) -> bool {
        matches!(self, FetchFailure::RateLimited)
    }

    /// Short form for run summaries.
    pub fn summary(&self) -> String {
        self.to_string().chars().take(100).collect()
    }
}

fn is_rate_limit_message(message: &str) -> bool {
    message.contains("429") || message.contains("Too Many Requests")
}

/// Trait for transcript providers.
#[async_trait]
pub trait TranscriptProvider: Send + Sync {
    /// Fetch the ordered segments of a video's transcript in the given language.
    ///
    /// An empty list means the video has no transcript content in that language.
    async fn fetch(
        &self,
        video_id: &str,
        language: &str,
    ) -> std::result::Result<Vec<Segment>, ProviderError>;
}

/// Fetch a transcript and normalize every outcome into the failure taxonomy.
pub async fn fetch_transcript(
    provider: &dyn TranscriptProvider,
    video_id: &str,
    language: &str,
) -> std::result::Result<Vec<Segment>, FetchFailure> {
    let segments = provider.fetch(video_id, language).await.map_err(|e| {
        debug!("Provider error for {}: {}", video_id, e);
        FetchFailure::classify(&e)
    })?;

    if segments.is_empty() {
        return Err(FetchFailure::NoTranscriptContent);
    }

    if let Some(bad) = segments.iter().find(|s| !s.is_well_formed()) {
        return Err(FetchFailure::Provider(format!(
            "Malformed segment at {}s (duration {})",
            bad.start, bad.duration
        )));
    }

    Ok(segments)
}
