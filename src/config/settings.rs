//! Configuration settings for transcript-harvest.

use crate::chunking::{ChunkMode, ChunkingConfig};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct Settings {
    pub input: InputSettings,
    pub download: DownloadSettings,
    pub chunking: ChunkingSettings,
    pub batching: BatchingSettings,
    pub merge: MergeSettings,
}

/// How video lists are read from tabular input.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InputSettings {
    /// Column holding video identifiers.
    pub video_id_column: String,
    /// Optional boolean column; rows where it is false are dropped.
    pub availability_column: Option<String>,
}

impl Default for InputSettings {
    fn default() -> Self {
        Self {
            video_id_column: "video_id".to_string(),
            availability_column: Some("has_transcript".to_string()),
        }
    }
}

/// Transcript download settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DownloadSettings {
    /// CSV file listing the videos to download.
    pub input_csv: String,
    /// Directory receiving one subdirectory per video.
    pub output_dir: String,
    /// Transcript language code.
    pub language: String,
    /// Offset into the not-yet-completed videos.
    pub start_index: usize,
    /// Number of videos attempted per run.
    pub batch_size: usize,
    /// Lower bound of the pause between requests, in seconds.
    pub min_wait_seconds: f64,
    /// Upper bound of the pause between requests, in seconds.
    pub max_wait_seconds: f64,
    /// Flush progress after this many successful videos.
    pub save_every: usize,
    /// Skip videos recorded as completed by earlier runs.
    pub resume: bool,
    /// HTTP request timeout in seconds.
    pub request_timeout_seconds: u64,
}

impl Default for DownloadSettings {
    fn default() -> Self {
        Self {
            input_csv: "videos.csv".to_string(),
            output_dir: "transcripts".to_string(),
            language: "bn".to_string(),
            start_index: 0,
            batch_size: 50,
            min_wait_seconds: 2.0,
            max_wait_seconds: 4.0,
            save_every: 5,
            resume: true,
            request_timeout_seconds: 30,
        }
    }
}

impl DownloadSettings {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }
}

/// Chunking settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkingSettings {
    /// Chunking mode (smart_duration, fixed, full).
    pub mode: ChunkMode,
    /// Minimum chunk duration in seconds.
    pub min_chunk_seconds: f64,
    /// Maximum chunk duration in seconds.
    pub max_chunk_seconds: f64,
    /// Window length in seconds for fixed mode.
    pub fixed_chunk_seconds: f64,
}

impl Default for ChunkingSettings {
    fn default() -> Self {
        Self {
            mode: ChunkMode::SmartDuration,
            min_chunk_seconds: 20.0,
            max_chunk_seconds: 30.0,
            fixed_chunk_seconds: 30.0,
        }
    }
}

impl ChunkingSettings {
    pub fn to_config(&self) -> ChunkingConfig {
        ChunkingConfig {
            mode: self.mode,
            min_duration: self.min_chunk_seconds,
            max_duration: self.max_chunk_seconds,
            fixed_duration: self.fixed_chunk_seconds,
        }
    }
}

/// Batch splitting settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchingSettings {
    /// Master CSV to split.
    pub input_csv: String,
    /// Directory receiving the batch files and manifests.
    pub output_dir: String,
    /// Videos per batch.
    pub videos_per_batch: usize,
    /// Batch files are named `<prefix>_batch_<n>.csv`.
    pub file_prefix: String,
    /// Suggested execution environments, assigned to batches in order.
    pub platforms: Vec<String>,
    /// Assignment table file name.
    pub assignments_file: String,
    /// JSON plan file name.
    pub plan_file: String,
}

impl Default for BatchingSettings {
    fn default() -> Self {
        Self {
            input_csv: "videos.csv".to_string(),
            output_dir: ".".to_string(),
            videos_per_batch: 50,
            file_prefix: "videos".to_string(),
            platforms: vec![
                "Kaggle (Notebook 1)".to_string(),
                "Google Colab (Account 1)".to_string(),
                "GitHub Codespaces".to_string(),
                "Google Colab (Account 2)".to_string(),
                "Kaggle (Notebook 2)".to_string(),
                "Any available platform".to_string(),
            ],
            assignments_file: "batch_assignments.csv".to_string(),
            plan_file: "download_plan.json".to_string(),
        }
    }
}

/// Batch merge settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MergeSettings {
    /// Directory searched for `*batch*transcript*` directories.
    pub root_dir: String,
    /// Unified output directory.
    pub output_dir: String,
    /// Per-video summary table.
    pub summary_csv: String,
    /// Corpus statistics document.
    pub stats_json: String,
}

impl Default for MergeSettings {
    fn default() -> Self {
        Self {
            root_dir: ".".to_string(),
            output_dir: "transcripts_merged".to_string(),
            summary_csv: "transcript_download_summary.csv".to_string(),
            stats_json: "transcript_stats.json".to_string(),
        }
    }
}

impl Settings {
    /// Load settings from the default configuration file.
    pub fn load() -> crate::error::Result<Self> {
        Self::load_from(None)
    }

    /// Load settings from a specific path, or default location if None.
    pub fn load_from(path: Option<&Path>) -> crate::error::Result<Self> {
        let config_path = match path {
            Some(p) => p.to_path_buf(),
            None => Self::default_config_path(),
        };

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let settings: Settings = toml::from_str(&content)?;
            Ok(settings)
        } else {
            Ok(Settings::default())
        }
    }

    /// Save settings to a specific path.
    pub fn save_to(&self, path: &Path) -> crate::error::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| crate::error::HarvestError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get the default configuration file path.
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("transcript-harvest")
            .join("config.toml")
    }

    /// Expand shell variables in paths (e.g., ~).
    pub fn expand_path(path: &str) -> PathBuf {
        PathBuf::from(shellexpand::tilde(path).to_string())
    }

    /// Check the values that would otherwise fail midway through a run.
    pub fn validate(&self) -> crate::error::Result<()> {
        use crate::error::HarvestError;

        self.chunking.to_config().validate()?;

        let d = &self.download;
        let finite = d.min_wait_seconds.is_finite() && d.max_wait_seconds.is_finite();
        if !(finite && d.min_wait_seconds >= 0.0 && d.min_wait_seconds <= d.max_wait_seconds) {
            return Err(HarvestError::Config(format!(
                "wait bounds must be finite with 0 <= min <= max (min={}, max={})",
                d.min_wait_seconds, d.max_wait_seconds
            )));
        }
        if d.save_every == 0 {
            return Err(HarvestError::Config("save_every must be at least 1".to_string()));
        }
        if self.batching.videos_per_batch == 0 {
            return Err(HarvestError::Config(
                "videos_per_batch must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let settings = Settings::default();
        assert!(settings.validate().is_ok());
        assert_eq!(settings.download.language, "bn");
        assert_eq!(settings.chunking.to_config(), ChunkingConfig::default());
        assert_eq!(settings.batching.platforms.len(), 6);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let settings: Settings = toml::from_str(
            r#"
            [download]
            language = "hi"
            batch_size = 10

            [chunking]
            mode = "fixed"
            fixed_chunk_seconds = 15.0
            "#,
        )
        .unwrap();

        assert_eq!(settings.download.language, "hi");
        assert_eq!(settings.download.batch_size, 10);
        assert_eq!(settings.download.save_every, 5);
        assert_eq!(settings.chunking.mode, ChunkMode::Fixed);
        assert_eq!(settings.chunking.min_chunk_seconds, 20.0);
        assert_eq!(settings.merge.output_dir, "transcripts_merged");
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut settings = Settings::default();
        settings.download.output_dir = "batch_3_transcripts".to_string();
        settings.save_to(&path).unwrap();

        let loaded = Settings::load_from(Some(&path)).unwrap();
        assert_eq!(loaded.download.output_dir, "batch_3_transcripts");
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let loaded = Settings::load_from(Some(&dir.path().join("absent.toml"))).unwrap();
        assert_eq!(loaded.download.batch_size, 50);
    }

    #[test]
    fn test_validate_rejects_bad_waits() {
        let mut settings = Settings::default();
        settings.download.min_wait_seconds = 5.0;
        settings.download.max_wait_seconds = 1.0;
        assert!(settings.validate().is_err());

        let mut settings = Settings::default();
        settings.download.max_wait_seconds = f64::INFINITY;
        assert!(settings.validate().is_err());

        let mut settings = Settings::default();
        settings.download.min_wait_seconds = f64::NAN;
        assert!(settings.validate().is_err());

        let mut settings = Settings::default();
        settings.download.save_every = 0;
        assert!(settings.validate().is_err());
    }
}
