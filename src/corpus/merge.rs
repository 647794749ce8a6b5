//! Merging independently produced batch directories into one corpus.
//!
//! Batches are visited in sorted order and videos within a batch in sorted
//! order. The first copy of a video ID wins; later copies are skipped.

use super::layout::read_metadata;
use crate::error::{HarvestError, Result};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// Index file written inside the merged directory.
pub const INDEX_FILE: &str = "index.json";

/// A video that made it into the merged corpus with readable metadata.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MergedVideo {
    pub video_id: String,
    pub chunks: usize,
    /// Seconds.
    pub duration: f64,
    pub mode: String,
    pub url: String,
}

/// A video that could not be merged.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CopyError {
    pub video_id: String,
    pub error: String,
}

/// A video skipped because an earlier batch already supplied it.
#[derive(Debug, Clone, PartialEq)]
pub struct DuplicateSkip {
    pub video_id: String,
    pub batch_dir: PathBuf,
}

/// What happened to one video directory during a merge.
#[derive(Debug, Clone, PartialEq)]
pub enum MergeEvent {
    Copied(String),
    Duplicate(String),
    Failed(CopyError),
}

/// Entry of `index.json`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndexEntry {
    pub chunks: usize,
    pub duration: f64,
    pub url: String,
}

/// Corpus-wide statistics.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MergeStats {
    pub total_videos: usize,
    pub total_chunks: usize,
    pub avg_chunks_per_video: f64,
    pub total_duration_hours: f64,
    pub errors: usize,
    pub duplicates_skipped: usize,
    pub chunk_modes: BTreeMap<String, usize>,
}

/// Outcome of a merge.
#[derive(Debug, Clone, Default)]
pub struct MergeReport {
    pub videos: Vec<MergedVideo>,
    pub errors: Vec<CopyError>,
    pub duplicates: Vec<DuplicateSkip>,
}

impl MergeReport {
    pub fn stats(&self) -> MergeStats {
        let total_videos = self.videos.len();
        let total_chunks: usize = self.videos.iter().map(|v| v.chunks).sum();
        let total_seconds: f64 = self.videos.iter().map(|v| v.duration).sum();

        let mut chunk_modes = BTreeMap::new();
        for video in &self.videos {
            *chunk_modes.entry(video.mode.clone()).or_insert(0) += 1;
        }

        MergeStats {
            total_videos,
            total_chunks,
            avg_chunks_per_video: if total_videos > 0 {
                total_chunks as f64 / total_videos as f64
            } else {
                0.0
            },
            total_duration_hours: total_seconds / 3600.0,
            errors: self.errors.len(),
            duplicates_skipped: self.duplicates.len(),
            chunk_modes,
        }
    }

    /// Video ID → summary, one entry per merged video.
    pub fn index(&self) -> BTreeMap<String, IndexEntry> {
        self.videos
            .iter()
            .map(|v| {
                (
                    v.video_id.clone(),
                    IndexEntry {
                        chunks: v.chunks,
                        duration: v.duration,
                        url: v.url.clone(),
                    },
                )
            })
            .collect()
    }

    /// Write the summary table, the statistics document and `index.json`.
    pub fn write_outputs(&self, merged_dir: &Path, summary_csv: &Path, stats_json: &Path) -> Result<()> {
        let mut writer = csv::Writer::from_path(summary_csv)?;
        for video in &self.videos {
            writer.serialize(video)?;
        }
        writer.flush()?;

        std::fs::write(stats_json, serde_json::to_string_pretty(&self.stats())?)?;

        std::fs::create_dir_all(merged_dir)?;
        std::fs::write(
            merged_dir.join(INDEX_FILE),
            serde_json::to_string_pretty(&self.index())?,
        )?;

        Ok(())
    }
}

/// Whether a directory name looks like a batch output directory.
pub fn is_batch_dir_name(name: &str) -> bool {
    let lower = name.to_lowercase();
    lower.contains("batch") && lower.contains("transcript")
}

/// Find batch directories directly under `root`, sorted by name. `exclude` is never returned.
pub fn discover_batch_dirs(root: &Path, exclude: &Path) -> Result<Vec<PathBuf>> {
    let excluded = exclude.canonicalize().ok();
    let mut dirs = Vec::new();

    for entry in std::fs::read_dir(root)? {
        let entry = entry?;
        let path = entry.path();
        if !path.is_dir() {
            continue;
        }
        if !is_batch_dir_name(&entry.file_name().to_string_lossy()) {
            continue;
        }
        if excluded.is_some() && path.canonicalize().ok() == excluded {
            continue;
        }
        dirs.push(path);
    }

    dirs.sort();

    if dirs.is_empty() {
        return Err(HarvestError::NoBatchDirectories(root.display().to_string()));
    }
    Ok(dirs)
}

/// Video directories of one batch, sorted by name.
pub fn list_video_dirs(batch_dir: &Path) -> Result<Vec<PathBuf>> {
    let mut videos = Vec::new();
    for entry in std::fs::read_dir(batch_dir)? {
        let entry = entry?;
        let path = entry.path();
        if path.is_dir() && !entry.file_name().to_string_lossy().starts_with('.') {
            videos.push(path);
        }
    }
    videos.sort();
    Ok(videos)
}

/// Merge `batch_dirs` into `merged_dir`, reporting each video to `on_event`.
pub fn merge_batches(
    batch_dirs: &[PathBuf],
    merged_dir: &Path,
    mut on_event: impl FnMut(&MergeEvent),
) -> Result<MergeReport> {
    std::fs::create_dir_all(merged_dir)?;

    let mut report = MergeReport::default();

    for batch_dir in batch_dirs {
        info!("Processing {}", batch_dir.display());

        for source in list_video_dirs(batch_dir)? {
            let video_id = source
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            let dest = merged_dir.join(&video_id);

            if dest.exists() {
                debug!("Skipping duplicate {}", video_id);
                report.duplicates.push(DuplicateSkip {
                    video_id: video_id.clone(),
                    batch_dir: batch_dir.clone(),
                });
                on_event(&MergeEvent::Duplicate(video_id));
                continue;
            }

            if let Err(e) = copy_tree(&source, &dest) {
                warn!("Error copying {}: {}", video_id, e);
                if dest.exists() {
                    if let Err(cleanup) = std::fs::remove_dir_all(&dest) {
                        warn!(
                            "Could not remove partial copy {}: {}",
                            dest.display(),
                            cleanup
                        );
                    }
                }
                let failure = CopyError {
                    video_id,
                    error: e.to_string(),
                };
                report.errors.push(failure.clone());
                on_event(&MergeEvent::Failed(failure));
                continue;
            }

            match read_metadata(&dest) {
                Ok(Some(meta)) => report.videos.push(MergedVideo {
                    video_id: video_id.clone(),
                    chunks: meta.total_chunks,
                    duration: meta.total_duration,
                    mode: meta.chunk_mode,
                    url: meta.url,
                }),
                Ok(None) => debug!("{} has no metadata; not counted", video_id),
                Err(e) => {
                    warn!("Unreadable metadata for {}: {}", video_id, e);
                    let failure = CopyError {
                        video_id: video_id.clone(),
                        error: format!("invalid metadata: {}", e),
                    };
                    report.errors.push(failure.clone());
                    on_event(&MergeEvent::Failed(failure));
                    continue;
                }
            }

            on_event(&MergeEvent::Copied(video_id));
        }
    }

    Ok(report)
}

/// Recursively copy a directory tree. `dest` must not exist yet.
fn copy_tree(source: &Path, dest: &Path) -> Result<()> {
    for entry in WalkDir::new(source) {
        let entry = entry?;
        let relative = entry
            .path()
            .strip_prefix(source)
            .map_err(|e| HarvestError::InvalidInput(e.to_string()))?;
        let target = dest.join(relative);

        if entry.file_type().is_dir() {
            std::fs::create_dir_all(&target)?;
        } else {
            std::fs::copy(entry.path(), &target)?;
        }
    }
    Ok(())
}
