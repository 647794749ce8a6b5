//! Partitioning a master video list into fixed-size batches.

use crate::error::{HarvestError, Result};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::info;

/// One batch of the plan.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct BatchAssignment {
    /// Batch index.
    pub batch: usize,
    /// Batch file name.
    pub file: String,
    /// Master-list index of the first video.
    pub start: usize,
    /// Master-list index of the last video (inclusive).
    pub end: usize,
    pub count: usize,
    /// Suggested execution environment.
    pub platform: String,
    #[serde(skip)]
    pub video_ids: Vec<String>,
}

/// The full partition of a master list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchPlan {
    pub total_videos: usize,
    pub num_batches: usize,
    pub videos_per_batch: usize,
    pub batches: Vec<BatchAssignment>,
}

/// Files written for a plan.
#[derive(Debug, Clone)]
pub struct PlanFiles {
    pub batch_files: Vec<PathBuf>,
    pub assignments: PathBuf,
    pub plan: PathBuf,
}

/// Label for batch `index`: the configured platform, or `Platform <n>` past the list.
pub fn platform_label(index: usize, platforms: &[String]) -> String {
    platforms
        .get(index)
        .cloned()
        .unwrap_or_else(|| format!("Platform {}", index + 1))
}

/// Batch file name for batch `index`.
pub fn batch_file_name(prefix: &str, index: usize) -> String {
    format!("{}_batch_{}.csv", prefix, index)
}

/// Split `video_ids` into contiguous batches of `batch_size` (the last may be smaller).
pub fn split_batches(
    video_ids: &[String],
    batch_size: usize,
    prefix: &str,
    platforms: &[String],
) -> Result<BatchPlan> {
    if batch_size == 0 {
        return Err(HarvestError::InvalidInput(
            "batch size must be at least 1".to_string(),
        ));
    }

    let batches: Vec<BatchAssignment> = video_ids
        .chunks(batch_size)
        .enumerate()
        .map(|(index, ids)| {
            let start = index * batch_size;
            BatchAssignment {
                batch: index,
                file: batch_file_name(prefix, index),
                start,
                end: start + ids.len() - 1,
                count: ids.len(),
                platform: platform_label(index, platforms),
                video_ids: ids.to_vec(),
            }
        })
        .collect();

    Ok(BatchPlan {
        total_videos: video_ids.len(),
        num_batches: batches.len(),
        videos_per_batch: batch_size,
        batches,
    })
}

impl BatchPlan {
    /// Write one CSV per batch, the assignment table and the JSON plan into `dir`.
    pub fn write(
        &self,
        dir: &Path,
        id_column: &str,
        assignments_file: &str,
        plan_file: &str,
    ) -> Result<PlanFiles> {
        std::fs::create_dir_all(dir)?;

        let mut batch_files = Vec::with_capacity(self.batches.len());
        for batch in &self.batches {
            let path = dir.join(&batch.file);
            let mut writer = csv::Writer::from_path(&path)?;
            writer.write_record([id_column])?;
            for id in &batch.video_ids {
                writer.write_record([id.as_str()])?;
            }
            writer.flush()?;
            info!("Wrote {} ({} videos)", path.display(), batch.count);
            batch_files.push(path);
        }

        let assignments = dir.join(assignments_file);
        let mut writer = csv::Writer::from_path(&assignments)?;
        for batch in &self.batches {
            writer.serialize(batch)?;
        }
        writer.flush()?;

        let plan = dir.join(plan_file);
        std::fs::write(&plan, serde_json::to_string_pretty(self)?)?;

        Ok(PlanFiles {
            batch_files,
            assignments,
            plan,
        })
    }
}
