//! Completed-video bookkeeping across restarted runs.
//!
//! The store is loaded once at the start of a run, updated as videos succeed,
//! flushed every `save_every` successes and once more when the run ends.
//! Flushing rewrites the whole file; two runs sharing an output directory will
//! overwrite each other's progress.

use crate::error::Result;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// File name of the progress record inside the output directory.
pub const PROGRESS_FILE: &str = "download_progress.json";

/// Persisted progress record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProgressState {
    /// Video IDs downloaded so far.
    pub completed: Vec<String>,
    /// Size of the master list when the record was written.
    pub total: usize,
    /// Unix time of the last flush, in seconds.
    pub timestamp: f64,
}

/// Completed-set store bound to one output directory.
#[derive(Debug)]
pub struct ProgressStore {
    path: PathBuf,
    completed: BTreeSet<String>,
    total: usize,
    save_every: usize,
    unsaved: usize,
}

impl ProgressStore {
    /// Open the store for `output_dir`, loading earlier progress when `resume` is set.
    pub fn open(output_dir: &Path, resume: bool, save_every: usize) -> Result<Self> {
        std::fs::create_dir_all(output_dir)?;
        let path = output_dir.join(PROGRESS_FILE);

        let completed = if resume && path.exists() {
            let content = std::fs::read_to_string(&path)?;
            let state: ProgressState = serde_json::from_str(&content)?;
            info!(
                "Resuming: {} videos already downloaded ({})",
                state.completed.len(),
                path.display()
            );
            state.completed.into_iter().collect()
        } else {
            if path.exists() {
                warn!(
                    "Resume disabled; {} will be overwritten at the next checkpoint",
                    path.display()
                );
            }
            BTreeSet::new()
        };

        Ok(Self {
            path,
            completed,
            total: 0,
            save_every: save_every.max(1),
            unsaved: 0,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn completed_count(&self) -> usize {
        self.completed.len()
    }

    pub fn is_completed(&self, video_id: &str) -> bool {
        self.completed.contains(video_id)
    }

    /// Record the size of the master list.
    pub fn set_total(&mut self, total: usize) {
        self.total = total;
    }

    /// Videos of this run: the not-yet-completed ones, windowed to
    /// `[start_index, start_index + batch_size)`.
    ///
    /// `start_index` counts positions among the remaining videos, not the master list.
    pub fn plan_window(&self, master: &[String], start_index: usize, batch_size: usize) -> Vec<String> {
        master
            .iter()
            .filter(|id| !self.is_completed(id))
            .skip(start_index)
            .take(batch_size)
            .cloned()
            .collect()
    }

    /// Mark a video as completed. Flushes when a checkpoint is due and returns whether it did.
    pub fn record_success(&mut self, video_id: &str) -> Result<bool> {
        self.completed.insert(video_id.to_string());
        self.unsaved += 1;

        if self.unsaved >= self.save_every {
            self.flush()?;
            return Ok(true);
        }
        Ok(false)
    }

    /// Overwrite the progress file with the current state.
    pub fn flush(&mut self) -> Result<()> {
        let state = ProgressState {
            completed: self.completed.iter().cloned().collect(),
            total: self.total,
            timestamp: Utc::now().timestamp_millis() as f64 / 1000.0,
        };
        std::fs::write(&self.path, serde_json::to_string(&state)?)?;
        self.unsaved = 0;
        debug!("Progress saved ({} completed)", self.completed.len());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    fn read_state(store: &ProgressStore) -> ProgressState {
        serde_json::from_str(&std::fs::read_to_string(store.path()).unwrap()).unwrap()
    }

    #[test]
    fn test_fresh_store_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = ProgressStore::open(dir.path(), true, 5).unwrap();
        assert_eq!(store.completed_count(), 0);
        assert!(!store.path().exists());
    }

    #[test]
    fn test_window_is_relative_to_remaining() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = ProgressStore::open(dir.path(), true, 100).unwrap();
        store.record_success("a").unwrap();
        store.record_success("c").unwrap();

        let master = ids(&["a", "b", "c", "d", "e", "f"]);

        assert_eq!(store.plan_window(&master, 0, 2), ids(&["b", "d"]));
        assert_eq!(store.plan_window(&master, 1, 2), ids(&["d", "e"]));
        assert_eq!(store.plan_window(&master, 3, 10), ids(&["f"]));
        assert!(store.plan_window(&master, 10, 10).is_empty());
    }

    #[test]
    fn test_checkpoint_every_n_successes() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = ProgressStore::open(dir.path(), true, 2).unwrap();
        store.set_total(10);

        assert!(!store.record_success("a").unwrap());
        assert!(!store.path().exists());
        assert!(store.record_success("b").unwrap());

        let state = read_state(&store);
        assert_eq!(state.completed, ids(&["a", "b"]));
        assert_eq!(state.total, 10);
        assert!(state.timestamp > 0.0);

        assert!(!store.record_success("c").unwrap());
        assert_eq!(read_state(&store).completed.len(), 2);
    }

    #[test]
    fn test_resume_loads_previous_progress() {
        let dir = tempfile::tempdir().unwrap();
        {
            let mut store = ProgressStore::open(dir.path(), true, 5).unwrap();
            store.record_success("x").unwrap();
            store.flush().unwrap();
        }

        let resumed = ProgressStore::open(dir.path(), true, 5).unwrap();
        assert!(resumed.is_completed("x"));

        let fresh = ProgressStore::open(dir.path(), false, 5).unwrap();
        assert!(!fresh.is_completed("x"));
    }

    #[test]
    fn test_reads_record_with_float_timestamp() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(PROGRESS_FILE),
            r#"{"completed": ["v1", "v2"], "total": 120, "timestamp": 1717171717.5}"#,
        )
        .unwrap();

        let store = ProgressStore::open(dir.path(), true, 5).unwrap();
        assert_eq!(store.completed_count(), 2);
        assert!(store.is_completed("v2"));
    }
}
