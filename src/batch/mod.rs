//! Batch planning and run bookkeeping.

mod progress;
mod split;

pub use progress::{ProgressState, ProgressStore, PROGRESS_FILE};
pub use split::{
    batch_file_name, platform_label, split_batches, BatchAssignment, BatchPlan, PlanFiles,
};
