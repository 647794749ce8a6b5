//! On-disk transcript corpus: per-video directories and merging them.

mod layout;
mod merge;

pub use layout::{read_metadata, VideoMetadata, VideoTranscript, METADATA_FILE};
pub use merge::{
    discover_batch_dirs, is_batch_dir_name, list_video_dirs, merge_batches, CopyError,
    DuplicateSkip, IndexEntry, MergeEvent, MergeReport, MergeStats, MergedVideo, INDEX_FILE,
};
