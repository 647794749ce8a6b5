//! Merge command implementation.

use crate::cli::{MergeArgs, Output};
use crate::config::Settings;
use crate::corpus::{discover_batch_dirs, list_video_dirs, merge_batches, MergeEvent};
use anyhow::Result;

/// Run the merge command.
pub fn run_merge(args: &MergeArgs, settings: &Settings) -> Result<()> {
    let merge = &settings.merge;
    let root = args
        .root
        .clone()
        .unwrap_or_else(|| Settings::expand_path(&merge.root_dir));
    let merged_dir = args
        .output_dir
        .clone()
        .unwrap_or_else(|| Settings::expand_path(&merge.output_dir));
    let summary_csv = args
        .summary
        .clone()
        .unwrap_or_else(|| Settings::expand_path(&merge.summary_csv));
    let stats_json = args
        .stats
        .clone()
        .unwrap_or_else(|| Settings::expand_path(&merge.stats_json));

    let batch_dirs = match discover_batch_dirs(&root, &merged_dir) {
        Ok(dirs) => dirs,
        Err(e) => {
            Output::error(&e.to_string());
            Output::info("Batch directories need both 'batch' and 'transcript' in their name.");
            return Err(e.into());
        }
    };

    Output::header(&format!("Found {} batch directories", batch_dirs.len()));
    let mut total = 0u64;
    for dir in &batch_dirs {
        let count = list_video_dirs(dir)?.len();
        total += count as u64;
        Output::list_item(&format!("{} ({} videos)", dir.display(), count));
    }

    let pb = Output::progress_bar(total, "Merging");
    let report = merge_batches(&batch_dirs, &merged_dir, |event| {
        if let MergeEvent::Copied(video_id) = event {
            pb.set_message(video_id.clone());
        }
        pb.inc(1);
    });
    pb.finish_and_clear();
    let report = report?;

    report.write_outputs(&merged_dir, &summary_csv, &stats_json)?;
    let stats = report.stats();

    Output::header("Merge Summary");
    Output::kv("Videos", &stats.total_videos.to_string());
    Output::kv("Chunks", &stats.total_chunks.to_string());
    Output::kv("Avg chunks/video", &format!("{:.1}", stats.avg_chunks_per_video));
    Output::kv("Total duration", &format!("{:.2} hours", stats.total_duration_hours));
    Output::kv("Duplicates skipped", &stats.duplicates_skipped.to_string());
    Output::kv("Errors", &stats.errors.to_string());

    if !stats.chunk_modes.is_empty() {
        Output::header("Chunk modes");
        for (mode, count) in &stats.chunk_modes {
            Output::kv(mode, &count.to_string());
        }
    }

    if !report.errors.is_empty() {
        Output::header("Errors");
        for error in report.errors.iter().take(10) {
            Output::list_item(&format!("{}: {}", error.video_id, error.error));
        }
        if report.errors.len() > 10 {
            Output::info(&format!("... and {} more", report.errors.len() - 10));
        }
    }

    println!();
    Output::success(&format!("Merged corpus at {}", merged_dir.display()));
    Output::kv("Summary", &summary_csv.display().to_string());
    Output::kv("Statistics", &stats_json.display().to_string());

    Ok(())
}
