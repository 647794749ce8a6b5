//! Split command implementation.

use crate::batch::split_batches;
use crate::cli::{Output, SplitArgs};
use crate::config::Settings;
use crate::input::load_video_ids;
use anyhow::Result;

/// Run the split command.
pub fn run_split(args: &SplitArgs, settings: &Settings) -> Result<()> {
    let batching = &settings.batching;
    let input = args
        .input
        .clone()
        .unwrap_or_else(|| Settings::expand_path(&batching.input_csv));
    let output_dir = args
        .output_dir
        .clone()
        .unwrap_or_else(|| Settings::expand_path(&batching.output_dir));
    let per_batch = args.videos_per_batch.unwrap_or(batching.videos_per_batch);
    let prefix = args.prefix.as_deref().unwrap_or(&batching.file_prefix);

    Output::info(&format!("Reading {}", input.display()));
    let video_ids = load_video_ids(&input, &settings.input)?;
    if video_ids.is_empty() {
        Output::warning("No videos found in input; nothing to split.");
        return Ok(());
    }

    let plan = split_batches(&video_ids, per_batch, prefix, &batching.platforms)?;
    let files = plan.write(
        &output_dir,
        &settings.input.video_id_column,
        &batching.assignments_file,
        &batching.plan_file,
    )?;

    Output::header("Batch Plan");
    Output::kv("Total videos", &plan.total_videos.to_string());
    Output::kv("Videos per batch", &plan.videos_per_batch.to_string());
    Output::kv("Batches", &plan.num_batches.to_string());

    for (batch, path) in plan.batches.iter().zip(&files.batch_files) {
        Output::list_item(&format!(
            "Batch {} [{}]: videos {}-{} ({} videos)",
            batch.batch, batch.platform, batch.start, batch.end, batch.count
        ));
        Output::command(&format!(
            "harvest download {} --output-dir {}_transcripts_batch_{}",
            path.display(),
            prefix,
            batch.batch
        ));
    }

    println!();
    Output::success(&format!(
        "Wrote {} batch files, {} and {}",
        files.batch_files.len(),
        files.assignments.display(),
        files.plan.display()
    ));

    Ok(())
}
