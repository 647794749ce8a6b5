//! Download command implementation.

use crate::batch::ProgressStore;
use crate::chunking::RandomTarget;
use crate::cli::{format_duration, DownloadArgs, Output};
use crate::config::Settings;
use crate::input::load_video_ids;
use crate::orchestrator::Harvester;
use crate::transcription::YoutubeTranscriptProvider;
use anyhow::Result;
use std::sync::Arc;

/// Run the download command.
pub async fn run_download(args: &DownloadArgs, mut settings: Settings) -> Result<()> {
    apply_overrides(args, &mut settings);
    settings.validate()?;

    let download = &settings.download;
    let input = args
        .input
        .clone()
        .unwrap_or_else(|| Settings::expand_path(&download.input_csv));
    let output_dir = Settings::expand_path(&download.output_dir);

    let master = load_video_ids(&input, &settings.input)?;
    let mut store = ProgressStore::open(&output_dir, download.resume, download.save_every)?;
    store.set_total(master.len());

    let videos = store.plan_window(&master, download.start_index, download.batch_size);

    Output::header("Transcript Download");
    Output::kv("Input", &input.display().to_string());
    Output::kv("Output", &output_dir.display().to_string());
    Output::kv("Language", &download.language);
    Output::kv("Chunking", &settings.chunking.mode.to_string());
    Output::kv("Videos in list", &master.len().to_string());
    Output::kv("Already downloaded", &store.completed_count().to_string());
    Output::kv(
        "This run",
        &format!(
            "{} (from index {} of the remaining videos)",
            videos.len(),
            download.start_index
        ),
    );

    if videos.is_empty() {
        Output::success("Nothing left to download in this window.");
        return Ok(());
    }

    let provider = YoutubeTranscriptProvider::new(download.request_timeout())?;
    let mut harvester = Harvester::new(&settings, Arc::new(provider))?;
    if let Some(seed) = args.seed {
        harvester = harvester.with_sampler(RandomTarget::seeded(seed));
    }

    let pb = Output::progress_bar(videos.len() as u64, "Downloading");
    let report = harvester
        .run_batch(&mut store, &videos, |record| {
            pb.set_message(record.video_id.clone());
            pb.inc(1);
        })
        .await;
    pb.finish_and_clear();
    let report = report?;

    let summary_path = output_dir.join(format!("batch_summary_{}.csv", download.start_index));
    let summary_written = report.write_summary(&summary_path)?;

    Output::header("Summary");
    Output::kv("Processed", &report.processed().to_string());
    Output::kv("Successful", &report.success_count().to_string());
    Output::kv("Failed", &(report.processed() - report.success_count()).to_string());
    Output::kv("Total chunks", &report.total_chunks().to_string());
    Output::kv("Completed overall", &format!("{}/{}", store.completed_count(), master.len()));

    if let Some(stats) = report.chunk_duration_stats() {
        Output::kv(
            "Chunk duration",
            &format!(
                "avg {:.1}s (per-video range {:.1}s-{:.1}s)",
                stats.average, stats.min, stats.max
            ),
        );
    }

    for failure in report.failures().take(10) {
        Output::list_item(&format!("{}: {}", failure.video_id, failure.error));
    }

    if let Some(video_id) = &report.rate_limited_at {
        println!();
        Output::warning(&format!("Rate limited at {}. Progress has been saved.", video_id));
        Output::warning("Wait before the next run; it will resume from the remaining videos.");
    }

    let elapsed = format_duration(pb.elapsed().as_secs_f64());
    if summary_written {
        Output::success(&format!(
            "Done in {}. Summary written to {}",
            elapsed,
            summary_path.display()
        ));
    } else {
        Output::success(&format!("Done in {}. No videos processed; no summary written.", elapsed));
    }

    Ok(())
}

fn apply_overrides(args: &DownloadArgs, settings: &mut Settings) {
    let download = &mut settings.download;
    if let Some(dir) = &args.output_dir {
        download.output_dir = dir.display().to_string();
    }
    if let Some(start) = args.start_index {
        download.start_index = start;
    }
    if let Some(size) = args.batch_size {
        download.batch_size = size;
    }
    if let Some(language) = &args.language {
        download.language = language.clone();
    }
    if args.no_resume {
        download.resume = false;
    }

    let chunking = &mut settings.chunking;
    if let Some(mode) = args.mode {
        chunking.mode = mode;
    }
    if let Some(min) = args.min_duration {
        chunking.min_chunk_seconds = min;
    }
    if let Some(max) = args.max_duration {
        chunking.max_chunk_seconds = max;
    }
}
