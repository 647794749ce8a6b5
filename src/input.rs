//! Reading video lists from tabular input.

use crate::config::InputSettings;
use crate::error::{HarvestError, Result};
use crate::transcription::extract_video_id;
use std::collections::HashSet;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info};

/// Load the deduplicated, order-preserving list of video IDs from a CSV file.
pub fn load_video_ids(path: &Path, settings: &InputSettings) -> Result<Vec<String>> {
    let file = std::fs::File::open(path).map_err(|e| {
        HarvestError::InvalidInput(format!("Cannot open {}: {}", path.display(), e))
    })?;
    let ids = read_video_ids(file, settings)?;
    info!("Loaded {} video IDs from {}", ids.len(), path.display());
    Ok(ids)
}

/// Read video IDs from CSV data.
///
/// Blank IDs are dropped, YouTube URLs are reduced to their ID, and rows whose
/// availability flag is false are skipped when that column exists.
pub fn read_video_ids<R: Read>(reader: R, settings: &InputSettings) -> Result<Vec<String>> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    let headers = csv_reader.headers()?.clone();

    let id_index = headers
        .iter()
        .position(|h| h.trim() == settings.video_id_column)
        .ok_or_else(|| {
            HarvestError::InvalidInput(format!(
                "Column '{}' not found (columns: {})",
                settings.video_id_column,
                headers.iter().collect::<Vec<_>>().join(", ")
            ))
        })?;

    let flag_index = settings
        .availability_column
        .as_deref()
        .and_then(|column| headers.iter().position(|h| h.trim() == column));

    let mut seen = HashSet::new();
    let mut ids = Vec::new();

    for record in csv_reader.records() {
        let record = record?;

        if let Some(index) = flag_index {
            if !record.get(index).is_some_and(parse_flag) {
                continue;
            }
        }

        let Some(raw) = record.get(id_index).map(str::trim).filter(|v| !v.is_empty()) else {
            continue;
        };

        let id = extract_video_id(raw).unwrap_or_else(|| raw.to_string());
        if seen.insert(id.clone()) {
            ids.push(id);
        } else {
            debug!("Dropping duplicate video ID {}", id);
        }
    }

    Ok(ids)
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_lowercase().as_str(),
        "true" | "1" | "yes" | "y" | "t"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> InputSettings {
        InputSettings::default()
    }

    #[test]
    fn test_reads_and_dedupes_in_order() {
        let data = "video_id,title\nbbbbbbbbbbb,B\naaaaaaaaaaa,A\nbbbbbbbbbbb,B again\n,empty\n";
        let ids = read_video_ids(data.as_bytes(), &settings()).unwrap();
        assert_eq!(ids, vec!["bbbbbbbbbbb", "aaaaaaaaaaa"]);
    }

    #[test]
    fn test_availability_filter() {
        let data = "video_id,has_transcript\nid_one_0001,True\nid_two_0002,False\nid_three_03,true\n";
        let ids = read_video_ids(data.as_bytes(), &settings()).unwrap();
        assert_eq!(ids, vec!["id_one_0001", "id_three_03"]);
    }

    #[test]
    fn test_missing_availability_column_keeps_all() {
        let data = "video_id\nx1\nx2\n";
        let ids = read_video_ids(data.as_bytes(), &settings()).unwrap();
        assert_eq!(ids, vec!["x1", "x2"]);
    }

    #[test]
    fn test_urls_are_normalized() {
        let data = "video_id\nhttps://www.youtube.com/watch?v=dQw4w9WgXcQ\ndQw4w9WgXcQ\n";
        let ids = read_video_ids(data.as_bytes(), &settings()).unwrap();
        assert_eq!(ids, vec!["dQw4w9WgXcQ"]);
    }

    #[test]
    fn test_missing_id_column() {
        let data = "id,title\nx,y\n";
        let err = read_video_ids(data.as_bytes(), &settings()).unwrap_err();
        assert!(matches!(err, HarvestError::InvalidInput(_)));
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_video_ids(&dir.path().join("nope.csv"), &settings()).is_err());
    }
}
