//! Configuration module for transcript-harvest.
//!
//! Handles loading and managing application settings.

mod settings;

pub use settings::{
    BatchingSettings, ChunkingSettings, DownloadSettings, InputSettings, MergeSettings, Settings,
};
