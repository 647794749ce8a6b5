//! CLI command implementations.

mod config;
mod download;
mod merge;
mod split;

pub use config::run_config;
pub use download::run_download;
pub use merge::run_merge;
pub use split::run_split;
