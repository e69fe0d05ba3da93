use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
/// Track Stats - per-file and cumulative distance, elevation gain and duration of GPX tracks
pub struct Settings {
    /// GPX files to analyze, in order; reloading a file replaces its summary row
    #[clap(value_name = "FILE")]
    pub gpx_files: Vec<PathBuf>,

    /// Summary storage file (default: per-user configuration directory)
    #[clap(long, value_name = "PATH", env = "TRACK_STATS_STORAGE")]
    pub storage: Option<PathBuf>,

    /// Ignore the previously persisted summary and start fresh
    #[clap(long, default_value = "false", env = "TRACK_STATS_IGNORE_PERSISTED")]
    pub ignore_persisted: bool,

    /// Do not write the summary back to storage
    #[clap(long, default_value = "false", env = "TRACK_STATS_NO_SAVE")]
    pub no_save: bool,

    /// Clear the whole summary before analyzing any file (cannot be undone)
    #[clap(long, default_value = "false")]
    pub clear: bool,

    /// Print the summary as JSON instead of a table
    #[clap(long, default_value = "false", env = "TRACK_STATS_JSON")]
    pub json: bool,

    /// Analyze files one after another instead of in parallel
    #[clap(long, default_value = "false", env = "TRACK_STATS_SEQUENTIAL")]
    pub sequential: bool,
}

impl Settings {
    /// Parse settings from the command line and environment, exiting with usage on error
    pub fn from_cli() -> Self {
        Settings::try_parse().unwrap_or_else(|e| e.exit())
    }

    /// Whether a storage file is needed at all
    pub fn uses_storage(&self) -> bool {
        !(self.ignore_persisted && self.no_save)
    }
}
