//! Track Stats - command line front-end
//!
//! Analyzes GPX files, prints per-file statistics and a running summary that survives
//! between runs.

mod logging;
mod report;
mod settings;

use settings::Settings;
use std::io::{self, Write};
use std::process::ExitCode;
use thiserror::Error;
use track_stats_lib::storage::{FileStorage, MemoryStorage, StorageBackend, StorageError};
use track_stats_lib::{
    FileAnalysis, SummaryReport, TrackError, analyze_file, analyze_files_parallel,
};

#[derive(Error, Debug)]
enum CliError {
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Output error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

fn main() -> ExitCode {
    let settings = Settings::from_cli();
    logging::setup_logging();
    tracing::debug!(
        "{} {}",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION")
    );

    match run(&settings) {
        Ok(code) => code,
        Err(e) => {
            tracing::error!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn run(settings: &Settings) -> Result<ExitCode, CliError> {
    let storage: Box<dyn StorageBackend> = if settings.uses_storage() {
        let storage = FileStorage::new_with_path(settings.storage.clone())?;
        tracing::debug!(path = %storage.path().display(), "using summary storage");
        Box::new(storage)
    } else {
        Box::new(MemoryStorage::new())
    };

    let mut out = io::stdout().lock();
    let failures = run_session(settings, storage.as_ref(), &mut out)?;

    Ok(if failures == 0 {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

/// Load, update, print and save the summary; returns the number of files that failed
fn run_session(
    settings: &Settings,
    storage: &dyn StorageBackend,
    out: &mut impl Write,
) -> Result<usize, CliError> {
    let mut summary = if settings.ignore_persisted {
        SummaryReport::new()
    } else {
        SummaryReport::load(storage)?
    };

    if settings.clear {
        summary.clear();
        if !settings.no_save {
            SummaryReport::forget(storage)?;
        }
        tracing::info!("Summary cleared");
    }

    let results: Vec<track_stats_lib::Result<FileAnalysis>> = if settings.sequential {
        settings
            .gpx_files
            .iter()
            .map(|path| analyze_file(path))
            .collect()
    } else {
        analyze_files_parallel(&settings.gpx_files)
    };

    let mut failures = 0usize;

    // Upserts stay on this thread, one file at a time, in command line order
    for (path, result) in settings.gpx_files.iter().zip(results) {
        match result {
            Ok(analysis) => {
                if !settings.json {
                    report::write_file_analysis(&mut *out, &analysis)?;
                }
                tracing::info!(file = %path.display(), "File loaded");
                summary.upsert(analysis.source_id, analysis.stats);
            }
            Err(e) => {
                failures += 1;
                tracing::error!(file = %path.display(), "{}", describe(&e));
            }
        }
    }

    if settings.json {
        serde_json::to_writer_pretty(&mut *out, &summary)?;
        writeln!(out)?;
    } else {
        if !settings.gpx_files.is_empty() {
            writeln!(out)?;
        }
        report::write_summary_table(&mut *out, &summary)?;
    }
    out.flush()?;

    if !settings.no_save {
        summary.save(storage)?;
    }

    Ok(failures)
}

/// User-facing message for a failed file
fn describe(error: &TrackError) -> String {
    match error {
        TrackError::Parse { .. } => format!("Invalid GPX file ({error})"),
        TrackError::NoData => "No geographic data found".to_string(),
        TrackError::Io(e) => format!("Could not read file: {e}"),
    }
}
