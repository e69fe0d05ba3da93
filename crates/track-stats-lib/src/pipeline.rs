//! Input boundary: document text in, tracks and statistics out

use crate::{Result, StatsRecord, TrackSet, compute_stats, extract};
use rayon::prelude::*;
use std::path::Path;

/// Everything produced for one source file
///
/// The track set is handed on for rendering; the record goes into the summary.
#[derive(Clone, Debug)]
pub struct FileAnalysis {
    /// Identifier of the source, usually its file name
    pub source_id: String,
    /// Extracted tracks
    pub track_set: TrackSet,
    /// Statistics of `track_set`
    pub stats: StatsRecord,
}

/// Extract and compute statistics for one document
pub fn analyze_document(source_id: impl Into<String>, content: &str) -> Result<FileAnalysis> {
    let source_id = source_id.into();
    let track_set = extract(content)?;
    let stats = compute_stats(&track_set);

    tracing::debug!(
        source = %source_id,
        points = stats.total_points,
        distance_km = stats.total_distance_km,
        "analyzed document"
    );

    Ok(FileAnalysis {
        source_id,
        track_set,
        stats,
    })
}

/// Read a file and analyze it, using its file name as source identifier
pub fn analyze_file(path: &Path) -> Result<FileAnalysis> {
    let content = std::fs::read_to_string(path)?;
    analyze_document(source_id_for(path), &content)
}

/// Analyze many `(source_id, content)` documents in parallel
///
/// Results are returned in input order. Each document is independent; merging results into a
/// [`crate::SummaryReport`] is left to the caller, one upsert at a time.
#[cfg_attr(feature = "profiling", profiling::function)]
pub fn analyze_documents_parallel<S>(documents: &[(String, S)]) -> Vec<Result<FileAnalysis>>
where
    S: AsRef<str> + Sync,
{
    documents
        .par_iter()
        .map(|(source_id, content)| analyze_document(source_id.clone(), content.as_ref()))
        .collect()
}

/// Read and analyze many files in parallel, in input order
#[cfg_attr(feature = "profiling", profiling::function)]
pub fn analyze_files_parallel<P>(paths: &[P]) -> Vec<Result<FileAnalysis>>
where
    P: AsRef<Path> + Sync,
{
    paths
        .par_iter()
        .map(|path| analyze_file(path.as_ref()))
        .collect()
}

/// File name of `path`, or the whole path when it has none
pub fn source_id_for(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
