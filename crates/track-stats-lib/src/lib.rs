//! Track Stats Library - GPX extraction and trip statistics
//!
//! This library turns the text of a GPX document into a normalized track model and reduces that
//! model to a fixed-shape statistics record. Records from many files are collected in a keyed
//! summary that can be persisted between sessions.
//!
//! # Architecture
//!
//! - **[`TrackSet`]**: Ordered [`Track`]s of [`TrackPoint`]s extracted from one document
//! - **[`extract`]**: Streaming XML walk producing a [`TrackSet`] or a typed [`TrackError`]
//! - **[`compute_stats`]**: Distance, elevation gain, point count and duration ([`StatsRecord`])
//! - **[`SummaryReport`]**: Ordered, keyed multi-file summary with upsert/clear semantics
//! - **[`storage`]**: Medium-agnostic key/value persistence for the summary
//!
//! # Usage Example
//!
//! ```rust
//! use track_stats_lib::{SummaryReport, analyze_document};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let gpx = r#"<gpx><trk><trkseg>
//!     <trkpt lat="0" lon="0"><ele>100</ele></trkpt>
//!     <trkpt lat="0" lon="1"><ele>150</ele></trkpt>
//! </trkseg></trk></gpx>"#;
//!
//! let analysis = analyze_document("ride.gpx", gpx)?;
//! assert_eq!(analysis.stats.total_points, 2);
//!
//! let mut report = SummaryReport::new();
//! report.upsert(analysis.source_id, analysis.stats);
//! assert_eq!(report.len(), 1);
//! # Ok(())
//! # }
//! ```

mod extract;
mod pipeline;
mod stats;
mod summary;
mod track;
pub mod storage;
pub mod utils;

// Public API exports
pub use extract::extract;
pub use pipeline::{
    FileAnalysis, analyze_document, analyze_documents_parallel, analyze_file,
    analyze_files_parallel, source_id_for,
};
pub use stats::{DURATION_UNAVAILABLE, StatsRecord, TripDuration, compute_stats};
pub use summary::{SUMMARY_STORAGE_KEY, SummaryEntry, SummaryReport, SummaryTotals};
pub use track::{Track, TrackPoint, TrackSet};

/// Error types for track extraction
#[derive(Debug, thiserror::Error)]
pub enum TrackError {
    #[error("Invalid GPX document at byte {position}: {reason}")]
    Parse { position: usize, reason: String },

    #[error("No geographic data found")]
    NoData,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl TrackError {
    pub(crate) fn parse(position: usize, reason: impl Into<String>) -> Self {
        TrackError::Parse {
            position,
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, TrackError>;
