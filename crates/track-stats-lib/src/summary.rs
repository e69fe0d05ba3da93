//! SummaryReport - running multi-file summary keyed by source identifier
//!
//! Entries keep insertion order. Upserting an existing source replaces its record in place,
//! so reloading the same file never duplicates or reorders the report.

use crate::StatsRecord;
use crate::storage::{StorageBackend, StorageResult, load_json_backend, save_json_backend};
use serde::{Deserialize, Serialize};

/// Storage key under which the summary is persisted
pub const SUMMARY_STORAGE_KEY: &str = "summary-report";

/// A statistics record tagged with the source it was computed from
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SummaryEntry {
    /// Source identifier, usually a file name
    pub source_id: String,
    #[serde(flatten)]
    pub stats: StatsRecord,
}

/// Totals over every entry of a report
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SummaryTotals {
    pub file_count: usize,
    pub total_points: usize,
    pub total_distance_km: f64,
    pub total_elevation_gain_m: f64,
}

/// Ordered summary of per-file statistics
///
/// Starts empty; only [`SummaryReport::upsert`] and [`SummaryReport::clear`] mutate it.
/// When shared between threads, wrap it in a `Mutex` so each upsert stays atomic.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SummaryReport {
    entries: Vec<SummaryEntry>,
}

#[cfg_attr(feature = "profiling", profiling::all_functions)]
impl SummaryReport {
    /// Create an empty report
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a report from a previously saved entry list
    ///
    /// Duplicate source identifiers collapse onto the first position, keeping the last record.
    pub fn from_entries(entries: Vec<SummaryEntry>) -> Self {
        let mut report = Self::new();
        for entry in entries {
            if report.position(&entry.source_id).is_some() {
                tracing::warn!(source = %entry.source_id, "duplicate source in stored summary");
            }
            report.upsert(entry.source_id, entry.stats);
        }
        report
    }

    /// Insert or replace the record for `source_id` and return the current entries
    ///
    /// New sources are appended; existing ones are replaced at their original position.
    pub fn upsert(&mut self, source_id: impl Into<String>, stats: StatsRecord) -> &[SummaryEntry] {
        let source_id = source_id.into();
        match self.position(&source_id) {
            Some(index) => {
                tracing::debug!(source = %source_id, index, "replacing summary entry");
                self.entries[index].stats = stats;
            }
            None => {
                tracing::debug!(source = %source_id, "appending summary entry");
                self.entries.push(SummaryEntry { source_id, stats });
            }
        }
        &self.entries
    }

    /// Remove every entry
    pub fn clear(&mut self) {
        tracing::debug!(entries = self.entries.len(), "clearing summary");
        self.entries.clear();
    }

    /// Entries in display order
    #[inline]
    pub fn list(&self) -> &[SummaryEntry] {
        &self.entries
    }

    /// Consume the report, returning its entries in display order
    pub fn into_entries(self) -> Vec<SummaryEntry> {
        self.entries
    }

    pub fn get(&self, source_id: &str) -> Option<&SummaryEntry> {
        self.position(source_id).map(|index| &self.entries[index])
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Aggregate points, distance and elevation gain over all entries
    pub fn totals(&self) -> SummaryTotals {
        self.entries
            .iter()
            .fold(SummaryTotals::default(), |mut totals, entry| {
                totals.file_count += 1;
                totals.total_points += entry.stats.total_points;
                totals.total_distance_km += entry.stats.total_distance_km;
                totals.total_elevation_gain_m += entry.stats.total_elevation_gain_m;
                totals
            })
    }

    /// Persist the entry list under [`SUMMARY_STORAGE_KEY`]
    pub fn save(&self, backend: &dyn StorageBackend) -> StorageResult<()> {
        save_json_backend(backend, SUMMARY_STORAGE_KEY, self)
    }

    /// Restore a report saved with [`SummaryReport::save`]; empty when nothing was stored
    pub fn load(backend: &dyn StorageBackend) -> StorageResult<Self> {
        let entries: Option<Vec<SummaryEntry>> = load_json_backend(backend, SUMMARY_STORAGE_KEY)?;
        Ok(entries.map(Self::from_entries).unwrap_or_default())
    }

    /// Delete the persisted copy of the report
    pub fn forget(backend: &dyn StorageBackend) -> StorageResult<()> {
        backend.remove(SUMMARY_STORAGE_KEY)
    }

    fn position(&self, source_id: &str) -> Option<usize> {
        self.entries
            .iter()
            .position(|entry| entry.source_id == source_id)
    }
}
