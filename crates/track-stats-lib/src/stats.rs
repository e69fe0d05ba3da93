//! Statistics engine: distance, elevation gain, point count and duration of a track set

use crate::{Track, TrackPoint, TrackSet, utils};
use serde::{Deserialize, Serialize};
use std::fmt;
use time::OffsetDateTime;

/// Label shown when no point carries a timestamp
pub const DURATION_UNAVAILABLE: &str = "N/A";

/// Time span between the earliest and latest timestamp of a track set
///
/// Stored as whole seconds (sub-second remainders are truncated). `None` means no point
/// had a timestamp.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TripDuration(Option<u64>);

impl TripDuration {
    pub const UNAVAILABLE: TripDuration = TripDuration(None);

    pub fn from_seconds(seconds: u64) -> Self {
        Self(Some(seconds))
    }

    /// Span between two instants, truncated to whole seconds
    pub fn between(start: OffsetDateTime, end: OffsetDateTime) -> Self {
        let seconds = (end - start).whole_seconds().max(0);
        Self(Some(seconds.unsigned_abs()))
    }

    #[inline]
    pub fn seconds(&self) -> Option<u64> {
        self.0
    }

    #[inline]
    pub fn is_available(&self) -> bool {
        self.0.is_some()
    }
}

impl fmt::Display for TripDuration {
    /// `1h 1m` from one hour up, `1m 5s` from one minute up, `42s` below that
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Some(total_seconds) = self.0 else {
            return f.write_str(DURATION_UNAVAILABLE);
        };

        let hours = total_seconds / 3600;
        let minutes = (total_seconds % 3600) / 60;
        let seconds = total_seconds % 60;

        if hours > 0 {
            write!(f, "{hours}h {minutes}m")
        } else if minutes > 0 {
            write!(f, "{minutes}m {seconds}s")
        } else {
            write!(f, "{seconds}s")
        }
    }
}

/// Aggregate statistics for one track set
///
/// Values keep full precision; rounding for display is left to the caller.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct StatsRecord {
    /// Number of points across all tracks
    pub total_points: usize,
    /// Sum of within-track haversine distances in kilometers
    pub total_distance_km: f64,
    /// Sum of positive within-track elevation deltas in meters
    pub total_elevation_gain_m: f64,
    /// Span between the earliest and latest timestamp across all tracks
    pub duration: TripDuration,
}

impl StatsRecord {
    /// Human-readable duration, or `N/A` when no timestamps were recorded
    pub fn duration_label(&self) -> String {
        self.duration.to_string()
    }
}

/// Compute the statistics record of a track set
///
/// Distance and elevation gain are accumulated per track and summed, so no distance is
/// attributed between the end of one track and the start of the next. The duration spans all
/// tracks.
#[cfg_attr(feature = "profiling", profiling::function)]
pub fn compute_stats(track_set: &TrackSet) -> StatsRecord {
    let tracks = track_set.tracks();

    let total_points = track_set.total_points();
    let total_distance_km = tracks.iter().map(Track::distance_km).sum();
    let total_elevation_gain_m = tracks.iter().map(Track::elevation_gain_m).sum();
    let duration = time_range(tracks)
        .map(|(start, end)| TripDuration::between(start, end))
        .unwrap_or_default();

    tracing::debug!(
        tracks = tracks.len(),
        total_points,
        total_distance_km,
        total_elevation_gain_m,
        %duration,
        "computed track statistics"
    );

    StatsRecord {
        total_points,
        total_distance_km,
        total_elevation_gain_m,
        duration,
    }
}

/// Haversine distance along consecutive points, in kilometers
pub(crate) fn distance_km(points: &[TrackPoint]) -> f64 {
    points
        .windows(2)
        .map(|pair| utils::haversine_km(pair[0].position, pair[1].position))
        .sum()
}

/// Positive elevation deltas along consecutive points where both carry elevation
pub(crate) fn elevation_gain_m(points: &[TrackPoint]) -> f64 {
    points
        .windows(2)
        .filter_map(|pair| match (pair[0].elevation, pair[1].elevation) {
            (Some(previous), Some(current)) => Some(current - previous),
            _ => None,
        })
        .filter(|delta| *delta > 0.0)
        .sum()
}

/// Earliest and latest timestamp over all points of the given tracks
pub(crate) fn time_range<'a>(
    tracks: impl IntoIterator<Item = &'a Track>,
) -> Option<(OffsetDateTime, OffsetDateTime)> {
    tracks
        .into_iter()
        .flat_map(|track| track.points().iter())
        .filter_map(|point| point.time)
        .fold(None, |range, time| match range {
            None => Some((time, time)),
            Some((start, end)) => Some((start.min(time), end.max(time))),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    fn create_test_track(points: Vec<TrackPoint>) -> Track {
        Track::new(points).unwrap()
    }

    fn with_elevations(elevations: &[Option<f64>]) -> Track {
        let points = elevations
            .iter()
            .enumerate()
            .map(|(i, elevation)| {
                let point = TrackPoint::new(45.0, 7.0 + i as f64 * 0.001, i + 1);
                match elevation {
                    Some(e) => point.with_elevation(*e),
                    None => point,
                }
            })
            .collect();
        create_test_track(points)
    }

    #[test]
    fn test_distance_one_degree_at_equator() {
        let track = create_test_track(vec![
            TrackPoint::new(0.0, 0.0, 1),
            TrackPoint::new(0.0, 1.0, 2),
        ]);
        let stats = compute_stats(&TrackSet::new(vec![track]).unwrap());
        assert!((stats.total_distance_km - 111.19).abs() < 0.1);
    }

    #[test]
    fn test_single_point_track_has_zero_distance() {
        let track = create_test_track(vec![TrackPoint::new(10.0, 10.0, 1)]);
        assert_eq!(track.distance_km(), 0.0);

        let stats = compute_stats(&TrackSet::new(vec![track]).unwrap());
        assert_eq!(stats.total_points, 1);
        assert_eq!(stats.total_distance_km, 0.0);
        assert_eq!(stats.total_elevation_gain_m, 0.0);
    }

    #[test]
    fn test_distance_is_sum_of_consecutive_pairs() {
        let points = vec![
            TrackPoint::new(45.0, 7.0, 1),
            TrackPoint::new(45.01, 7.0, 2),
            TrackPoint::new(45.01, 7.02, 3),
        ];
        let expected = utils::haversine_km(points[0].position, points[1].position)
            + utils::haversine_km(points[1].position, points[2].position);

        let track = create_test_track(points);
        assert!((track.distance_km() - expected).abs() < 1e-12);
    }

    #[test]
    fn test_no_distance_between_tracks() {
        let first = create_test_track(vec![
            TrackPoint::new(0.0, 0.0, 1),
            TrackPoint::new(0.0, 1.0, 2),
        ]);
        let second = create_test_track(vec![
            TrackPoint::new(40.0, 40.0, 1),
            TrackPoint::new(40.0, 40.01, 2),
        ]);
        let expected = first.distance_km() + second.distance_km();

        let stats = compute_stats(&TrackSet::new(vec![first, second]).unwrap());
        assert!((stats.total_distance_km - expected).abs() < 1e-9);
        // A jump from (0, 1) to (40, 40) alone would add thousands of kilometers
        assert!(stats.total_distance_km < 113.0);
    }

    #[test]
    fn test_elevation_gain_ignores_descents() {
        let track = with_elevations(&[Some(100.0), Some(150.0), Some(120.0), Some(160.0)]);
        assert_eq!(track.elevation_gain_m(), 90.0);
    }

    #[test]
    fn test_elevation_gain_skips_pairs_with_missing_elevation() {
        let track = with_elevations(&[Some(100.0), None, Some(200.0), Some(210.0)]);
        assert_eq!(track.elevation_gain_m(), 10.0);

        let flat = with_elevations(&[None, None, None]);
        assert_eq!(flat.elevation_gain_m(), 0.0);
    }

    #[test]
    fn test_elevation_gain_unchanged_by_lower_point() {
        let before = with_elevations(&[Some(10.0), Some(30.0), Some(25.0), Some(40.0)]);
        let after = with_elevations(&[Some(10.0), Some(30.0), Some(25.0), Some(40.0), Some(5.0)]);
        assert_eq!(before.elevation_gain_m(), after.elevation_gain_m());
        assert!(after.elevation_gain_m() >= 0.0);
    }

    #[test]
    fn test_elevation_gain_not_connected_across_tracks() {
        let low = with_elevations(&[Some(0.0), Some(10.0)]);
        let high = with_elevations(&[Some(500.0), Some(505.0)]);
        let stats = compute_stats(&TrackSet::new(vec![low, high]).unwrap());
        assert_eq!(stats.total_elevation_gain_m, 15.0);
    }

    #[test]
    fn test_duration_spans_all_tracks() {
        let first = create_test_track(vec![
            TrackPoint::new(0.0, 0.0, 1).with_time(datetime!(2024-05-01 10:00:00 UTC)),
            TrackPoint::new(0.0, 0.1, 2).with_time(datetime!(2024-05-01 10:30:00 UTC)),
        ]);
        let second = create_test_track(vec![
            TrackPoint::new(0.0, 0.2, 1),
            TrackPoint::new(0.0, 0.3, 2).with_time(datetime!(2024-05-01 11:01:01 UTC)),
        ]);

        let stats = compute_stats(&TrackSet::new(vec![first, second]).unwrap());
        assert_eq!(stats.duration.seconds(), Some(3661));
        assert_eq!(stats.duration_label(), "1h 1m");
    }

    #[test]
    fn test_duration_uses_min_and_max_not_first_and_last() {
        let track = create_test_track(vec![
            TrackPoint::new(0.0, 0.0, 1).with_time(datetime!(2024-05-01 10:00:30 UTC)),
            TrackPoint::new(0.0, 0.1, 2).with_time(datetime!(2024-05-01 10:00:00 UTC)),
            TrackPoint::new(0.0, 0.2, 3).with_time(datetime!(2024-05-01 10:00:45 UTC)),
            TrackPoint::new(0.0, 0.3, 4).with_time(datetime!(2024-05-01 10:00:10 UTC)),
        ]);
        let stats = compute_stats(&TrackSet::new(vec![track]).unwrap());
        assert_eq!(stats.duration_label(), "45s");
    }

    #[test]
    fn test_duration_unavailable_without_timestamps() {
        let track = with_elevations(&[Some(1.0), Some(2.0)]);
        let stats = compute_stats(&TrackSet::new(vec![track]).unwrap());
        assert!(!stats.duration.is_available());
        assert_eq!(stats.duration_label(), DURATION_UNAVAILABLE);
    }

    #[test]
    fn test_duration_single_timestamp_is_zero() {
        let track = create_test_track(vec![
            TrackPoint::new(0.0, 0.0, 1).with_time(datetime!(2024-05-01 10:00:00 UTC)),
            TrackPoint::new(0.0, 0.1, 2),
        ]);
        let stats = compute_stats(&TrackSet::new(vec![track]).unwrap());
        assert_eq!(stats.duration_label(), "0s");
    }

    #[test]
    fn test_duration_truncates_subseconds() {
        let duration = TripDuration::between(
            datetime!(2024-05-01 10:00:00 UTC),
            datetime!(2024-05-01 10:00:59.999 UTC),
        );
        assert_eq!(duration.seconds(), Some(59));
    }

    #[test]
    fn test_duration_formats() {
        assert_eq!(TripDuration::from_seconds(0).to_string(), "0s");
        assert_eq!(TripDuration::from_seconds(59).to_string(), "59s");
        assert_eq!(TripDuration::from_seconds(60).to_string(), "1m 0s");
        assert_eq!(TripDuration::from_seconds(3599).to_string(), "59m 59s");
        assert_eq!(TripDuration::from_seconds(3600).to_string(), "1h 0m");
        assert_eq!(TripDuration::from_seconds(3661).to_string(), "1h 1m");
        assert_eq!(TripDuration::from_seconds(90061).to_string(), "25h 1m");
        assert_eq!(TripDuration::UNAVAILABLE.to_string(), "N/A");
    }

    #[test]
    fn test_record_serializes_duration_as_seconds() {
        let record = StatsRecord {
            total_points: 5,
            total_distance_km: 1.5,
            total_elevation_gain_m: 20.0,
            duration: TripDuration::from_seconds(61),
        };
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["duration"], 61);

        let unavailable = StatsRecord::default();
        let json = serde_json::to_value(&unavailable).unwrap();
        assert!(json["duration"].is_null());
    }
}
