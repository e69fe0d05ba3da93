//! Normalized track model produced by extraction

use crate::{Result, TrackError, stats};
use geo::{BoundingRect, MultiPoint, Point, Rect};
use time::OffsetDateTime;

/// One recorded location sample
///
/// The position follows the `geo` convention (`x` = longitude, `y` = latitude, degrees).
/// A point only exists when both coordinates parsed to finite numbers.
#[derive(Clone, Debug, PartialEq)]
pub struct TrackPoint {
    /// WGS84 position
    pub position: Point<f64>,
    /// Elevation in meters, if the source carried a usable `<ele>`
    pub elevation: Option<f64>,
    /// Recording time, if the source carried a usable `<time>`
    pub time: Option<OffsetDateTime>,
    /// 1-based rank of the source `<trkpt>` within its segment, counted before invalid
    /// points are dropped (so gaps are possible)
    pub sequence_index: usize,
}

impl TrackPoint {
    /// Create a point without elevation or time
    pub fn new(lat: f64, lon: f64, sequence_index: usize) -> Self {
        Self {
            position: Point::new(lon, lat),
            elevation: None,
            time: None,
            sequence_index,
        }
    }

    pub fn with_elevation(mut self, elevation: f64) -> Self {
        self.elevation = Some(elevation);
        self
    }

    pub fn with_time(mut self, time: OffsetDateTime) -> Self {
        self.time = Some(time);
        self
    }

    #[inline]
    pub fn lat(&self) -> f64 {
        self.position.y()
    }

    #[inline]
    pub fn lon(&self) -> f64 {
        self.position.x()
    }
}

/// One continuous recorded segment; never empty
#[derive(Clone, Debug, PartialEq)]
pub struct Track {
    points: Vec<TrackPoint>,
}

impl Track {
    /// Create a track, or `None` when there are no points
    pub fn new(points: Vec<TrackPoint>) -> Option<Self> {
        if points.is_empty() {
            None
        } else {
            Some(Self { points })
        }
    }

    /// Points in recording order
    #[inline]
    pub fn points(&self) -> &[TrackPoint] {
        &self.points
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Always false; kept for API symmetry with `len`
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Sum of haversine distances between consecutive points, in kilometers
    pub fn distance_km(&self) -> f64 {
        stats::distance_km(&self.points)
    }

    /// Sum of positive elevation deltas between consecutive points, in meters
    pub fn elevation_gain_m(&self) -> f64 {
        stats::elevation_gain_m(&self.points)
    }

    /// Earliest and latest timestamp in this track
    pub fn time_range(&self) -> Option<(OffsetDateTime, OffsetDateTime)> {
        stats::time_range(std::iter::once(self))
    }
}

/// All tracks extracted from one source document, in document order
#[derive(Clone, Debug, PartialEq)]
pub struct TrackSet {
    tracks: Vec<Track>,
}

impl TrackSet {
    /// Create a track set; fails with [`TrackError::NoData`] when there are no tracks
    pub fn new(tracks: Vec<Track>) -> Result<Self> {
        if tracks.is_empty() {
            return Err(TrackError::NoData);
        }
        Ok(Self { tracks })
    }

    #[inline]
    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    pub fn into_tracks(self) -> Vec<Track> {
        self.tracks
    }

    /// Number of tracks
    #[inline]
    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    /// Always false; kept for API symmetry with `len`
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    /// Total number of points across all tracks
    pub fn total_points(&self) -> usize {
        self.tracks.iter().map(Track::len).sum()
    }

    /// Iterate over every point of every track, in order
    pub fn points(&self) -> impl Iterator<Item = &TrackPoint> {
        self.tracks.iter().flat_map(|track| track.points.iter())
    }

    /// Bounding rectangle of all points (`x` = longitude, `y` = latitude)
    pub fn bounds(&self) -> Rect<f64> {
        let multi_point: MultiPoint<f64> = self.points().map(|p| p.position).collect();
        // Never empty: every track holds at least one point
        multi_point
            .bounding_rect()
            .unwrap_or_else(|| Rect::new(geo::Coord::zero(), geo::Coord::zero()))
    }

    /// Midpoint of [`TrackSet::bounds`]
    pub fn center(&self) -> Point<f64> {
        self.bounds().center().into()
    }
}
