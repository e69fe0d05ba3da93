//! Track extraction from GPX document text
//!
//! The document is walked with a streaming XML reader. Elements are matched by local name
//! (namespace prefixes are ignored) on descendants: `trk` anywhere, `trkseg` inside a `trk`,
//! `trkpt` inside a `trkseg`, and the first `ele` / `time` inside a `trkpt`. Document order is
//! preserved for tracks, segments and points.

use crate::{Result, Track, TrackError, TrackPoint, TrackSet, utils};
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use time::OffsetDateTime;

/// Extract every non-empty track segment of a GPX document
///
/// Fails with [`TrackError::Parse`] when the text is not well-formed XML (no partial result is
/// returned) and with [`TrackError::NoData`] when no segment holds a valid point. Points whose
/// latitude or longitude do not parse are dropped silently.
#[cfg_attr(feature = "profiling", profiling::function)]
pub fn extract(document: &str) -> Result<TrackSet> {
    let document = document.strip_prefix('\u{feff}').unwrap_or(document);
    let mut reader = Reader::from_str(document);
    let mut walker = Walker::default();

    loop {
        let position = reader.buffer_position();
        let event = reader
            .read_event()
            .map_err(|e| TrackError::parse(reader.buffer_position(), e.to_string()))?;

        match event {
            Event::Start(ref element) => walker.open(element, position)?,
            Event::Empty(ref element) => {
                walker.open(element, position)?;
                walker.close(position)?;
            }
            Event::End(_) => walker.close(position)?,
            Event::Text(ref text) => {
                let text = text
                    .unescape()
                    .map_err(|e| TrackError::parse(position, e.to_string()))?;
                walker.text(&text, position)?;
            }
            Event::CData(ref cdata) => {
                walker.text(&String::from_utf8_lossy(cdata), position)?;
            }
            Event::Eof => break,
            // Declarations, comments, processing instructions and doctypes carry no track data
            _ => {}
        }
    }

    walker.finish(reader.buffer_position())
}

/// Role of an open element in the walk
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Node {
    Track,
    Segment,
    Point,
    Elevation,
    Time,
    Other,
}

/// Point under construction; coordinates are `None` when they failed to parse
#[derive(Debug)]
struct PendingPoint {
    lat: Option<f64>,
    lon: Option<f64>,
    sequence_index: usize,
    elevation: Option<f64>,
    elevation_seen: bool,
    time: Option<OffsetDateTime>,
    time_seen: bool,
}

#[derive(Debug, Default)]
struct PendingSegment {
    points: Vec<TrackPoint>,
    /// Number of `trkpt` elements seen so far, valid or not
    rank: usize,
}

#[derive(Debug, Default)]
struct Walker {
    stack: Vec<Node>,
    root_seen: bool,
    open_tracks: usize,
    segment: Option<PendingSegment>,
    point: Option<PendingPoint>,
    /// Text collected for the `ele` or `time` element currently open
    capture: Option<String>,
    tracks: Vec<Track>,
    dropped_points: usize,
}

impl Walker {
    fn open(&mut self, element: &BytesStart<'_>, position: usize) -> Result<()> {
        check_start_tag(element, position)?;
        if self.stack.is_empty() {
            if self.root_seen {
                return Err(TrackError::parse(position, "multiple root elements"));
            }
            self.root_seen = true;
        }

        let node = match element.local_name().as_ref() {
            b"trk" => {
                self.open_tracks += 1;
                Node::Track
            }
            b"trkseg" if self.open_tracks > 0 && self.segment.is_none() => {
                self.segment = Some(PendingSegment::default());
                Node::Segment
            }
            b"trkpt" if self.point.is_none() => match self.segment.as_mut() {
                Some(segment) => {
                    segment.rank += 1;
                    let (lat, lon) = read_coordinates(element, position)?;
                    self.point = Some(PendingPoint {
                        lat,
                        lon,
                        sequence_index: segment.rank,
                        elevation: None,
                        elevation_seen: false,
                        time: None,
                        time_seen: false,
                    });
                    Node::Point
                }
                None => Node::Other,
            },
            b"ele" if self.capture.is_none() => match self.point.as_mut() {
                Some(point) if !point.elevation_seen => {
                    point.elevation_seen = true;
                    self.capture = Some(String::new());
                    Node::Elevation
                }
                _ => Node::Other,
            },
            b"time" if self.capture.is_none() => match self.point.as_mut() {
                Some(point) if !point.time_seen => {
                    point.time_seen = true;
                    self.capture = Some(String::new());
                    Node::Time
                }
                _ => Node::Other,
            },
            _ => Node::Other,
        };

        self.stack.push(node);
        Ok(())
    }

    fn close(&mut self, position: usize) -> Result<()> {
        let node = self
            .stack
            .pop()
            .ok_or_else(|| TrackError::parse(position, "closing tag without matching start"))?;

        match node {
            Node::Track => self.open_tracks -= 1,
            Node::Segment => {
                if let Some(segment) = self.segment.take()
                    && let Some(track) = Track::new(segment.points)
                {
                    self.tracks.push(track);
                }
            }
            Node::Point => self.finish_point(),
            Node::Elevation => {
                let text = self.capture.take().unwrap_or_default();
                if let Some(point) = self.point.as_mut() {
                    point.elevation = utils::parse_finite(&text);
                }
            }
            Node::Time => {
                let text = self.capture.take().unwrap_or_default();
                if let Some(point) = self.point.as_mut() {
                    point.time = utils::parse_timestamp(&text);
                }
            }
            Node::Other => {}
        }
        Ok(())
    }

    fn text(&mut self, text: &str, position: usize) -> Result<()> {
        if self.stack.is_empty() {
            if text.trim().is_empty() {
                return Ok(());
            }
            return Err(TrackError::parse(position, "text outside the root element"));
        }
        if let Some(capture) = self.capture.as_mut() {
            capture.push_str(text);
        }
        Ok(())
    }

    fn finish_point(&mut self) {
        let Some(pending) = self.point.take() else {
            return;
        };
        let Some(segment) = self.segment.as_mut() else {
            return;
        };

        match (pending.lat, pending.lon) {
            (Some(lat), Some(lon)) => {
                let mut point = TrackPoint::new(lat, lon, pending.sequence_index);
                point.elevation = pending.elevation;
                point.time = pending.time;
                segment.points.push(point);
            }
            _ => {
                tracing::trace!(
                    sequence_index = pending.sequence_index,
                    "dropping track point with invalid coordinates"
                );
                self.dropped_points += 1;
            }
        }
    }

    fn finish(self, position: usize) -> Result<TrackSet> {
        if let Some(node) = self.stack.last() {
            return Err(TrackError::parse(
                position,
                format!("unexpected end of document inside {node:?} element"),
            ));
        }
        if !self.root_seen {
            return Err(TrackError::parse(position, "no root element"));
        }

        let points: usize = self.tracks.iter().map(Track::len).sum();
        tracing::debug!(
            tracks = self.tracks.len(),
            points,
            dropped_points = self.dropped_points,
            "extracted tracks"
        );

        TrackSet::new(self.tracks)
    }
}

/// Reject start tags the reader lets through unchecked: invalid names and malformed,
/// unquoted, valueless or duplicate attributes
fn check_start_tag(element: &BytesStart<'_>, position: usize) -> Result<()> {
    check_name(element.name().as_ref(), position)?;
    for attribute in element.attributes() {
        let attribute = attribute.map_err(|e| TrackError::parse(position, e.to_string()))?;
        check_name(attribute.key.as_ref(), position)?;
    }
    Ok(())
}

fn check_name(name: &[u8], position: usize) -> Result<()> {
    if std::str::from_utf8(name).is_ok_and(is_xml_name) {
        return Ok(());
    }
    Err(TrackError::parse(
        position,
        format!("invalid name {:?}", String::from_utf8_lossy(name)),
    ))
}

fn is_xml_name(name: &str) -> bool {
    let mut chars = name.chars();
    chars
        .next()
        .is_some_and(|c| c.is_alphabetic() || c == '_' || c == ':')
        && chars.all(|c| c.is_alphanumeric() || matches!(c, '_' | ':' | '-' | '.'))
}

/// Read `lat` and `lon`; unparseable or missing values become `None`
fn read_coordinates(
    element: &BytesStart<'_>,
    position: usize,
) -> Result<(Option<f64>, Option<f64>)> {
    let mut lat = None;
    let mut lon = None;

    for attribute in element.attributes() {
        let attribute = attribute.map_err(|e| TrackError::parse(position, e.to_string()))?;
        let target = match attribute.key.local_name().as_ref() {
            b"lat" => &mut lat,
            b"lon" => &mut lon,
            _ => continue,
        };
        let value = attribute
            .unescape_value()
            .map_err(|e| TrackError::parse(position, e.to_string()))?;
        *target = utils::parse_finite(&value);
    }

    Ok((lat, lon))
}

impl TrackSet {
    /// Build a track set from an already-parsed GPX model
    ///
    /// Applies the same rules as [`extract`]: one track per non-empty segment, non-finite
    /// coordinates dropped, [`TrackError::NoData`] when nothing remains.
    pub fn from_gpx(gpx: &gpx::Gpx) -> Result<Self> {
        let tracks = gpx
            .tracks
            .iter()
            .flat_map(|track| track.segments.iter())
            .filter_map(|segment| {
                let points = segment
                    .points
                    .iter()
                    .enumerate()
                    .filter_map(|(i, waypoint)| {
                        let position = waypoint.point();
                        if !position.x().is_finite() || !position.y().is_finite() {
                            return None;
                        }
                        let mut point = TrackPoint::new(position.y(), position.x(), i + 1);
                        point.elevation = waypoint.elevation.filter(|e| e.is_finite());
                        point.time = waypoint.time.map(OffsetDateTime::from);
                        Some(point)
                    })
                    .collect();
                Track::new(points)
            })
            .collect();

        TrackSet::new(tracks)
    }
}
