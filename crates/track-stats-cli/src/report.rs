//! Text rendering of per-file statistics and the summary table.
//!
//! Display rounding happens here only: distances with two decimals, elevation and
//! point counts as integers.

use std::io::{self, Write};
use track_stats_lib::{FileAnalysis, SummaryReport};

pub fn format_distance_km(distance_km: f64) -> String {
    format!("{distance_km:.2}")
}

/// Whole meters, halves rounded up
pub fn format_elevation_m(elevation_m: f64) -> String {
    format!("{}", elevation_m.round() as i64)
}

/// One header line per file, one line per track, then the geographic bounds
pub fn write_file_analysis(out: &mut impl Write, analysis: &FileAnalysis) -> io::Result<()> {
    let stats = &analysis.stats;
    writeln!(
        out,
        "{}: {} points, {} km, +{} m, {}",
        analysis.source_id,
        stats.total_points,
        format_distance_km(stats.total_distance_km),
        format_elevation_m(stats.total_elevation_gain_m),
        stats.duration_label()
    )?;

    for (i, track) in analysis.track_set.tracks().iter().enumerate() {
        writeln!(
            out,
            "  track {}: {} points, {} km, +{} m",
            i + 1,
            track.len(),
            format_distance_km(track.distance_km()),
            format_elevation_m(track.elevation_gain_m())
        )?;
    }

    let bounds = analysis.track_set.bounds();
    writeln!(
        out,
        "  bounds: {:.5},{:.5} .. {:.5},{:.5}",
        bounds.min().y,
        bounds.min().x,
        bounds.max().y,
        bounds.max().x
    )
}

const HEADERS: [&str; 5] = ["File", "Points", "Distance (km)", "Elevation+ (m)", "Duration"];

/// Summary table with one row per entry and a totals row
pub fn write_summary_table(out: &mut impl Write, report: &SummaryReport) -> io::Result<()> {
    if report.is_empty() {
        return writeln!(out, "Summary is empty.");
    }

    let rows: Vec<[String; 5]> = report
        .list()
        .iter()
        .map(|entry| {
            [
                entry.source_id.clone(),
                entry.stats.total_points.to_string(),
                format_distance_km(entry.stats.total_distance_km),
                format_elevation_m(entry.stats.total_elevation_gain_m),
                entry.stats.duration_label(),
            ]
        })
        .collect();

    let totals = report.totals();
    let totals_row = [
        format!("Total ({} files)", totals.file_count),
        totals.total_points.to_string(),
        format_distance_km(totals.total_distance_km),
        format_elevation_m(totals.total_elevation_gain_m),
        String::new(),
    ];

    let mut widths = HEADERS.map(str::len);
    for row in rows.iter().chain(std::iter::once(&totals_row)) {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let rule = widths.map(|w| "-".repeat(w)).join("-+-");

    write_row(out, &HEADERS.map(String::from), &widths)?;
    writeln!(out, "{rule}")?;
    for row in &rows {
        write_row(out, row, &widths)?;
    }
    writeln!(out, "{rule}")?;
    write_row(out, &totals_row, &widths)
}

/// First column left-aligned, the rest right-aligned
fn write_row(out: &mut impl Write, row: &[String; 5], widths: &[usize; 5]) -> io::Result<()> {
    let cells: Vec<String> = row
        .iter()
        .zip(widths)
        .enumerate()
        .map(|(i, (cell, &width))| {
            if i == 0 {
                format!("{cell:<width$}")
            } else {
                format!("{cell:>width$}")
            }
        })
        .collect();
    writeln!(out, "{}", cells.join(" | ").trim_end())
}

#[cfg(test)]
mod tests {
    use super::*;
    use track_stats_lib::{StatsRecord, TripDuration, analyze_document};

    fn render<F>(f: F) -> String
    where
        F: FnOnce(&mut Vec<u8>) -> io::Result<()>,
    {
        let mut buffer = Vec::new();
        f(&mut buffer).unwrap();
        String::from_utf8(buffer).unwrap()
    }

    #[test]
    fn test_display_rounding() {
        assert_eq!(format_distance_km(111.194_926), "111.19");
        assert_eq!(format_distance_km(0.0), "0.00");
        assert_eq!(format_elevation_m(89.5), "90");
        assert_eq!(format_elevation_m(89.4), "89");
    }

    #[test]
    fn test_file_analysis_lines() {
        let document = r#"<gpx><trk>
<trkseg><trkpt lat="0" lon="0"><ele>100</ele></trkpt><trkpt lat="0" lon="1"><ele>150</ele></trkpt></trkseg>
<trkseg><trkpt lat="1" lon="1"/></trkseg>
</trk></gpx>"#;
        let analysis = analyze_document("ride.gpx", document).unwrap();

        let text = render(|out| write_file_analysis(out, &analysis));
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "ride.gpx: 3 points, 111.19 km, +50 m, N/A");
        assert_eq!(lines[1], "  track 1: 2 points, 111.19 km, +50 m");
        assert_eq!(lines[2], "  track 2: 1 points, 0.00 km, +0 m");
        assert_eq!(lines[3], "  bounds: 0.00000,0.00000 .. 1.00000,1.00000");
    }

    #[test]
    fn test_empty_summary() {
        let text = render(|out| write_summary_table(out, &SummaryReport::new()));
        assert_eq!(text, "Summary is empty.\n");
    }

    #[test]
    fn test_summary_table_rows_in_report_order() {
        let mut report = SummaryReport::new();
        report.upsert(
            "b.gpx",
            StatsRecord {
                total_points: 10,
                total_distance_km: 1.234,
                total_elevation_gain_m: 12.6,
                duration: TripDuration::from_seconds(3661),
            },
        );
        report.upsert("a.gpx", StatsRecord::default());

        let text = render(|out| write_summary_table(out, &report));
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), 6);
        assert!(lines[0].starts_with("File"));
        assert!(lines[2].starts_with("b.gpx"));
        assert!(lines[2].contains("1.23"));
        assert!(lines[2].contains("13"));
        assert!(lines[2].ends_with("1h 1m"));
        assert!(lines[3].starts_with("a.gpx"));
        assert!(lines[3].ends_with("N/A"));
        assert!(lines[5].starts_with("Total (2 files)"));
    }
}
