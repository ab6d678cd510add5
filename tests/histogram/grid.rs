extern crate skyview;

use skyview::histogram::{reducers, HeatmapGrid};
use skyview::io::decode_histogram;
use skyview::telemetry::FixType;

#[test]
fn per_constellation_fix_status_grid() {
    // A day of fix-status reports for two constellations, one report per constellation
    // at both ends of the range.
    let snapshot = r#"{
        "2025-07-01T10:00:00Z": {"GPS": 3, "GLONASS": 2},
        "2025-07-02T09:59:00Z": {"GPS": 3, "GLONASS": 1}
    }"#;
    let histogram = decode_histogram(snapshot).unwrap();

    let reduce = reducers::ordinal_max(|raw| FixType::from_raw(raw).rank());
    let grid = HeatmapGrid::from_histogram("Fix status", &histogram, 400, reduce, |rank| {
        FixType::from_raw(rank as i64 + 1).label().to_string()
    });

    // Just under 24 hours over 400 columns picks 5-minute buckets from the ladder.
    assert_eq!(grid.bucket_minutes, 5);
    assert_eq!(grid.rows, vec!["GPS".to_string(), "GLONASS".to_string()]);

    // All rows share identical column boundaries.
    assert_eq!(grid.columns.len(), 288);
    assert_eq!(grid.values[0].len(), grid.columns.len());
    assert_eq!(grid.values[1].len(), grid.columns.len());

    // First and last buckets hold the reports; the gap in between is "No data", not zero.
    assert_eq!(grid.values[0][0], Some(2.0));
    assert_eq!(grid.values[1][0], Some(1.0));
    assert_eq!(grid.values[0][287], Some(2.0));
    assert_eq!(grid.values[1][287], Some(0.0));
    assert_eq!(grid.values[0][100], None);
    assert!(grid.text[0][100].contains("No data"));

    // Tooltip text names the row and the human-readable ordinal.
    assert!(grid.text[0][0].starts_with("GPS: 3D fix @ "));
    assert!(grid.text[1][287].starts_with("GLONASS: No fix @ "));
}

#[test]
fn scalar_histogram_single_row() {
    let snapshot = r#"{
        "2025-07-01T10:00:00Z": 2.1,
        "2025-07-01T10:02:00Z": 4.7,
        "2025-07-01T10:03:00Z": 3.3
    }"#;
    let histogram = decode_histogram(snapshot).unwrap();

    let grid = HeatmapGrid::from_histogram("PDOP", &histogram, 400, reducers::max, |v| {
        format!("{v:.1}")
    });

    assert_eq!(grid.rows, vec!["PDOP".to_string()]);
    assert_eq!(grid.bucket_minutes, 1);
    assert_eq!(grid.columns.len(), 4);
    assert_eq!(grid.values[0], vec![Some(2.1), None, Some(4.7), Some(3.3)]);
}

#[test]
fn unparseable_timestamps_are_filtered_not_fatal() {
    let snapshot = r#"{
        "2025-07-01T10:00:00Z": 1.0,
        "yesterday-ish": 2.0
    }"#;
    let histogram = decode_histogram(snapshot).unwrap();
    let grid = HeatmapGrid::from_histogram("PDOP", &histogram, 400, reducers::mean, |v| {
        format!("{v:.1}")
    });
    assert_eq!(grid.columns.len(), 1);
    assert_eq!(grid.values[0][0], Some(1.0));
}
