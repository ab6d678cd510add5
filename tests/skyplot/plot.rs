extern crate skyview;

use approx::assert_abs_diff_eq;
use skyview::io::{decode_elevation_mask, decode_satellites};
use skyview::skyplot::geometry::radial;
use skyview::skyplot::{SkyPlot, SkyPlotConfig};

fn snapshot_wrapped() -> &'static str {
    // One GPS satellite whose history wraps across the 0/360 azimuth boundary, plus two
    // collection artifacts (exact-zero azimuth or elevation) that must be discarded.
    r#"{
        "satellites": [
            {
                "constellation": "GPS",
                "prn": 17,
                "azimuth_degrees": 12.0,
                "elevation_degrees": 55.0,
                "average_sno": 42.0,
                "used_for_fix": true,
                "maximum_multipath_indicator": 1,
                "track_points": [
                    {"azimuth_degrees": 10.0, "elevation_degrees": 40.0, "timestamp": "2025-07-01T10:08:00Z"},
                    {"azimuth_degrees": 20.0, "elevation_degrees": 41.0, "timestamp": "2025-07-01T10:06:00Z"},
                    {"azimuth_degrees": 0.0,  "elevation_degrees": 44.0, "timestamp": "2025-07-01T10:05:00Z"},
                    {"azimuth_degrees": 350.0, "elevation_degrees": 42.0, "timestamp": "2025-07-01T10:04:00Z"},
                    {"azimuth_degrees": 355.0, "elevation_degrees": 43.0, "timestamp": "2025-07-01T10:02:00Z"},
                    {"azimuth_degrees": 356.0, "elevation_degrees": 0.0, "timestamp": "2025-07-01T10:00:00Z"}
                ]
            },
            {
                "constellation": "Galileo",
                "prn": 4,
                "azimuth_degrees": 200.0,
                "elevation_degrees": 12.0
            }
        ]
    }"#
}

#[test]
fn assembles_wraparound_tracks() {
    let sats = decode_satellites(snapshot_wrapped()).unwrap();
    assert_eq!(sats.len(), 2);

    let mask = decode_elevation_mask("[]").unwrap();
    let cfg = SkyPlotConfig::builder().radius_px(240.0).build();
    let plot = SkyPlot::assemble(&sats, &mask, &cfg);

    let gps = &plot.satellites[0];
    // The 20 -> 350 jump exceeds half a circle, so the track splits in two, and the
    // artifact points do not survive.
    assert_eq!(gps.track_segments.len(), 2);
    assert_eq!(gps.track_segments[0].len(), 2);
    assert_eq!(gps.track_segments[1].len(), 2);

    // Normalization keeps the exact-zero points; only segmentation discards them.
    let history = &gps.sample.track_points;
    assert_eq!(history.len(), 6);
    assert_eq!(history[0].azimuth_deg, 10.0);

    // The Galileo satellite has no history: a marker, no lines.
    let galileo = &plot.satellites[1];
    assert!(galileo.track_segments.is_empty());
    assert!(galileo.marker_lines.is_empty());

    // Its marker sits at the projected radius for 12 degrees of elevation.
    assert_abs_diff_eq!(galileo.position.norm(), radial(12.0, 240.0), epsilon = 1e-9);
}

#[test]
fn bare_array_and_wrapped_object_agree() {
    let wrapped = decode_satellites(snapshot_wrapped()).unwrap();

    let bare = r#"[
        {"constellation": "GPS", "prn": 17, "azimuth_degrees": 12.0, "elevation_degrees": 55.0,
         "average_sno": 42.0, "used_for_fix": true, "maximum_multipath_indicator": 1,
         "track_points": [
            {"azimuth_degrees": 10.0, "elevation_degrees": 40.0, "timestamp": "2025-07-01T10:08:00Z"},
            {"azimuth_degrees": 20.0, "elevation_degrees": 41.0, "timestamp": "2025-07-01T10:06:00Z"},
            {"azimuth_degrees": 0.0,  "elevation_degrees": 44.0, "timestamp": "2025-07-01T10:05:00Z"},
            {"azimuth_degrees": 350.0, "elevation_degrees": 42.0, "timestamp": "2025-07-01T10:04:00Z"},
            {"azimuth_degrees": 355.0, "elevation_degrees": 43.0, "timestamp": "2025-07-01T10:02:00Z"},
            {"azimuth_degrees": 356.0, "elevation_degrees": 0.0, "timestamp": "2025-07-01T10:00:00Z"}
         ]},
        {"constellation": "Galileo", "prn": 4, "azimuth_degrees": 200.0, "elevation_degrees": 12.0}
    ]"#;
    let bare = decode_satellites(bare).unwrap();

    assert_eq!(wrapped, bare);
}

#[test]
fn recomputation_is_referentially_transparent() {
    let sats = decode_satellites(snapshot_wrapped()).unwrap();
    let mask = decode_elevation_mask(r#"[{"azimuth_bucket": 10, "skyline_elevation": 8.0}]"#).unwrap();
    let cfg = SkyPlotConfig::builder().radius_px(300.0).build();

    // Re-invoked on every refresh and theme change: identical inputs, identical outputs.
    let first = SkyPlot::assemble(&sats, &mask, &cfg);
    let second = SkyPlot::assemble(&sats, &mask, &cfg);
    assert_eq!(first, second);
}

#[test]
fn marker_lines_start_at_the_icon_edge() {
    let snapshot = r#"[
        {"constellation": "GPS", "prn": 3, "azimuth_degrees": 0.0, "elevation_degrees": 90.0,
         "track_points": [
            {"azimuth_degrees": 360.0, "elevation_degrees": 89.9, "timestamp": "2025-07-01T10:04:00Z"},
            {"azimuth_degrees": 360.0, "elevation_degrees": 20.0, "timestamp": "2025-07-01T10:00:00Z"}
         ]}
    ]"#;
    let sats = decode_satellites(snapshot).unwrap();
    let cfg = SkyPlotConfig::builder().radius_px(100.0).icon_radius_px(9.0).build();
    let plot = SkyPlot::assemble(&sats, &decode_elevation_mask("[]").unwrap(), &cfg);

    let lines = &plot.satellites[0].marker_lines;
    assert_eq!(lines.len(), 1);
    let (start, end) = lines[0];

    // Track runs due north (up the screen): the line starts 9 px from the newest point.
    let newest = &plot.satellites[0].track_segments[0][0];
    assert_abs_diff_eq!((start - newest).norm(), 9.0, epsilon = 1e-9);
    assert_abs_diff_eq!(end.y, -radial(20.0, 100.0), epsilon = 1e-9);
}
