extern crate skyview;

use hifitime::{Epoch, Unit};
use rstest::rstest;
use skyview::histogram::{aggregate, partition, pick_bucket_minutes, reducers, TimeSample};
use skyview::telemetry::{FixType, MultipathLevel};

fn sample(timestamp: &str, value: f64) -> TimeSample {
    TimeSample {
        epoch: Epoch::from_gregorian_str(timestamp).unwrap(),
        value,
    }
}

#[rstest]
#[case(4, 1)] // 4 h over 400 columns: 36 s per column, floor at one minute
#[case(48, 10)] // 48 h over 400 columns: 7.2 min per column, snaps up to 10
fn ladder_selection(#[case] span_hours: i64, #[case] expected: i64) {
    let span = Unit::Hour * span_hours as f64;
    assert_eq!(pick_bucket_minutes(span, 400), expected);
}

#[test]
fn aggregation_is_order_independent() {
    let ordered = vec![
        sample("2025-07-01T10:01:00Z", 1.0),
        sample("2025-07-01T10:12:00Z", 3.0),
        sample("2025-07-01T10:23:00Z", 2.0),
        sample("2025-07-01T10:44:00Z", 3.0),
    ];
    let mut shuffled = ordered.clone();
    shuffled.swap(0, 3);
    shuffled.swap(1, 2);

    let reduce = |samples: &[TimeSample]| reducers::max(samples);
    let a = aggregate("Fix", &ordered, 15, reduce, |v| format!("{v:.0}"));
    let b = aggregate("Fix", &shuffled, 15, reduce, |v| format!("{v:.0}"));
    assert_eq!(a, b);

    // And calling twice over the same input is idempotent.
    let c = aggregate("Fix", &ordered, 15, reduce, |v| format!("{v:.0}"));
    assert_eq!(a, c);
}

#[test]
fn bucket_boundaries_agree_across_overlapping_ranges() {
    // Epoch-aligned bucketing: the same timestamps land in the same buckets no matter
    // which other samples are present.
    let narrow = vec![
        sample("2025-07-01T10:07:00Z", 1.0),
        sample("2025-07-01T10:26:00Z", 2.0),
    ];
    let wide = vec![
        sample("2025-07-01T09:58:00Z", 9.0),
        sample("2025-07-01T10:07:00Z", 1.0),
        sample("2025-07-01T10:26:00Z", 2.0),
    ];

    let narrow_buckets = partition(&narrow, 10);
    let wide_buckets = partition(&wide, 10);

    let starts_narrow: Vec<_> = narrow_buckets.iter().map(|b| b.start).collect();
    let starts_wide: Vec<_> = wide_buckets.iter().map(|b| b.start).collect();
    // The narrow range's boundaries are a suffix of the wide range's.
    assert_eq!(starts_wide[1..], starts_narrow[..]);
}

#[test]
fn fix_type_ordinal_reduction() {
    let reduce = reducers::ordinal_max(|raw| FixType::from_raw(raw).rank());

    // A momentary 3D fix dominates the bucket.
    let samples = vec![
        sample("2025-07-01T10:00:00Z", 1.0),
        sample("2025-07-01T10:00:30Z", 3.0),
        sample("2025-07-01T10:01:00Z", 2.0),
    ];
    let values = aggregate("Fix status", &samples, 5, reduce, |rank| {
        FixType::from_raw(rank as i64 + 1).label().to_string()
    });
    assert_eq!(values.len(), 1);
    assert_eq!(values[0].value, Some(2.0));
    assert_eq!(values[0].label, "Fix status: 3D fix @ 2025-07-01 10:02");
}

#[test]
fn multipath_maximum_severity_wins() {
    let reduce = reducers::ordinal_max(|raw| MultipathLevel::from_indicator(raw).rank());

    let mostly_low = vec![
        sample("2025-07-01T10:00:00Z", 1.0),
        sample("2025-07-01T10:00:10Z", 2.0),
        sample("2025-07-01T10:00:20Z", 1.0),
    ];
    // Maximum severity, not majority or mean: Medium.
    assert_eq!(reduce(&mostly_low), Some(1.0));

    let with_high = vec![
        sample("2025-07-01T10:00:00Z", 1.0),
        sample("2025-07-01T10:00:10Z", 3.0),
        sample("2025-07-01T10:00:20Z", 1.0),
    ];
    assert_eq!(reduce(&with_high), Some(2.0));
}

#[test]
fn degenerate_inputs() {
    let reduce = |samples: &[TimeSample]| reducers::mean(samples);
    assert!(aggregate("PDOP", &[], 5, reduce, |v| format!("{v}")).is_empty());

    let single = vec![sample("2025-07-01T10:03:00Z", 2.5)];
    let values = aggregate("PDOP", &single, 5, reduce, |v| format!("{v}"));
    assert_eq!(values.len(), 1);
    assert_eq!(values[0].value, Some(2.5));
}
