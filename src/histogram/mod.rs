/*
    Skyview, GNSS sky geometry and adaptive temporal aggregation
    Copyright (C) 2018-onwards Christopher Rabotin <christopher.rabotin@gmail.com>

    This program is free software: you can redistribute it and/or modify
    it under the terms of the GNU Affero General Public License as published
    by the Free Software Foundation, either version 3 of the License, or
    (at your option) any later version.

    This program is distributed in the hope that it will be useful,
    but WITHOUT ANY WARRANTY; without even the implied warranty of
    MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
    GNU Affero General Public License for more details.

    You should have received a copy of the GNU Affero General Public License
    along with this program.  If not, see <https://www.gnu.org/licenses/>.
*/

use std::collections::BTreeMap;

use hifitime::{Duration, Epoch, Unit};
use serde_derive::Deserialize as DeriveDeserialize;

use crate::telemetry::{parse_epoch, Constellation};

pub mod buckets;

pub use buckets::{pick_bucket_minutes, DEFAULT_TARGET_COLUMNS, NICE_BUCKET_MINUTES};

/// One observation of an irregular time series. The value is either a numeric scalar or
/// the raw encoding of a small closed ordinal set (fix type, multipath level); reducers
/// decide which.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct TimeSample {
    pub epoch: Epoch,
    pub value: f64,
}

/// A fixed-width time bucket and the samples that fell into it. Derived, never persisted.
#[derive(Clone, Debug, PartialEq)]
pub struct Bucket {
    pub start: Epoch,
    pub duration: Duration,
    pub samples: Vec<TimeSample>,
}

impl Bucket {
    pub fn midpoint(&self) -> Epoch {
        self.start + self.duration * 0.5
    }
}

/// A reduced bucket, ready for a heatmap cell and its tooltip.
#[derive(Clone, Debug, PartialEq)]
pub struct BucketValue {
    pub start: Epoch,
    pub midpoint: Epoch,
    /// `None` when the bucket holds no samples: gaps are preserved, never imputed.
    pub value: Option<f64>,
    pub label: String,
}

/// Bucket reducers. All are plain functions from a bucket's samples to a reduced value,
/// so callers can supply their own.
pub mod reducers {
    use super::TimeSample;

    /// Reduces to the highest-severity ordinal rank observed: the raw maximum is taken
    /// first and then mapped through `rank_of`, so an unmapped raw value ranks lowest
    /// instead of failing.
    pub fn ordinal_max<F>(rank_of: F) -> impl Fn(&[TimeSample]) -> Option<f64>
    where
        F: Fn(i64) -> u8,
    {
        move |samples| {
            let max_raw = samples.iter().map(|s| s.value).reduce(f64::max)?;
            Some(f64::from(rank_of(max_raw as i64)))
        }
    }

    /// Largest value in the bucket.
    pub fn max(samples: &[TimeSample]) -> Option<f64> {
        samples.iter().map(|s| s.value).reduce(f64::max)
    }

    /// Arithmetic mean of the bucket.
    pub fn mean(samples: &[TimeSample]) -> Option<f64> {
        if samples.is_empty() {
            None
        } else {
            Some(samples.iter().map(|s| s.value).sum::<f64>() / samples.len() as f64)
        }
    }
}

/// Unix milliseconds of this epoch, for bucket arithmetic.
fn epoch_ms(epoch: Epoch) -> i64 {
    epoch.to_unix_milliseconds().round() as i64
}

/// Epoch-aligned bucket start: floored toward negative infinity so timestamps on either
/// side of the Unix epoch align identically, and repeated calls over overlapping ranges
/// agree on boundaries.
fn bucket_start_ms(ts_ms: i64, bucket_ms: i64) -> i64 {
    ts_ms.div_euclid(bucket_ms) * bucket_ms
}

/// Partitions samples into epoch-aligned buckets of `bucket_minutes`.
///
/// The input need not be sorted: a working copy is re-sorted, so reordering the input
/// never changes the output. Buckets with no samples are emitted empty rather than
/// omitted, preserving a uniform axis. Zero samples yield zero buckets; a single sample
/// (or a zero span) yields exactly one bucket.
pub fn partition(samples: &[TimeSample], bucket_minutes: i64) -> Vec<Bucket> {
    if samples.is_empty() {
        return Vec::new();
    }
    let bucket_minutes = sane_bucket_minutes(bucket_minutes);

    let mut sorted = samples.to_vec();
    sorted.sort_by(|a, b| a.epoch.cmp(&b.epoch));

    let bucket_ms = bucket_minutes * 60_000;
    let first = bucket_start_ms(epoch_ms(sorted[0].epoch), bucket_ms);
    let last = bucket_start_ms(epoch_ms(sorted[sorted.len() - 1].epoch), bucket_ms);

    partition_range(&sorted, bucket_ms, first, last)
}

/// Partitions pre-sorted samples over an explicit range of bucket starts, so several
/// series can share identical column boundaries.
fn partition_range(sorted: &[TimeSample], bucket_ms: i64, first_ms: i64, last_ms: i64) -> Vec<Bucket> {
    let duration = Unit::Millisecond * bucket_ms as f64;
    let mut buckets = Vec::with_capacity(((last_ms - first_ms) / bucket_ms + 1) as usize);

    // Samples and buckets are both monotonic: a single forward scan assigns each sample
    // to exactly one bucket.
    let mut idx = 0;
    let mut start_ms = first_ms;
    while start_ms <= last_ms {
        let end_ms = start_ms + bucket_ms;
        let mut bucket_samples = Vec::new();
        while idx < sorted.len() && epoch_ms(sorted[idx].epoch) < end_ms {
            if epoch_ms(sorted[idx].epoch) >= start_ms {
                bucket_samples.push(sorted[idx]);
            }
            idx += 1;
        }
        buckets.push(Bucket {
            start: Epoch::from_unix_milliseconds(start_ms as f64),
            duration,
            samples: bucket_samples,
        });
        start_ms += bucket_ms;
    }

    buckets
}

fn sane_bucket_minutes(bucket_minutes: i64) -> i64 {
    if bucket_minutes <= 0 {
        warn!("bucket width of {bucket_minutes} min is not positive, using 1 min");
        1
    } else {
        bucket_minutes
    }
}

/// Formats a bucket timestamp for tooltips, minute precision.
fn format_epoch_minutes(epoch: Epoch) -> String {
    let (year, month, day, hour, minute, _, _) = epoch.to_gregorian_utc();
    format!("{year:04}-{month:02}-{day:02} {hour:02}:{minute:02}")
}

/// Partitions and reduces a series in one pass, labeling every bucket with the metric
/// name, the human-readable value ("No data" for an empty bucket) and the bucket's
/// midpoint timestamp.
pub fn aggregate<R, L>(
    metric: &str,
    samples: &[TimeSample],
    bucket_minutes: i64,
    reduce: R,
    value_label: L,
) -> Vec<BucketValue>
where
    R: Fn(&[TimeSample]) -> Option<f64>,
    L: Fn(f64) -> String,
{
    partition(samples, bucket_minutes)
        .into_iter()
        .map(|bucket| reduce_bucket(metric, &bucket, &reduce, &value_label))
        .collect()
}

fn reduce_bucket<R, L>(metric: &str, bucket: &Bucket, reduce: &R, value_label: &L) -> BucketValue
where
    R: Fn(&[TimeSample]) -> Option<f64>,
    L: Fn(f64) -> String,
{
    let value = if bucket.samples.is_empty() {
        None
    } else {
        reduce(&bucket.samples)
    };
    let text = match value {
        Some(v) => value_label(v),
        None => "No data".to_string(),
    };
    let midpoint = bucket.midpoint();
    let label = format!("{metric}: {text} @ {}", format_epoch_minutes(midpoint));

    BucketValue {
        start: bucket.start,
        midpoint,
        value,
        label,
    }
}

/// A histogram value from the upstream endpoint: either a plain scalar or a small
/// per-constellation object.
#[derive(Clone, Debug, DeriveDeserialize)]
#[serde(untagged)]
pub enum HistogramValue {
    Scalar(f64),
    PerConstellation(BTreeMap<Constellation, f64>),
}

/// A reduced 2-D grid: one row per metric/constellation, one column per time bucket,
/// all rows sharing identical column boundaries. Consumed by a heatmap renderer.
#[derive(Clone, Debug, PartialEq)]
pub struct HeatmapGrid {
    pub rows: Vec<String>,
    /// Bucket start epochs, shared by every row.
    pub columns: Vec<Epoch>,
    pub bucket_minutes: i64,
    /// Reduced value per `[row][column]`; `None` where a bucket holds no samples.
    pub values: Vec<Vec<Option<f64>>>,
    /// Tooltip text per `[row][column]`.
    pub text: Vec<Vec<String>>,
}

impl HeatmapGrid {
    /// Resamples a timestamp-keyed histogram onto a grid of at most roughly
    /// `target_columns` buckets.
    ///
    /// Scalar entries land in a single row named after the metric; per-constellation
    /// entries produce one row per constellation present, in constellation order. Keys
    /// with unparseable timestamps are dropped. The bucket width is chosen once, from
    /// the overall span, so every row shares the same axis.
    pub fn from_histogram<R, L>(
        metric: &str,
        histogram: &BTreeMap<String, HistogramValue>,
        target_columns: u32,
        reduce: R,
        value_label: L,
    ) -> Self
    where
        R: Fn(&[TimeSample]) -> Option<f64>,
        L: Fn(f64) -> String,
    {
        let mut by_row: BTreeMap<String, Vec<TimeSample>> = BTreeMap::new();
        let mut all_ms: Vec<i64> = Vec::new();

        for (key, value) in histogram {
            let epoch = match parse_epoch(key) {
                Some(epoch) => epoch,
                None => continue,
            };
            match value {
                HistogramValue::Scalar(v) if v.is_finite() => {
                    all_ms.push(epoch_ms(epoch));
                    by_row
                        .entry(metric.to_string())
                        .or_default()
                        .push(TimeSample { epoch, value: *v });
                }
                HistogramValue::PerConstellation(per_constellation) => {
                    for (constellation, v) in per_constellation {
                        if !v.is_finite() {
                            continue;
                        }
                        all_ms.push(epoch_ms(epoch));
                        by_row
                            .entry(format!("{constellation}"))
                            .or_default()
                            .push(TimeSample { epoch, value: *v });
                    }
                }
                HistogramValue::Scalar(_) => continue,
            }
        }

        if by_row.is_empty() {
            return Self {
                rows: Vec::new(),
                columns: Vec::new(),
                bucket_minutes: NICE_BUCKET_MINUTES[0],
                values: Vec::new(),
                text: Vec::new(),
            };
        }

        let min_ms = *all_ms.iter().min().unwrap();
        let max_ms = *all_ms.iter().max().unwrap();
        // A single instant still spans one bucket.
        let span = Unit::Millisecond * ((max_ms - min_ms).max(1)) as f64;
        let bucket_minutes = pick_bucket_minutes(span, target_columns);
        let bucket_ms = bucket_minutes * 60_000;
        let first = bucket_start_ms(min_ms, bucket_ms);
        let last = bucket_start_ms(max_ms, bucket_ms);

        // Row order: constellation order for per-constellation rows, else the metric row.
        let mut rows: Vec<String> = Vec::with_capacity(by_row.len());
        if by_row.contains_key(metric) {
            rows.push(metric.to_string());
        }
        for constellation in enum_iterator::all::<Constellation>() {
            let name = format!("{constellation}");
            if name != metric && by_row.contains_key(&name) {
                rows.push(name);
            }
        }
        // Anything else (unexpected row names) in lexical order.
        for name in by_row.keys() {
            if !rows.contains(name) {
                rows.push(name.clone());
            }
        }

        let mut columns = Vec::new();
        let mut values = Vec::with_capacity(rows.len());
        let mut text = Vec::with_capacity(rows.len());

        for row in &rows {
            let mut samples = by_row.remove(row).unwrap_or_default();
            samples.sort_by(|a, b| a.epoch.cmp(&b.epoch));

            let buckets = partition_range(&samples, bucket_ms, first, last);
            if columns.is_empty() {
                columns = buckets.iter().map(|b| b.start).collect();
            }

            let mut row_values = Vec::with_capacity(buckets.len());
            let mut row_text = Vec::with_capacity(buckets.len());
            for bucket in &buckets {
                let reduced = reduce_bucket(row, bucket, &reduce, &value_label);
                row_values.push(reduced.value);
                row_text.push(reduced.label);
            }
            values.push(row_values);
            text.push(row_text);
        }

        Self {
            rows,
            columns,
            bucket_minutes,
            values,
            text,
        }
    }
}
