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

use hifitime::{Duration, Unit};

/// The bucket width ladder, in minutes. Only human-friendly widths appear on a time axis
/// users read at a glance, never e.g. 7-minute buckets.
pub const NICE_BUCKET_MINUTES: [i64; 9] = [1, 2, 5, 10, 15, 30, 60, 120, 240];

/// Default number of columns a heatmap is resampled toward.
pub const DEFAULT_TARGET_COLUMNS: u32 = 400;

/// Picks a bucket width from the ladder so that resampling the provided span yields close
/// to, and not much more than, `target_columns` buckets.
///
/// The count may exceed the target by one when the span straddles the epoch-aligned
/// bucket boundaries; that is accepted rather than special-cased. A non-positive span
/// yields the smallest width.
pub fn pick_bucket_minutes(span: Duration, target_columns: u32) -> i64 {
    let span_ms = span.to_unit(Unit::Millisecond);
    if span_ms <= 0.0 || target_columns == 0 {
        return NICE_BUCKET_MINUTES[0];
    }

    let approx_bucket_ms = (span_ms / f64::from(target_columns)).ceil();
    let approx_minutes = ((approx_bucket_ms / 60_000.0).round() as i64).max(1);

    for minutes in NICE_BUCKET_MINUTES {
        if minutes >= approx_minutes {
            return minutes;
        }
    }
    NICE_BUCKET_MINUTES[NICE_BUCKET_MINUTES.len() - 1]
}
