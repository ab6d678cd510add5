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

use crate::linalg::Vector2;
use crate::skyplot::geometry::project;
use crate::telemetry::MaskBinSample;

/// Default azimuth bin width of the upstream mask estimation, in degrees.
pub const DEFAULT_BIN_SIZE_DEG: u32 = 5;

/// One bin of the dense series covering the full circle.
///
/// `value_deg` is `None` when the estimation window had no usable data for this azimuth.
/// The geometry below substitutes 0 degrees (no visible obstruction) for such bins, but
/// the dense series keeps the `None` so callers can tell "no data" from "no obstruction".
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct MaskBin {
    pub azimuth_deg: f64,
    pub value_deg: Option<f64>,
    pub used_fallback: bool,
    pub sample_count: Option<u32>,
}

impl MaskBin {
    fn empty(azimuth_deg: f64) -> Self {
        Self {
            azimuth_deg,
            value_deg: None,
            used_fallback: false,
            sample_count: None,
        }
    }

    fn geometry_value_deg(&self) -> f64 {
        self.value_deg.unwrap_or(0.0)
    }
}

/// The elevation mask geometry: the dense bin series, the closed "blocked region"
/// polygon between the horizon and the skyline, the skyline outline, and the sub-arcs
/// that were derived by the fallback estimation.
#[derive(Clone, Debug, PartialEq)]
pub struct ElevationMask {
    pub bin_size_deg: u32,
    /// One entry per multiple of `bin_size_deg` in [0, 360), in azimuth order.
    pub series: Vec<MaskBin>,
    /// Closed ring: outer rim points followed by the skyline points in reverse order.
    pub blocked_polygon: Vec<Vector2<f64>>,
    /// The skyline alone, closed by the explicit wrap bin at azimuth 360.
    pub skyline_boundary: Vec<Vector2<f64>>,
    /// Maximal contiguous fallback runs, as open polylines. A single-bin run is still
    /// emitted even though a one-point polyline degenerates to nothing when stroked;
    /// the renderer owns that tradeoff.
    pub fallback_segments: Vec<Vec<Vector2<f64>>>,
}

impl ElevationMask {
    /// Builds the mask geometry from normalized bin samples for a disk of `radius`.
    ///
    /// Missing bins become "no data" entries, present values are clamped to [0, 90],
    /// and an empty input yields a well-formed mask with zero obstruction everywhere.
    pub fn build(bins: &[MaskBinSample], bin_size_deg: u32, radius: f64) -> Self {
        let bin_size_deg = if bin_size_deg == 0 || 360 % bin_size_deg != 0 {
            warn!("mask bin size {bin_size_deg} does not divide 360, using {DEFAULT_BIN_SIZE_DEG}");
            DEFAULT_BIN_SIZE_DEG
        } else {
            bin_size_deg
        };

        // Index by integral bucket. Buckets off the bin grid can never match a dense
        // bin, exactly as a fractional key never matched in the upstream lookup.
        let mut by_bucket: BTreeMap<i64, &MaskBinSample> = BTreeMap::new();
        for bin in bins {
            if bin.azimuth_bucket_deg.fract() == 0.0 {
                by_bucket.insert(bin.azimuth_bucket_deg as i64, bin);
            }
        }

        // Dense series: one bin per multiple of the bin size, in azimuth order.
        let mut series = Vec::with_capacity((360 / bin_size_deg) as usize);
        let mut az = 0u32;
        while az < 360 {
            let observed = by_bucket.get(&i64::from(az)).map(|b| MaskBin {
                azimuth_deg: f64::from(az),
                value_deg: b.value_deg.map(|v| v.clamp(0.0, 90.0)),
                used_fallback: b.used_fallback,
                sample_count: b.sample_count,
            });
            series.push(observed.unwrap_or_else(|| MaskBin::empty(f64::from(az))));
            az += bin_size_deg;
        }

        // Duplicate the first bin at azimuth 360 so the polygon closes over the wrap.
        let mut wrapped = series.clone();
        let mut wrap_bin = wrapped[0];
        wrap_bin.azimuth_deg = 360.0;
        wrapped.push(wrap_bin);

        let rim: Vec<Vector2<f64>> = wrapped
            .iter()
            .map(|bin| project(bin.azimuth_deg, 0.0, radius))
            .collect();

        let skyline_boundary: Vec<Vector2<f64>> = wrapped
            .iter()
            .map(|bin| project(bin.azimuth_deg, bin.geometry_value_deg(), radius))
            .collect();

        // Outer arc then the skyline arc reversed: the interior of the closed ring is
        // exactly the band between the horizon and the skyline.
        let mut blocked_polygon = rim;
        blocked_polygon.extend(skyline_boundary.iter().rev());

        let fallback_segments = fallback_runs(&wrapped, &skyline_boundary);

        Self {
            bin_size_deg,
            series,
            blocked_polygon,
            skyline_boundary,
            fallback_segments,
        }
    }

    /// Bins with no observation at all, for callers that report coverage.
    pub fn bins_without_data(&self) -> usize {
        self.series.iter().filter(|b| b.value_deg.is_none()).count()
    }
}

/// Scans the wrapped series in azimuth order and collects maximal contiguous runs of
/// fallback bins as separate open polylines.
fn fallback_runs(wrapped: &[MaskBin], skyline: &[Vector2<f64>]) -> Vec<Vec<Vector2<f64>>> {
    let mut segments = Vec::new();
    let mut current: Vec<Vector2<f64>> = Vec::new();

    for (bin, point) in wrapped.iter().zip(skyline) {
        if bin.used_fallback {
            current.push(*point);
        } else if !current.is_empty() {
            segments.push(std::mem::take(&mut current));
        }
    }
    if !current.is_empty() {
        segments.push(current);
    }

    segments
}
