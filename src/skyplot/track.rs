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

use crate::linalg::Vector2;
use crate::skyplot::geometry::project;
use crate::telemetry::TrackPoint;

/// Azimuth jump between consecutive observations beyond which the track is split.
///
/// A satellite's true angular velocity between consecutive samples is always far below
/// half a circle, so a larger jump is the 0/360 wraparound, not physical motion. A naive
/// polyline across that boundary would sweep across the entire plot.
pub const WRAPAROUND_THRESHOLD_DEG: f64 = 180.0;

/// Clearance added to the marker radius below which a track line is not worth drawing.
const MIN_LINE_CLEARANCE: f64 = 2.0;

/// Splits a satellite's observation history (ordered newest first, per the upstream
/// convention) into polyline segments.
///
/// Points with an azimuth or elevation of exactly 0 are collection artifacts and are
/// discarded. Segments split at the wraparound boundary, and a segment survives only
/// with at least two points since a single point cannot form a line.
pub fn segment(points: &[TrackPoint]) -> Vec<Vec<TrackPoint>> {
    let valid: Vec<&TrackPoint> = points
        .iter()
        .filter(|tp| tp.azimuth_deg != 0.0 && tp.elevation_deg != 0.0)
        .collect();

    let mut segments = Vec::new();
    let mut current: Vec<TrackPoint> = Vec::new();

    for tp in valid {
        match current.last() {
            Some(prev) if (tp.azimuth_deg - prev.azimuth_deg).abs() > WRAPAROUND_THRESHOLD_DEG => {
                if current.len() >= 2 {
                    segments.push(std::mem::take(&mut current));
                } else {
                    current.clear();
                }
                current.push(tp.clone());
            }
            _ => current.push(tp.clone()),
        }
    }
    if current.len() >= 2 {
        segments.push(current);
    }

    segments
}

/// Projects a segment into disk coordinates.
pub fn project_segment(segment: &[TrackPoint], radius: f64) -> Vec<Vector2<f64>> {
    segment
        .iter()
        .map(|tp| project(tp.azimuth_deg, tp.elevation_deg, radius))
        .collect()
}

/// The straight line a renderer draws from the newest observation (the satellite's
/// current marker) toward the oldest one in a segment, offset so it starts at the edge
/// of the marker's icon circle.
///
/// Returns `None` when the two endpoints are closer than the icon radius plus a small
/// clearance, where the line would degenerate to a stub under the marker.
pub fn marker_offset_line(
    segment: &[TrackPoint],
    radius: f64,
    icon_radius: f64,
) -> Option<(Vector2<f64>, Vector2<f64>)> {
    let newest = segment.first()?;
    let oldest = segment.last()?;
    if segment.len() < 2 {
        return None;
    }

    let current = project(newest.azimuth_deg, newest.elevation_deg, radius);
    let target = project(oldest.azimuth_deg, oldest.elevation_deg, radius);

    let delta = target - current;
    let distance = delta.norm();
    if distance < icon_radius + MIN_LINE_CLEARANCE {
        return None;
    }

    let start = current + delta * (icon_radius / distance);
    Some((start, target))
}
