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

/*! # skyview

Turns sparse, irregularly-timed GNSS telemetry (azimuth, elevation, signal quality,
per-azimuth obstruction samples) into the geometric and time-binned data structures
a chart renderer draws: polar sky plots with obstruction masks and satellite tracks,
and heatmap grids resampled onto human-friendly time buckets.

Every function in this crate is pure given its inputs: no I/O, no caching, no clock
reads. Identical inputs always produce identical outputs, so callers may memoize or
re-invoke on every data refresh as they see fit. Rendering (SVG, canvas, or a native
toolkit) is a separate concern and consumes the plain point, polygon and grid values
produced here.
*/

/// Telemetry wire shapes, ordinal scales, and input normalization.
pub mod telemetry;

/// Sky plot geometry: polar projection, elevation mask, and satellite tracks.
pub mod skyplot;

/// Adaptive temporal aggregation of irregular time series onto fixed buckets.
pub mod histogram;

/// Snapshot decoding and configuration loading.
pub mod io;

#[macro_use]
extern crate log;
extern crate hifitime;
extern crate nalgebra as na;

/// Re-export of hifitime
pub mod time {
    pub use hifitime::*;
}

/// Re-export nalgebra
pub mod linalg {
    pub use na::base::*;
}

/// Re-export some useful things
pub use self::skyplot::{SkyPlot, SkyPlotConfig};
pub use self::telemetry::Constellation;
