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

use serde_derive::{Deserialize, Serialize};
use typed_builder::TypedBuilder;

use crate::io::ConfigRepr;
use crate::linalg::Vector2;
use crate::telemetry::{MaskBinSample, SatelliteSample};

pub mod geometry;
pub mod mask;
pub mod track;

pub use geometry::PolarFrame;
pub use mask::ElevationMask;

/// Geometry parameters of a sky plot. All values are explicit parameters, never globals:
/// the renderer derives the radius from its viewport and re-invokes the engine on resize.
#[derive(Copy, Clone, Debug, Deserialize, PartialEq, Serialize, TypedBuilder)]
#[builder(doc)]
pub struct SkyPlotConfig {
    /// Radius of the sky disk, in pixels.
    pub radius_px: f64,
    /// Azimuth bin width of the elevation mask, in degrees. Must divide 360.
    #[builder(default = mask::DEFAULT_BIN_SIZE_DEG)]
    pub bin_size_deg: u32,
    /// Radius of the satellite marker icon, in pixels, for track line offsets.
    #[builder(default = 9.0)]
    pub icon_radius_px: f64,
    /// Distance beyond the rim at which frame labels anchor, in pixels.
    #[builder(default = 18.0)]
    pub label_offset_px: f64,
}

impl ConfigRepr for SkyPlotConfig {}

/// A satellite ready to draw: its current marker position, its projected track segments,
/// and the offset lines from the marker toward each segment's oldest point.
#[derive(Clone, Debug, PartialEq)]
pub struct PlottedSatellite {
    pub sample: SatelliteSample,
    pub position: Vector2<f64>,
    pub track_segments: Vec<Vec<Vector2<f64>>>,
    pub marker_lines: Vec<(Vector2<f64>, Vector2<f64>)>,
}

/// The fully assembled sky plot geometry for one telemetry snapshot.
#[derive(Clone, Debug, PartialEq)]
pub struct SkyPlot {
    pub frame: PolarFrame,
    pub mask: ElevationMask,
    pub satellites: Vec<PlottedSatellite>,
}

impl SkyPlot {
    /// Assembles the renderer-ready geometry from normalized satellites and mask bins.
    ///
    /// Recomputed from scratch on every invocation: there is no cached state, so
    /// identical inputs always produce identical outputs.
    pub fn assemble(
        satellites: &[SatelliteSample],
        mask_bins: &[MaskBinSample],
        cfg: &SkyPlotConfig,
    ) -> Self {
        let frame = PolarFrame::new(cfg.radius_px, cfg.label_offset_px);
        let mask = ElevationMask::build(mask_bins, cfg.bin_size_deg, cfg.radius_px);

        let satellites = satellites
            .iter()
            .map(|sample| {
                let position =
                    geometry::project(sample.azimuth_deg, sample.elevation_deg, cfg.radius_px);

                let segments = track::segment(&sample.track_points);
                let marker_lines = segments
                    .iter()
                    .filter_map(|seg| {
                        track::marker_offset_line(seg, cfg.radius_px, cfg.icon_radius_px)
                    })
                    .collect();
                let track_segments = segments
                    .iter()
                    .map(|seg| track::project_segment(seg, cfg.radius_px))
                    .collect();

                PlottedSatellite {
                    sample: sample.clone(),
                    position,
                    track_segments,
                    marker_lines,
                }
            })
            .collect();

        Self {
            frame,
            mask,
            satellites,
        }
    }
}
