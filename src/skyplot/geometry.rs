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

/// Elevations at which the polar frame draws reference rings, in degrees.
pub const ELEVATION_RING_DEG: [f64; 5] = [15.0, 30.0, 45.0, 60.0, 75.0];

/// Azimuth step between frame spokes and degree labels, in degrees.
pub const AZIMUTH_SPOKE_STEP_DEG: f64 = 45.0;

/// Converts an azimuth in degrees to the screen angle in radians: azimuth 0 renders
/// straight up ("north"), and angles increase clockwise.
pub fn screen_angle_rad(azimuth_deg: f64) -> f64 {
    (azimuth_deg - 90.0).to_radians()
}

/// Radius at which an elevation renders, in the same unit as `radius`: the zenith (90
/// degrees) maps to the center and the horizon (0 degrees) to the outer rim. Strictly
/// decreasing in elevation, which every other geometric computation here relies on.
pub fn radial(elevation_deg: f64, radius: f64) -> f64 {
    ((90.0 - elevation_deg) / 90.0) * radius
}

/// Projects an (azimuth, elevation) pair onto the disk of the provided radius.
///
/// Callers must clamp the elevation to [0, 90] and wrap the azimuth to [0, 360)
/// beforehand; normalization is an input concern, not a projection concern.
pub fn project(azimuth_deg: f64, elevation_deg: f64, radius: f64) -> Vector2<f64> {
    let r = radial(elevation_deg, radius);
    let angle = screen_angle_rad(azimuth_deg);
    Vector2::new(angle.cos() * r, angle.sin() * r)
}

/// A ring of constant elevation on the polar frame.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ElevationRing {
    pub elevation_deg: f64,
    pub radius: f64,
}

/// A radial spoke of constant azimuth, from the center to the rim.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct AzimuthSpoke {
    pub azimuth_deg: f64,
    pub rim: Vector2<f64>,
}

/// An anchor for a text label, placed outside the rim.
#[derive(Clone, Debug, PartialEq)]
pub struct LabelAnchor {
    pub label: String,
    pub position: Vector2<f64>,
}

/// The static geometry of the polar frame: the rim, elevation rings, azimuth spokes and
/// the label anchors around the rim. Exposed as plain data so any renderer can draw it.
#[derive(Clone, Debug, PartialEq)]
pub struct PolarFrame {
    pub radius: f64,
    pub elevation_rings: Vec<ElevationRing>,
    pub azimuth_spokes: Vec<AzimuthSpoke>,
    pub cardinal_anchors: Vec<LabelAnchor>,
    pub degree_anchors: Vec<LabelAnchor>,
}

impl PolarFrame {
    /// Builds the frame for a disk of the provided radius, with labels anchored
    /// `label_offset` beyond the rim.
    pub fn new(radius: f64, label_offset: f64) -> Self {
        let elevation_rings = ELEVATION_RING_DEG
            .iter()
            .map(|&el| ElevationRing {
                elevation_deg: el,
                radius: radial(el, radius),
            })
            .collect();

        let mut azimuth_spokes = Vec::new();
        let mut cardinal_anchors = Vec::new();
        let mut degree_anchors = Vec::new();

        let mut az = 0.0;
        while az < 360.0 {
            let angle = screen_angle_rad(az);
            let direction = Vector2::new(angle.cos(), angle.sin());
            azimuth_spokes.push(AzimuthSpoke {
                azimuth_deg: az,
                rim: direction * radius,
            });

            let position = direction * (radius + label_offset);
            match cardinal_label(az) {
                Some(cardinal) => cardinal_anchors.push(LabelAnchor {
                    label: cardinal.to_string(),
                    position,
                }),
                None => degree_anchors.push(LabelAnchor {
                    label: format!("{az:.0}°"),
                    position,
                }),
            }

            az += AZIMUTH_SPOKE_STEP_DEG;
        }

        Self {
            radius,
            elevation_rings,
            azimuth_spokes,
            cardinal_anchors,
            degree_anchors,
        }
    }
}

fn cardinal_label(azimuth_deg: f64) -> Option<&'static str> {
    if azimuth_deg == 0.0 {
        Some("N")
    } else if azimuth_deg == 90.0 {
        Some("E")
    } else if azimuth_deg == 180.0 {
        Some("S")
    } else if azimuth_deg == 270.0 {
        Some("W")
    } else {
        None
    }
}
