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
use std::fmt;

use enum_iterator::Sequence;
use hifitime::Epoch;
use serde::de::Deserializer;
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};
use serde_derive::Deserialize as DeriveDeserialize;

/// GNSS constellations reported by the receivers. Anything unrecognized maps to
/// [Constellation::Unknown] rather than failing, since a firmware update upstream must not
/// blank the whole dashboard.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Sequence)]
pub enum Constellation {
    GPS,
    GLONASS,
    BeiDou,
    Galileo,
    Unknown,
}

impl From<&str> for Constellation {
    fn from(name: &str) -> Self {
        match name {
            "GPS" => Self::GPS,
            "GLONASS" => Self::GLONASS,
            "BeiDou" => Self::BeiDou,
            "Galileo" => Self::Galileo,
            _ => Self::Unknown,
        }
    }
}

impl fmt::Display for Constellation {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::GPS => write!(f, "GPS"),
            Self::GLONASS => write!(f, "GLONASS"),
            Self::BeiDou => write!(f, "BeiDou"),
            Self::Galileo => write!(f, "Galileo"),
            Self::Unknown => write!(f, "Unknown"),
        }
    }
}

impl Serialize for Constellation {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format!("{self}"))
    }
}

impl<'de> Deserialize<'de> for Constellation {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        Ok(Self::from(name.as_str()))
    }
}

/// Fix type as reported in GSA sentences, ordered by quality: no fix, then a 2D fix, then a
/// full 3D fix. The ordinal rank is what heatmap reducers compare.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Sequence)]
pub enum FixType {
    NoFix,
    Fix2D,
    Fix3D,
}

impl FixType {
    /// Maps the raw wire value (1, 2, or 3) to a fix type. Unmapped values rank lowest.
    pub fn from_raw(raw: i64) -> Self {
        match raw {
            2 => Self::Fix2D,
            3 => Self::Fix3D,
            _ => Self::NoFix,
        }
    }

    pub const fn rank(self) -> u8 {
        match self {
            Self::NoFix => 0,
            Self::Fix2D => 1,
            Self::Fix3D => 2,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::NoFix => "No fix",
            Self::Fix2D => "2D fix",
            Self::Fix3D => "3D fix",
        }
    }
}

/// Multipath interference level derived from the receiver's multipath indicator.
/// Severity increases with the ordinal rank.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Sequence)]
pub enum MultipathLevel {
    Low,
    Medium,
    High,
}

impl MultipathLevel {
    /// Maps the raw indicator (1, 2, or 3) to a level. Unmapped values rank lowest.
    pub fn from_indicator(raw: i64) -> Self {
        match raw {
            2 => Self::Medium,
            3 => Self::High,
            _ => Self::Low,
        }
    }

    pub const fn rank(self) -> u8 {
        match self {
            Self::Low => 0,
            Self::Medium => 1,
            Self::High => 2,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
        }
    }
}

/// Carrier-to-noise density quality bands, for tooltips and legends.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Sequence)]
pub enum SnrQuality {
    Unknown,
    Poor,
    Marginal,
    Good,
}

impl SnrQuality {
    /// Classifies a C/N0 in dB-Hz: at most 20 is poor, at most 30 is marginal, above is good.
    pub fn classify(sno_db_hz: Option<f64>) -> Self {
        match sno_db_hz {
            None => Self::Unknown,
            Some(sno) if !sno.is_finite() => Self::Unknown,
            Some(sno) if sno <= 20.0 => Self::Poor,
            Some(sno) if sno <= 30.0 => Self::Marginal,
            Some(_) => Self::Good,
        }
    }
}

/// A single historical observation of a satellite's position in the sky.
#[derive(Clone, Debug, PartialEq)]
pub struct TrackPoint {
    pub azimuth_deg: f64,
    pub elevation_deg: f64,
    pub epoch: Epoch,
    pub snr_db_hz: Option<f64>,
}

/// A satellite as seen in the latest telemetry snapshot, with its observation history.
///
/// After normalization, `elevation_deg` is in [0, 90] and `azimuth_deg` in [0, 360).
#[derive(Clone, Debug, PartialEq)]
pub struct SatelliteSample {
    pub constellation: Constellation,
    pub prn: u16,
    pub azimuth_deg: f64,
    pub elevation_deg: f64,
    pub snr_db_hz: Option<f64>,
    pub used_for_fix: bool,
    pub doppler_hz: Option<f64>,
    pub pseudorange_rms_error: Option<f64>,
    pub max_multipath_indicator: Option<i64>,
    pub track_points: Vec<TrackPoint>,
}

impl SatelliteSample {
    pub fn multipath_level(&self) -> Option<MultipathLevel> {
        self.max_multipath_indicator.map(MultipathLevel::from_indicator)
    }

    pub fn snr_quality(&self) -> SnrQuality {
        SnrQuality::classify(self.snr_db_hz)
    }
}

/// One normalized elevation mask observation: the minimum elevation at which satellites
/// become visible at this azimuth bucket, or `None` when the estimation window had no
/// usable data.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct MaskBinSample {
    pub azimuth_bucket_deg: f64,
    pub value_deg: Option<f64>,
    pub used_fallback: bool,
    pub sample_count: Option<u32>,
}

/// Satellite entry as emitted by the upstream REST endpoint.
#[derive(Clone, Debug, DeriveDeserialize)]
pub struct RawSatellite {
    #[serde(default)]
    pub constellation: Option<Constellation>,
    #[serde(default)]
    pub prn: Option<u16>,
    #[serde(default)]
    pub azimuth_degrees: Option<f64>,
    #[serde(default)]
    pub elevation_degrees: Option<f64>,
    #[serde(default)]
    pub average_sno: Option<f64>,
    #[serde(default)]
    pub used_for_fix: Option<bool>,
    #[serde(default)]
    pub average_doppler_hz: Option<f64>,
    #[serde(default)]
    pub average_pseudorange_rms_error: Option<f64>,
    #[serde(default)]
    pub maximum_multipath_indicator: Option<i64>,
    #[serde(default)]
    pub track_points: Vec<RawTrackPoint>,
}

#[derive(Clone, Debug, DeriveDeserialize)]
pub struct RawTrackPoint {
    #[serde(default)]
    pub azimuth_degrees: Option<f64>,
    #[serde(default)]
    pub elevation_degrees: Option<f64>,
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub average_sno: Option<f64>,
}

/// Elevation mask bin as emitted by the upstream REST endpoint.
#[derive(Clone, Debug, DeriveDeserialize)]
pub struct RawMaskBin {
    #[serde(default)]
    pub azimuth_bucket: Option<f64>,
    #[serde(default)]
    pub skyline_elevation: Option<f64>,
    #[serde(default)]
    pub skyline_elevation_best_effort: Option<f64>,
    #[serde(default)]
    pub used_fallback: bool,
    #[serde(default)]
    pub sample_count: Option<u32>,
}

impl RawMaskBin {
    /// The skyline value if directly estimated, else the best-effort estimate, else no data.
    pub fn effective_value_deg(&self) -> Option<f64> {
        self.skyline_elevation
            .or(self.skyline_elevation_best_effort)
            .filter(|v| v.is_finite())
    }
}

/// The satellites endpoint returns either a bare array or an object wrapping it. Both
/// shapes are accepted and normalized here, at the engine boundary, so the algorithms
/// never shape-sniff.
#[derive(Clone, Debug, DeriveDeserialize)]
#[serde(untagged)]
pub enum SatellitesInput {
    List(Vec<RawSatellite>),
    Wrapped { satellites: Vec<RawSatellite> },
}

/// The elevation mask endpoint returns either an array of bins or an object keyed by
/// azimuth bucket.
#[derive(Clone, Debug, DeriveDeserialize)]
#[serde(untagged)]
pub enum MaskInput {
    List(Vec<RawMaskBin>),
    Keyed(BTreeMap<String, RawMaskBin>),
}

/// Wraps an azimuth to [0, 360).
pub fn wrap_azimuth_deg(az_deg: f64) -> f64 {
    az_deg.rem_euclid(360.0)
}

/// Clamps an elevation to [0, 90].
pub fn clamp_elevation_deg(el_deg: f64) -> f64 {
    el_deg.clamp(0.0, 90.0)
}

/// Parses an ISO-8601 / RFC3339 timestamp. Returns `None` on failure: partial telemetry
/// loss is expected and filtered, never fatal.
pub fn parse_epoch(timestamp: &str) -> Option<Epoch> {
    match Epoch::from_gregorian_str(timestamp) {
        Ok(epoch) => Some(epoch),
        Err(err) => {
            debug!("dropping unparseable timestamp {timestamp}: {err}");
            None
        }
    }
}

/// Normalizes the satellites input: satellites without a finite azimuth and elevation are
/// dropped, elevations are clamped to [0, 90], azimuths wrapped to [0, 360), and track
/// points with missing coordinates or unparseable timestamps are dropped.
pub fn normalize_satellites(input: &SatellitesInput) -> Vec<SatelliteSample> {
    let raw = match input {
        SatellitesInput::List(sats) => sats,
        SatellitesInput::Wrapped { satellites } => satellites,
    };

    let mut sats = Vec::with_capacity(raw.len());
    for sat in raw {
        let (az, el) = match (sat.azimuth_degrees, sat.elevation_degrees) {
            (Some(az), Some(el)) if az.is_finite() && el.is_finite() => (az, el),
            _ => {
                debug!(
                    "dropping satellite {:?} PRN {:?} without a position",
                    sat.constellation, sat.prn
                );
                continue;
            }
        };

        let mut track_points = Vec::with_capacity(sat.track_points.len());
        for tp in &sat.track_points {
            let (tp_az, tp_el) = match (tp.azimuth_degrees, tp.elevation_degrees) {
                (Some(a), Some(e)) if a.is_finite() && e.is_finite() => (a, e),
                _ => continue,
            };
            let epoch = match tp.timestamp.as_deref().and_then(parse_epoch) {
                Some(epoch) => epoch,
                None => continue,
            };
            track_points.push(TrackPoint {
                azimuth_deg: tp_az,
                elevation_deg: tp_el,
                epoch,
                snr_db_hz: tp.average_sno.filter(|s| s.is_finite()),
            });
        }

        sats.push(SatelliteSample {
            constellation: sat.constellation.unwrap_or(Constellation::Unknown),
            prn: sat.prn.unwrap_or_default(),
            azimuth_deg: wrap_azimuth_deg(az),
            elevation_deg: clamp_elevation_deg(el),
            snr_db_hz: sat.average_sno.filter(|s| s.is_finite()),
            used_for_fix: sat.used_for_fix.unwrap_or(false),
            doppler_hz: sat.average_doppler_hz.filter(|d| d.is_finite()),
            pseudorange_rms_error: sat.average_pseudorange_rms_error.filter(|p| p.is_finite()),
            max_multipath_indicator: sat.maximum_multipath_indicator,
            track_points,
        });
    }

    sats
}

/// Normalizes the elevation mask input to a flat list of bin samples. Bins without a
/// finite azimuth bucket are dropped; the skyline value resolves to the direct estimate,
/// then the best-effort estimate, then no data.
pub fn normalize_mask_bins(input: &MaskInput) -> Vec<MaskBinSample> {
    let raw: Vec<&RawMaskBin> = match input {
        MaskInput::List(bins) => bins.iter().collect(),
        MaskInput::Keyed(by_bucket) => by_bucket.values().collect(),
    };

    let mut bins = Vec::with_capacity(raw.len());
    for bin in raw {
        let bucket = match bin.azimuth_bucket {
            Some(bucket) if bucket.is_finite() => bucket,
            _ => {
                debug!("dropping mask bin without an azimuth bucket");
                continue;
            }
        };
        bins.push(MaskBinSample {
            azimuth_bucket_deg: bucket,
            value_deg: bin.effective_value_deg(),
            used_fallback: bin.used_fallback,
            sample_count: bin.sample_count,
        });
    }

    bins
}

/// Joins per-timestamp azimuth, elevation and C/N0 series (keyed by ISO-8601 timestamps)
/// into track points, keeping only timestamps present and finite in all three series.
/// The result is sorted by epoch, oldest first.
pub fn join_observation_series(
    azimuth: &BTreeMap<String, f64>,
    elevation: &BTreeMap<String, f64>,
    sno: &BTreeMap<String, f64>,
) -> Vec<TrackPoint> {
    let mut points = Vec::with_capacity(elevation.len());
    for (key, el) in elevation {
        let (az, s) = match (azimuth.get(key), sno.get(key)) {
            (Some(az), Some(s)) => (*az, *s),
            _ => continue,
        };
        if !el.is_finite() || !az.is_finite() || !s.is_finite() {
            continue;
        }
        let epoch = match parse_epoch(key) {
            Some(epoch) => epoch,
            None => continue,
        };
        points.push(TrackPoint {
            azimuth_deg: wrap_azimuth_deg(az),
            elevation_deg: clamp_elevation_deg(*el),
            epoch,
            snr_db_hz: Some(s),
        });
    }

    points.sort_by(|a, b| a.epoch.cmp(&b.epoch));
    points
}
