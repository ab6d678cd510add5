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
use std::fmt::Debug;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Serialize;
use snafu::{ResultExt, Snafu};

use crate::histogram::HistogramValue;
use crate::telemetry::{
    normalize_mask_bins, normalize_satellites, MaskBinSample, MaskInput, SatelliteSample,
    SatellitesInput,
};

#[derive(Debug, Snafu)]
pub enum ConfigError {
    #[snafu(display("Failed to read configuration file: {source}"))]
    ReadError { source: std::io::Error },
    #[snafu(display("Failed to parse YAML configuration: {source}"))]
    ParseError { source: serde_yaml::Error },
}

impl PartialEq for ConfigError {
    /// No two configuration errors match
    fn eq(&self, _other: &Self) -> bool {
        false
    }
}

#[derive(Debug, Snafu)]
pub enum SnapshotError {
    #[snafu(display("Failed to decode telemetry snapshot: {source}"))]
    DecodeError { source: serde_json::Error },
}

pub trait ConfigRepr: Debug + Sized + Serialize + DeserializeOwned {
    /// Builds the configuration representation from the path to a yaml
    fn load<P>(path: P) -> Result<Self, ConfigError>
    where
        P: AsRef<Path>,
    {
        let file = File::open(path).context(ReadSnafu)?;
        let reader = BufReader::new(file);

        serde_yaml::from_reader(reader).context(ParseSnafu)
    }

    /// Builds a sequence of "Selves" from the provided path to a yaml
    fn load_many<P>(path: P) -> Result<Vec<Self>, ConfigError>
    where
        P: AsRef<Path>,
    {
        let file = File::open(path).context(ReadSnafu)?;
        let reader = BufReader::new(file);

        serde_yaml::from_reader(reader).context(ParseSnafu)
    }

    /// Builds the configuration representation from a yaml string
    fn loads(data: &str) -> Result<Self, ConfigError> {
        debug!("Loading YAML:\n{data}");
        serde_yaml::from_str(data).context(ParseSnafu)
    }
}

/// Decodes a satellites snapshot (either a bare JSON array or an object wrapping a
/// `satellites` array) into normalized samples.
pub fn decode_satellites(snapshot: &str) -> Result<Vec<SatelliteSample>, SnapshotError> {
    let input: SatellitesInput = serde_json::from_str(snapshot).context(DecodeSnafu)?;
    Ok(normalize_satellites(&input))
}

/// Decodes an elevation mask snapshot (either a JSON array of bins or an object keyed by
/// azimuth bucket) into normalized bin samples.
pub fn decode_elevation_mask(snapshot: &str) -> Result<Vec<MaskBinSample>, SnapshotError> {
    let input: MaskInput = serde_json::from_str(snapshot).context(DecodeSnafu)?;
    Ok(normalize_mask_bins(&input))
}

/// Decodes a histogram snapshot: a JSON object from ISO-8601 timestamps to either
/// scalars or per-constellation objects.
pub fn decode_histogram(
    snapshot: &str,
) -> Result<BTreeMap<String, HistogramValue>, SnapshotError> {
    serde_json::from_str(snapshot).context(DecodeSnafu)
}
