use chrono::NaiveDateTime;
use std::collections::HashSet;
use validator::Validate;

use crate::api::raw::{RawSensorData, RawStation};
use crate::error::{IngestError, Result};
use crate::models::{Measurement, Station};

/// Timestamp format used by the GIOŚ data endpoint.
const API_DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Converts raw API responses into the two warehouse record shapes.
///
/// Deterministic: identical input produces identical records in input order.
pub struct Transformer;

impl Transformer {
    pub fn new() -> Self {
        Self
    }

    /// Normalize the station list. Records without an identifier are dropped;
    /// coordinate strings are parsed to floats; the nested commune object is
    /// flattened into city, district and province columns. Each record is
    /// validated against the model rules before it is emitted, so a station
    /// with out-of-range coordinates aborts the run instead of reaching the
    /// warehouse.
    pub fn station_records(&self, raw: &[RawStation]) -> Result<Vec<Station>> {
        let mut stations = Vec::with_capacity(raw.len());

        for entry in raw {
            let Some(id) = entry.id else {
                tracing::warn!("dropping station record without id");
                continue;
            };

            let commune = entry.city.as_ref().and_then(|c| c.commune.as_ref());

            let station = Station {
                id,
                station_name: entry.station_name.clone().unwrap_or_default(),
                gegr_lat: parse_coordinate(id, entry.gegr_lat.as_deref())?,
                gegr_lon: parse_coordinate(id, entry.gegr_lon.as_deref())?,
                city: commune
                    .and_then(|c| c.commune_name.as_deref())
                    .map(capitalize),
                address_street: entry.address_street.clone(),
                district_name: commune.and_then(|c| c.district_name.clone()),
                province: commune
                    .and_then(|c| c.province_name.as_deref())
                    .map(capitalize),
            };

            station.validate()?;
            stations.push(station);
        }

        Ok(stations)
    }

    /// Flatten one sensor's reading window into measurement records.
    ///
    /// Every (timestamp, value) pair becomes a record; null readings are kept
    /// with an absent value so downstream consumers see the gap. An empty
    /// window yields an empty vec, not an error.
    pub fn measurement_records(
        &self,
        station_id: u32,
        sensor_id: u32,
        param_code: &str,
        data: &RawSensorData,
    ) -> Result<Vec<Measurement>> {
        let param_code = param_code.parse()?;
        let mut measurements = Vec::with_capacity(data.values.len());

        for reading in &data.values {
            let datetime =
                NaiveDateTime::parse_from_str(&reading.date, API_DATETIME_FORMAT)?;

            measurements.push(Measurement {
                station_id,
                sensor_id,
                param_code,
                datetime,
                value: reading.value,
            });
        }

        Ok(measurements)
    }

    /// Drop in-batch duplicates by composite key, first occurrence wins,
    /// input order preserved.
    pub fn dedup_batch(&self, measurements: Vec<Measurement>) -> Vec<Measurement> {
        let mut seen = HashSet::with_capacity(measurements.len());
        measurements
            .into_iter()
            .filter(|m| seen.insert(m.key()))
            .collect()
    }
}

impl Default for Transformer {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_coordinate(station_id: u32, raw: Option<&str>) -> Result<f64> {
    let raw = raw.ok_or_else(|| {
        IngestError::InvalidCoordinate(format!("station {station_id}: missing coordinate"))
    })?;

    raw.trim().parse::<f64>().map_err(|_| {
        IngestError::InvalidCoordinate(format!("station {station_id}: '{raw}'"))
    })
}

/// Uppercase the first character, lowercase the rest. Matches how province
/// and commune names are stored ("DOLNOŚLĄSKIE" -> "Dolnośląskie").
fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase(),
        None => String::new(),
    }
}
