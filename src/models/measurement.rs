use std::fmt;
use std::str::FromStr;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::error::{IngestError, Result};

/// Pollutant parameter codes reported by the GIOŚ network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ParamCode {
    #[serde(rename = "PM10")]
    Pm10,
    #[serde(rename = "PM2.5")]
    Pm25,
    #[serde(rename = "NO2")]
    No2,
    #[serde(rename = "O3")]
    O3,
    #[serde(rename = "SO2")]
    So2,
    #[serde(rename = "C6H6")]
    C6h6,
    #[serde(rename = "CO")]
    Co,
}

impl ParamCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ParamCode::Pm10 => "PM10",
            ParamCode::Pm25 => "PM2.5",
            ParamCode::No2 => "NO2",
            ParamCode::O3 => "O3",
            ParamCode::So2 => "SO2",
            ParamCode::C6h6 => "C6H6",
            ParamCode::Co => "CO",
        }
    }
}

impl FromStr for ParamCode {
    type Err = IngestError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "PM10" => Ok(ParamCode::Pm10),
            "PM2.5" => Ok(ParamCode::Pm25),
            "NO2" => Ok(ParamCode::No2),
            "O3" => Ok(ParamCode::O3),
            "SO2" => Ok(ParamCode::So2),
            "C6H6" => Ok(ParamCode::C6h6),
            "CO" => Ok(ParamCode::Co),
            other => Err(IngestError::UnknownParam(other.to_string())),
        }
    }
}

impl fmt::Display for ParamCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One pollutant reading at one sensor at one timestamp, in the shape of the
/// `measurements` warehouse table. `value` is `None` when the sensor reported
/// no valid reading for that hour; such rows are still persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Measurement {
    pub station_id: u32,
    pub sensor_id: u32,
    pub param_code: ParamCode,
    pub datetime: NaiveDateTime,
    pub value: Option<f64>,
}

impl Measurement {
    pub fn key(&self) -> MeasurementKey {
        MeasurementKey {
            station_id: self.station_id,
            sensor_id: self.sensor_id,
            param_code: self.param_code,
            datetime: self.datetime,
        }
    }
}

/// Logical primary key of a measurement row, used for deduplication against
/// rows already persisted in the warehouse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MeasurementKey {
    pub station_id: u32,
    pub sensor_id: u32,
    pub param_code: ParamCode,
    pub datetime: NaiveDateTime,
}
