//! Wire-format types mirroring the GIOŚ REST API JSON 1:1.
//!
//! These structs do no normalization; coordinates stay decimal strings and
//! readings keep their nullable values. The transformer turns them into the
//! warehouse shapes in `models`.

use serde::Deserialize;

/// One entry of the `station/findAll` response.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawStation {
    /// Missing identifiers do happen in the feed; such records are dropped
    /// by the transformer.
    pub id: Option<u32>,
    pub station_name: Option<String>,
    pub gegr_lat: Option<String>,
    pub gegr_lon: Option<String>,
    pub city: Option<RawCity>,
    pub address_street: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawCity {
    pub commune: Option<RawCommune>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawCommune {
    pub commune_name: Option<String>,
    pub district_name: Option<String>,
    pub province_name: Option<String>,
}

/// One entry of the `station/sensors/{id}` response.
#[derive(Debug, Clone, Deserialize)]
pub struct RawSensor {
    pub id: u32,
    pub param: RawParam,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawParam {
    pub param_code: String,
}

/// The `data/getData/{sensor_id}` response: a recent time window of readings
/// for one sensor.
#[derive(Debug, Clone, Deserialize)]
pub struct RawSensorData {
    #[serde(default)]
    pub values: Vec<RawValue>,
}

/// A single reading; `value` is null when the sensor had no valid reading
/// for that timestamp.
#[derive(Debug, Clone, Deserialize)]
pub struct RawValue {
    pub date: String,
    pub value: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_find_all_entry() {
        let json = r#"{
            "id": 14,
            "stationName": "Działoszyn",
            "gegrLat": "50.972167",
            "gegrLon": "14.941319",
            "city": {
                "id": 192,
                "name": "Działoszyn",
                "commune": {
                    "communeName": "Bogatynia",
                    "districtName": "zgorzelecki",
                    "provinceName": "DOLNOŚLĄSKIE"
                }
            },
            "addressStreet": null
        }"#;

        let station: RawStation = serde_json::from_str(json).unwrap();
        assert_eq!(station.id, Some(14));
        assert_eq!(station.gegr_lat.as_deref(), Some("50.972167"));
        let commune = station.city.unwrap().commune.unwrap();
        assert_eq!(commune.province_name.as_deref(), Some("DOLNOŚLĄSKIE"));
        assert!(station.address_street.is_none());
    }

    #[test]
    fn test_parses_sensor_entry() {
        let json = r#"{
            "id": 92,
            "stationId": 14,
            "param": {
                "paramName": "pył zawieszony PM10",
                "paramFormula": "PM10",
                "paramCode": "PM10",
                "idParam": 3
            }
        }"#;

        let sensor: RawSensor = serde_json::from_str(json).unwrap();
        assert_eq!(sensor.id, 92);
        assert_eq!(sensor.param.param_code, "PM10");
    }

    #[test]
    fn test_parses_sensor_data_with_null_reading() {
        let json = r#"{
            "key": "PM10",
            "values": [
                { "date": "2017-03-28 11:00:00", "value": 30.3 },
                { "date": "2017-03-28 12:00:00", "value": null }
            ]
        }"#;

        let data: RawSensorData = serde_json::from_str(json).unwrap();
        assert_eq!(data.values.len(), 2);
        assert_eq!(data.values[0].value, Some(30.3));
        assert_eq!(data.values[1].value, None);
    }

    #[test]
    fn test_missing_values_array_defaults_to_empty() {
        let data: RawSensorData = serde_json::from_str(r#"{ "key": "CO" }"#).unwrap();
        assert!(data.values.is_empty());
    }
}
