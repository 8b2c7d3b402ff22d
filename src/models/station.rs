use serde::{Deserialize, Serialize};
use validator::Validate;

/// One air-quality monitoring site, flattened into the shape of the
/// `stations` warehouse table.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct Station {
    pub id: u32,

    #[validate(length(min = 1))]
    #[serde(rename = "stationName")]
    pub station_name: String,

    #[validate(range(min = -90.0, max = 90.0))]
    #[serde(rename = "gegrLat")]
    pub gegr_lat: f64,

    #[validate(range(min = -180.0, max = 180.0))]
    #[serde(rename = "gegrLon")]
    pub gegr_lon: f64,

    /// Commune name, capitalized.
    pub city: Option<String>,

    #[serde(rename = "addressStreet")]
    pub address_street: Option<String>,

    pub district_name: Option<String>,

    /// Province name, capitalized.
    pub province: Option<String>,
}
