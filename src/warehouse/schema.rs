//! Destination table schemas.
//!
//! Column names follow the upstream API spelling for stations (the BI layer
//! was built against them) and snake_case for measurements.

use gcp_bigquery_client::model::{
    table_field_schema::TableFieldSchema, table_schema::TableSchema,
};

/// BigQuery dataset location.
pub const DATASET_LOCATION: &str = "EU";

pub fn stations_schema() -> TableSchema {
    TableSchema::new(vec![
        TableFieldSchema::integer("id"),
        TableFieldSchema::string("stationName"),
        TableFieldSchema::float("gegrLat"),
        TableFieldSchema::float("gegrLon"),
        TableFieldSchema::string("city"),
        TableFieldSchema::string("addressStreet"),
        TableFieldSchema::string("district_name"),
        TableFieldSchema::string("province"),
    ])
}

pub fn measurements_schema() -> TableSchema {
    TableSchema::new(vec![
        TableFieldSchema::integer("station_id"),
        TableFieldSchema::integer("sensor_id"),
        TableFieldSchema::string("param_code"),
        TableFieldSchema::date_time("datetime"),
        TableFieldSchema::float("value"),
    ])
}
