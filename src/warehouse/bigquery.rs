use std::collections::HashSet;

use chrono::NaiveDateTime;
use gcp_bigquery_client::model::{
    dataset::Dataset, query_request::QueryRequest, query_response::ResultSet, table::Table,
    table_data_insert_all_request::TableDataInsertAllRequest, table_schema::TableSchema,
};
use gcp_bigquery_client::error::BQError;
use gcp_bigquery_client::Client;
use serde::Serialize;
use tracing::{debug, info};

use crate::config::Settings;
use crate::error::{IngestError, Result};
use crate::models::{Measurement, MeasurementKey, Station};
use crate::warehouse::schema::{measurements_schema, stations_schema, DATASET_LOCATION};

/// Streaming-insert requests are capped by the API; stay well under the cap.
const INSERT_CHUNK_SIZE: usize = 500;

/// Format BigQuery uses for DATETIME values in query results.
const BQ_DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

/// Thin wrapper over the BigQuery client holding the destination
/// coordinates. One instance is built per run and used for every read and
/// write; credentials are read once from the service-account key file.
pub struct Warehouse {
    client: Client,
    project_id: String,
    dataset: String,
    table_stations: String,
    table_measurements: String,
}

impl Warehouse {
    /// Authenticate against BigQuery with the key file named in the settings.
    pub async fn connect(settings: &Settings) -> Result<Self> {
        let key_path = settings.json_key_bq.to_str().ok_or_else(|| {
            IngestError::Config(format!(
                "credential path is not valid UTF-8: {}",
                settings.json_key_bq.display()
            ))
        })?;

        let client = Client::from_service_account_key_file(key_path).await?;
        info!(project = %settings.project_id, dataset = %settings.dataset_name, "warehouse client ready");

        Ok(Self {
            client,
            project_id: settings.project_id.clone(),
            dataset: settings.dataset_name.clone(),
            table_stations: settings.table_stations.clone(),
            table_measurements: settings.table_measurements.clone(),
        })
    }

    /// Create the dataset and both destination tables if they do not exist.
    /// Safe to call on every run.
    pub async fn ensure_schema(&self) -> Result<()> {
        self.ensure_dataset().await?;
        self.ensure_table(&self.table_stations, stations_schema())
            .await?;
        self.ensure_table(&self.table_measurements, measurements_schema())
            .await?;
        Ok(())
    }

    async fn ensure_dataset(&self) -> Result<()> {
        match self.client.dataset().get(&self.project_id, &self.dataset).await {
            Ok(_) => {
                debug!(dataset = %self.dataset, "dataset exists");
            }
            Err(err) if is_not_found(&err) => {
                self.client
                    .dataset()
                    .create(Dataset::new(&self.project_id, &self.dataset).location(DATASET_LOCATION))
                    .await?;
                info!(dataset = %self.dataset, "created dataset");
            }
            // Auth, quota or network failures are not "missing dataset".
            Err(err) => return Err(err.into()),
        }
        Ok(())
    }

    async fn ensure_table(&self, table: &str, schema: TableSchema) -> Result<()> {
        match self
            .client
            .table()
            .get(&self.project_id, &self.dataset, table, None)
            .await
        {
            Ok(_) => {
                debug!(table, "table exists");
            }
            Err(err) if is_not_found(&err) => {
                self.client
                    .table()
                    .create(Table::new(&self.project_id, &self.dataset, table, schema))
                    .await?;
                info!(table, "created table");
            }
            Err(err) => return Err(err.into()),
        }
        Ok(())
    }

    /// Identifiers of every station already stored.
    pub async fn existing_station_ids(&self) -> Result<HashSet<u32>> {
        let sql = format!(
            "SELECT id FROM `{}.{}.{}`",
            self.project_id, self.dataset, self.table_stations
        );
        let mut result_set = self.query(&sql).await?;

        let mut ids = HashSet::new();
        while result_set.next_row() {
            let id = result_set
                .get_i64_by_name("id")?
                .ok_or_else(|| IngestError::KeyQuery("null station id".to_string()))?;
            ids.insert(id as u32);
        }

        debug!(count = ids.len(), "fetched existing station ids");
        Ok(ids)
    }

    /// Composite keys of every measurement already stored.
    pub async fn existing_measurement_keys(&self) -> Result<HashSet<MeasurementKey>> {
        let sql = format!(
            "SELECT station_id, sensor_id, param_code, datetime FROM `{}.{}.{}`",
            self.project_id, self.dataset, self.table_measurements
        );
        let mut result_set = self.query(&sql).await?;

        let mut keys = HashSet::new();
        while result_set.next_row() {
            let station_id = result_set
                .get_i64_by_name("station_id")?
                .ok_or_else(|| IngestError::KeyQuery("null station_id".to_string()))?;
            let sensor_id = result_set
                .get_i64_by_name("sensor_id")?
                .ok_or_else(|| IngestError::KeyQuery("null sensor_id".to_string()))?;
            let param_code = result_set
                .get_string_by_name("param_code")?
                .ok_or_else(|| IngestError::KeyQuery("null param_code".to_string()))?;
            let datetime = result_set
                .get_string_by_name("datetime")?
                .ok_or_else(|| IngestError::KeyQuery("null datetime".to_string()))?;

            keys.insert(MeasurementKey {
                station_id: station_id as u32,
                sensor_id: sensor_id as u32,
                param_code: param_code.parse()?,
                datetime: NaiveDateTime::parse_from_str(&datetime, BQ_DATETIME_FORMAT)?,
            });
        }

        debug!(count = keys.len(), "fetched existing measurement keys");
        Ok(keys)
    }

    /// Append station rows.
    pub async fn insert_stations(&self, stations: &[Station]) -> Result<()> {
        self.insert_rows(&self.table_stations, stations).await
    }

    /// Append measurement rows.
    pub async fn insert_measurements(&self, measurements: &[Measurement]) -> Result<()> {
        self.insert_rows(&self.table_measurements, measurements)
            .await
    }

    async fn query(&self, sql: &str) -> Result<ResultSet> {
        let response = self
            .client
            .job()
            .query(&self.project_id, QueryRequest::new(sql))
            .await?;
        Ok(ResultSet::new_from_query_response(response))
    }

    async fn insert_rows<T: Serialize>(&self, table: &str, rows: &[T]) -> Result<()> {
        for chunk in rows.chunks(INSERT_CHUNK_SIZE) {
            let mut request = TableDataInsertAllRequest::new();
            for row in chunk {
                request.add_row(None, row)?;
            }

            let response = self
                .client
                .tabledata()
                .insert_all(&self.project_id, &self.dataset, table, request)
                .await?;

            if let Some(errors) = response.insert_errors {
                if !errors.is_empty() {
                    return Err(IngestError::WarehouseRows {
                        table: table.to_string(),
                        count: errors.len(),
                        detail: format!("{errors:?}"),
                    });
                }
            }

            debug!(table, rows = chunk.len(), "inserted chunk");
        }
        Ok(())
    }
}

/// Only an HTTP 404 from the API means "create it"; anything else is a real
/// failure and must surface as-is.
fn is_not_found(err: &BQError) -> bool {
    matches!(err, BQError::ResponseError { error } if error.error.code == 404)
}
