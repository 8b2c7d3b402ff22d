use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::info;

use crate::error::{IngestError, Result};

/// Destination identifiers for the ingestion run, read once at startup and
/// passed by reference to each component.
///
/// The file uses uppercase keys (`PROJECT_ID`, `DATASET_NAME`,
/// `TABLE_STATIONS`, `TABLE_MEASUREMENTS`, `JSON_KEY_BQ`); the config layer
/// lowercases them on load. Environment variables with the same names
/// override file values.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub project_id: String,
    pub dataset_name: String,
    pub table_stations: String,
    pub table_measurements: String,
    /// Path to the service-account credential file.
    pub json_key_bq: PathBuf,
}

impl Settings {
    pub fn load(path: &Path) -> Result<Self> {
        let settings: Settings = config::Config::builder()
            .add_source(config::File::from(path.to_path_buf()))
            .add_source(config::Environment::default())
            .build()?
            .try_deserialize()?;

        settings.check()?;

        info!(
            project = %settings.project_id,
            dataset = %settings.dataset_name,
            stations = %settings.table_stations,
            measurements = %settings.table_measurements,
            "configuration loaded"
        );

        Ok(settings)
    }

    fn check(&self) -> Result<()> {
        for (key, value) in [
            ("PROJECT_ID", &self.project_id),
            ("DATASET_NAME", &self.dataset_name),
            ("TABLE_STATIONS", &self.table_stations),
            ("TABLE_MEASUREMENTS", &self.table_measurements),
        ] {
            if value.trim().is_empty() {
                return Err(IngestError::Config(format!("{key} must not be empty")));
            }
        }

        if !self.json_key_bq.is_file() {
            return Err(IngestError::Config(format!(
                "credential file not found: {}",
                self.json_key_bq.display()
            )));
        }

        Ok(())
    }
}
