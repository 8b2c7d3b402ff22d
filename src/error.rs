use thiserror::Error;

pub type Result<T> = std::result::Result<T, IngestError>;

#[derive(Error, Debug)]
pub enum IngestError {
    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to load configuration: {0}")]
    ConfigFile(#[from] config::ConfigError),

    #[error("Request to {url} failed")]
    Fetch {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} returned HTTP {status}")]
    HttpStatus {
        url: String,
        status: reqwest::StatusCode,
    },

    #[error("Unexpected JSON from {url}")]
    Parse {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Date parsing error: {0}")]
    DateParse(#[from] chrono::ParseError),

    #[error("Invalid coordinate format: {0}")]
    InvalidCoordinate(String),

    #[error("Unknown parameter code: {0}")]
    UnknownParam(String),

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("Warehouse error: {0}")]
    Warehouse(#[from] gcp_bigquery_client::error::BQError),

    #[error("Warehouse rejected {count} row(s) inserting into {table}: {detail}")]
    WarehouseRows {
        table: String,
        count: usize,
        detail: String,
    },

    #[error("Unexpected existing-key query result: {0}")]
    KeyQuery(String),
}
