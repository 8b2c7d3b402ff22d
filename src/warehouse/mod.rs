pub mod bigquery;
pub mod schema;

pub use bigquery::Warehouse;
