pub mod api;
pub mod cli;
pub mod config;
pub mod error;
pub mod models;
pub mod processors;
pub mod utils;
pub mod warehouse;

pub use error::{IngestError, Result};
