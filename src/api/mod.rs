pub mod client;
pub mod raw;

pub use client::GiosClient;
pub use raw::{RawSensor, RawSensorData, RawStation, RawValue};
