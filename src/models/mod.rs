pub mod measurement;
pub mod station;

pub use measurement::{Measurement, MeasurementKey, ParamCode};
pub use station::Station;
