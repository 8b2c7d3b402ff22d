use std::collections::HashSet;

use crate::models::{Measurement, MeasurementKey, Station};

/// Set-difference filter between a candidate batch and the keys already
/// stored in the warehouse.
///
/// The filter itself does no I/O — key retrieval lives in the warehouse
/// layer, and a failed key query aborts the run before this filter is ever
/// reached (fail closed: guessing would risk duplicate inserts into the
/// append-only tables).
pub struct DedupFilter;

impl DedupFilter {
    pub fn new() -> Self {
        Self
    }

    /// Keep only stations whose identifier is not yet stored. Order preserved.
    pub fn filter_stations(
        &self,
        batch: Vec<Station>,
        existing_ids: &HashSet<u32>,
    ) -> Vec<Station> {
        batch
            .into_iter()
            .filter(|s| !existing_ids.contains(&s.id))
            .collect()
    }

    /// Keep only measurements whose composite key is not yet stored. Order
    /// preserved.
    pub fn filter_measurements(
        &self,
        batch: Vec<Measurement>,
        existing_keys: &HashSet<MeasurementKey>,
    ) -> Vec<Measurement> {
        batch
            .into_iter()
            .filter(|m| !existing_keys.contains(&m.key()))
            .collect()
    }
}

impl Default for DedupFilter {
    fn default() -> Self {
        Self::new()
    }
}
