use tracing::{info, warn};

use crate::api::GiosClient;
use crate::cli::args::Cli;
use crate::config::Settings;
use crate::error::Result;
use crate::models::{Measurement, Station};
use crate::processors::{DedupFilter, Transformer};
use crate::utils::ProgressReporter;
use crate::warehouse::Warehouse;

/// One full ingestion run: load config, snapshot the API, filter out rows the
/// warehouse already holds, append the rest. Strictly sequential; the first
/// error aborts the run.
pub async fn run(cli: Cli) -> Result<()> {
    let settings = Settings::load(&cli.config)?;

    let warehouse = Warehouse::connect(&settings).await?;
    if cli.dry_run {
        info!("dry run: skipping dataset and table creation");
    } else {
        warehouse.ensure_schema().await?;
    }

    let client = GiosClient::new();
    let transformer = Transformer::new();
    let dedup = DedupFilter::new();

    // Stations first: measurement rows reference them.
    let raw_stations = client.find_all_stations().await?;
    let mut stations = transformer.station_records(&raw_stations)?;
    info!(count = stations.len(), "fetched station list");

    if let Some(id) = cli.station_id {
        stations.retain(|s| s.id == id);
        if stations.is_empty() {
            warn!(station_id = id, "station not present in the upstream list");
        }
    }

    let existing_ids = warehouse.existing_station_ids().await?;
    let new_stations = dedup.filter_stations(stations.clone(), &existing_ids);
    info!(
        new = new_stations.len(),
        known = existing_ids.len(),
        "station dedup complete"
    );

    if cli.dry_run {
        info!("dry run: skipping station insert");
    } else if !new_stations.is_empty() {
        warehouse.insert_stations(&new_stations).await?;
        info!(rows = new_stations.len(), "wrote station rows");
    }

    let progress = ProgressReporter::new(
        stations.len() as u64,
        "Fetching sensor readings...",
        cli.quiet,
    );
    let measurements = collect_measurements(&client, &transformer, &stations, &progress).await?;
    progress.finish_with_message("Fetch complete");

    let batch = transformer.dedup_batch(measurements);
    let existing_keys = warehouse.existing_measurement_keys().await?;
    let new_measurements = dedup.filter_measurements(batch, &existing_keys);
    info!(
        new = new_measurements.len(),
        known = existing_keys.len(),
        "measurement dedup complete"
    );

    if cli.dry_run {
        info!("dry run: skipping measurement insert");
    } else if !new_measurements.is_empty() {
        warehouse.insert_measurements(&new_measurements).await?;
        info!(rows = new_measurements.len(), "wrote measurement rows");
    }

    info!(
        stations = new_stations.len(),
        measurements = new_measurements.len(),
        "ingestion run complete"
    );
    Ok(())
}

/// Walk every station's sensors and flatten the recent reading windows into
/// one measurement batch, in fetch order.
async fn collect_measurements(
    client: &GiosClient,
    transformer: &Transformer,
    stations: &[Station],
    progress: &ProgressReporter,
) -> Result<Vec<Measurement>> {
    let mut measurements = Vec::new();

    for station in stations {
        progress.set_message(format!("Station {}: {}", station.id, station.station_name).as_str());

        let sensors = client.station_sensors(station.id).await?;
        for sensor in &sensors {
            let data = client.sensor_data(sensor.id).await?;
            if data.values.is_empty() {
                // A sensor with no readings in the window is not an error.
                info!(
                    station_id = station.id,
                    sensor_id = sensor.id,
                    param = %sensor.param.param_code,
                    "no readings in window"
                );
                continue;
            }

            measurements.extend(transformer.measurement_records(
                station.id,
                sensor.id,
                &sensor.param.param_code,
                &data,
            )?);
        }

        progress.increment(1);
    }

    Ok(measurements)
}
