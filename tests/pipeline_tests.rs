use std::collections::HashSet;

use gios_ingest::api::GiosClient;
use gios_ingest::models::{Measurement, MeasurementKey};
use gios_ingest::processors::{DedupFilter, Transformer};
use gios_ingest::IngestError;
use pretty_assertions::assert_eq;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

const STATIONS_BODY: &str = r#"[
    {
        "id": 1,
        "stationName": "Test Station One",
        "gegrLat": "50.057678",
        "gegrLon": "19.926189",
        "city": {
            "id": 1,
            "name": "Krakow",
            "commune": {
                "communeName": "KRAKOW",
                "districtName": "Krakow",
                "provinceName": "MALOPOLSKIE"
            }
        },
        "addressStreet": "al. Krasinskiego"
    },
    {
        "id": 2,
        "stationName": "Test Station Two",
        "gegrLat": "52.219298",
        "gegrLon": "21.004724",
        "city": null,
        "addressStreet": null
    }
]"#;

const SENSORS_STATION_1: &str = r#"[
    {
        "id": 100,
        "stationId": 1,
        "param": {
            "paramName": "pyl zawieszony PM10",
            "paramFormula": "PM10",
            "paramCode": "PM10",
            "idParam": 3
        }
    }
]"#;

const DATA_SENSOR_100: &str = r#"{
    "key": "PM10",
    "values": [
        { "date": "2024-03-01 10:00:00", "value": 31.4 },
        { "date": "2024-03-01 11:00:00", "value": null },
        { "date": "2024-03-01 12:00:00", "value": 28.9 }
    ]
}"#;

fn route(path: &str) -> &'static str {
    if path.contains("/station/findAll") {
        STATIONS_BODY
    } else if path.contains("/station/sensors/1") {
        SENSORS_STATION_1
    } else if path.contains("/data/getData/100") {
        DATA_SENSOR_100
    } else {
        // Station 2 has no sensors; anything else is an empty window.
        "[]"
    }
}

/// Serve canned GIOŚ responses on an ephemeral local port.
async fn spawn_fixture_server() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        loop {
            let Ok((mut socket, _)) = listener.accept().await else {
                break;
            };
            tokio::spawn(async move {
                let mut buf = vec![0u8; 4096];
                let n = socket.read(&mut buf).await.unwrap_or(0);
                let request = String::from_utf8_lossy(&buf[..n]).to_string();
                let path = request
                    .lines()
                    .next()
                    .and_then(|line| line.split_whitespace().nth(1))
                    .unwrap_or("")
                    .to_string();

                let body = route(&path);
                let response = format!(
                    "HTTP/1.1 200 OK\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
                    body.len(),
                    body
                );
                let _ = socket.write_all(response.as_bytes()).await;
            });
        }
    });

    format!("http://{addr}")
}

/// Fetch and flatten everything the fixture API offers, the way a run does.
async fn snapshot(base_url: &str) -> (Vec<gios_ingest::models::Station>, Vec<Measurement>) {
    let client = GiosClient::with_base_url(base_url);
    let transformer = Transformer::new();

    let raw_stations = client.find_all_stations().await.unwrap();
    let stations = transformer.station_records(&raw_stations).unwrap();

    let mut measurements = Vec::new();
    for station in &stations {
        let sensors = client.station_sensors(station.id).await.unwrap();
        for sensor in &sensors {
            let data = client.sensor_data(sensor.id).await.unwrap();
            measurements.extend(
                transformer
                    .measurement_records(station.id, sensor.id, &sensor.param.param_code, &data)
                    .unwrap(),
            );
        }
    }

    (stations, transformer.dedup_batch(measurements))
}

#[tokio::test]
async fn test_first_run_writes_full_snapshot() {
    let base_url = spawn_fixture_server().await;
    let (stations, measurements) = snapshot(&base_url).await;
    let dedup = DedupFilter::new();

    // Empty destination: everything is new.
    let new_stations = dedup.filter_stations(stations, &HashSet::new());
    let new_measurements = dedup.filter_measurements(measurements, &HashSet::new());

    assert_eq!(new_stations.len(), 2);
    assert_eq!(new_measurements.len(), 3);

    // The null reading stays a row with an absent value, never zero.
    let absent: Vec<&Measurement> = new_measurements
        .iter()
        .filter(|m| m.value.is_none())
        .collect();
    assert_eq!(absent.len(), 1);
    assert!(!new_measurements.iter().any(|m| m.value == Some(0.0)));

    // Station metadata survived normalization.
    assert_eq!(new_stations[0].city.as_deref(), Some("Krakow"));
    assert_eq!(new_stations[0].province.as_deref(), Some("Malopolskie"));
    assert!(new_stations[1].city.is_none());
}

#[tokio::test]
async fn test_rerun_with_unchanged_upstream_writes_nothing() {
    let base_url = spawn_fixture_server().await;
    let dedup = DedupFilter::new();

    // First run against an empty destination.
    let (stations, measurements) = snapshot(&base_url).await;
    let stored_ids: HashSet<u32> = stations.iter().map(|s| s.id).collect();
    let stored_keys: HashSet<MeasurementKey> = measurements.iter().map(|m| m.key()).collect();

    // Second run re-fetches the identical snapshot; the filter removes it all.
    let (stations_again, measurements_again) = snapshot(&base_url).await;
    let new_stations = dedup.filter_stations(stations_again, &stored_ids);
    let new_measurements = dedup.filter_measurements(measurements_again, &stored_keys);

    assert_eq!(new_stations.len(), 0);
    assert_eq!(new_measurements.len(), 0);
}

#[tokio::test]
async fn test_composite_key_unique_within_batch() {
    let base_url = spawn_fixture_server().await;
    let (_, measurements) = snapshot(&base_url).await;

    let keys: HashSet<MeasurementKey> = measurements.iter().map(|m| m.key()).collect();
    assert_eq!(keys.len(), measurements.len());
}

#[tokio::test]
async fn test_server_error_aborts_before_any_write() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        loop {
            let Ok((mut socket, _)) = listener.accept().await else {
                break;
            };
            let mut buf = vec![0u8; 4096];
            let _ = socket.read(&mut buf).await;
            let _ = socket
                .write_all(
                    b"HTTP/1.1 500 Internal Server Error\r\ncontent-length: 0\r\nconnection: close\r\n\r\n",
                )
                .await;
        }
    });

    let client = GiosClient::with_base_url(format!("http://{addr}"));
    let err = client.find_all_stations().await.unwrap_err();

    // The station-list fetch is the first pipeline stage, so this error
    // surfaces before any insert is attempted.
    assert!(
        matches!(err, IngestError::HttpStatus { status, .. } if status.as_u16() == 500),
        "expected HttpStatus, got {err:?}"
    );
}

#[tokio::test]
async fn test_malformed_json_is_a_parse_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        loop {
            let Ok((mut socket, _)) = listener.accept().await else {
                break;
            };
            let mut buf = vec![0u8; 4096];
            let _ = socket.read(&mut buf).await;
            let body = "<html>not json</html>";
            let response = format!(
                "HTTP/1.1 200 OK\r\ncontent-type: text/html\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
                body.len(),
                body
            );
            let _ = socket.write_all(response.as_bytes()).await;
        }
    });

    let client = GiosClient::with_base_url(format!("http://{addr}"));
    let err = client.find_all_stations().await.unwrap_err();
    assert!(matches!(err, IngestError::Parse { .. }));
}
