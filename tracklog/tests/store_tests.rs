use std::fs;

use pretty_assertions::assert_eq;
use tempfile::TempDir;
use tracklog::{StoreError, Waypoint, WaypointStore};

fn points() -> WaypointStore {
    WaypointStore::from(vec![
        Waypoint::new("start line", "480702.2800N", "113100.0000E"),
        Waypoint::new("hairpin", "480711.5000S", "1131005.1000W"),
        Waypoint::new("start line", "480702.2800N", "113100.0000E"),
    ])
}

#[test]
fn test_save_then_load_round_trip() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("log.csv");
    points().save(&path).unwrap();
    assert_eq!(WaypointStore::load(&path).unwrap(), points());
}

#[test]
fn test_save_overwrites_previous_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("log.csv");
    points().save(&path).unwrap();

    let mut fewer = points();
    fewer.delete(1).unwrap();
    fewer.save(&path).unwrap();
    assert_eq!(WaypointStore::load(&path).unwrap().len(), 2);
}

#[test]
fn test_save_empty_keeps_header() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("log.csv");
    points().save(&path).unwrap();
    WaypointStore::new().save(&path).unwrap();
    assert_eq!(fs::read_to_string(&path).unwrap(), "name,lat,lon\n");
    assert!(WaypointStore::load(&path).unwrap().is_empty());
}

#[test]
fn test_missing_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("absent.csv");
    let err = WaypointStore::load(&path).unwrap_err();
    assert!(err.is_not_found(), "{err}");
    assert!(WaypointStore::load_or_default(&path).unwrap().is_empty());
}

#[test]
fn test_load_rejects_ragged_rows() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("log.csv");
    fs::write(&path, "name,lat,lon\na,1N,2E\nb,3N\n").unwrap();
    assert!(matches!(
        WaypointStore::load(&path),
        Err(StoreError::Format(_))
    ));
    assert!(matches!(
        WaypointStore::load_or_default(&path),
        Err(StoreError::Format(_))
    ));
}

#[test]
fn test_load_file_written_by_hand() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("log.csv");
    fs::write(&path, "name,lat,lon\r\nfinish,480702.28N,113100.0E\r\n").unwrap();
    assert_eq!(
        WaypointStore::load(&path).unwrap().points(),
        &[Waypoint::new("finish", "480702.28N", "113100.0E")]
    );
}

#[test]
fn test_save_into_missing_directory_fails() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("no-such-dir").join("log.csv");
    assert!(matches!(points().save(&path), Err(StoreError::Io(_))));
}
