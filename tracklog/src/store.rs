use std::{fs::File, io, path::Path};

use serde::{Deserialize, Serialize};

use crate::error::StoreError;

/// Column names of the row file, in write order
pub const HEADER: [&str; 3] = ["name", "lat", "lon"];

/// An operator-named point. `lat` and `lon` hold the converted value with the
/// hemisphere letter appended, exactly as written to the row file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Waypoint {
    pub name: String,
    pub lat: String,
    pub lon: String,
}

impl Waypoint {
    pub fn new(name: impl Into<String>, lat: impl Into<String>, lon: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            lat: lat.into(),
            lon: lon.into(),
        }
    }
}

/// Waypoints in capture order. Names need not be unique.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct WaypointStore {
    points: Vec<Waypoint>,
}

impl WaypointStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads the row file at `path`.
    ///
    /// Columns are matched by header name, so a file written with a different
    /// column order loads the same. A missing file is an [`StoreError::Io`] with
    /// kind `NotFound`, see [`WaypointStore::load_or_default`].
    pub fn load(path: &Path) -> Result<Self, StoreError> {
        let file = File::open(path)?;
        Self::from_reader(file)
    }

    /// Like [`WaypointStore::load`], but a missing file yields an empty store.
    pub fn load_or_default(path: &Path) -> Result<Self, StoreError> {
        match Self::load(path) {
            Err(e) if e.is_not_found() => Ok(Self::default()),
            other => other,
        }
    }

    pub fn from_reader<R: io::Read>(reader: R) -> Result<Self, StoreError> {
        let mut rdr = csv::ReaderBuilder::new().has_headers(true).from_reader(reader);
        let points = rdr
            .deserialize::<Waypoint>()
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { points })
    }

    /// Writes every point to `path`, replacing its previous content.
    ///
    /// An empty store still writes the header row, so the file reloads as an
    /// empty set rather than disappearing.
    pub fn save(&self, path: &Path) -> Result<(), StoreError> {
        let file = File::create(path)?;
        self.to_writer(file)
    }

    pub fn to_writer<W: io::Write>(&self, writer: W) -> Result<(), StoreError> {
        let mut wtr = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(writer);
        wtr.write_record(HEADER)?;
        for point in &self.points {
            wtr.serialize(point)?;
        }
        wtr.flush()?;
        Ok(())
    }

    pub fn push(&mut self, point: Waypoint) {
        self.points.push(point);
    }

    /// Removes the point with the 1-based number `index` and returns it.
    ///
    /// `0` means "cancel" and returns `Ok(None)` without touching the list.
    pub fn delete(&mut self, index: usize) -> Result<Option<Waypoint>, StoreError> {
        if index == 0 {
            return Ok(None);
        }
        if index > self.points.len() {
            return Err(StoreError::IndexOutOfRange {
                index,
                len: self.points.len(),
            });
        }
        Ok(Some(self.points.remove(index - 1)))
    }

    pub fn points(&self) -> &[Waypoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn clear(&mut self) {
        self.points.clear();
    }
}

impl From<Vec<Waypoint>> for WaypointStore {
    fn from(points: Vec<Waypoint>) -> Self {
        Self { points }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> WaypointStore {
        WaypointStore::from(vec![
            Waypoint::new("start", "480702.2800N", "011310.0000E"),
            Waypoint::new("gate", "480703.0000N", "011311.0000E"),
            Waypoint::new("start", "480704.0000N", "011312.0000E"),
        ])
    }

    #[test]
    fn delete_zero_cancels() {
        let mut store = sample();
        assert!(store.delete(0).unwrap().is_none());
        assert!(store.delete(0).unwrap().is_none());
        assert_eq!(store, sample());
    }

    #[test]
    fn delete_is_one_based() {
        let mut store = sample();
        let removed = store.delete(2).unwrap().unwrap();
        assert_eq!(removed.name, "gate");
        assert_eq!(store.len(), 2);
        assert_eq!(store.points()[1].lat, "480704.0000N");
    }

    #[test]
    fn delete_out_of_range_leaves_points() {
        let mut store = sample();
        assert!(matches!(
            store.delete(4),
            Err(StoreError::IndexOutOfRange { index: 4, len: 3 })
        ));
        assert_eq!(store, sample());
    }

    #[test]
    fn writes_header_then_rows() {
        let mut out = Vec::new();
        sample().to_writer(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some("name,lat,lon"));
        assert_eq!(lines.next(), Some("start,480702.2800N,011310.0000E"));
        assert_eq!(text.lines().count(), 4);
    }

    #[test]
    fn empty_store_writes_header_only() {
        let mut out = Vec::new();
        WaypointStore::new().to_writer(&mut out).unwrap();
        assert_eq!(out, b"name,lat,lon\n");
        let reloaded = WaypointStore::from_reader(&out[..]).unwrap();
        assert!(reloaded.is_empty());
    }

    #[test]
    fn reads_columns_by_name() {
        let data = "lon,name,lat\n011310.0000E,start,480702.2800N\n";
        let store = WaypointStore::from_reader(data.as_bytes()).unwrap();
        assert_eq!(
            store.points(),
            &[Waypoint::new("start", "480702.2800N", "011310.0000E")]
        );
    }

    #[test]
    fn ragged_row_is_format_error() {
        let data = "name,lat,lon\nstart,480702.2800N\n";
        assert!(matches!(
            WaypointStore::from_reader(data.as_bytes()),
            Err(StoreError::Format(_))
        ));
    }

    #[test]
    fn names_with_commas_survive() {
        let store = WaypointStore::from(vec![Waypoint::new("a, b", "1N", "2E")]);
        let mut out = Vec::new();
        store.to_writer(&mut out).unwrap();
        assert_eq!(WaypointStore::from_reader(&out[..]).unwrap(), store);
    }
}
