//! CSV track loading, validation, and filtering.

use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::Deserialize;

use icetrack_common::error::{IcetrackError, IcetrackResult};

use crate::fix::{GpsFix, Track, TrackSet};

/// Loader filter options.
///
/// The library defaults filter nothing; the CLI fills these from
/// configuration (`excluded_ids`, `min_fixes`).
#[derive(Debug, Clone)]
pub struct LoadOptions {
    /// Identifiers dropped outright, before any other filtering.
    pub excluded_ids: Vec<String>,

    /// Minimum retained fixes for an animal to be kept.
    pub min_fixes: usize,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            excluded_ids: Vec::new(),
            min_fixes: 1,
        }
    }
}

/// One CSV row as it appears on disk. Header aliases cover the export
/// variants seen in tag data shares.
#[derive(Debug, Deserialize)]
struct RawFix {
    #[serde(alias = "bird", alias = "name", alias = "animal")]
    id: String,

    #[serde(alias = "date", alias = "datetime", alias = "time")]
    timestamp: String,

    #[serde(alias = "lat")]
    latitude: f64,

    #[serde(alias = "lon", alias = "long")]
    longitude: f64,
}

/// Load tracks from a CSV file with a header row.
///
/// Accepted columns: `id` (aliases `bird`, `name`, `animal`), `timestamp`
/// (`date`, `datetime`, `time`), `latitude` (`lat`), `longitude` (`lon`,
/// `long`). Timestamps are RFC 3339 or `YYYY-MM-DD HH:MM:SS`, UTC assumed
/// when unzoned. Any malformed record is a fatal error.
pub fn load_tracks(path: impl AsRef<Path>, options: &LoadOptions) -> IcetrackResult<TrackSet> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(IcetrackError::file_not_found(path));
    }
    let file = std::fs::File::open(path)?;
    let set = read_tracks(file, options)?;
    tracing::info!(
        path = %path.display(),
        animals = set.len(),
        fixes = set.total_fixes(),
        "loaded track data"
    );
    Ok(set)
}

/// Load tracks from any CSV reader (headers required).
pub fn read_tracks(reader: impl Read, options: &LoadOptions) -> IcetrackResult<TrackSet> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut by_id: BTreeMap<String, Vec<GpsFix>> = BTreeMap::new();
    for (index, record) in csv_reader.deserialize::<RawFix>().enumerate() {
        // Data records are 1-based in messages; the header is not counted.
        let record_no = index + 1;
        let raw =
            record.map_err(|e| IcetrackError::data(format!("record {}: {}", record_no, e)))?;
        if options.excluded_ids.iter().any(|excluded| excluded == &raw.id) {
            continue;
        }
        let fix = validate_fix(&raw, record_no)?;
        by_id.entry(raw.id).or_default().push(fix);
    }

    let mut tracks = Vec::new();
    for (id, fixes) in by_id {
        if fixes.len() < options.min_fixes {
            tracing::warn!(
                id = %id,
                fixes = fixes.len(),
                min_fixes = options.min_fixes,
                "dropping under-sampled track"
            );
            continue;
        }
        tracks.push(Track { id, fixes });
    }
    Ok(TrackSet::new(tracks))
}

fn validate_fix(raw: &RawFix, record_no: usize) -> IcetrackResult<GpsFix> {
    let timestamp = parse_timestamp(&raw.timestamp).ok_or_else(|| {
        IcetrackError::data(format!(
            "record {}: unparseable timestamp {:?} (want RFC 3339 or YYYY-MM-DD HH:MM:SS)",
            record_no, raw.timestamp
        ))
    })?;
    if !(-90.0..=90.0).contains(&raw.latitude) {
        return Err(IcetrackError::data(format!(
            "record {}: latitude {} outside [-90, 90]",
            record_no, raw.latitude
        )));
    }
    if !(-180.0..=180.0).contains(&raw.longitude) {
        return Err(IcetrackError::data(format!(
            "record {}: longitude {} outside [-180, 180]",
            record_no, raw.longitude
        )));
    }
    Ok(GpsFix {
        timestamp,
        longitude: raw.longitude,
        latitude: raw.latitude,
    })
}

fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(zoned) = DateTime::parse_from_rfc3339(raw) {
        return Some(zoned.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S")
        .ok()
        .map(|naive| naive.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    const SAMPLE: &str = "\
id,timestamp,latitude,longitude
PG01,2013-04-01 06:00:00,-66.66,140.00
PG01,2013-04-01 00:00:00,-66.65,140.01
PG02,2013-04-01T12:00:00Z,-66.70,139.95
PG02,2013-04-01T18:00:00+00:00,-66.72,139.90
";

    #[test]
    fn test_read_groups_by_id_and_sorts_by_time() {
        let set = read_tracks(SAMPLE.as_bytes(), &LoadOptions::default()).unwrap();
        assert_eq!(set.ids(), vec!["PG01", "PG02"]);

        let pg01 = &set.tracks[0];
        assert_eq!(pg01.fixes.len(), 2);
        assert!(pg01.fixes[0].timestamp < pg01.fixes[1].timestamp);
        assert_eq!(pg01.fixes[0].longitude, 140.01);
    }

    #[test]
    fn test_both_timestamp_formats_agree_on_utc() {
        let set = read_tracks(SAMPLE.as_bytes(), &LoadOptions::default()).unwrap();
        let pg02 = &set.tracks[1];
        assert_eq!(
            pg02.fixes[0].timestamp.to_rfc3339(),
            "2013-04-01T12:00:00+00:00"
        );
    }

    #[test]
    fn test_excluded_ids_are_dropped() {
        let options = LoadOptions {
            excluded_ids: vec!["PG01".to_string()],
            min_fixes: 1,
        };
        let set = read_tracks(SAMPLE.as_bytes(), &options).unwrap();
        assert_eq!(set.ids(), vec!["PG02"]);
    }

    #[test]
    fn test_min_fixes_drops_sparse_tracks() {
        let options = LoadOptions {
            excluded_ids: Vec::new(),
            min_fixes: 3,
        };
        let set = read_tracks(SAMPLE.as_bytes(), &options).unwrap();
        assert!(set.is_empty());
    }

    #[test]
    fn test_alias_headers_accepted() {
        let csv = "bird,date,lat,lon\nPG09,2013-05-02 10:30:00,-66.5,140.2\n";
        let set = read_tracks(csv.as_bytes(), &LoadOptions::default()).unwrap();
        assert_eq!(set.ids(), vec!["PG09"]);
        assert_eq!(set.tracks[0].fixes[0].latitude, -66.5);
    }

    #[test]
    fn test_bad_timestamp_is_fatal_and_names_record() {
        let csv = "id,timestamp,latitude,longitude\nPG01,yesterday,-66.6,140.0\n";
        let err = read_tracks(csv.as_bytes(), &LoadOptions::default()).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("record 1"));
        assert!(message.contains("timestamp"));
    }

    #[test]
    fn test_out_of_range_coordinates_are_fatal() {
        let csv = "id,timestamp,latitude,longitude\nPG01,2013-04-01 06:00:00,-96.6,140.0\n";
        let err = read_tracks(csv.as_bytes(), &LoadOptions::default()).unwrap_err();
        assert!(err.to_string().contains("latitude"));

        let csv = "id,timestamp,latitude,longitude\nPG01,2013-04-01 06:00:00,-66.6,190.0\n";
        let err = read_tracks(csv.as_bytes(), &LoadOptions::default()).unwrap_err();
        assert!(err.to_string().contains("longitude"));
    }

    #[test]
    fn test_missing_column_is_fatal() {
        let csv = "id,timestamp,latitude\nPG01,2013-04-01 06:00:00,-66.6\n";
        assert!(read_tracks(csv.as_bytes(), &LoadOptions::default()).is_err());
    }

    #[test]
    fn test_header_only_input_yields_empty_set() {
        let csv = "id,timestamp,latitude,longitude\n";
        let set = read_tracks(csv.as_bytes(), &LoadOptions::default()).unwrap();
        assert!(set.is_empty());
    }

    #[test]
    fn test_missing_file_reports_path() {
        let err = load_tracks("/no/such/tracks.csv", &LoadOptions::default()).unwrap_err();
        assert!(err.to_string().contains("/no/such/tracks.csv"));
    }

    #[test]
    fn test_fixture_loads_with_colony_exclusions() {
        let path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .join("..")
            .join("..")
            .join("fixtures")
            .join("tracks.csv");

        let options = LoadOptions {
            excluded_ids: vec!["PG07".to_string(), "PG12".to_string()],
            min_fixes: 10,
        };
        let set = load_tracks(path, &options).unwrap();

        // PG07/PG12 are excluded by id; PG04 has too few fixes.
        assert_eq!(set.ids(), vec!["PG01", "PG02", "PG03"]);
        for track in &set.tracks {
            assert!(track.len() >= 10);
            for pair in track.fixes.windows(2) {
                assert!(pair[0].timestamp <= pair[1].timestamp);
            }
        }
    }
}
