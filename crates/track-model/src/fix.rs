//! GPS track data model.
//!
//! A fix is one GPS record; a track is one animal's time-ordered fixes.
//! Coordinates are geographic degrees (WGS84 longitude/latitude) exactly
//! as they come out of the tag export; reprojection happens downstream.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single GPS record.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GpsFix {
    /// Acquisition time (UTC).
    pub timestamp: DateTime<Utc>,

    /// Longitude in degrees, east positive, within [-180, 180].
    pub longitude: f64,

    /// Latitude in degrees, north positive, within [-90, 90].
    pub latitude: f64,
}

/// One animal's fixes, sorted ascending by timestamp.
///
/// Duplicate timestamps are legal (Argos/GPS exports have them) and keep
/// their input order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Track {
    /// Animal identifier (e.g., "PG03").
    pub id: String,

    /// Time-ordered fixes.
    pub fixes: Vec<GpsFix>,
}

/// All retained tracks, sorted alphabetically by identifier.
///
/// The alphabetical order is load-bearing: renderers assign colors by
/// index, so the same animal keeps the same color in every output.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrackSet {
    pub tracks: Vec<Track>,
}

/// Dataset statistics for the `info` command and render reports.
#[derive(Debug, Clone, Serialize)]
pub struct TrackSummary {
    pub animals: usize,
    pub total_fixes: usize,
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
    /// (min_lon, min_lat, max_lon, max_lat) in degrees.
    pub geo_bounds: Option<(f64, f64, f64, f64)>,
    pub per_animal: Vec<AnimalSummary>,
}

/// Per-animal statistics.
#[derive(Debug, Clone, Serialize)]
pub struct AnimalSummary {
    pub id: String,
    pub fixes: usize,
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
}

impl Track {
    /// First fix time, if any.
    pub fn start_time(&self) -> Option<DateTime<Utc>> {
        self.fixes.first().map(|f| f.timestamp)
    }

    /// Last fix time, if any.
    pub fn end_time(&self) -> Option<DateTime<Utc>> {
        self.fixes.last().map(|f| f.timestamp)
    }

    pub fn len(&self) -> usize {
        self.fixes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fixes.is_empty()
    }
}

impl TrackSet {
    /// Build a set, sorting fixes by time within each track and tracks
    /// alphabetically by identifier. Sorting is stable.
    pub fn new(mut tracks: Vec<Track>) -> Self {
        for track in &mut tracks {
            track.fixes.sort_by_key(|f| f.timestamp);
        }
        tracks.sort_by(|a, b| a.id.cmp(&b.id));
        Self { tracks }
    }

    /// Identifiers in alphabetical order.
    pub fn ids(&self) -> Vec<&str> {
        self.tracks.iter().map(|t| t.id.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    /// Total fix count across all tracks.
    pub fn total_fixes(&self) -> usize {
        self.tracks.iter().map(|t| t.fixes.len()).sum()
    }

    /// Earliest and latest fix time across the whole set.
    pub fn time_range(&self) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
        let start = self.tracks.iter().filter_map(Track::start_time).min()?;
        let end = self.tracks.iter().filter_map(Track::end_time).max()?;
        Some((start, end))
    }

    /// Geographic bounding box (min_lon, min_lat, max_lon, max_lat).
    pub fn geo_bounds(&self) -> Option<(f64, f64, f64, f64)> {
        let mut fixes = self.tracks.iter().flat_map(|t| t.fixes.iter());
        let first = fixes.next()?;
        let mut bounds = (
            first.longitude,
            first.latitude,
            first.longitude,
            first.latitude,
        );
        for fix in fixes {
            bounds.0 = bounds.0.min(fix.longitude);
            bounds.1 = bounds.1.min(fix.latitude);
            bounds.2 = bounds.2.max(fix.longitude);
            bounds.3 = bounds.3.max(fix.latitude);
        }
        Some(bounds)
    }

    /// Dataset statistics snapshot.
    pub fn summary(&self) -> TrackSummary {
        let (start, end) = match self.time_range() {
            Some((s, e)) => (Some(s), Some(e)),
            None => (None, None),
        };
        TrackSummary {
            animals: self.tracks.len(),
            total_fixes: self.total_fixes(),
            start,
            end,
            geo_bounds: self.geo_bounds(),
            per_animal: self
                .tracks
                .iter()
                .map(|t| AnimalSummary {
                    id: t.id.clone(),
                    fixes: t.fixes.len(),
                    start: t.start_time(),
                    end: t.end_time(),
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn fix(hour: u32, lon: f64, lat: f64) -> GpsFix {
        GpsFix {
            timestamp: Utc.with_ymd_and_hms(2013, 4, 1, hour, 0, 0).unwrap(),
            longitude: lon,
            latitude: lat,
        }
    }

    #[test]
    fn test_new_sorts_fixes_and_tracks() {
        let set = TrackSet::new(vec![
            Track {
                id: "PG09".to_string(),
                fixes: vec![fix(12, 140.2, -66.7), fix(6, 140.1, -66.6)],
            },
            Track {
                id: "PG01".to_string(),
                fixes: vec![fix(3, 139.9, -66.5)],
            },
        ]);

        assert_eq!(set.ids(), vec!["PG01", "PG09"]);
        assert_eq!(set.tracks[1].fixes[0].timestamp, fix(6, 0.0, 0.0).timestamp);
        assert_eq!(
            set.tracks[1].fixes[1].timestamp,
            fix(12, 0.0, 0.0).timestamp
        );
    }

    #[test]
    fn test_duplicate_timestamps_keep_input_order() {
        let first = GpsFix {
            timestamp: Utc.with_ymd_and_hms(2013, 4, 1, 6, 0, 0).unwrap(),
            longitude: 140.0,
            latitude: -66.6,
        };
        let second = GpsFix {
            longitude: 140.5,
            ..first
        };
        let set = TrackSet::new(vec![Track {
            id: "PG02".to_string(),
            fixes: vec![first, second],
        }]);

        assert_eq!(set.tracks[0].fixes[0].longitude, 140.0);
        assert_eq!(set.tracks[0].fixes[1].longitude, 140.5);
    }

    #[test]
    fn test_time_range_spans_all_tracks() {
        let set = TrackSet::new(vec![
            Track {
                id: "PG01".to_string(),
                fixes: vec![fix(6, 140.0, -66.6), fix(18, 140.3, -66.8)],
            },
            Track {
                id: "PG02".to_string(),
                fixes: vec![fix(2, 139.8, -66.5)],
            },
        ]);

        let (start, end) = set.time_range().unwrap();
        assert_eq!(start, fix(2, 0.0, 0.0).timestamp);
        assert_eq!(end, fix(18, 0.0, 0.0).timestamp);
    }

    #[test]
    fn test_geo_bounds_cover_all_fixes() {
        let set = TrackSet::new(vec![Track {
            id: "PG01".to_string(),
            fixes: vec![fix(0, 139.5, -66.9), fix(6, 141.2, -66.1)],
        }]);

        let (min_lon, min_lat, max_lon, max_lat) = set.geo_bounds().unwrap();
        assert_eq!(min_lon, 139.5);
        assert_eq!(min_lat, -66.9);
        assert_eq!(max_lon, 141.2);
        assert_eq!(max_lat, -66.1);
    }

    #[test]
    fn test_empty_set_has_no_range_or_bounds() {
        let set = TrackSet::default();
        assert!(set.is_empty());
        assert_eq!(set.total_fixes(), 0);
        assert!(set.time_range().is_none());
        assert!(set.geo_bounds().is_none());

        let summary = set.summary();
        assert_eq!(summary.animals, 0);
        assert!(summary.start.is_none());
    }

    #[test]
    fn test_summary_serializes_to_json() {
        let set = TrackSet::new(vec![Track {
            id: "PG01".to_string(),
            fixes: vec![fix(6, 140.0, -66.6)],
        }]);

        let json = serde_json::to_string(&set.summary()).unwrap();
        assert!(json.contains("\"animals\":1"));
        assert!(json.contains("\"PG01\""));
        assert!(json.contains("2013-04-01T06:00:00Z"));
    }
}
