//! Projected track geometry: the reprojected mirror of the track model.

use chrono::{DateTime, Utc};

use icetrack_common::error::{IcetrackError, IcetrackResult};
use icetrack_track_model::TrackSet;

use crate::bounds::Region;
use crate::crs::Crs;

/// A fix reprojected into map coordinates (meters).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProjectedFix {
    pub timestamp: DateTime<Utc>,
    pub x: f64,
    pub y: f64,
}

/// One animal's reprojected path, time-ordered like its source track.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectedTrack {
    pub id: String,
    pub points: Vec<ProjectedFix>,
}

/// All reprojected tracks, in the source set's alphabetical order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProjectedTrackSet {
    pub tracks: Vec<ProjectedTrack>,
}

impl ProjectedTrack {
    /// Position at `when`: linear interpolation between the two
    /// surrounding fixes, clamped to the track ends. `None` only for an
    /// empty track.
    pub fn position_at(&self, when: DateTime<Utc>) -> Option<(f64, f64)> {
        let first = self.points.first()?;
        if when <= first.timestamp {
            return Some((first.x, first.y));
        }
        let last = self.points.last()?;
        if when >= last.timestamp {
            return Some((last.x, last.y));
        }

        // First index whose timestamp exceeds `when`; the two guards
        // above pin it to 1..len.
        let next = self.points.partition_point(|p| p.timestamp <= when);
        let before = &self.points[next - 1];
        let after = &self.points[next];

        let span_ms = (after.timestamp - before.timestamp).num_milliseconds();
        if span_ms == 0 {
            return Some((after.x, after.y));
        }
        let progress = (when - before.timestamp).num_milliseconds() as f64 / span_ms as f64;
        Some((
            before.x + (after.x - before.x) * progress,
            before.y + (after.y - before.y) * progress,
        ))
    }

    /// Points with `timestamp <= when`.
    pub fn points_until(&self, when: DateTime<Utc>) -> &[ProjectedFix] {
        let end = self.points.partition_point(|p| p.timestamp <= when);
        &self.points[..end]
    }
}

impl ProjectedTrackSet {
    /// Identifiers in set order (alphabetical by construction).
    pub fn ids(&self) -> Vec<&str> {
        self.tracks.iter().map(|t| t.id.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    pub fn total_points(&self) -> usize {
        self.tracks.iter().map(|t| t.points.len()).sum()
    }

    /// Earliest and latest fix time across the whole set.
    pub fn time_range(&self) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
        let start = self
            .tracks
            .iter()
            .filter_map(|t| t.points.first())
            .map(|p| p.timestamp)
            .min()?;
        let end = self
            .tracks
            .iter()
            .filter_map(|t| t.points.last())
            .map(|p| p.timestamp)
            .max()?;
        Some((start, end))
    }

    /// Projected bounding box of every point in the set.
    pub fn bounds(&self) -> Option<Region> {
        let mut points = self.tracks.iter().flat_map(|t| t.points.iter());
        let first = points.next()?;
        let mut region = Region::new(first.x, first.y, first.x, first.y);
        for p in points {
            region.x_min = region.x_min.min(p.x);
            region.y_min = region.y_min.min(p.y);
            region.x_max = region.x_max.max(p.x);
            region.y_max = region.y_max.max(p.y);
        }
        Some(region)
    }
}

/// Reproject every fix of a set into the target projected CRS.
///
/// The target must be projected; non-finite projection output is fatal
/// and names the offending fix.
pub fn reproject_tracks(set: &TrackSet, target: &Crs) -> IcetrackResult<ProjectedTrackSet> {
    let projection = target.projection()?;

    let mut tracks = Vec::with_capacity(set.tracks.len());
    for track in &set.tracks {
        let mut points = Vec::with_capacity(track.fixes.len());
        for fix in &track.fixes {
            let (x, y) = projection.project(fix.longitude, fix.latitude);
            if !x.is_finite() || !y.is_finite() {
                return Err(IcetrackError::geo(format!(
                    "track {}: fix at {} ({}, {}) projects to non-finite coordinates",
                    track.id, fix.timestamp, fix.longitude, fix.latitude
                )));
            }
            points.push(ProjectedFix {
                timestamp: fix.timestamp,
                x,
                y,
            });
        }
        tracks.push(ProjectedTrack {
            id: track.id.clone(),
            points,
        });
    }

    tracing::debug!(
        animals = tracks.len(),
        crs = %target,
        "reprojected tracks"
    );
    Ok(ProjectedTrackSet { tracks })
}
