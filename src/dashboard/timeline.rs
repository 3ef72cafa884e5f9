use crate::db::models::{Camera, IncidentKind, IncidentView};
use chrono::{NaiveDate, NaiveDateTime, Timelike};
use serde::Serialize;

/// Narrowest segment the timeline will emit, in percent of the 24h axis.
/// Keeps zero-duration incidents visible and clickable.
pub const MIN_SEGMENT_WIDTH: f64 = 0.5;

/// Horizontal offset of an instant along a 24-hour axis, as a percentage.
/// Seconds are ignored, matching the minute resolution of the rendered track.
pub fn position(ts: NaiveDateTime) -> f64 {
    let minute_of_day = ts.hour() * 60 + ts.minute();
    minute_of_day as f64 / (24.0 * 60.0) * 100.0
}

/// Segment width in percent for an incident's time interval.
///
/// Duration is taken from the two instants directly rather than from their
/// positions, so rounding in `position` cannot compound. A malformed record
/// with `ts_end < ts_start` clamps to zero duration before the minimum-width
/// floor applies.
pub fn width(ts_start: NaiveDateTime, ts_end: NaiveDateTime) -> f64 {
    let duration_minutes = ((ts_end - ts_start).num_seconds() as f64 / 60.0).max(0.0);
    (duration_minutes / (24.0 * 60.0) * 100.0).max(MIN_SEGMENT_WIDTH)
}

/// Position of the current-time marker. Same axis as the segments, computed
/// fresh from `now` on every call and independent of any incident.
pub fn now_marker(now: NaiveDateTime) -> f64 {
    position(now)
}

/// Visual bucket for a segment. One bucket per known incident type plus a
/// default for anything the store sends that we do not recognize.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SegmentColor {
    Red,
    Orange,
    Blue,
    Green,
    Gray,
}

impl SegmentColor {
    pub fn for_kind(kind: IncidentKind) -> Self {
        match kind {
            IncidentKind::GunThreat => SegmentColor::Red,
            IncidentKind::UnauthorizedAccess => SegmentColor::Orange,
            IncidentKind::FaceRecognised => SegmentColor::Blue,
            IncidentKind::SuspiciousActivity => SegmentColor::Green,
            IncidentKind::Unknown => SegmentColor::Gray,
        }
    }
}

/// One positioned incident within a camera's 24-hour row
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineSegment {
    pub incident_id: i64,
    pub kind: IncidentKind,
    pub color: SegmentColor,
    pub resolved: bool,
    /// Percent offset from the start of the axis
    pub left: f64,
    /// Percent width, floored at `MIN_SEGMENT_WIDTH`
    pub width: f64,
}

impl TimelineSegment {
    fn from_incident(incident: &IncidentView) -> Self {
        let kind = incident.kind();
        Self {
            incident_id: incident.id,
            kind,
            color: SegmentColor::for_kind(kind),
            resolved: incident.resolved,
            left: position(incident.ts_start),
            width: width(incident.ts_start, incident.ts_end),
        }
    }
}

/// All positioned segments for one camera on the selected day
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CameraLane {
    pub camera_id: i64,
    pub camera_name: String,
    pub camera_location: String,
    pub segments: Vec<TimelineSegment>,
}

/// Whether an incident belongs to the given calendar day.
///
/// Attribution is by the start instant only; an incident that runs past
/// midnight stays on its start day and is never split.
pub fn on_day(incident: &IncidentView, day: NaiveDate) -> bool {
    incident.ts_start.date() == day
}

/// Lazily yield the positioned segments for one camera on one day.
///
/// Recomputed from the inputs on every call; calling again restarts the
/// sequence.
pub fn camera_segments<'a>(
    day: NaiveDate,
    camera_id: i64,
    incidents: &'a [IncidentView],
) -> impl Iterator<Item = TimelineSegment> + 'a {
    incidents
        .iter()
        .filter(move |incident| incident.camera_id == camera_id && on_day(incident, day))
        .map(TimelineSegment::from_incident)
}

/// Project a day's incidents onto one lane per camera, in camera order
pub fn project_day(day: NaiveDate, cameras: &[Camera], incidents: &[IncidentView]) -> Vec<CameraLane> {
    cameras
        .iter()
        .map(|camera| CameraLane {
            camera_id: camera.id,
            camera_name: camera.name.clone(),
            camera_location: camera.location.clone(),
            segments: camera_segments(day, camera.id, incidents).collect(),
        })
        .collect()
}
