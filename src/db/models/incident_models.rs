use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Incident read model enriched with camera join fields.
///
/// `camera_name` and `camera_location` are derived by the listing join and are
/// never stored on the incident row.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct IncidentView {
    pub id: i64,
    pub camera_id: i64,
    #[serde(rename = "type")]
    pub kind: String,
    pub ts_start: NaiveDateTime,
    pub ts_end: NaiveDateTime,
    pub thumbnail_url: String,
    pub resolved: bool,
    pub camera_name: String,
    pub camera_location: String,
}

impl IncidentView {
    /// Classify this incident's type string
    pub fn kind(&self) -> IncidentKind {
        IncidentKind::parse(&self.kind)
    }
}

/// Closed set of incident types the dashboard understands.
///
/// The store persists free-form type strings; anything outside the four known
/// detections maps to `Unknown` so an unrecognized string can never fail a
/// lookup downstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IncidentKind {
    #[serde(rename = "Unauthorized Access")]
    UnauthorizedAccess,
    #[serde(rename = "Gun Threat")]
    GunThreat,
    #[serde(rename = "Face Recognised")]
    FaceRecognised,
    #[serde(rename = "Suspicious Activity")]
    SuspiciousActivity,
    Unknown,
}

impl IncidentKind {
    pub fn parse(s: &str) -> Self {
        match s {
            "Unauthorized Access" => IncidentKind::UnauthorizedAccess,
            "Gun Threat" => IncidentKind::GunThreat,
            "Face Recognised" => IncidentKind::FaceRecognised,
            "Suspicious Activity" => IncidentKind::SuspiciousActivity,
            _ => IncidentKind::Unknown,
        }
    }

    /// Whether this type counts toward the critical tally when unresolved.
    /// Fixed allow-list, not configurable.
    pub fn is_critical(self) -> bool {
        matches!(
            self,
            IncidentKind::GunThreat | IncidentKind::UnauthorizedAccess
        )
    }
}

impl fmt::Display for IncidentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            IncidentKind::UnauthorizedAccess => "Unauthorized Access",
            IncidentKind::GunThreat => "Gun Threat",
            IncidentKind::FaceRecognised => "Face Recognised",
            IncidentKind::SuspiciousActivity => "Suspicious Activity",
            IncidentKind::Unknown => "Unknown",
        };
        write!(f, "{}", name)
    }
}
