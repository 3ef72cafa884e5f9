pub mod camera_models;
pub mod incident_models;

pub use camera_models::Camera;
pub use incident_models::{IncidentKind, IncidentView};
