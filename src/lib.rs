pub mod api;
pub mod config;
pub mod dashboard;
pub mod db;
pub mod error;

// Re-export main components for easier use
pub use dashboard::{
    partition, project_day, IncidentPartition, IncidentStore, IncidentSummary,
    ResolutionCoordinator, ResolveOutcome, ResolvePhase,
};
pub use error::Error;
