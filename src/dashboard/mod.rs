pub mod partition;
pub mod resolve;
pub mod timeline;
#[cfg(test)]
mod tests;

pub use partition::{partition, IncidentPartition, IncidentSummary};
pub use resolve::{IncidentStore, ResolutionCoordinator, ResolveOutcome, ResolvePhase};
pub use timeline::{project_day, CameraLane, SegmentColor, TimelineSegment};
