use crate::dashboard::resolve::IncidentStore;
use crate::db::models::{Camera, IncidentView};
use anyhow::Result;
use async_trait::async_trait;
use sqlx::PgPool;
use std::sync::Arc;

pub mod cameras;
pub mod incidents;

pub use cameras::CamerasRepository;
pub use incidents::IncidentsRepository;

/// SQL-backed incident store, the production implementation of the
/// coordinator's persistence seam
#[derive(Clone)]
pub struct SqlIncidentStore {
    cameras: CamerasRepository,
    incidents: IncidentsRepository,
    incident_limit: i64,
}

impl SqlIncidentStore {
    pub fn new(pool: Arc<PgPool>, incident_limit: i64) -> Self {
        Self {
            cameras: CamerasRepository::new(Arc::clone(&pool)),
            incidents: IncidentsRepository::new(pool),
            incident_limit,
        }
    }
}

#[async_trait]
impl IncidentStore for SqlIncidentStore {
    async fn list_cameras(&self) -> Result<Vec<Camera>> {
        self.cameras.get_all().await
    }

    async fn list_incidents(&self, resolved: Option<bool>) -> Result<Vec<IncidentView>> {
        self.incidents.get_all(resolved, self.incident_limit).await
    }

    async fn resolve_incident(&self, id: i64) -> Result<IncidentView> {
        self.incidents.toggle_resolved(id).await
    }
}
