use crate::db::models::IncidentView;
use crate::error::Error;
use anyhow::Result;
use sqlx::PgPool;
use std::sync::Arc;
use tracing::info;

/// Incidents repository for handling incident operations
#[derive(Clone)]
pub struct IncidentsRepository {
    pool: Arc<PgPool>,
}

impl IncidentsRepository {
    /// Create a new incidents repository
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }

    /// Get incidents enriched with camera fields, newest first.
    ///
    /// `resolved` filters on the flag when given; `None` returns everything.
    pub async fn get_all(&self, resolved: Option<bool>, limit: i64) -> Result<Vec<IncidentView>> {
        let result = match resolved {
            Some(resolved) => {
                sqlx::query_as::<_, IncidentView>(
                    r#"
                    SELECT i.id, i.camera_id, i.kind, i.ts_start, i.ts_end,
                           i.thumbnail_url, i.resolved,
                           c.name AS camera_name, c.location AS camera_location
                    FROM incidents i
                    JOIN cameras c ON i.camera_id = c.id
                    WHERE i.resolved = $1
                    ORDER BY i.ts_start DESC
                    LIMIT $2
                    "#,
                )
                .bind(resolved)
                .bind(limit)
                .fetch_all(&*self.pool)
                .await
            }
            None => {
                sqlx::query_as::<_, IncidentView>(
                    r#"
                    SELECT i.id, i.camera_id, i.kind, i.ts_start, i.ts_end,
                           i.thumbnail_url, i.resolved,
                           c.name AS camera_name, c.location AS camera_location
                    FROM incidents i
                    JOIN cameras c ON i.camera_id = c.id
                    ORDER BY i.ts_start DESC
                    LIMIT $1
                    "#,
                )
                .bind(limit)
                .fetch_all(&*self.pool)
                .await
            }
        }
        .map_err(|e| Error::Database(format!("Failed to get incidents: {}", e)))?;

        Ok(result)
    }

    /// Get one enriched incident by ID
    pub async fn get_by_id(&self, id: i64) -> Result<Option<IncidentView>> {
        let result = sqlx::query_as::<_, IncidentView>(
            r#"
            SELECT i.id, i.camera_id, i.kind, i.ts_start, i.ts_end,
                   i.thumbnail_url, i.resolved,
                   c.name AS camera_name, c.location AS camera_location
            FROM incidents i
            JOIN cameras c ON i.camera_id = c.id
            WHERE i.id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| Error::Database(format!("Failed to get incident by ID: {}", e)))?;

        Ok(result)
    }

    /// Flip the resolved flag on one incident and return the enriched record.
    ///
    /// The negation happens in a single UPDATE against the row's current
    /// value, so concurrent writers serialize per row and the client never
    /// chooses the target value. Fails with NotFound for an absent id.
    pub async fn toggle_resolved(&self, id: i64) -> Result<IncidentView> {
        let result = sqlx::query_as::<_, IncidentView>(
            r#"
            UPDATE incidents i
            SET resolved = NOT i.resolved
            FROM cameras c
            WHERE i.id = $1 AND c.id = i.camera_id
            RETURNING i.id, i.camera_id, i.kind, i.ts_start, i.ts_end,
                      i.thumbnail_url, i.resolved,
                      c.name AS camera_name, c.location AS camera_location
            "#,
        )
        .bind(id)
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| Error::Database(format!("Failed to toggle incident: {}", e)))?
        .ok_or_else(|| Error::NotFound(format!("Incident not found: {}", id)))?;

        info!(
            "Incident {} toggled to resolved={} on camera {}",
            result.id, result.resolved, result.camera_name
        );

        Ok(result)
    }
}
