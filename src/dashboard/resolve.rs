use crate::db::models::{Camera, IncidentView};
use anyhow::Result;
use async_trait::async_trait;
use log::{info, warn};
use std::collections::HashMap;

/// Persistence seam the coordinator drives. The SQL-backed implementation
/// lives in the db layer; tests substitute an in-memory store.
#[async_trait]
pub trait IncidentStore: Send + Sync {
    /// Cameras ordered by id ascending
    async fn list_cameras(&self) -> Result<Vec<Camera>>;

    /// Enriched incidents ordered by ts_start descending, optionally filtered
    /// on the resolved flag
    async fn list_incidents(&self, resolved: Option<bool>) -> Result<Vec<IncidentView>>;

    /// Toggle one incident's resolved flag and return the post-toggle
    /// enriched record. Fails with NotFound for an absent id.
    async fn resolve_incident(&self, id: i64) -> Result<IncidentView>;
}

/// Per-id phase in the resolve state machine. Idle is implicit: ids appear in
/// the coordinator's table only while a resolve is in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolvePhase {
    Idle,
    Resolving,
}

/// Result of a resolve action, reported upward for display. Failures are
/// recoverable conditions, never session-fatal.
#[derive(Debug, Clone)]
pub enum ResolveOutcome {
    /// The store confirmed the toggle; local state now holds the returned
    /// record
    Applied(IncidentView),
    /// A resolve for this id was already in flight; no second request was
    /// issued
    Duplicate,
    /// The store rejected or never answered; local state is unchanged
    Failed(String),
}

/// View-state container for the operator's dashboard session.
///
/// Holds the local incident collection, the single nullable selection, and an
/// explicit per-id state table that admits at most one in-flight resolve per
/// incident. The table is the only exclusion primitive: different ids may
/// resolve concurrently with no ordering between them, and a second action on
/// an id already in flight is rejected before any request is issued. Once
/// dispatched a resolve cannot be cancelled; a hung request keeps its marker
/// until the store answers.
pub struct ResolutionCoordinator {
    incidents: Vec<IncidentView>,
    selected: Option<i64>,
    in_flight: HashMap<i64, ResolvePhase>,
}

impl ResolutionCoordinator {
    /// Create a session over an initial incident list. The first unresolved
    /// incident is auto-selected.
    pub fn new(incidents: Vec<IncidentView>) -> Self {
        let selected = incidents.iter().find(|i| !i.resolved).map(|i| i.id);
        Self {
            incidents,
            selected,
            in_flight: HashMap::new(),
        }
    }

    /// Replace the local collection from a fresh store listing and re-apply
    /// the auto-selection rule
    pub fn load(&mut self, incidents: Vec<IncidentView>) {
        self.selected = incidents.iter().find(|i| !i.resolved).map(|i| i.id);
        self.incidents = incidents;
    }

    pub fn incidents(&self) -> &[IncidentView] {
        &self.incidents
    }

    pub fn selected(&self) -> Option<i64> {
        self.selected
    }

    /// Operator selection. Ignored for ids not present in the local list so
    /// the selection invariant (at most one, always known) holds.
    pub fn select(&mut self, id: i64) -> bool {
        if self.incidents.iter().any(|i| i.id == id) {
            self.selected = Some(id);
            true
        } else {
            false
        }
    }

    pub fn phase(&self, id: i64) -> ResolvePhase {
        self.in_flight
            .get(&id)
            .copied()
            .unwrap_or(ResolvePhase::Idle)
    }

    /// Ids currently undergoing a resolve, for the display layer to disable
    pub fn in_flight_ids(&self) -> Vec<i64> {
        self.in_flight.keys().copied().collect()
    }

    /// Idle -> Resolving. Returns false when the id is already in flight, in
    /// which case the caller must not issue a request: the store toggle
    /// negates the row's current value, so a racing second toggle would leave
    /// the final state nondeterministic.
    pub fn begin_resolve(&mut self, id: i64) -> bool {
        if self.in_flight.contains_key(&id) {
            return false;
        }
        self.in_flight.insert(id, ResolvePhase::Resolving);
        true
    }

    /// Resolving -> Resolved | Failed. Clears the in-flight marker either way.
    ///
    /// On success the authoritative record replaces the matching local entry,
    /// and if that incident was selected the selection moves to the first
    /// other unresolved incident in pre-mutation list order, or to none. On
    /// failure the local collection is left exactly as it was.
    pub fn complete_resolve(&mut self, id: i64, result: Result<IncidentView>) -> ResolveOutcome {
        self.in_flight.remove(&id);

        match result {
            Ok(updated) => {
                // Reselect against the list as it stood before the swap
                if self.selected == Some(id) {
                    self.selected = self
                        .incidents
                        .iter()
                        .find(|i| i.id != id && !i.resolved)
                        .map(|i| i.id);
                }

                if let Some(entry) = self.incidents.iter_mut().find(|i| i.id == id) {
                    *entry = updated.clone();
                }

                info!(
                    "Incident {} now resolved={}, selection {:?}",
                    updated.id, updated.resolved, self.selected
                );
                ResolveOutcome::Applied(updated)
            }
            Err(e) => {
                warn!("Resolve of incident {} failed: {}", id, e);
                ResolveOutcome::Failed(e.to_string())
            }
        }
    }

    /// Full resolve workflow against a store: dedup guard, request, then
    /// reconciliation
    pub async fn resolve(&mut self, id: i64, store: &dyn IncidentStore) -> ResolveOutcome {
        if !self.begin_resolve(id) {
            return ResolveOutcome::Duplicate;
        }

        let result = store.resolve_incident(id).await;
        self.complete_resolve(id, result)
    }
}
