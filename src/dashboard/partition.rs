use crate::db::models::IncidentView;
use serde::Serialize;

/// Derived views over the incident list.
///
/// Pure derivation, recomputed whenever the underlying list changes; calling
/// it twice on the same input yields identical output. Input ordering is
/// preserved in both subsets (the store lists incidents newest first, and that
/// contract is the store's, not ours).
#[derive(Debug, Clone)]
pub struct IncidentPartition {
    pub unresolved: Vec<IncidentView>,
    pub resolved: Vec<IncidentView>,
    pub critical_count: usize,
}

/// Headline counts for the dashboard panel
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IncidentSummary {
    pub unresolved_count: usize,
    pub resolved_count: usize,
    pub critical_count: usize,
}

impl IncidentPartition {
    pub fn summary(&self) -> IncidentSummary {
        IncidentSummary {
            unresolved_count: self.unresolved.len(),
            resolved_count: self.resolved.len(),
            critical_count: self.critical_count,
        }
    }
}

/// Split incidents into unresolved/resolved subsets and count the critical
/// ones. Critical means unresolved with a type on the fixed allow-list
/// (GunThreat, UnauthorizedAccess).
pub fn partition(incidents: &[IncidentView]) -> IncidentPartition {
    let mut unresolved = Vec::new();
    let mut resolved = Vec::new();
    let mut critical_count = 0;

    for incident in incidents {
        if incident.resolved {
            resolved.push(incident.clone());
        } else {
            if incident.kind().is_critical() {
                critical_count += 1;
            }
            unresolved.push(incident.clone());
        }
    }

    IncidentPartition {
        unresolved,
        resolved,
        critical_count,
    }
}
