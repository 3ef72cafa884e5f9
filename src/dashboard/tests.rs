#[cfg(test)]
mod tests {
    use crate::dashboard::partition::partition;
    use crate::dashboard::resolve::{
        IncidentStore, ResolutionCoordinator, ResolveOutcome, ResolvePhase,
    };
    use crate::dashboard::timeline::{
        self, camera_segments, position, project_day, width, SegmentColor, MIN_SEGMENT_WIDTH,
    };
    use crate::db::models::{Camera, IncidentKind, IncidentView};
    use crate::error::Error;
    use anyhow::Result;
    use async_trait::async_trait;
    use chrono::{NaiveDate, NaiveDateTime};
    use std::collections::HashSet;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    fn ts(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap()
    }

    fn day(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn incident(
        id: i64,
        camera_id: i64,
        kind: &str,
        start: &str,
        end: &str,
        resolved: bool,
    ) -> IncidentView {
        IncidentView {
            id,
            camera_id,
            kind: kind.to_string(),
            ts_start: ts(start),
            ts_end: ts(end),
            thumbnail_url: format!("https://thumbs.example/{}.jpg", id),
            resolved,
            camera_name: format!("Camera {:02}", camera_id),
            camera_location: "somewhere".to_string(),
        }
    }

    // In-memory store standing in for the SQL repositories
    struct MemoryStore {
        incidents: Mutex<Vec<IncidentView>>,
        resolve_calls: AtomicUsize,
        fail_with: Option<Error>,
    }

    impl MemoryStore {
        fn new(incidents: Vec<IncidentView>) -> Self {
            Self {
                incidents: Mutex::new(incidents),
                resolve_calls: AtomicUsize::new(0),
                fail_with: None,
            }
        }

        fn failing(incidents: Vec<IncidentView>, err: Error) -> Self {
            Self {
                incidents: Mutex::new(incidents),
                resolve_calls: AtomicUsize::new(0),
                fail_with: Some(err),
            }
        }
    }

    #[async_trait]
    impl IncidentStore for MemoryStore {
        async fn list_cameras(&self) -> Result<Vec<Camera>> {
            Ok(vec![])
        }

        async fn list_incidents(&self, resolved: Option<bool>) -> Result<Vec<IncidentView>> {
            let incidents = self.incidents.lock().unwrap();
            Ok(incidents
                .iter()
                .filter(|i| resolved.map_or(true, |r| i.resolved == r))
                .cloned()
                .collect())
        }

        async fn resolve_incident(&self, id: i64) -> Result<IncidentView> {
            self.resolve_calls.fetch_add(1, Ordering::SeqCst);

            if let Some(err) = &self.fail_with {
                return Err(err.clone().into());
            }

            let mut incidents = self.incidents.lock().unwrap();
            let entry = incidents
                .iter_mut()
                .find(|i| i.id == id)
                .ok_or_else(|| Error::NotFound(format!("Incident not found: {}", id)))?;
            entry.resolved = !entry.resolved;
            Ok(entry.clone())
        }
    }

    // --- Timeline projector ---

    #[test]
    fn position_spans_the_24h_axis() {
        assert_eq!(position(ts("2024-01-15 00:00:00")), 0.0);

        let end_of_day = position(ts("2024-01-15 23:59:00"));
        assert!((end_of_day - 99.930).abs() < 0.01);

        // Monotonic non-decreasing across the day
        let mut last = -1.0;
        for hour in 0..24 {
            for minute in [0, 15, 30, 45] {
                let p = position(ts(&format!("2024-01-15 {:02}:{:02}:00", hour, minute)));
                assert!(p >= last);
                last = p;
            }
        }
    }

    #[test]
    fn width_comes_from_the_instants_not_the_positions() {
        // Two hours is exactly 1/12 of the axis
        let w = width(ts("2024-01-15 06:00:00"), ts("2024-01-15 08:00:00"));
        assert!((w - 100.0 / 12.0).abs() < 1e-9);
    }

    #[test]
    fn width_floors_at_minimum_for_short_incidents() {
        let w = width(ts("2024-01-15 06:00:00"), ts("2024-01-15 06:00:00"));
        assert_eq!(w, MIN_SEGMENT_WIDTH);

        let w = width(ts("2024-01-15 06:00:00"), ts("2024-01-15 06:01:00"));
        assert!(w >= MIN_SEGMENT_WIDTH);
    }

    #[test]
    fn malformed_interval_clamps_to_exactly_the_floor() {
        // ts_end before ts_start: duration clamps to zero, then the floor
        let w = width(ts("2024-01-15 08:00:00"), ts("2024-01-15 06:00:00"));
        assert_eq!(w, MIN_SEGMENT_WIDTH);
    }

    #[test]
    fn midnight_crossing_incident_belongs_to_its_start_day_only() {
        let incidents = vec![incident(
            1,
            1,
            "Suspicious Activity",
            "2024-01-15 23:50:00",
            "2024-01-16 00:05:00",
            false,
        )];

        let on_15: Vec<_> = camera_segments(day("2024-01-15"), 1, &incidents).collect();
        let on_16: Vec<_> = camera_segments(day("2024-01-16"), 1, &incidents).collect();
        assert_eq!(on_15.len(), 1);
        assert!(on_16.is_empty());
    }

    #[test]
    fn project_day_builds_one_lane_per_camera_in_order() {
        let cameras = vec![
            Camera {
                id: 1,
                name: "Shop Floor".into(),
                location: "Main retail area".into(),
            },
            Camera {
                id: 2,
                name: "Vault".into(),
                location: "Secure storage room".into(),
            },
        ];
        let incidents = vec![
            incident(
                10,
                2,
                "Gun Threat",
                "2024-01-15 14:45:00",
                "2024-01-15 14:47:00",
                false,
            ),
            incident(
                11,
                1,
                "Face Recognised",
                "2024-01-15 08:30:00",
                "2024-01-15 08:32:00",
                false,
            ),
            incident(
                12,
                1,
                "Gun Threat",
                "2024-01-16 01:20:00",
                "2024-01-16 01:23:00",
                false,
            ),
        ];

        let lanes = project_day(day("2024-01-15"), &cameras, &incidents);
        assert_eq!(lanes.len(), 2);
        assert_eq!(lanes[0].camera_id, 1);
        assert_eq!(lanes[0].segments.len(), 1);
        assert_eq!(lanes[0].segments[0].incident_id, 11);
        assert_eq!(lanes[1].camera_id, 2);
        assert_eq!(lanes[1].segments[0].color, SegmentColor::Red);
        // The Jan 16 incident is on no lane for Jan 15
        assert!(lanes
            .iter()
            .flat_map(|l| &l.segments)
            .all(|s| s.incident_id != 12));
    }

    #[test]
    fn unrecognized_type_falls_into_the_gray_bucket() {
        let incidents = vec![incident(
            1,
            1,
            "Drone Sighting",
            "2024-01-15 10:00:00",
            "2024-01-15 10:05:00",
            false,
        )];
        let segments: Vec<_> = camera_segments(day("2024-01-15"), 1, &incidents).collect();
        assert_eq!(segments[0].kind, IncidentKind::Unknown);
        assert_eq!(segments[0].color, SegmentColor::Gray);
    }

    #[test]
    fn now_marker_uses_the_segment_axis() {
        let now = ts("2024-01-15 12:00:00");
        assert_eq!(timeline::now_marker(now), 50.0);
    }

    // --- Partitioner ---

    #[test]
    fn partition_covers_the_input_exactly() {
        let incidents = vec![
            incident(
                1,
                1,
                "Unauthorized Access",
                "2024-01-15 02:15:00",
                "2024-01-15 02:18:00",
                false,
            ),
            incident(
                2,
                3,
                "Face Recognised",
                "2024-01-15 08:30:00",
                "2024-01-15 08:32:00",
                true,
            ),
            incident(
                3,
                2,
                "Gun Threat",
                "2024-01-15 14:45:00",
                "2024-01-15 14:47:00",
                false,
            ),
        ];

        let part = partition(&incidents);
        assert_eq!(part.unresolved.len() + part.resolved.len(), incidents.len());

        let unresolved_ids: HashSet<i64> = part.unresolved.iter().map(|i| i.id).collect();
        let resolved_ids: HashSet<i64> = part.resolved.iter().map(|i| i.id).collect();
        assert!(unresolved_ids.is_disjoint(&resolved_ids));

        let all_ids: HashSet<i64> = incidents.iter().map(|i| i.id).collect();
        let union: HashSet<i64> = unresolved_ids.union(&resolved_ids).copied().collect();
        assert_eq!(union, all_ids);

        // Input order preserved within each subset
        assert_eq!(part.unresolved[0].id, 1);
        assert_eq!(part.unresolved[1].id, 3);
    }

    #[test]
    fn partition_is_idempotent() {
        let incidents = vec![
            incident(
                1,
                1,
                "Gun Threat",
                "2024-01-15 02:15:00",
                "2024-01-15 02:18:00",
                false,
            ),
            incident(
                2,
                2,
                "Face Recognised",
                "2024-01-15 08:30:00",
                "2024-01-15 08:32:00",
                true,
            ),
        ];

        let first = partition(&incidents);
        let second = partition(&incidents);
        assert_eq!(first.critical_count, second.critical_count);
        assert_eq!(
            first.unresolved.iter().map(|i| i.id).collect::<Vec<_>>(),
            second.unresolved.iter().map(|i| i.id).collect::<Vec<_>>()
        );
    }

    #[test]
    fn resolved_gun_threat_is_not_critical() {
        let incidents = vec![
            incident(
                1,
                2,
                "Gun Threat",
                "2024-01-15 14:45:00",
                "2024-01-15 14:47:00",
                true,
            ),
            incident(
                2,
                1,
                "Unauthorized Access",
                "2024-01-15 02:15:00",
                "2024-01-15 02:18:00",
                false,
            ),
            incident(
                3,
                4,
                "Suspicious Activity",
                "2024-01-15 16:20:00",
                "2024-01-15 16:25:00",
                false,
            ),
        ];

        let part = partition(&incidents);
        assert_eq!(part.critical_count, 1);
        assert_eq!(part.summary().resolved_count, 1);
        assert_eq!(part.summary().unresolved_count, 2);
    }

    // --- Resolution coordinator ---

    fn two_unresolved() -> Vec<IncidentView> {
        vec![
            incident(
                1,
                1,
                "Unauthorized Access",
                "2024-01-15 19:10:00",
                "2024-01-15 19:12:00",
                false,
            ),
            incident(
                2,
                2,
                "Gun Threat",
                "2024-01-15 14:45:00",
                "2024-01-15 14:47:00",
                false,
            ),
        ]
    }

    #[test]
    fn first_unresolved_incident_is_auto_selected() {
        let mut incidents = two_unresolved();
        incidents[0].resolved = true;
        let coordinator = ResolutionCoordinator::new(incidents);
        assert_eq!(coordinator.selected(), Some(2));

        let none_unresolved = ResolutionCoordinator::new(vec![]);
        assert_eq!(none_unresolved.selected(), None);
    }

    #[tokio::test]
    async fn resolving_the_selected_incident_moves_selection_to_the_next() -> Result<()> {
        let store = MemoryStore::new(two_unresolved());
        let mut coordinator = ResolutionCoordinator::new(two_unresolved());
        assert_eq!(coordinator.selected(), Some(1));

        match coordinator.resolve(1, &store).await {
            ResolveOutcome::Applied(updated) => assert!(updated.resolved),
            other => panic!("expected Applied, got {:?}", other),
        }

        assert_eq!(coordinator.selected(), Some(2));
        assert!(coordinator.incidents().iter().find(|i| i.id == 1).unwrap().resolved);
        assert_eq!(coordinator.phase(1), ResolvePhase::Idle);
        Ok(())
    }

    #[tokio::test]
    async fn resolving_the_only_incident_empties_the_selection() -> Result<()> {
        let only = vec![two_unresolved().remove(0)];
        let store = MemoryStore::new(only.clone());
        let mut coordinator = ResolutionCoordinator::new(only);

        match coordinator.resolve(1, &store).await {
            ResolveOutcome::Applied(_) => {}
            other => panic!("expected Applied, got {:?}", other),
        }
        assert_eq!(coordinator.selected(), None);
        Ok(())
    }

    #[tokio::test]
    async fn second_resolve_on_an_in_flight_id_is_rejected() -> Result<()> {
        let store = MemoryStore::new(two_unresolved());
        let mut coordinator = ResolutionCoordinator::new(two_unresolved());

        // First action marks the id; the duplicate must not reach the store
        assert!(coordinator.begin_resolve(1));
        assert_eq!(coordinator.phase(1), ResolvePhase::Resolving);
        assert!(!coordinator.begin_resolve(1));
        assert_eq!(coordinator.in_flight_ids(), vec![1]);

        match coordinator.resolve(1, &store).await {
            ResolveOutcome::Duplicate => {}
            other => panic!("expected Duplicate, got {:?}", other),
        }
        assert_eq!(store.resolve_calls.load(Ordering::SeqCst), 0);

        // Completing the original request applies exactly one mutation
        let result = store.resolve_incident(1).await;
        coordinator.complete_resolve(1, result);
        assert_eq!(store.resolve_calls.load(Ordering::SeqCst), 1);
        assert!(coordinator.incidents()[0].resolved);

        // A different id is free to fly while the first is pending
        let mut other = ResolutionCoordinator::new(two_unresolved());
        assert!(other.begin_resolve(1));
        assert!(other.begin_resolve(2));
        Ok(())
    }

    #[tokio::test]
    async fn failed_resolve_leaves_local_state_untouched() -> Result<()> {
        let store = MemoryStore::failing(
            two_unresolved(),
            Error::TransientIo("service unavailable".to_string()),
        );
        let mut coordinator = ResolutionCoordinator::new(two_unresolved());

        match coordinator.resolve(1, &store).await {
            ResolveOutcome::Failed(msg) => assert!(msg.contains("service unavailable")),
            other => panic!("expected Failed, got {:?}", other),
        }

        // No optimistic mutation, marker cleared, selection intact
        assert!(!coordinator.incidents()[0].resolved);
        assert_eq!(coordinator.phase(1), ResolvePhase::Idle);
        assert_eq!(coordinator.selected(), Some(1));

        // The id is free for a retry
        assert!(coordinator.begin_resolve(1));
        Ok(())
    }

    #[tokio::test]
    async fn resolving_a_missing_incident_fails_recoverably() -> Result<()> {
        let store = MemoryStore::new(two_unresolved());
        let mut coordinator = ResolutionCoordinator::new(two_unresolved());

        match coordinator.resolve(99, &store).await {
            ResolveOutcome::Failed(msg) => assert!(msg.contains("not found")),
            other => panic!("expected Failed, got {:?}", other),
        }
        assert_eq!(coordinator.phase(99), ResolvePhase::Idle);
        Ok(())
    }

    #[test]
    fn selection_only_accepts_known_ids() {
        let mut coordinator = ResolutionCoordinator::new(two_unresolved());
        assert!(coordinator.select(2));
        assert_eq!(coordinator.selected(), Some(2));
        assert!(!coordinator.select(42));
        assert_eq!(coordinator.selected(), Some(2));
    }

    #[test]
    fn load_replaces_the_collection_and_reselects() {
        let mut coordinator = ResolutionCoordinator::new(two_unresolved());
        let mut refreshed = two_unresolved();
        refreshed[0].resolved = true;
        coordinator.load(refreshed);
        assert_eq!(coordinator.selected(), Some(2));
        assert_eq!(coordinator.incidents().len(), 2);
    }
}
