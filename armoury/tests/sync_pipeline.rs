//! End-to-end sync against an in-memory store and a scripted publisher.

#![expect(
    clippy::expect_used,
    reason = "test code uses expect for clear failure messages"
)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use armoury::domain::ports::{PublisherSource, PublisherSourceError};
use armoury::domain::{
    ArmyQueryService, DisplayUnits, FactionSyncStatus, SyncOutcome, SyncService,
};
use armoury::outbound::persistence::{
    DieselArmyRepository, DieselMetadataRepository, DieselSettingsRepository, SqliteStore,
};
use async_trait::async_trait;
use chrono::{DateTime, Local, TimeDelta, TimeZone, Utc};
use mockable::Clock;
use rstest::{fixture, rstest};
use serde_json::json;
use tokio_util::sync::CancellationToken;

/// Publisher double serving canned documents and counting requests.
#[derive(Default)]
struct ScriptedSource {
    metadata: Mutex<String>,
    armies: Mutex<HashMap<i64, String>>,
    calls: AtomicUsize,
}

impl ScriptedSource {
    fn set_metadata(&self, factions: &[i64]) {
        let listed: Vec<_> = factions
            .iter()
            .map(|id| json!({ "id": id, "parent": id, "name": format!("Faction {id}"), "slug": format!("faction-{id}") }))
            .collect();
        let document = json!({
            "factions": listed,
            "weapons": [{ "id": 1, "name": "Combi Rifle" }],
            "skills": [{ "id": 5, "name": "Camouflage" }]
        });
        *self.metadata.lock().expect("metadata lock") = document.to_string();
    }

    fn set_army(&self, faction_id: i64, version: &str) {
        let document = json!({
            "version": version,
            "units": [
                {
                    "id": 101, "isc": "Fusiliers", "name": "FUSILIERS", "slug": "fusiliers",
                    "profileGroups": [{
                        "profiles": [{ "move": [10, 5], "cc": 13, "bs": 12, "w": 1, "ava": 255, "equip": [1], "chars": [7] }],
                        "options": [{ "id": 1, "orders": [{ "type": "REGULAR" }] }]
                    }]
                },
                { "id": 102, "isc": "Bulleteer", "name": "BULLETEER", "slug": "bulleteer" },
                { "id": 103, "isc": "Nisse", "name": "NISSE", "slug": "nisse" }
            ],
            "resume": [
                { "id": 101, "isc": "Fusiliers", "name": "FUSILIERS", "slug": "fusiliers" }
            ],
            "filters": {
                "equip": [{ "id": 1, "name": "Combi Rifle" }],
                "chars": [{ "id": 7, "name": "Hackable" }]
            }
        });
        self.armies
            .lock()
            .expect("armies lock")
            .insert(faction_id, document.to_string());
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PublisherSource for ScriptedSource {
    async fn fetch_metadata(&self) -> Result<String, PublisherSourceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.metadata.lock().expect("metadata lock").clone())
    }

    async fn fetch_army_data(&self, faction_id: i64) -> Result<String, PublisherSourceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.armies
            .lock()
            .expect("armies lock")
            .get(&faction_id)
            .cloned()
            .ok_or_else(|| PublisherSourceError::status(404_u16, "no such faction"))
    }
}

/// Clock the test can move forward.
struct SteppingClock {
    now: Mutex<DateTime<Utc>>,
}

impl SteppingClock {
    fn advance(&self, by: TimeDelta) {
        let mut now = self.now.lock().expect("clock lock");
        *now += by;
    }
}

impl Clock for SteppingClock {
    fn local(&self) -> DateTime<Local> {
        self.utc().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        *self.now.lock().expect("clock lock")
    }
}

struct Harness {
    source: Arc<ScriptedSource>,
    clock: Arc<SteppingClock>,
    sync: SyncService<ScriptedSource, DieselMetadataRepository, DieselArmyRepository>,
    query: ArmyQueryService<DieselArmyRepository, DieselMetadataRepository>,
}

#[fixture]
fn harness() -> Harness {
    let store = SqliteStore::in_memory();
    let metadata = Arc::new(DieselMetadataRepository::new(store.clone()));
    let armies = Arc::new(DieselArmyRepository::new(store.clone()));
    let settings = Arc::new(DieselSettingsRepository::new(store.clone()));
    let source = Arc::new(ScriptedSource::default());
    source.set_metadata(&[10, 20]);
    source.set_army(10, "2.0");
    source.set_army(20, "2.0");
    let clock = Arc::new(SteppingClock {
        now: Mutex::new(
            Utc.with_ymd_and_hms(2026, 3, 14, 8, 0, 0)
                .single()
                .expect("valid timestamp"),
        ),
    });

    let sync = SyncService::new(
        Arc::clone(&source),
        Arc::clone(&metadata),
        Arc::clone(&armies),
        Arc::new(store),
        settings.clone(),
        clock.clone(),
    );
    let query = ArmyQueryService::new(armies, metadata, settings);
    Harness {
        source,
        clock,
        sync,
        query,
    }
}

fn statuses(outcome: &SyncOutcome) -> Vec<(i64, FactionSyncStatus)> {
    match outcome {
        SyncOutcome::Completed { factions, .. } => factions
            .iter()
            .map(|result| (result.faction_id, result.status.clone()))
            .collect(),
        SyncOutcome::Skipped { .. } => Vec::new(),
    }
}

#[rstest]
#[tokio::test]
async fn first_run_imports_and_second_run_is_gated(harness: Harness) {
    let cancel = CancellationToken::new();

    let first = harness.sync.run(&cancel).await.expect("first run");

    assert_eq!(harness.source.calls(), 3);
    assert_eq!(
        statuses(&first),
        vec![
            (
                10,
                FactionSyncStatus::Imported {
                    version: "2.0".to_owned(),
                    previous_version: None,
                }
            ),
            (
                20,
                FactionSyncStatus::Imported {
                    version: "2.0".to_owned(),
                    previous_version: None,
                }
            ),
        ]
    );
    assert_eq!(harness.query.faction_ids().await.expect("ids"), vec![10, 20]);

    harness.clock.advance(TimeDelta::hours(1));
    let second = harness.sync.run(&cancel).await.expect("second run");

    assert!(matches!(second, SyncOutcome::Skipped { .. }));
    assert_eq!(harness.source.calls(), 3);
}

#[rstest]
#[tokio::test]
async fn later_run_keeps_rows_stable_when_versions_match(harness: Harness) {
    let cancel = CancellationToken::new();
    harness.sync.run(&cancel).await.expect("first run");

    harness.clock.advance(TimeDelta::days(8));
    let later = harness.sync.run(&cancel).await.expect("later run");

    assert!(
        statuses(&later)
            .iter()
            .all(|(_, status)| matches!(status, FactionSyncStatus::UpToDate { .. }))
    );
    assert_eq!(harness.query.list_units(10).await.expect("units").len(), 3);
    assert_eq!(harness.query.list_resume(10).await.expect("resume").len(), 1);
}

#[rstest]
#[tokio::test]
async fn stored_versions_never_move_backwards(harness: Harness) {
    let cancel = CancellationToken::new();
    harness.sync.run(&cancel).await.expect("first run");

    harness.source.set_army(10, "1.9.9");
    harness.source.set_army(20, "2.0.1");
    let forced = harness.sync.run_forced(&cancel).await.expect("forced run");

    assert_eq!(
        statuses(&forced),
        vec![
            (
                10,
                FactionSyncStatus::UpToDate {
                    stored_version: "2.0".to_owned(),
                    remote_version: "1.9.9".to_owned(),
                }
            ),
            (
                20,
                FactionSyncStatus::Imported {
                    version: "2.0.1".to_owned(),
                    previous_version: Some("2.0".to_owned()),
                }
            ),
        ]
    );
    let snapshot = harness
        .query
        .snapshot(10)
        .await
        .expect("query")
        .expect("snapshot");
    assert_eq!(snapshot.version, "2.0");
}

#[rstest]
#[tokio::test]
async fn synced_units_render_derived_views(harness: Harness) {
    let cancel = CancellationToken::new();
    harness.sync.run(&cancel).await.expect("sync");

    let inches = harness.query.unit_view(10, 101).await.expect("view");
    harness
        .query
        .set_display_units(DisplayUnits::Centimeters)
        .await
        .expect("store preference");
    let centimeters = harness.query.unit_view(10, 101).await.expect("view");

    assert_eq!(inches.movement.as_deref(), Some("4-2"));
    assert_eq!(inches.availability.as_deref(), Some("Total"));
    assert_eq!(inches.common_equipment, vec!["Combi Rifle"]);
    assert!(inches.flags.hackable);
    assert!(inches.flags.orders.regular);
    assert_eq!(centimeters.movement.as_deref(), Some("10-5"));
}

#[rstest]
#[tokio::test]
async fn search_finds_units_across_factions(harness: Harness) {
    let cancel = CancellationToken::new();
    harness.sync.run(&cancel).await.expect("sync");

    let hits = harness
        .query
        .search_units(Some("fusil"), None)
        .await
        .expect("search");
    let scoped = harness
        .query
        .search_units(Some("FUSIL"), Some(20))
        .await
        .expect("search");

    assert_eq!(hits.len(), 2);
    assert_eq!(scoped.len(), 1);
}
