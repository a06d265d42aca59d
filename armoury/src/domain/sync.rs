//! Synchronization orchestrator.
//!
//! One run downloads the metadata document, imports it, then walks every
//! faction it lists and imports the faction's army document when the
//! publisher version is strictly newer than the stored one. Runs are gated
//! to one attempt per seven days through the
//! [`LAST_SYNC_ATTEMPT_KEY`] setting.

use std::sync::Arc;

use chrono::{DateTime, SecondsFormat, TimeDelta, Utc};
use mockable::Clock;
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::domain::army::version_from_json;
use crate::domain::ports::{
    ArmyRepository, LocalStore, MetadataRepository, PublisherSource, SettingsRepository,
};
use crate::domain::service_support::{
    ensure_active, map_document_error, map_source_error, map_store_error,
};
use crate::domain::{
    ArmyImportService, DomainError, LAST_SYNC_ATTEMPT_KEY, MetadataCounts, MetadataImportService,
};

/// Minimum spacing, in days, between two gated sync attempts.
pub const SYNC_INTERVAL_DAYS: i64 = 7;

/// What happened to one faction during a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum FactionSyncStatus {
    /// The army document was imported.
    #[serde(rename_all = "camelCase")]
    Imported {
        /// Version now stored.
        version: String,
        /// Version stored before, if any.
        previous_version: Option<String>,
    },
    /// The stored snapshot is as new as the remote document.
    #[serde(rename_all = "camelCase")]
    UpToDate {
        /// Stored version.
        stored_version: String,
        /// Version offered by the publisher.
        remote_version: String,
    },
    /// The remote document carried no version and was skipped.
    MissingVersion,
}

/// Per-faction result of a completed run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FactionSyncResult {
    /// Faction id.
    pub faction_id: i64,
    /// Outcome for the faction.
    #[serde(flatten)]
    pub status: FactionSyncStatus,
}

/// Result of one orchestrator run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "camelCase")]
pub enum SyncOutcome {
    /// The gate held; no network request was made.
    #[serde(rename_all = "camelCase")]
    Skipped {
        /// Last recorded attempt.
        last_attempt: DateTime<Utc>,
    },
    /// The pipeline ran to the end.
    #[serde(rename_all = "camelCase")]
    Completed {
        /// When the attempt was recorded.
        attempted_at: DateTime<Utc>,
        /// Metadata rows written.
        metadata: MetadataCounts,
        /// Per-faction results in metadata order.
        factions: Vec<FactionSyncResult>,
    },
}

impl SyncOutcome {
    /// Factions whose army document was imported during this run.
    #[must_use]
    pub fn imported_factions(&self) -> Vec<i64> {
        match self {
            Self::Skipped { .. } => Vec::new(),
            Self::Completed { factions, .. } => factions
                .iter()
                .filter(|result| matches!(result.status, FactionSyncStatus::Imported { .. }))
                .map(|result| result.faction_id)
                .collect(),
        }
    }
}

/// Decide whether a gated run may proceed.
///
/// A missing or unparseable `last_attempt` proceeds, as does one at least
/// [`SYNC_INTERVAL_DAYS`] before `now`.
#[must_use]
pub fn should_sync_at(last_attempt: Option<&str>, now: DateTime<Utc>) -> bool {
    match last_attempt.map(parse_attempt) {
        None | Some(None) => true,
        Some(Some(last)) => now.signed_duration_since(last) >= TimeDelta::days(SYNC_INTERVAL_DAYS),
    }
}

fn parse_attempt(raw: &str) -> Option<DateTime<Utc>> {
    match DateTime::parse_from_rfc3339(raw.trim()) {
        Ok(parsed) => Some(parsed.with_timezone(&Utc)),
        Err(error) => {
            warn!(value = raw, %error, "ignoring unparseable last sync attempt");
            None
        }
    }
}

/// Domain service that runs the download, import and version gating flow.
#[derive(Clone)]
pub struct SyncService<P, M, A> {
    source: Arc<P>,
    metadata: MetadataImportService<M>,
    armies: Arc<A>,
    army_import: ArmyImportService<A>,
    store: Arc<dyn LocalStore>,
    settings: Arc<dyn SettingsRepository>,
    clock: Arc<dyn Clock>,
}

impl<P, M, A> SyncService<P, M, A>
where
    P: PublisherSource,
    M: MetadataRepository,
    A: ArmyRepository,
{
    /// Wire the orchestrator to its collaborators.
    #[must_use]
    pub fn new(
        source: Arc<P>,
        metadata: Arc<M>,
        armies: Arc<A>,
        store: Arc<dyn LocalStore>,
        settings: Arc<dyn SettingsRepository>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            source,
            metadata: MetadataImportService::new(metadata),
            army_import: ArmyImportService::new(Arc::clone(&armies), Arc::clone(&clock)),
            armies,
            store,
            settings,
            clock,
        }
    }

    /// Whether the seven-day gate currently allows a run.
    ///
    /// # Errors
    ///
    /// `ServiceUnavailable` when the setting cannot be read.
    pub async fn should_sync(&self) -> Result<bool, DomainError> {
        let last_attempt = self
            .settings
            .find_setting(LAST_SYNC_ATTEMPT_KEY)
            .await
            .map_err(map_store_error)?;
        Ok(should_sync_at(last_attempt.as_deref(), self.clock.utc()))
    }

    /// Run the pipeline if the gate allows it.
    ///
    /// # Errors
    ///
    /// Fetch, import and store failures propagate; the recorded attempt is
    /// kept, so the next gated run waits out the full interval.
    pub async fn run(&self, cancel: &CancellationToken) -> Result<SyncOutcome, DomainError> {
        ensure_active(cancel, "sync")?;
        self.store.initialize().await.map_err(map_store_error)?;

        let last_attempt = self
            .settings
            .find_setting(LAST_SYNC_ATTEMPT_KEY)
            .await
            .map_err(map_store_error)?;
        let now = self.clock.utc();
        if !should_sync_at(last_attempt.as_deref(), now) {
            let last_attempt = last_attempt
                .as_deref()
                .and_then(parse_attempt)
                .unwrap_or(now);
            info!(%last_attempt, "sync skipped; last attempt is recent");
            return Ok(SyncOutcome::Skipped { last_attempt });
        }

        self.run_unconditionally(now, cancel).await
    }

    /// Run the pipeline regardless of the gate. The attempt is still
    /// recorded.
    ///
    /// # Errors
    ///
    /// See [`Self::run`].
    pub async fn run_forced(&self, cancel: &CancellationToken) -> Result<SyncOutcome, DomainError> {
        ensure_active(cancel, "sync")?;
        self.store.initialize().await.map_err(map_store_error)?;
        self.run_unconditionally(self.clock.utc(), cancel).await
    }

    async fn run_unconditionally(
        &self,
        attempted_at: DateTime<Utc>,
        cancel: &CancellationToken,
    ) -> Result<SyncOutcome, DomainError> {
        self.settings
            .upsert_setting(
                LAST_SYNC_ATTEMPT_KEY,
                &attempted_at.to_rfc3339_opts(SecondsFormat::Secs, true),
            )
            .await
            .map_err(map_store_error)?;
        info!(%attempted_at, "sync started");

        let metadata_json = self
            .source
            .fetch_metadata()
            .await
            .map_err(map_source_error)?;
        let summary = self.metadata.import_from_json(&metadata_json, cancel).await?;

        let mut factions = Vec::with_capacity(summary.faction_ids.len());
        for faction_id in summary.faction_ids {
            ensure_active(cancel, "sync")?;
            let status = self.sync_faction(faction_id, cancel).await?;
            factions.push(FactionSyncResult { faction_id, status });
        }

        info!(
            faction_count = factions.len(),
            imported = factions
                .iter()
                .filter(|result| matches!(result.status, FactionSyncStatus::Imported { .. }))
                .count(),
            "sync completed"
        );
        Ok(SyncOutcome::Completed {
            attempted_at,
            metadata: summary.counts,
            factions,
        })
    }

    async fn sync_faction(
        &self,
        faction_id: i64,
        cancel: &CancellationToken,
    ) -> Result<FactionSyncStatus, DomainError> {
        let army_json = self
            .source
            .fetch_army_data(faction_id)
            .await
            .map_err(map_source_error)?;
        let remote =
            version_from_json(&army_json).map_err(|message| map_document_error("army", message))?;
        if remote.is_blank() {
            warn!(faction_id, "army document has no version; skipping");
            return Ok(FactionSyncStatus::MissingVersion);
        }

        let stored = self
            .armies
            .find_snapshot(faction_id)
            .await
            .map_err(map_store_error)?;
        let previous_version = match stored {
            Some(snapshot) if !remote.is_newer_than(&snapshot.dotted_version()) => {
                info!(faction_id, version = %snapshot.version, "army up to date");
                return Ok(FactionSyncStatus::UpToDate {
                    stored_version: snapshot.version,
                    remote_version: remote.as_str().to_owned(),
                });
            }
            Some(snapshot) => Some(snapshot.version),
            None => None,
        };

        let imported = self
            .army_import
            .import_faction_army_from_json(faction_id, &army_json, cancel)
            .await?;
        Ok(FactionSyncStatus::Imported {
            version: imported.version,
            previous_version,
        })
    }
}

#[cfg(test)]
#[path = "sync_tests.rs"]
mod tests;
