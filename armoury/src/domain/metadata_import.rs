//! Metadata import: replace every reference table from one document.

use std::sync::Arc;

use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::domain::DomainError;
use crate::domain::ports::MetadataRepository;
use crate::domain::service_support::{ensure_active, map_document_error, map_store_error};
use crate::domain::{MetadataCounts, MetadataSnapshot};

/// Result of one metadata import.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetadataImportSummary {
    /// Rows written per table.
    pub counts: MetadataCounts,
    /// Distinct positive faction ids in document order.
    pub faction_ids: Vec<i64>,
}

/// Domain service that normalizes and stores the metadata document.
#[derive(Clone)]
pub struct MetadataImportService<M> {
    repository: Arc<M>,
}

impl<M> MetadataImportService<M>
where
    M: MetadataRepository,
{
    /// Create a new importer over `repository`.
    #[must_use]
    pub fn new(repository: Arc<M>) -> Self {
        Self { repository }
    }

    /// Parse `json` and replace all metadata tables in one transaction.
    ///
    /// # Errors
    ///
    /// `InvalidRequest` when the document envelope is wrong, `Cancelled` when
    /// `cancel` fired before the write, and `ServiceUnavailable` when the
    /// store rejects the replacement.
    pub async fn import_from_json(
        &self,
        json: &str,
        cancel: &CancellationToken,
    ) -> Result<MetadataImportSummary, DomainError> {
        ensure_active(cancel, "metadata import")?;
        let snapshot =
            MetadataSnapshot::from_json(json).map_err(|message| map_document_error("metadata", message))?;
        let faction_ids = snapshot.faction_ids();

        let counts = self
            .repository
            .replace_metadata(&snapshot)
            .await
            .map_err(map_store_error)?;
        info!(
            factions = counts.factions,
            weapons = counts.weapons,
            skills = counts.skills,
            equips = counts.equips,
            "metadata imported"
        );

        Ok(MetadataImportSummary {
            counts,
            faction_ids,
        })
    }
}
