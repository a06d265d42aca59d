//! Army import: replace one faction's snapshot and derived rows.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use cap_std::{ambient_authority, fs::Dir};
use mockable::Clock;
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::domain::{ArmyImport, DomainError};
use crate::domain::ports::ArmyRepository;
use crate::domain::service_support::{ensure_active, map_document_error, map_store_error};

/// Result of importing one faction's army document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArmyImportSummary {
    /// Faction the document was stored under.
    pub faction_id: i64,
    /// Version recorded on the snapshot.
    pub version: String,
    /// Unit rows written.
    pub unit_count: usize,
    /// Resume rows written.
    pub resume_count: usize,
}

/// Domain service that stores army documents.
#[derive(Clone)]
pub struct ArmyImportService<A> {
    repository: Arc<A>,
    clock: Arc<dyn Clock>,
}

impl<A> ArmyImportService<A>
where
    A: ArmyRepository,
{
    /// Create a new importer; `clock` stamps each snapshot.
    #[must_use]
    pub fn new(repository: Arc<A>, clock: Arc<dyn Clock>) -> Self {
        Self { repository, clock }
    }

    /// Parse `json` and replace the faction's rows in one transaction.
    ///
    /// # Errors
    ///
    /// `InvalidRequest` for a malformed envelope or non-positive faction id,
    /// `Cancelled` when `cancel` fired first, `ServiceUnavailable` when the
    /// store fails.
    pub async fn import_faction_army_from_json(
        &self,
        faction_id: i64,
        json: &str,
        cancel: &CancellationToken,
    ) -> Result<ArmyImportSummary, DomainError> {
        ensure_active(cancel, "army import")?;
        if faction_id <= 0 {
            return Err(DomainError::invalid_request(format!(
                "faction id must be positive, got {faction_id}"
            )));
        }

        let import = ArmyImport::from_json(faction_id, json, self.clock.utc())
            .map_err(|message| map_document_error("army", message))?;
        self.repository
            .replace_faction_army(&import)
            .await
            .map_err(map_store_error)?;

        let summary = ArmyImportSummary {
            faction_id,
            version: import.snapshot.version,
            unit_count: import.units.len(),
            resume_count: import.resume.len(),
        };
        info!(
            faction_id,
            version = %summary.version,
            row_count = summary.unit_count,
            "army imported"
        );
        Ok(summary)
    }

    /// Read an army document from disk and import it.
    ///
    /// # Errors
    ///
    /// `NotFound` when the file is missing, `ServiceUnavailable` for other
    /// read failures, plus everything
    /// [`Self::import_faction_army_from_json`] returns.
    pub async fn import_faction_army_from_file(
        &self,
        faction_id: i64,
        path: &Path,
        cancel: &CancellationToken,
    ) -> Result<ArmyImportSummary, DomainError> {
        ensure_active(cancel, "army import")?;
        let owned: PathBuf = path.to_path_buf();
        let json = tokio::task::spawn_blocking(move || read_document(&owned))
            .await
            .map_err(|error| DomainError::internal(format!("file reader task failed: {error}")))?
            .map_err(|error| map_read_error(path, &error))?;
        self.import_faction_army_from_json(faction_id, &json, cancel)
            .await
    }
}

fn read_document(path: &Path) -> io::Result<String> {
    let file_name = path.file_name().ok_or_else(|| {
        io::Error::new(io::ErrorKind::InvalidInput, "path has no file name")
    })?;
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let directory = Dir::open_ambient_dir(parent, ambient_authority())?;
    directory.read_to_string(file_name)
}

fn map_read_error(path: &Path, error: &io::Error) -> DomainError {
    let message = format!("cannot read {}: {error}", path.display());
    match error.kind() {
        io::ErrorKind::NotFound => DomainError::not_found(message),
        io::ErrorKind::InvalidInput | io::ErrorKind::InvalidData => {
            DomainError::invalid_request(message)
        }
        _ => DomainError::service_unavailable(message),
    }
}

#[cfg(test)]
mod tests {
    //! Behaviour of the army importer against a mocked repository.

    use std::io::Write as _;

    use super::*;
    use crate::domain::ErrorCode;
    use crate::domain::ports::{MockArmyRepository, StoreError};
    use crate::domain::service_support::fixtures::{fixture_clock, fixture_timestamp};
    use rstest::rstest;
    use serde_json::json;

    fn document() -> String {
        json!({
            "version": "1.4.2",
            "units": [
                { "id": 1, "name": "FUSILIERS", "slug": "fusiliers" },
                { "id": 2, "name": "BULLETEER", "slug": "bulleteer" }
            ],
            "resume": [{ "id": 1, "name": "FUSILIERS", "slug": "fusiliers" }]
        })
        .to_string()
    }

    fn service(repository: MockArmyRepository) -> ArmyImportService<MockArmyRepository> {
        ArmyImportService::new(Arc::new(repository), fixture_clock())
    }

    #[rstest]
    #[tokio::test]
    async fn stores_snapshot_and_rows_for_faction() {
        let mut repository = MockArmyRepository::new();
        repository
            .expect_replace_faction_army()
            .times(1)
            .withf(|import| {
                import.snapshot.faction_id == 10
                    && import.snapshot.imported_at == fixture_timestamp()
                    && import.units.iter().all(|unit| unit.key.faction_id == 10)
            })
            .returning(|_| Ok(()));

        let summary = service(repository)
            .import_faction_army_from_json(10, &document(), &CancellationToken::new())
            .await
            .expect("import succeeds");

        assert_eq!(
            summary,
            ArmyImportSummary {
                faction_id: 10,
                version: "1.4.2".to_owned(),
                unit_count: 2,
                resume_count: 1,
            }
        );
    }

    #[rstest]
    #[case(0)]
    #[case(-4)]
    #[tokio::test]
    async fn rejects_non_positive_faction_ids(#[case] faction_id: i64) {
        let mut repository = MockArmyRepository::new();
        repository.expect_replace_faction_army().never();

        let err = service(repository)
            .import_faction_army_from_json(faction_id, &document(), &CancellationToken::new())
            .await
            .expect_err("invalid faction");

        assert_eq!(err.code(), ErrorCode::InvalidRequest);
    }

    #[rstest]
    #[tokio::test]
    async fn failed_replacement_propagates() {
        let mut repository = MockArmyRepository::new();
        repository
            .expect_replace_faction_army()
            .returning(|_| Err(StoreError::connection("database is locked")));

        let err = service(repository)
            .import_faction_army_from_json(10, &document(), &CancellationToken::new())
            .await
            .expect_err("store failure");

        assert_eq!(err.code(), ErrorCode::ServiceUnavailable);
    }

    #[rstest]
    #[tokio::test]
    async fn imports_from_file() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        file.write_all(document().as_bytes()).expect("write document");
        let mut repository = MockArmyRepository::new();
        repository
            .expect_replace_faction_army()
            .times(1)
            .returning(|_| Ok(()));

        let summary = service(repository)
            .import_faction_army_from_file(20, file.path(), &CancellationToken::new())
            .await
            .expect("file import succeeds");

        assert_eq!(summary.faction_id, 20);
        assert_eq!(summary.unit_count, 2);
    }

    #[rstest]
    #[tokio::test]
    async fn missing_file_is_not_found() {
        let directory = tempfile::tempdir().expect("temp dir");
        let mut repository = MockArmyRepository::new();
        repository.expect_replace_faction_army().never();

        let err = service(repository)
            .import_faction_army_from_file(
                20,
                &directory.path().join("absent.json"),
                &CancellationToken::new(),
            )
            .await
            .expect_err("missing file");

        assert_eq!(err.code(), ErrorCode::NotFound);
    }
}
