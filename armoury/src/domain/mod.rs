//! Domain layer: document shapes, import and sync services, derived views.
//!
//! Purpose: keep publisher document handling and sync policy independent of
//! HTTP and SQLite. Adapters in [`crate::outbound`] implement the
//! [`ports`] traits.

pub mod army;
mod army_import;
mod army_query;
pub mod coerce;
pub mod derived;
pub mod error;
mod keys;
pub mod metadata;
mod metadata_import;
pub mod ports;
mod service_support;
mod settings;
mod sync;
mod version;

pub use self::army::{ArmyImport, ArmyResume, ArmySnapshot, ArmyUnit, version_from_json};
pub use self::army_import::{ArmyImportService, ArmyImportSummary};
pub use self::army_query::{ArmyQueryService, UNFILTERED_SEARCH_LIMIT};
pub use self::error::{DomainError, ErrorCode, ErrorValidationError};
pub use self::keys::{ResumeKey, UnitKey, WeaponKey};
pub use self::metadata::{
    Faction, HackProgram, MartialArt, MetadataCounts, MetadataSnapshot, ReferenceEntry,
    ValuedEntry, Weapon,
};
pub use self::metadata_import::{MetadataImportService, MetadataImportSummary};
pub use self::settings::{
    DISPLAY_UNITS_KEY, DisplayUnits, LAST_SYNC_ATTEMPT_KEY, ParseDisplayUnitsError,
};
pub use self::sync::{
    FactionSyncResult, FactionSyncStatus, SYNC_INTERVAL_DAYS, SyncOutcome, SyncService,
    should_sync_at,
};
pub use self::version::{DottedVersion, compare_versions};
