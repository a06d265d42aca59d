//! Domain ports for the hexagonal boundary.

mod macros;
pub(crate) use macros::define_port_error;

mod army_repository;
mod local_store;
mod metadata_repository;
mod publisher_source;
mod settings_repository;

#[cfg(test)]
pub use army_repository::MockArmyRepository;
pub use army_repository::{ArmyRepository, FixtureArmyRepository, UnitSearch};
#[cfg(test)]
pub use local_store::MockLocalStore;
pub use local_store::{FixtureLocalStore, LocalStore, StoreError};
#[cfg(test)]
pub use metadata_repository::MockMetadataRepository;
pub use metadata_repository::{FixtureMetadataRepository, MetadataRepository};
#[cfg(test)]
pub use publisher_source::MockPublisherSource;
pub use publisher_source::{FixturePublisherSource, PublisherSource, PublisherSourceError};
#[cfg(test)]
pub use settings_repository::MockSettingsRepository;
pub use settings_repository::{FixtureSettingsRepository, SettingsRepository};
