//! SQLite persistence adapters built on Diesel.
//!
//! Every repository shares one [`SqliteStore`] connection. Row structs stay
//! private to this module; callers only see domain types.

mod diesel_army_repository;
mod diesel_helpers;
mod diesel_metadata_repository;
mod diesel_settings_repository;
mod models;
mod schema;
mod store;

pub use diesel_army_repository::DieselArmyRepository;
pub use diesel_metadata_repository::DieselMetadataRepository;
pub use diesel_settings_repository::DieselSettingsRepository;
pub use store::SqliteStore;
