//! Reference-data ingestion and sync for a miniatures wargame companion.
//!
//! The [`domain`] layer decodes loosely typed publisher documents, decides
//! when a sync is due and builds derived unit views. [`outbound`] holds the
//! HTTP and SQLite adapters behind the domain ports, and [`config`] loads the
//! runtime settings used by the `armoury-sync` binary.

pub mod config;
pub mod domain;
pub mod outbound;
