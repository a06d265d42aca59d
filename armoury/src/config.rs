//! Runtime configuration loaded via OrthoConfig.
//!
//! Values come from `ARMOURY_*` environment variables or configuration
//! files; every field is optional and falls back to a documented default.

use std::path::PathBuf;
use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::Deserialize;
use url::Url;

use crate::outbound::publisher::{DEFAULT_REQUEST_TIMEOUT, PublisherEndpoints};

/// Default metadata document URL.
pub const DEFAULT_METADATA_URL: &str = "https://api.corvusbelli.com/army/infinity/en/metadata";
/// Default base URL for per-faction army documents.
pub const DEFAULT_ARMY_BASE_URL: &str = "https://api.corvusbelli.com/army/units/en";
/// Default `Origin` header value.
pub const DEFAULT_ORIGIN: &str = "https://infinityuniverse.com";
/// Default SQLite file, relative to the working directory.
pub const DEFAULT_DATABASE_PATH: &str = "armoury.sqlite3";

/// Error raised when a configured value cannot be used.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SettingsError {
    /// A URL setting did not parse.
    #[error("invalid {field}: {message}")]
    InvalidUrl {
        /// Setting name.
        field: &'static str,
        /// Parser message.
        message: String,
    },
    /// The request timeout was zero.
    #[error("request_timeout_secs must be positive")]
    ZeroTimeout,
}

/// Configuration for the sync pipeline and its command line.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "ARMOURY")]
pub struct ArmourySettings {
    /// Metadata document URL.
    pub metadata_url: Option<String>,
    /// Base URL for army documents; the faction id is appended as a path
    /// segment.
    pub army_base_url: Option<String>,
    /// `Origin` header sent with publisher requests.
    pub origin: Option<String>,
    /// SQLite database file.
    pub database_path: Option<PathBuf>,
    /// Publisher request timeout in seconds.
    pub request_timeout_secs: Option<u64>,
}

impl ArmourySettings {
    /// Configured metadata URL, or [`DEFAULT_METADATA_URL`].
    #[must_use]
    pub fn metadata_url(&self) -> &str {
        self.metadata_url.as_deref().unwrap_or(DEFAULT_METADATA_URL)
    }

    /// Configured army base URL, or [`DEFAULT_ARMY_BASE_URL`].
    #[must_use]
    pub fn army_base_url(&self) -> &str {
        self.army_base_url
            .as_deref()
            .unwrap_or(DEFAULT_ARMY_BASE_URL)
    }

    /// Configured origin, or [`DEFAULT_ORIGIN`].
    #[must_use]
    pub fn origin(&self) -> &str {
        self.origin.as_deref().unwrap_or(DEFAULT_ORIGIN)
    }

    /// Configured database file, or [`DEFAULT_DATABASE_PATH`].
    #[must_use]
    pub fn database_path(&self) -> PathBuf {
        self.database_path
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATABASE_PATH))
    }

    /// Configured request timeout, or [`DEFAULT_REQUEST_TIMEOUT`].
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::ZeroTimeout`] for a zero override.
    pub fn request_timeout(&self) -> Result<Duration, SettingsError> {
        match self.request_timeout_secs {
            None => Ok(DEFAULT_REQUEST_TIMEOUT),
            Some(0) => Err(SettingsError::ZeroTimeout),
            Some(seconds) => Ok(Duration::from_secs(seconds)),
        }
    }

    /// Publisher endpoints built from the URL settings.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::InvalidUrl`] when either URL does not parse.
    pub fn endpoints(&self) -> Result<PublisherEndpoints, SettingsError> {
        Ok(PublisherEndpoints {
            metadata_url: parse_url("metadata_url", self.metadata_url())?,
            army_base_url: parse_url("army_base_url", self.army_base_url())?,
            origin: self.origin().to_owned(),
        })
    }
}

fn parse_url(field: &'static str, raw: &str) -> Result<Url, SettingsError> {
    Url::parse(raw).map_err(|error| SettingsError::InvalidUrl {
        field,
        message: format!("{raw}: {error}"),
    })
}
