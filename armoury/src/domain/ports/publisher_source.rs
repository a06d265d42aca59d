//! Driven port for downloading publisher documents.
//!
//! Adapters return the decoded UTF-8 body; parsing belongs to the importers.

use async_trait::async_trait;

use super::define_port_error;

define_port_error! {
    /// Errors surfaced while calling the publisher API.
    pub enum PublisherSourceError {
        /// Network transport failed before a response arrived.
        Transport { message: String } =>
            "publisher transport failed: {message}",
        /// The request exceeded its timeout.
        Timeout { message: String } =>
            "publisher request timed out: {message}",
        /// The publisher answered with a non-success status.
        Status { status: u16, message: String } =>
            "publisher returned status {status}: {message}",
        /// The body could not be decompressed or was not UTF-8.
        Decode { message: String } =>
            "publisher response decode failed: {message}",
        /// The adapter could not build the request.
        InvalidRequest { message: String } =>
            "publisher request invalid: {message}",
    }
}

impl PublisherSourceError {
    /// Return whether retrying this error is expected to help.
    ///
    /// The sync pipeline never retries on its own; this is for callers that
    /// layer a policy on top.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Transport { .. } | Self::Timeout { .. } => true,
            Self::Status { status, .. } => matches!(status, 408 | 429 | 500..=599),
            Self::Decode { .. } | Self::InvalidRequest { .. } => false,
        }
    }
}

/// Port for fetching the metadata and per-faction army documents.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PublisherSource: Send + Sync {
    /// Download the global metadata document.
    async fn fetch_metadata(&self) -> Result<String, PublisherSourceError>;

    /// Download the army document for one faction.
    ///
    /// # Examples
    ///
    /// ```rust,ignore
    /// use armoury::domain::ports::{FixturePublisherSource, PublisherSource};
    ///
    /// let body = FixturePublisherSource.fetch_army_data(10).await?;
    /// assert!(body.contains("version"));
    /// # Ok::<(), armoury::domain::ports::PublisherSourceError>(())
    /// ```
    async fn fetch_army_data(&self, faction_id: i64) -> Result<String, PublisherSourceError>;
}

/// Fixture source serving empty documents.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixturePublisherSource;

#[async_trait]
impl PublisherSource for FixturePublisherSource {
    async fn fetch_metadata(&self) -> Result<String, PublisherSourceError> {
        Ok(r#"{"factions":[]}"#.to_owned())
    }

    async fn fetch_army_data(&self, _faction_id: i64) -> Result<String, PublisherSourceError> {
        Ok(r#"{"version":"","units":[],"resume":[]}"#.to_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(PublisherSourceError::transport("reset"), true)]
    #[case(PublisherSourceError::timeout("80s"), true)]
    #[case(PublisherSourceError::status(503_u16, "busy"), true)]
    #[case(PublisherSourceError::status(429_u16, "slow down"), true)]
    #[case(PublisherSourceError::status(404_u16, "missing"), false)]
    #[case(PublisherSourceError::decode("bad gzip"), false)]
    fn classifies_retryable_failures(#[case] error: PublisherSourceError, #[case] expected: bool) {
        assert_eq!(error.is_retryable(), expected);
    }
}
