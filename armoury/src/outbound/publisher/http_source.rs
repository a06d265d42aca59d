//! Reqwest-backed publisher source adapter.
//!
//! This adapter owns transport details only: request headers, the timeout,
//! gzip decoding and HTTP error mapping. Bodies are returned as text.

use std::io::Read;
use std::time::Duration;

use async_trait::async_trait;
use flate2::read::GzDecoder;
use reqwest::header::{ACCEPT, ACCEPT_ENCODING, CONTENT_ENCODING, HeaderMap, ORIGIN};
use reqwest::{Client, StatusCode, Url};
use tracing::debug;

use crate::domain::ports::{PublisherSource, PublisherSourceError};

/// Request timeout applied when configuration does not override it.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(80);

/// Where the publisher documents live and the origin the API expects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublisherEndpoints {
    /// URL of the metadata document.
    pub metadata_url: Url,
    /// Base URL; a faction's army document is `{army_base_url}/{faction_id}`.
    pub army_base_url: Url,
    /// Value of the `Origin` header sent with every request.
    pub origin: String,
}

/// Publisher source adapter performing HTTP GET requests.
pub struct PublisherHttpSource {
    client: Client,
    endpoints: PublisherEndpoints,
}

impl PublisherHttpSource {
    /// Build an adapter using a reqwest client with an explicit timeout.
    ///
    /// Transport-level decompression stays off; gzip bodies are decoded by
    /// the adapter.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(endpoints: PublisherEndpoints, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client, endpoints })
    }

    async fn get_text(&self, url: Url) -> Result<String, PublisherSourceError> {
        debug!(%url, "fetching publisher document");
        let response = self
            .client
            .get(url)
            .header(ORIGIN, self.endpoints.origin.as_str())
            .header(ACCEPT, "application/json")
            .header(ACCEPT_ENCODING, "gzip")
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        let gzip = declares_gzip(response.headers());
        let body = response.bytes().await.map_err(map_transport_error)?;
        if !status.is_success() {
            let preview_source = if gzip {
                gunzip(&body).unwrap_or_else(|_| body.to_vec())
            } else {
                body.to_vec()
            };
            return Err(map_status_error(status, &preview_source));
        }

        let bytes = if gzip { gunzip(&body)? } else { body.to_vec() };
        debug!(byte_count = bytes.len(), gzip, "publisher document received");
        String::from_utf8(bytes).map_err(|error| {
            PublisherSourceError::decode(format!("body is not valid UTF-8: {error}"))
        })
    }
}

#[async_trait]
impl PublisherSource for PublisherHttpSource {
    async fn fetch_metadata(&self) -> Result<String, PublisherSourceError> {
        self.get_text(self.endpoints.metadata_url.clone()).await
    }

    async fn fetch_army_data(&self, faction_id: i64) -> Result<String, PublisherSourceError> {
        let url = army_url(&self.endpoints.army_base_url, faction_id)?;
        self.get_text(url).await
    }
}

fn army_url(base: &Url, faction_id: i64) -> Result<Url, PublisherSourceError> {
    let joined = format!("{}/{faction_id}", base.as_str().trim_end_matches('/'));
    Url::parse(&joined).map_err(|error| {
        PublisherSourceError::invalid_request(format!("cannot build army URL {joined}: {error}"))
    })
}

fn declares_gzip(headers: &HeaderMap) -> bool {
    headers
        .get_all(CONTENT_ENCODING)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(','))
        .any(|coding| coding.trim().eq_ignore_ascii_case("gzip"))
}

fn gunzip(body: &[u8]) -> Result<Vec<u8>, PublisherSourceError> {
    let mut decoded = Vec::with_capacity(body.len().saturating_mul(4));
    GzDecoder::new(body)
        .read_to_end(&mut decoded)
        .map_err(|error| PublisherSourceError::decode(format!("invalid gzip body: {error}")))?;
    Ok(decoded)
}

fn map_transport_error(error: reqwest::Error) -> PublisherSourceError {
    if error.is_timeout() {
        PublisherSourceError::timeout(error.to_string())
    } else {
        PublisherSourceError::transport(error.to_string())
    }
}

fn map_status_error(status: StatusCode, body: &[u8]) -> PublisherSourceError {
    let preview = body_preview(body);
    let message = if preview.is_empty() {
        status
            .canonical_reason()
            .unwrap_or("no response body")
            .to_owned()
    } else {
        preview
    };
    PublisherSourceError::status(status.as_u16(), message)
}

fn body_preview(body: &[u8]) -> String {
    const PREVIEW_CHAR_LIMIT: usize = 160;

    let compact = String::from_utf8_lossy(body)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    let mut preview: String = compact.chars().take(PREVIEW_CHAR_LIMIT).collect();
    if compact.chars().count() > PREVIEW_CHAR_LIMIT {
        preview.push_str("...");
    }
    preview
}
