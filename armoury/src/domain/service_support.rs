//! Error mapping and cancellation checks shared by the domain services.

use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::domain::DomainError;
use crate::domain::ports::{PublisherSourceError, StoreError};

/// Fail with [`crate::domain::ErrorCode::Cancelled`] when `cancel` has fired.
pub(crate) fn ensure_active(
    cancel: &CancellationToken,
    operation: &str,
) -> Result<(), DomainError> {
    if cancel.is_cancelled() {
        debug!(operation, "operation cancelled before start");
        return Err(DomainError::cancelled(format!("{operation} was cancelled")));
    }
    Ok(())
}

pub(crate) fn map_store_error(error: StoreError) -> DomainError {
    match error {
        StoreError::Connection { message } => {
            DomainError::service_unavailable(format!("local store unavailable: {message}"))
        }
        StoreError::Query { message } => {
            DomainError::service_unavailable(format!("local store query failed: {message}"))
        }
        StoreError::Serialization { message } => {
            DomainError::internal(format!("local store value invalid: {message}"))
        }
    }
}

pub(crate) fn map_source_error(error: PublisherSourceError) -> DomainError {
    match error {
        PublisherSourceError::InvalidRequest { message } => {
            DomainError::invalid_request(format!("publisher request invalid: {message}"))
        }
        other => DomainError::service_unavailable(other.to_string()),
    }
}

pub(crate) fn map_document_error(kind: &str, message: String) -> DomainError {
    DomainError::invalid_request(format!("{kind} document rejected: {message}"))
}
