//! Shared Diesel error mapping and timestamp conversion.

use chrono::{DateTime, SecondsFormat, Utc};
use tracing::debug;

use crate::domain::ports::StoreError;

/// Map a Diesel error into a store error and emit debug context.
pub(crate) fn map_diesel_error(error: diesel::result::Error, operation: &str) -> StoreError {
    use diesel::result::{DatabaseErrorKind, Error as DieselError};

    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), operation, "diesel operation failed");
        }
        other => debug!(error = %other, operation, "diesel operation failed"),
    }

    match error {
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, info) => {
            StoreError::connection(format!("{operation}: {}", info.message()))
        }
        DieselError::DeserializationError(cause) => {
            StoreError::serialization(format!("{operation}: {cause}"))
        }
        other => StoreError::query(format!("{operation}: {other}")),
    }
}

/// Text form used for timestamp columns.
pub(crate) fn timestamp_to_text(timestamp: DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Parse a timestamp column back into UTC.
pub(crate) fn timestamp_from_text(text: &str) -> Result<DateTime<Utc>, StoreError> {
    DateTime::parse_from_rfc3339(text)
        .map(|parsed| parsed.with_timezone(&Utc))
        .map_err(|error| StoreError::serialization(format!("invalid timestamp {text:?}: {error}")))
}

/// Convert a row index or limit into a SQLite integer.
pub(crate) fn to_sql_integer(value: usize) -> Result<i64, StoreError> {
    i64::try_from(value)
        .map_err(|_| StoreError::query(format!("value {value} exceeds the SQLite integer range")))
}
