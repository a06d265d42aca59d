//! Tests for domain error construction and serialization.

use super::*;
use rstest::rstest;
use serde_json::json;

#[rstest]
#[case::invalid(DomainError::invalid_request("bad"), ErrorCode::InvalidRequest)]
#[case::missing(DomainError::not_found("gone"), ErrorCode::NotFound)]
#[case::unavailable(DomainError::service_unavailable("down"), ErrorCode::ServiceUnavailable)]
#[case::cancelled(DomainError::cancelled("stop"), ErrorCode::Cancelled)]
#[case::internal(DomainError::internal("boom"), ErrorCode::InternalError)]
fn constructors_set_code(#[case] error: DomainError, #[case] expected: ErrorCode) {
    assert_eq!(error.code(), expected);
}

#[rstest]
fn try_new_rejects_empty_messages() {
    let result = DomainError::try_new(ErrorCode::InvalidRequest, "   ");
    assert!(matches!(result, Err(ErrorValidationError::EmptyMessage)));
}

#[rstest]
fn new_substitutes_blank_messages() {
    let error = DomainError::new(ErrorCode::InternalError, "");
    assert_eq!(error.message(), "unspecified error");
}

#[rstest]
fn serializes_with_snake_case_code_and_details() {
    let error = DomainError::not_found("no snapshot").with_details(json!({ "factionId": 10 }));
    let value = serde_json::to_value(&error).expect("error serializes");
    assert_eq!(
        value,
        json!({
            "code": "not_found",
            "message": "no snapshot",
            "details": { "factionId": 10 }
        })
    );
}

#[rstest]
fn deserialization_rejects_blank_message() {
    let result =
        serde_json::from_value::<DomainError>(json!({ "code": "not_found", "message": " " }));
    assert!(result.is_err());
}

#[rstest]
fn display_uses_message() {
    assert_eq!(DomainError::cancelled("sync cancelled").to_string(), "sync cancelled");
}

#[rstest]
fn boxes_as_std_error() {
    let boxed: Box<dyn std::error::Error + Send + Sync> =
        Box::new(DomainError::service_unavailable("store offline"));
    assert_eq!(boxed.to_string(), "store offline");
    assert!(boxed.downcast_ref::<DomainError>().is_some());
}
