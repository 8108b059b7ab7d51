//! Tests for domain error construction and serialisation.

use super::*;
use rstest::{fixture, rstest};
use serde_json::{Value, json};

const TRACE_ID: &str = "00000000-0000-0000-0000-000000000000";

#[fixture]
fn expected_trace_id() -> String {
    TRACE_ID.to_owned()
}

#[rstest]
fn invalid_request_constructor_sets_code() {
    let err = Error::invalid_request("bad");
    assert_eq!(err.code(), ErrorCode::InvalidRequest);
}

#[rstest]
fn try_new_rejects_empty_messages() {
    let result = Error::try_new(ErrorCode::InvalidRequest, "   ");
    assert!(matches!(result, Err(ErrorValidationError::EmptyMessage)));
}

#[rstest]
fn try_with_trace_id_rejects_empty_values() {
    let result = Error::invalid_request("bad").try_with_trace_id("   ");
    assert!(matches!(result, Err(ErrorValidationError::EmptyTraceId)));
}

#[rstest]
fn new_returns_none_when_trace_id_out_of_scope() {
    let error = Error::internal("boom");
    assert!(error.trace_id().is_none());
}

#[rstest]
#[tokio::test]
async fn new_captures_trace_id_in_scope(expected_trace_id: String) {
    let trace_id: TraceId = expected_trace_id
        .parse()
        .expect("fixtures provide a valid UUID");
    let error = TraceId::scope(trace_id, async move { Error::not_found("missing") }).await;

    assert_eq!(error.trace_id(), Some(expected_trace_id.as_str()));
}

#[rstest]
#[tokio::test]
async fn deserialising_does_not_adopt_ambient_trace(expected_trace_id: String) {
    let trace_id: TraceId = expected_trace_id
        .parse()
        .expect("fixtures provide a valid UUID");
    let payload = json!({ "error": "not_found", "detail": "missing" });

    let error = TraceId::scope(trace_id, async move {
        serde_json::from_value::<Error>(payload).expect("payload deserialises")
    })
    .await;

    assert!(error.trace_id().is_none());
}

#[rstest]
fn serialises_with_error_and_detail_members() {
    let mut fields = FieldErrors::default();
    fields.add("email", "A user with this email already exists.");
    let error = Error::validation(fields).with_trace_id(TRACE_ID);

    let value = serde_json::to_value(&error).expect("error serialises");

    assert_eq!(value.get("error").and_then(Value::as_str), Some("invalid_request"));
    assert_eq!(value.get("detail").and_then(Value::as_str), Some("validation failed"));
    assert_eq!(value.get("traceId").and_then(Value::as_str), Some(TRACE_ID));
    assert_eq!(
        value.pointer("/fields/email/0").and_then(Value::as_str),
        Some("A user with this email already exists.")
    );
}

#[rstest]
fn empty_field_errors_are_not_attached() {
    let error = Error::invalid_request("bad").with_fields(FieldErrors::default());
    assert!(error.fields().is_none());

    let value = serde_json::to_value(&error).expect("error serialises");
    assert!(value.get("fields").is_none());
}

#[rstest]
fn rejects_blank_detail_when_deserialising() {
    let payload = json!({ "error": "internal_error", "detail": "  " });
    assert!(serde_json::from_value::<Error>(payload).is_err());
}
