//! Regression coverage for domain error construction and serialisation.

use rstest::rstest;
use serde_json::json;

use super::*;

#[rstest]
#[case(Error::invalid_request("bad"), ErrorCode::InvalidRequest)]
#[case(Error::unauthorized("who"), ErrorCode::Unauthorized)]
#[case(Error::forbidden("nope"), ErrorCode::Forbidden)]
#[case(Error::not_found("gone"), ErrorCode::NotFound)]
#[case(Error::service_unavailable("later"), ErrorCode::ServiceUnavailable)]
#[case(Error::internal("boom"), ErrorCode::InternalError)]
fn constructors_set_expected_code(#[case] error: Error, #[case] expected: ErrorCode) {
    assert_eq!(error.code(), expected);
}

#[test]
fn invalid_transition_carries_state_details() {
    let error = Error::invalid_transition("pending_checkin", "submit invoice");
    assert_eq!(error.code(), ErrorCode::InvalidTransition);
    assert_eq!(
        error.details(),
        Some(&json!({
            "currentStatus": "pending_checkin",
            "attemptedTransition": "submit invoice",
        }))
    );
    assert!(error.message().contains("pending_checkin"));
}

#[test]
fn details_survive_serde_round_trip() {
    let error = Error::invalid_request("bad").with_details(json!({ "field": "caseId" }));
    let encoded = serde_json::to_string(&error).expect("serialises");
    let decoded: Error = serde_json::from_str(&encoded).expect("deserialises");
    assert_eq!(decoded, error);
}

#[test]
fn trace_id_is_absent_outside_request_scope() {
    let error = Error::internal("boom");
    assert!(error.trace_id().is_none());

    let encoded = serde_json::to_value(&error).expect("serialises");
    assert!(encoded.get("traceId").is_none());
}

#[tokio::test]
async fn trace_id_is_captured_inside_scope() {
    let trace_id = TraceId::from_uuid(uuid::Uuid::nil());
    let error = TraceId::scope(trace_id, async { Error::not_found("missing") }).await;
    assert_eq!(error.trace_id(), Some(trace_id.to_string().as_str()));
}

#[test]
fn with_trace_id_overrides_captured_value() {
    let error = Error::internal("boom").with_trace_id("manual");
    assert_eq!(error.trace_id(), Some("manual"));
}
