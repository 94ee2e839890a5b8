//! Tests for domain error construction and issue bookkeeping.

use super::*;
use rstest::rstest;
use serde_json::json;

#[rstest]
#[case(ErrorCode::InvalidRequest, 4000)]
#[case(ErrorCode::Unauthorized, 4010)]
#[case(ErrorCode::Forbidden, 4030)]
#[case(ErrorCode::NotFound, 4040)]
#[case(ErrorCode::Conflict, 4090)]
#[case(ErrorCode::TooManyRequests, 4290)]
#[case(ErrorCode::InternalError, 5000)]
#[case(ErrorCode::ServiceUnavailable, 5030)]
fn numeric_codes_are_stable(#[case] code: ErrorCode, #[case] numeric: u16) {
    assert_eq!(code.numeric(), numeric);
}

#[rstest]
fn serialised_code_matches_as_str() {
    let value = serde_json::to_value(ErrorCode::TooManyRequests).expect("serialise");
    assert_eq!(value, json!(ErrorCode::TooManyRequests.as_str()));
}

#[rstest]
fn blank_messages_fall_back_to_code_default() {
    let err = Error::new(ErrorCode::NotFound, "   ");
    assert_eq!(err.message(), "Resource not found");
}

#[rstest]
fn trace_id_is_absent_out_of_scope() {
    assert!(Error::internal("boom").trace_id().is_none());
}

#[tokio::test]
async fn trace_id_is_captured_in_scope() {
    let id = TraceId::generate();
    let err = TraceId::scope(id, async { Error::conflict("taken") }).await;
    assert_eq!(err.trace_id(), Some(id.to_string().as_str()));
}

#[rstest]
fn blank_trace_id_is_ignored() {
    let err = Error::internal("boom").with_trace_id("abc").with_trace_id("  ");
    assert_eq!(err.trace_id(), Some("abc"));
}

#[rstest]
fn validation_collects_issues_in_order() {
    let err = Error::validation([
        ValidationIssue::new(IssueCode::Required, "username is required").at("username"),
        ValidationIssue::new(IssueCode::TooSmall, "too short").at("password"),
    ]);
    assert_eq!(err.code(), ErrorCode::InvalidRequest);
    let paths: Vec<_> = err.issues().iter().map(|i| i.path().join(".")).collect();
    assert_eq!(paths, ["username", "password"]);
}

#[rstest]
fn issue_paths_prepend_segments() {
    let issue = ValidationIssue::new(IssueCode::InvalidType, "expected number")
        .at("year")
        .at("input");
    assert_eq!(issue.path(), ["input", "year"]);
}

#[rstest]
fn issue_serialises_optional_fields_only_when_present() {
    let bare = serde_json::to_value(ValidationIssue::new(IssueCode::Custom, "nope")).expect("json");
    assert_eq!(bare, json!({"code": "custom", "path": [], "message": "nope"}));

    let full = ValidationIssue::new(IssueCode::InvalidEnumValue, "bad sort")
        .at("sort")
        .with_received(json!("speed"))
        .with_options(["price", "year"]);
    let value = serde_json::to_value(full).expect("json");
    assert_eq!(value["received"], json!("speed"));
    assert_eq!(value["options"], json!(["price", "year"]));
}
